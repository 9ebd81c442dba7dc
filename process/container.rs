//! Build containers: one [`ContainerImage`] per target OS and
//! architecture, created by a [`ContainerRunner`].

pub use compose::*;
pub use image::*;
pub use runner::*;
pub use state::*;

mod compose;
mod image;
mod runner;
mod state;
