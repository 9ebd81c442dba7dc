//! This crate is responsible for managing the processes spawned
//! by this tool. It selects the container engine, describes every
//! build container and builds the exact engine invocations that
//! run them.

pub mod container;
pub mod drivers;
pub mod error;

pub use error::{ContainerError, ProcessError};
