pub use run::*;

mod run;
