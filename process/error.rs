use std::{io, process::ExitStatus};

use miette::Diagnostic;
use thiserror::Error;

use crate::container::ImageState;

/// Failure of an engine process.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to launch `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Status { command: String, status: ExitStatus },
}

#[derive(Error, Diagnostic, Debug)]
pub enum ContainerError {
    #[error("{0}")]
    #[diagnostic(code(crossbox::config))]
    Configuration(String),

    #[error("could not pull the docker image {image}")]
    #[diagnostic(
        code(crossbox::pull),
        help("Check the image reference and your registry credentials")
    )]
    Pull {
        image: String,
        #[source]
        source: ProcessError,
    },

    #[error("packaging failed for {id}")]
    #[diagnostic(code(crossbox::packaging))]
    Packaging {
        id: String,
        #[source]
        source: ProcessError,
    },

    #[error("could not retrieve the packaged artifact for {id}: {reason}")]
    #[diagnostic(code(crossbox::relocation))]
    Relocation {
        id: String,
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    #[error("cannot {operation} image {id} while it is {state}")]
    #[diagnostic(code(crossbox::lifecycle))]
    InvalidTransition {
        id: String,
        operation: &'static str,
        state: ImageState,
    },
}
