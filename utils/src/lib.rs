pub mod arch;
pub mod constants;
pub mod logging;
mod macros;
pub mod volume;

use std::path::PathBuf;

use log::trace;
use miette::{miette, Result};

pub use arch::Architecture;
pub use volume::{join_path_container, join_path_host, Volume};

/// Locates a command on the `PATH`.
///
/// # Errors
/// Will error if the command doesn't exist.
pub fn check_command_exists(command: &str) -> Result<PathBuf> {
    trace!("check_command_exists({command})");

    which::which(command)
        .inspect(|path| trace!("Command {command} found at {}", path.display()))
        .map_err(|e| miette!("Command {command} doesn't exist and is required: {e}"))
}

/// The user cache directory of the platform.
#[must_use]
pub fn cache_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|base_dirs| base_dirs.cache_dir().to_path_buf())
}
