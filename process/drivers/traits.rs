use std::fmt::Debug;

use super::types::{EngineType, Host};

/// Arguments an engine family needs to keep the files written
/// to the mounted host directories owned by the host user.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PermissionArgs {
    /// Engine flags, placed after the mount flags.
    pub flags: Vec<String>,

    /// Arguments placed in front of the user command.
    pub command_prefix: Vec<String>,
}

/// Strategy for one engine family.
pub trait EngineDriver: Debug + Send + Sync {
    fn engine_type(&self) -> EngineType;

    /// Computes the user permission arguments for a container run.
    ///
    /// `debug` is set when the tool runs in debug mode, in which case
    /// helpers running before the user command are left verbose.
    fn permission_args(&self, host: &Host, debug: bool) -> PermissionArgs;
}
