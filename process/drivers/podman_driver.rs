use crossbox_utils::{constants::USE_PODMAN, string_vec};
use log::trace;

use super::{
    types::{EngineType, Host},
    EngineDriver, PermissionArgs,
};

/// Rootless podman maps the host user onto the container user
/// through the user namespace, the images only need to know
/// they're running under podman.
#[derive(Debug)]
pub struct PodmanDriver;

impl EngineDriver for PodmanDriver {
    fn engine_type(&self) -> EngineType {
        EngineType::Podman
    }

    fn permission_args(&self, host: &Host, debug: bool) -> PermissionArgs {
        trace!("PodmanDriver::permission_args({host:?}, {debug})");

        PermissionArgs {
            flags: string_vec!["--userns", "keep-id", "-e", format!("{USE_PODMAN}=1")],
            command_prefix: vec![],
        }
    }
}
