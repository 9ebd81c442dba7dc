use crossbox_utils::{constants::FIXUID_ENTRYPOINT, string_vec};
use log::trace;

use super::{
    types::{EngineType, Host},
    EngineDriver, PermissionArgs,
};

/// Docker runs the container as root unless told otherwise. The
/// images ship `fixuid`, which remaps the container user onto the
/// uid/gid passed with `-u` before running the user command.
#[derive(Debug)]
pub struct DockerDriver;

impl EngineDriver for DockerDriver {
    fn engine_type(&self) -> EngineType {
        EngineType::Docker
    }

    fn permission_args(&self, host: &Host, debug: bool) -> PermissionArgs {
        trace!("DockerDriver::permission_args({host:?}, {debug})");

        // Docker Desktop on Windows maps the ownership itself
        if host.windows {
            return PermissionArgs::default();
        }

        let Some(user) = host.user else {
            return PermissionArgs::default();
        };

        PermissionArgs {
            flags: string_vec![
                "-u",
                format!("{}:{}", user.uid, user.gid),
                "--entrypoint",
                FIXUID_ENTRYPOINT,
            ],
            command_prefix: if debug { vec![] } else { string_vec!["-q"] },
        }
    }
}
