use std::path::Path;

use crossbox_utils::constants::{DOCKER_ENGINE, PODMAN_ENGINE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineType {
    Docker,
    Podman,
}

impl EngineType {
    /// Recognizes the engine family from the file name of its binary.
    pub fn from_binary(binary: &Path) -> Option<Self> {
        let name = binary.file_stem()?.to_str()?;
        match name {
            DOCKER_ENGINE => Some(Self::Docker),
            PODMAN_ENGINE => Some(Self::Podman),
            _ => None,
        }
    }
}

impl std::fmt::Display for EngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match *self {
            Self::Docker => DOCKER_ENGINE,
            Self::Podman => PODMAN_ENGINE,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostUser {
    pub uid: u32,
    pub gid: u32,
}

/// The host facts that shape an engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Host {
    pub windows: bool,
    pub user: Option<HostUser>,
}

impl Host {
    #[must_use]
    pub fn current() -> Self {
        Self {
            windows: cfg!(windows),
            user: current_user(),
        }
    }
}

#[cfg(unix)]
fn current_user() -> Option<HostUser> {
    Some(HostUser {
        uid: users::get_current_uid(),
        gid: users::get_current_gid(),
    })
}

#[cfg(not(unix))]
const fn current_user() -> Option<HostUser> {
    None
}
