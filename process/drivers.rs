//! This module is responsible for selecting the container engine.
//! The engine family decides how the permissions of the mounted
//! project files are handled, every other part of an engine
//! invocation is shared between the families.

use std::path::{Path, PathBuf};

use comlexr::cmd;
use crossbox_utils::{
    check_command_exists,
    constants::{DOCKER_ENGINE, PODMAN_ENGINE},
};
use log::{debug, trace, warn};

use crate::error::ContainerError;

use self::{
    docker_driver::DockerDriver,
    podman_driver::PodmanDriver,
    types::{EngineType, Host},
};

pub use traits::*;

mod docker_driver;
pub mod opts;
mod podman_driver;
mod traits;
pub mod types;

static DOCKER_DRIVER: DockerDriver = DockerDriver;
static PODMAN_DRIVER: PodmanDriver = PodmanDriver;

/// A resolved container engine: the binary to invoke and the
/// strategy for its family.
#[derive(Debug, Clone)]
pub struct Engine {
    binary: PathBuf,
    driver: &'static dyn EngineDriver,
}

impl Engine {
    pub fn new<P>(binary: P, engine_type: EngineType) -> Self
    where
        P: Into<PathBuf>,
    {
        let driver: &'static dyn EngineDriver = match engine_type {
            EngineType::Docker => &DOCKER_DRIVER,
            EngineType::Podman => &PODMAN_DRIVER,
        };

        Self {
            binary: binary.into(),
            driver,
        }
    }

    /// Classifies a binary by its name.
    ///
    /// Any binary that isn't recognized as podman is driven
    /// like docker.
    pub fn classify<P>(binary: P) -> Self
    where
        P: Into<PathBuf>,
    {
        let binary = binary.into();
        let engine_type = EngineType::from_binary(&binary).unwrap_or_else(|| {
            warn!(
                "Unrecognized engine {}, handling it like {DOCKER_ENGINE}",
                binary.display()
            );
            EngineType::Docker
        });

        Self::new(binary, engine_type)
    }

    /// Resolves the engine to use.
    ///
    /// A requested engine has to exist on the `PATH`. Without a request
    /// docker is preferred, checking whether it is an alias of podman,
    /// then podman.
    ///
    /// # Errors
    /// Will error if the requested engine, or any engine when none
    /// was requested, can't be found.
    pub fn detect(requested: Option<&str>) -> Result<Self, ContainerError> {
        trace!("Engine::detect({requested:?})");

        if let Some(requested) = requested {
            let binary = check_command_exists(requested).map_err(|_| {
                ContainerError::Configuration(format!(
                    "engine binary {requested} not found in PATH"
                ))
            })?;
            return Ok(Self::classify(binary));
        }

        if let Ok(binary) = check_command_exists(DOCKER_ENGINE) {
            let engine_type = if is_podman_alias(&binary) {
                debug!("{} is an alias of {PODMAN_ENGINE}", binary.display());
                EngineType::Podman
            } else {
                EngineType::Docker
            };
            return Ok(Self::new(binary, engine_type));
        }

        check_command_exists(PODMAN_ENGINE)
            .map(|binary| Self::new(binary, EngineType::Podman))
            .map_err(|_| {
                ContainerError::Configuration(format!(
                    "could not find a container engine, need either {DOCKER_ENGINE} or {PODMAN_ENGINE}"
                ))
            })
    }

    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    #[must_use]
    pub fn engine_type(&self) -> EngineType {
        self.driver.engine_type()
    }

    #[must_use]
    pub fn is_podman(&self) -> bool {
        self.engine_type() == EngineType::Podman
    }

    /// Flags handling the ownership of the files the container
    /// writes to the mounted host directories.
    #[must_use]
    pub fn permission_args(&self, host: &Host, debug: bool) -> PermissionArgs {
        self.driver.permission_args(host, debug)
    }
}

fn is_podman_alias(binary: &Path) -> bool {
    let output = {
        let c = cmd!(binary, "--version");
        trace!("{c:?}");
        c
    }
    .output();

    output.is_ok_and(|out| {
        out.status.success()
            && String::from_utf8_lossy(&out.stdout)
                .to_lowercase()
                .contains(PODMAN_ENGINE)
    })
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("docker", EngineType::Docker)]
    #[case("/usr/bin/docker", EngineType::Docker)]
    #[case("podman", EngineType::Podman)]
    #[case("/usr/local/bin/podman", EngineType::Podman)]
    #[case("nerdctl", EngineType::Docker)]
    #[case("/opt/bin/podman-remote", EngineType::Docker)]
    fn classify(#[case] binary: &str, #[case] expected: EngineType) {
        let engine = Engine::classify(binary);

        assert_eq!(engine.engine_type(), expected);
        assert_eq!(engine.is_podman(), expected == EngineType::Podman);
        assert_eq!(engine.binary(), Path::new(binary));
    }

    #[test]
    fn detect_missing_requested_engine() {
        let err = Engine::detect(Some("crossbox-missing-engine")).unwrap_err();
        assert!(matches!(err, ContainerError::Configuration(_)));
    }

    #[cfg(unix)]
    mod alias {
        use std::{fs, os::unix::fs::PermissionsExt};

        use rstest::rstest;

        use super::*;

        fn fake_engine(dir: &Path, version: &str) -> PathBuf {
            let binary = dir.join("docker");
            fs::write(&binary, format!("#!/bin/sh\necho '{version}'\n")).unwrap();
            fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();
            binary
        }

        #[rstest]
        #[case("podman version 4.9.3", true)]
        #[case("Docker version 27.1.1, build 6312585", false)]
        fn docker_binary_may_be_podman(#[case] version: &str, #[case] expected: bool) {
            let dir = tempfile::tempdir().unwrap();
            let binary = fake_engine(dir.path(), version);

            assert_eq!(is_podman_alias(&binary), expected);
        }

        #[test]
        fn failing_binary_is_not_an_alias() {
            assert!(!is_podman_alias(Path::new("false")));
        }
    }
}
