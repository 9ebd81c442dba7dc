use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
    sync::Arc,
};

use colored::Colorize;
use comlexr::cmd;
use crossbox_utils::{
    constants::{CGO_ENABLED, FREEBSD_OS, GOCACHE},
    join_path_host, string_vec, Architecture, Volume,
};
use indexmap::IndexMap;
use log::{debug, info, trace};

use crate::{
    drivers::opts::RunOpts,
    error::{ContainerError, ProcessError},
};

use super::{env_flags, mount_flags, ImageState, Mount, RunnerSettings, Transition};

/// Builds the Image ID of a target.
#[must_use]
pub fn image_id(os: &str, arch: Architecture) -> String {
    if arch.is_multiple() {
        os.to_string()
    } else {
        format!("{os}-{arch}")
    }
}

/// One build container: a target OS and architecture together with
/// the engine image providing its toolchain.
#[derive(Debug, Clone)]
pub struct ContainerImage {
    id: String,
    arch: Architecture,
    os: String,
    image: String,
    mounts: IndexMap<String, Mount>,
    env: IndexMap<String, String>,
    settings: Arc<RunnerSettings>,
    state: ImageState,
}

impl ContainerImage {
    pub(super) fn new(
        arch: Architecture,
        os: &str,
        image: &str,
        settings: Arc<RunnerSettings>,
    ) -> Self {
        Self {
            id: image_id(os, arch),
            arch,
            os: os.to_string(),
            image: image.to_string(),
            mounts: IndexMap::new(),
            env: IndexMap::new(),
            settings,
            state: ImageState::Created,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn arch(&self) -> Architecture {
        self.arch
    }

    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    #[must_use]
    pub const fn mounts(&self) -> &IndexMap<String, Mount> {
        &self.mounts
    }

    #[must_use]
    pub const fn env(&self) -> &IndexMap<String, String> {
        &self.env
    }

    /// The environment shared by every image of the runner.
    #[must_use]
    pub fn shared_env(&self) -> &IndexMap<String, String> {
        &self.settings.env
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.settings.tags
    }

    #[must_use]
    pub const fn state(&self) -> ImageState {
        self.state
    }

    /// Binds a host directory into the container. A mount with the
    /// same name is replaced.
    ///
    /// # Errors
    /// Will error once the image has run.
    pub fn set_mount<H, C>(&mut self, name: &str, host: H, container: C) -> Result<(), ContainerError>
    where
        H: Into<PathBuf>,
        C: Into<String>,
    {
        self.check_configurable("mount")?;
        self.insert_mount(name, host, container);
        Ok(())
    }

    /// Sets an environment variable for this image only.
    ///
    /// # Errors
    /// Will error once the image has run.
    pub fn set_env<K, V>(&mut self, name: K, value: V) -> Result<(), ContainerError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.check_configurable("configure env of")?;
        self.env.insert(name.into(), value.into());
        Ok(())
    }

    pub(super) fn insert_mount<H, C>(&mut self, name: &str, host: H, container: C)
    where
        H: Into<PathBuf>,
        C: Into<String>,
    {
        self.mounts.insert(
            name.to_string(),
            Mount {
                host: host.into(),
                container: container.into(),
            },
        );
    }

    fn check_configurable(&self, operation: &'static str) -> Result<(), ContainerError> {
        if self.state.is_configurable() {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> ContainerError {
        ContainerError::InvalidTransition {
            id: self.id.clone(),
            operation,
            state: self.state,
        }
    }

    fn guard(&self, transition: Transition) -> Result<ImageState, ContainerError> {
        self.state
            .next(transition)
            .ok_or_else(|| self.invalid(transition.as_str()))
    }

    /// Pulls a newer copy of the engine image when pulling is enabled.
    ///
    /// # Errors
    /// Will error if the image was already prepared or the pull fails.
    pub fn prepare(&mut self) -> Result<(), ContainerError> {
        trace!("ContainerImage::prepare({})", self.id);
        let next = self.guard(Transition::Prepare)?;

        if self.settings.pull {
            self.pull()?;
        }

        self.state = next;
        Ok(())
    }

    fn pull(&self) -> Result<(), ContainerError> {
        info!(
            "Checking for a newer version of the image: {}",
            self.image.bold()
        );

        let mut command = cmd!(self.settings.engine.binary(), "pull", &self.image);
        let display = format!("{command:?}");
        debug!("{display}");

        let output = command.output().map_err(|source| ContainerError::Pull {
            image: self.image.clone(),
            source: ProcessError::Spawn {
                command: display.clone(),
                source,
            },
        })?;

        debug!("{}", String::from_utf8_lossy(&output.stdout));
        debug!("{}", String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(ContainerError::Pull {
                image: self.image.clone(),
                source: ProcessError::Status {
                    command: display,
                    status: output.status,
                },
            });
        }

        info!("Image is up to date");
        Ok(())
    }

    /// The engine arguments for running `args` in a new container.
    ///
    /// The order is fixed: run flags, working dir, mounts, permission
    /// flags, the default env, the shared then the image env, the
    /// image reference and finally the command. The permission prefix
    /// has to stay the first element of the command.
    #[must_use]
    pub fn cmd_args(&self, vol: &Volume, opts: RunOpts, args: &[String]) -> Vec<String> {
        let workdir = opts
            .workdir
            .map_or_else(|| vol.work_dir_container(), ToString::to_string);
        let quote_needed = self.os != FREEBSD_OS;
        let permissions = self
            .settings
            .engine
            .permission_args(&self.settings.host, self.settings.debug);

        let mut cmd_args = string_vec!["run", "--rm", "-t", "-w", workdir];
        cmd_args.extend(mount_flags(self.mounts.values()));
        cmd_args.extend(permissions.flags);
        cmd_args.extend(string_vec![
            "-e",
            format!("{CGO_ENABLED}=1"),
            "-e",
            format!("{GOCACHE}={}", vol.go_cache_dir_container()),
        ]);
        cmd_args.extend(env_flags(&self.settings.env, quote_needed));
        cmd_args.extend(env_flags(&self.env, quote_needed));
        cmd_args.push(self.image.clone());
        cmd_args.extend(permissions.command_prefix);
        cmd_args.extend(args.iter().cloned());
        cmd_args
    }

    /// The engine process running `args` in a new container.
    ///
    /// The process inherits stdout and stderr of this tool.
    #[must_use]
    pub fn cmd(&self, vol: &Volume, opts: RunOpts, args: &[String]) -> Command {
        cmd!(
            self.settings.engine.binary(),
            for self.cmd_args(vol, opts, args),
        )
    }

    /// Runs `args` in a new container and waits for it to exit.
    ///
    /// # Errors
    /// Will error if the image wasn't prepared, the engine can't be
    /// launched or the command exits unsuccessfully.
    pub fn run(&mut self, vol: &Volume, opts: RunOpts, args: &[String]) -> Result<(), ContainerError> {
        trace!("ContainerImage::run({}, {opts:?}, {args:?})", self.id);
        let next = self.guard(Transition::Run)?;

        let mut command = self.cmd(vol, opts, args);
        debug!("{command:?}");

        let status = command.status().map_err(|source| ContainerError::Packaging {
            id: self.id.clone(),
            source: ProcessError::Spawn {
                command: format!("{command:?}"),
                source,
            },
        })?;

        if !status.success() {
            return Err(ContainerError::Packaging {
                id: self.id.clone(),
                source: ProcessError::Status {
                    command: format!("{command:?}"),
                    status,
                },
            });
        }

        self.state = next;
        Ok(())
    }

    /// Moves the packaged artifact from the image temp dir into the
    /// image dist dir on the host, returning its final location.
    ///
    /// Nothing is touched on the host when the artifact is missing.
    ///
    /// # Errors
    /// Will error if the image never ran, the artifact is missing or
    /// it can't be moved.
    pub fn finalize(&mut self, package_name: &str) -> Result<PathBuf, ContainerError> {
        trace!("ContainerImage::finalize({}, {package_name})", self.id);
        let next = self.guard(Transition::Finalize)?;

        let vol = &self.settings.volume;
        let src = join_path_host([vol.tmp_dir_host(), Path::new(&self.id), Path::new(package_name)]);
        let dist = join_path_host([vol.dist_dir_host(), Path::new(&self.id), Path::new(package_name)]);

        if src.symlink_metadata().is_err() {
            return Err(self.relocation(format!("{} not found", src.display()), None));
        }

        if let Some(parent) = dist.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                self.relocation(
                    format!("could not create the dist package dir {}", parent.display()),
                    Some(e),
                )
            })?;
        }

        // rename won't replace an existing directory, nor a file on windows
        if let Ok(meta) = dist.symlink_metadata() {
            let removed = if meta.is_dir() {
                fs::remove_dir_all(&dist)
            } else {
                fs::remove_file(&dist)
            };
            removed.map_err(|e| {
                self.relocation(
                    format!("could not replace {}", dist.display()),
                    Some(e),
                )
            })?;
        }

        fs::rename(&src, &dist).map_err(|e| {
            self.relocation(
                format!("could not move {} to {}", src.display(), dist.display()),
                Some(e),
            )
        })?;

        info!("Package: {}", dist.display().to_string().bold().green());

        self.state = next;
        Ok(dist)
    }

    fn relocation(&self, reason: String, source: Option<std::io::Error>) -> ContainerError {
        ContainerError::Relocation {
            id: self.id.clone(),
            reason,
            source,
        }
    }

    /// Releases the image. Images hold no engine resources between
    /// runs, so this only ends the lifecycle.
    pub fn close(&mut self) {
        trace!("ContainerImage::close({})", self.id);
        self.state = ImageState::Closed;
    }
}

#[cfg(test)]
mod test {
    use crossbox_utils::constants::PROJECT_MOUNT;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        container::{ContainerRunner, RunnerSettings},
        drivers::{
            types::{EngineType, Host, HostUser},
            Engine,
        },
    };

    const LINUX_HOST: Host = Host {
        windows: false,
        user: Some(HostUser { uid: 1000, gid: 985 }),
    };

    fn volume() -> Volume {
        Volume::new("/home/user/app", "/home/user/.cache/crossbox")
    }

    fn runner(engine: Engine, host: Host, debug: bool) -> ContainerRunner {
        ContainerRunner::new(
            RunnerSettings::builder()
                .engine(engine)
                .host(host)
                .volume(volume())
                .env(IndexMap::from([(
                    "GOFLAGS".to_string(),
                    "-ldflags=-w".to_string(),
                )]))
                .cache_enabled(true)
                .debug(debug)
                .build(),
        )
    }

    fn image(runner: &mut ContainerRunner, os: &str) -> ContainerImage {
        let image = runner
            .new_image_container(Architecture::Amd64, os, "fyneio/fyne-cross:1.2-base")
            .unwrap();
        image
            .set_mount(PROJECT_MOUNT, "/home/user/app", "/app")
            .unwrap();
        image.set_env("GOOS", os).unwrap();
        image.clone()
    }

    #[test]
    fn docker_command_maps_host_user() {
        let mut runner = runner(Engine::new("docker", EngineType::Docker), LINUX_HOST, false);
        let image = image(&mut runner, "linux");

        let args = image.cmd_args(
            &volume(),
            RunOpts::default(),
            &string_vec!["fyne", "package", "-os", "linux"],
        );

        assert_eq!(
            args,
            vec![
                "run",
                "--rm",
                "-t",
                "-w",
                "/app",
                "-v",
                "/home/user/.cache/crossbox:/go:z",
                "-v",
                "/home/user/app:/app:z",
                "-u",
                "1000:985",
                "--entrypoint",
                "fixuid",
                "-e",
                "CGO_ENABLED=1",
                "-e",
                "GOCACHE=/go/go-build",
                "-e",
                r#""GOFLAGS=-ldflags=-w""#,
                "-e",
                "GOOS=linux",
                "fyneio/fyne-cross:1.2-base",
                "-q",
                "fyne",
                "package",
                "-os",
                "linux",
            ]
        );
    }

    #[test]
    fn docker_command_in_debug_keeps_fixuid_verbose() {
        let mut runner = runner(Engine::new("docker", EngineType::Docker), LINUX_HOST, true);
        let image = image(&mut runner, "linux");

        let args = image.cmd_args(&volume(), RunOpts::default(), &string_vec!["sh"]);

        assert_eq!(
            args[args.len() - 2..],
            ["fyneio/fyne-cross:1.2-base", "sh"]
        );
        assert!(args.contains(&"--entrypoint".to_string()));
    }

    #[test]
    fn docker_command_on_windows_host() {
        let host = Host {
            windows: true,
            user: None,
        };
        let mut runner = runner(Engine::new("docker.exe", EngineType::Docker), host, false);
        let image = image(&mut runner, "windows");

        let args = image.cmd_args(&volume(), RunOpts::default(), &string_vec!["sh"]);

        assert!(!args.contains(&"-u".to_string()));
        assert!(!args.contains(&"--entrypoint".to_string()));
        assert!(!args.contains(&"-q".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("sh"));
    }

    #[test]
    fn podman_command_keeps_user_namespace() {
        let mut runner = runner(Engine::new("podman", EngineType::Podman), LINUX_HOST, false);
        let image = image(&mut runner, "linux");

        let args = image.cmd_args(&volume(), RunOpts::default(), &string_vec!["sh"]);

        assert_eq!(
            args[9..13],
            ["--userns", "keep-id", "-e", "use_podman=1"]
        );
        assert!(!args.contains(&"-u".to_string()));
        assert!(!args.contains(&"--entrypoint".to_string()));
        assert_eq!(
            args[args.len() - 2..],
            ["fyneio/fyne-cross:1.2-base", "sh"]
        );
    }

    #[test]
    fn freebsd_env_is_never_quoted() {
        let mut runner = runner(Engine::new("docker", EngineType::Docker), LINUX_HOST, false);
        let image = image(&mut runner, "freebsd");

        let args = image.cmd_args(&volume(), RunOpts::default(), &[]);

        assert!(args.contains(&"GOFLAGS=-ldflags=-w".to_string()));
        assert!(!args.iter().any(|a| a.starts_with('"')));
    }

    #[test]
    fn workdir_override() {
        let mut runner = runner(Engine::new("docker", EngineType::Docker), LINUX_HOST, false);
        let image = image(&mut runner, "linux");

        let args = image.cmd_args(
            &volume(),
            RunOpts::builder().workdir("/app/cmd/hello").build(),
            &[],
        );

        assert_eq!(args[3..5], ["-w", "/app/cmd/hello"]);
    }

    #[test]
    fn command_uses_engine_binary() {
        let mut runner = runner(
            Engine::new("/usr/bin/podman", EngineType::Podman),
            LINUX_HOST,
            false,
        );
        let image = image(&mut runner, "linux");

        let command = image.cmd(&volume(), RunOpts::default(), &string_vec!["sh"]);

        assert_eq!(command.get_program(), std::ffi::OsStr::new("/usr/bin/podman"));
        assert_eq!(
            command.get_args().count(),
            image.cmd_args(&volume(), RunOpts::default(), &string_vec!["sh"]).len()
        );
    }

    #[test]
    fn run_requires_prepare() {
        let mut runner = runner(Engine::new("docker", EngineType::Docker), LINUX_HOST, false);
        let mut image = image(&mut runner, "linux");

        let err = image
            .run(&volume(), RunOpts::default(), &string_vec!["sh"])
            .unwrap_err();

        assert!(matches!(
            err,
            ContainerError::InvalidTransition {
                operation: "run",
                state: ImageState::Created,
                ..
            }
        ));
    }

    #[test]
    fn finalize_requires_a_run() {
        let mut runner = runner(Engine::new("docker", EngineType::Docker), LINUX_HOST, false);
        let mut image = image(&mut runner, "linux");
        image.prepare().unwrap();

        let err = image.finalize("app.tar.xz").unwrap_err();

        assert!(matches!(
            err,
            ContainerError::InvalidTransition {
                operation: "finalize",
                state: ImageState::Prepared,
                ..
            }
        ));
    }

    #[test]
    fn mounts_are_frozen_after_the_first_run() {
        let mut runner = runner(Engine::new("docker", EngineType::Docker), LINUX_HOST, false);
        let mut image = image(&mut runner, "linux");
        image.state = ImageState::Ran;

        assert!(image.set_mount("sdk", "/opt/sdk", "/sdk").is_err());
        assert!(image.set_env("CC", "clang").is_err());
        assert!(!image.mounts().contains_key("sdk"));
    }

    fn ran_image(project: &Path) -> ContainerImage {
        let mut runner = ContainerRunner::new(
            RunnerSettings::builder()
                .engine(Engine::new("docker", EngineType::Docker))
                .host(LINUX_HOST)
                .volume(Volume::new(project, project.join("cache")))
                .build(),
        );
        let mut image = runner
            .new_image_container(Architecture::Arm64, "linux", "fyneio/fyne-cross:1.2-linux-arm64")
            .unwrap()
            .clone();
        image.state = ImageState::Ran;
        image
    }

    #[test]
    fn finalize_moves_the_artifact() {
        let project = tempfile::tempdir().unwrap();
        let mut image = ran_image(project.path());

        let tmp = project.path().join("crossbox/tmp/linux-arm64");
        fs::create_dir_all(&tmp).unwrap();
        fs::write(tmp.join("app.tar.xz"), b"artifact").unwrap();

        let dist = image.finalize("app.tar.xz").unwrap();

        assert_eq!(dist, project.path().join("crossbox/dist/linux-arm64/app.tar.xz"));
        assert_eq!(fs::read(&dist).unwrap(), b"artifact");
        assert!(!tmp.join("app.tar.xz").exists());
        assert_eq!(image.state(), ImageState::Finalized);
    }

    #[test]
    fn finalize_replaces_a_previous_artifact() {
        let project = tempfile::tempdir().unwrap();
        let mut image = ran_image(project.path());

        let tmp = project.path().join("crossbox/tmp/linux-arm64");
        let dist_dir = project.path().join("crossbox/dist/linux-arm64");
        fs::create_dir_all(&tmp).unwrap();
        fs::create_dir_all(&dist_dir).unwrap();
        fs::write(tmp.join("app.tar.xz"), b"new").unwrap();
        fs::write(dist_dir.join("app.tar.xz"), b"old").unwrap();

        let dist = image.finalize("app.tar.xz").unwrap();

        assert_eq!(fs::read(dist).unwrap(), b"new");
    }

    #[test]
    fn finalize_without_artifact_leaves_the_host_untouched() {
        let project = tempfile::tempdir().unwrap();
        let mut image = ran_image(project.path());

        let err = image.finalize("app.tar.xz").unwrap_err();

        assert!(matches!(err, ContainerError::Relocation { .. }));
        assert!(!project.path().join("crossbox").exists());
        assert_eq!(image.state(), ImageState::Ran);
    }

    #[test]
    fn close_ends_the_lifecycle() {
        let project = tempfile::tempdir().unwrap();
        let mut image = ran_image(project.path());

        image.close();

        assert_eq!(image.state(), ImageState::Closed);
        assert!(image.prepare().is_err());
    }

    #[cfg(unix)]
    mod process {
        use pretty_assertions::assert_eq;

        use super::*;

        fn prepared(binary: &str, pull: bool) -> ContainerImage {
            let mut runner = ContainerRunner::new(
                RunnerSettings::builder()
                    .engine(Engine::new(binary, EngineType::Docker))
                    .host(LINUX_HOST)
                    .volume(volume())
                    .pull(pull)
                    .build(),
            );
            runner
                .new_image_container(Architecture::Amd64, "linux", "fyneio/fyne-cross:1.2-base")
                .unwrap()
                .clone()
        }

        #[test]
        fn run_succeeds_with_the_engine() {
            let mut image = prepared("true", false);
            image.prepare().unwrap();

            image
                .run(&volume(), RunOpts::default(), &string_vec!["sh"])
                .unwrap();
            image
                .run(&volume(), RunOpts::default(), &string_vec!["sh"])
                .unwrap();

            assert_eq!(image.state(), ImageState::Ran);
        }

        #[test]
        fn failed_run_is_a_packaging_error() {
            let mut image = prepared("false", false);
            image.prepare().unwrap();

            let err = image
                .run(&volume(), RunOpts::default(), &string_vec!["sh"])
                .unwrap_err();

            assert!(matches!(
                err,
                ContainerError::Packaging {
                    source: ProcessError::Status { .. },
                    ..
                }
            ));
            assert_eq!(image.state(), ImageState::Prepared);
        }

        #[test]
        fn missing_engine_is_a_packaging_error() {
            let mut image = prepared("/nonexistent/crossbox-engine", false);
            image.prepare().unwrap();

            let err = image
                .run(&volume(), RunOpts::default(), &string_vec!["sh"])
                .unwrap_err();

            assert!(matches!(
                err,
                ContainerError::Packaging {
                    source: ProcessError::Spawn { .. },
                    ..
                }
            ));
        }

        #[test]
        fn failed_pull_abandons_the_image() {
            let mut image = prepared("false", true);

            let err = image.prepare().unwrap_err();

            assert!(matches!(err, ContainerError::Pull { .. }));
            assert_eq!(image.state(), ImageState::Created);
        }

        #[test]
        fn successful_pull_prepares_the_image() {
            let mut image = prepared("true", true);

            image.prepare().unwrap();

            assert_eq!(image.state(), ImageState::Prepared);
        }

        #[test]
        fn pull_skipped_when_disabled() {
            let mut image = prepared("/nonexistent/crossbox-engine", false);

            image.prepare().unwrap();

            assert_eq!(image.state(), ImageState::Prepared);
        }
    }
}
