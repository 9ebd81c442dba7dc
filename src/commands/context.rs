use bon::Builder;
use crossbox_process_management::{
    container::{ContainerRunner, RunnerSettings},
    drivers::Engine,
};
use crossbox_utils::{constants::GOFLAGS, join_path_container, Volume};
use indexmap::IndexMap;
use log::{debug, trace, LevelFilter};
use miette::{bail, Context as _, Result};

use super::CommonFlags;

/// Linker flags dropping the symbol table and the DWARF information.
const STRIP_DEBUG_LDFLAGS: &str = "-w -s";

/// Everything a target OS needs to build and package the
/// application, validated once from the command line.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Builder)]
pub struct Context {
    pub engine: Engine,
    pub volume: Volume,

    #[builder(into)]
    pub arch: Option<String>,

    #[builder(into)]
    pub name: String,

    #[builder(into)]
    pub app_id: Option<String>,

    #[builder(default = 1)]
    pub app_build: u32,

    #[builder(into, default = String::from("1.0.0"))]
    pub app_version: String,

    /// Icon location, relative to the project root.
    #[builder(into, default = String::from(crossbox_utils::constants::DEFAULT_ICON))]
    pub icon: String,

    /// Package location, relative to the project root.
    #[builder(into, default = String::from("."))]
    pub package: String,

    #[builder(into)]
    pub image: Option<String>,

    #[builder(default)]
    pub env: IndexMap<String, String>,

    #[builder(default)]
    pub tags: Vec<String>,

    #[builder(default)]
    pub pull: bool,

    #[builder(default)]
    pub cache_enabled: bool,

    #[builder(default)]
    pub release: bool,

    #[builder(default)]
    pub debug: bool,

    #[builder(default)]
    pub no_project_upload: bool,
}

impl Context {
    /// Validates the flags, resolves the engine and mounts the volume.
    ///
    /// # Errors
    /// Will error if no engine can be found, the project layout is
    /// invalid or the host directories can't be created.
    pub fn try_from_flags(flags: &CommonFlags) -> Result<Self> {
        trace!("Context::try_from_flags({flags:#?})");

        let engine = Engine::detect(flags.engine.as_deref())?;
        debug!(
            "Using {} engine at {}",
            engine.engine_type(),
            engine.binary().display()
        );

        let volume = Volume::mount(flags.dir.as_deref(), flags.cache_dir.as_deref())?;
        let must_exist = !flags.no_project_upload;

        volume
            .project_path_container(&flags.package, must_exist)
            .wrap_err("Invalid package")?;
        volume
            .project_path_container(&flags.icon, must_exist)
            .wrap_err("Invalid icon")?;

        let name = match &flags.name {
            Some(name) => name.clone(),
            None => match volume.work_dir_host().file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => bail!(
                    "Cannot determine the application name from {}, use --name",
                    volume.work_dir_host().display()
                ),
            },
        };

        let mut env: IndexMap<String, String> = flags.env.iter().cloned().collect();
        if let Some(goflags) = goflags(flags.ldflags.as_deref(), !flags.no_strip_debug) {
            env.insert(GOFLAGS.to_string(), goflags);
        }

        Ok(Self {
            engine,
            volume,
            arch: flags.arch.clone(),
            name,
            app_id: flags.app_id.clone(),
            app_build: flags.app_build,
            app_version: flags.app_version.clone(),
            icon: flags.icon.clone(),
            package: flags.package.clone(),
            image: flags.image.clone(),
            env,
            tags: flags.tags.clone(),
            pull: flags.pull,
            cache_enabled: !flags.no_cache,
            release: flags.release,
            debug: flags.debug || log::max_level() >= LevelFilter::Debug,
            no_project_upload: flags.no_project_upload,
        })
    }

    /// A runner sharing this context with every image it creates.
    #[must_use]
    pub fn runner(&self) -> ContainerRunner {
        ContainerRunner::new(
            RunnerSettings::builder()
                .engine(self.engine.clone())
                .volume(self.volume.clone())
                .env(self.env.clone())
                .tags(self.tags.clone())
                .pull(self.pull)
                .cache_enabled(self.cache_enabled)
                .debug(self.debug)
                .build(),
        )
    }

    /// The package directory inside the container.
    #[must_use]
    pub fn package_dir_container(&self) -> String {
        join_path_container([self.volume.work_dir_container(), self.package.clone()])
    }

    /// The icon location inside the container.
    #[must_use]
    pub fn icon_container(&self) -> String {
        join_path_container([self.volume.work_dir_container(), self.icon.clone()])
    }
}

/// Builds the `GOFLAGS` value carrying the linker flags. A list of
/// several flags is quoted so the go tool keeps it as one value.
fn goflags(ldflags: Option<&str>, strip_debug: bool) -> Option<String> {
    let fields = ldflags
        .into_iter()
        .chain(strip_debug.then_some(STRIP_DEBUG_LDFLAGS))
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>();

    match fields.as_slice() {
        [] => None,
        [single] => Some(format!("-ldflags={single}")),
        many => Some(format!("-ldflags='{}'", many.join(" "))),
    }
}
