use std::path::PathBuf;

use clap::Args;
use crossbox_utils::constants::{
    CB_ARCH, CB_CACHE_DIR, CB_ENGINE, CB_IMAGE, CB_PULL, DEFAULT_ICON,
};

/// Flags shared by every target OS.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Args)]
pub struct CommonFlags {
    /// List of target architectures separated by comma.
    ///
    /// Use `*` to build every architecture the target supports.
    #[arg(long, env = CB_ARCH)]
    pub arch: Option<String>,

    /// Build number.
    #[arg(long, default_value_t = 1)]
    pub app_build: u32,

    /// Application ID used for distribution.
    #[arg(long)]
    pub app_id: Option<String>,

    /// Version number in the form x, x.y or x.y.z semantic version.
    #[arg(long, default_value = "1.0.0")]
    pub app_version: String,

    /// Directory used to share and cache sources and dependencies
    /// between builds.
    ///
    /// Defaults to the user cache directory.
    #[arg(long, env = CB_CACHE_DIR)]
    pub cache_dir: Option<PathBuf>,

    /// Do not use the cache directory.
    #[arg(long)]
    pub no_cache: bool,

    /// Root directory of the project.
    ///
    /// Defaults to the current directory.
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// The container engine to use.
    ///
    /// Either docker or podman are detected when not set.
    #[arg(long, env = CB_ENGINE)]
    pub engine: Option<String>,

    /// Environment variable to set in the containers, in the
    /// form `KEY=VALUE`. Can be used multiple times.
    #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_env)]
    pub env: Vec<(String, String)>,

    /// Application icon, relative to the project root.
    #[arg(long, default_value = DEFAULT_ICON)]
    pub icon: String,

    /// Custom engine image to use instead of the default one.
    #[arg(long, env = CB_IMAGE)]
    pub image: Option<String>,

    /// Additional flags to pass to the external linker.
    #[arg(long, allow_hyphen_values = true)]
    pub ldflags: Option<String>,

    /// Name of the application.
    ///
    /// Defaults to the name of the project root.
    #[arg(long)]
    pub name: Option<String>,

    /// Don't check that project paths exist on the host.
    ///
    /// Useful when the engine runs on a remote host.
    #[arg(long)]
    pub no_project_upload: bool,

    /// Keep the debug information in the binary.
    #[arg(long)]
    pub no_strip_debug: bool,

    /// Pull a newer version of the engine image before using it.
    #[arg(long, env = CB_PULL)]
    pub pull: bool,

    /// Package in release mode.
    #[arg(long)]
    pub release: bool,

    /// List of build tags separated by comma.
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Keep the engine images verbose.
    #[arg(long)]
    pub debug: bool,

    /// The package to build, relative to the project root.
    #[arg(default_value = ".")]
    pub package: String,
}

fn parse_env(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("{value} must be in the form KEY=VALUE")),
    }
}
