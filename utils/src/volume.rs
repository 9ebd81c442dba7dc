//! Translation of the project directories between the host
//! and the build containers.
//!
//! The project root is mounted at [`WORK_DIR_CONTAINER`] and every
//! other project directory lives under it, so a path relative to the
//! project root is valid in both path spaces. The cache directory is
//! the exception: it lives outside of the project on the host and is
//! mounted at [`CACHE_DIR_CONTAINER`].

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use log::{debug, trace};
use miette::{bail, Context, IntoDiagnostic, Result};

use crate::constants::{
    CACHE_DIR_CONTAINER, CACHE_DIR_NAME, DIST_RELATIVE_PATH, GO_CACHE_DIR_NAME, TMP_RELATIVE_PATH,
    WORK_DIR_CONTAINER,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    cache_dir_host: PathBuf,
    dist_dir_host: PathBuf,
    tmp_dir_host: PathBuf,
    work_dir_host: PathBuf,
}

impl Volume {
    /// Describes the directory layout for a project without
    /// touching the filesystem.
    pub fn new<W, C>(work_dir_host: W, cache_dir_host: C) -> Self
    where
        W: Into<PathBuf>,
        C: Into<PathBuf>,
    {
        let work_dir_host = work_dir_host.into();
        Self {
            cache_dir_host: cache_dir_host.into(),
            dist_dir_host: work_dir_host.join(DIST_RELATIVE_PATH),
            tmp_dir_host: work_dir_host.join(TMP_RELATIVE_PATH),
            work_dir_host,
        }
    }

    /// Resolves the project layout and creates the host directories.
    ///
    /// The work dir defaults to the current directory and the cache
    /// dir to the user's cache directory.
    ///
    /// # Errors
    /// Will error if a default can't be determined or if a host
    /// directory can't be created.
    pub fn mount(work_dir_host: Option<&Path>, cache_dir_host: Option<&Path>) -> Result<Self> {
        trace!("Volume::mount({work_dir_host:?}, {cache_dir_host:?})");

        let work_dir_host = match work_dir_host {
            Some(dir) => std::path::absolute(dir)
                .into_diagnostic()
                .wrap_err_with(|| format!("Cannot resolve project root {}", dir.display()))?,
            None => std::env::current_dir()
                .into_diagnostic()
                .wrap_err("Cannot determine the current directory")?,
        };

        let cache_dir_host = match cache_dir_host {
            Some(dir) => std::path::absolute(dir)
                .into_diagnostic()
                .wrap_err_with(|| format!("Cannot resolve cache dir {}", dir.display()))?,
            None => match crate::cache_dir() {
                Some(dir) => dir.join(CACHE_DIR_NAME),
                None => bail!("Cannot determine the user cache directory, use --cache-dir"),
            },
        };

        let vol = Self::new(work_dir_host, cache_dir_host);

        for dir in [&vol.cache_dir_host, &vol.dist_dir_host, &vol.tmp_dir_host] {
            debug!("Creating host dir {}", dir.display());
            fs::create_dir_all(dir)
                .into_diagnostic()
                .wrap_err_with(|| format!("Cannot create the host dir {}", dir.display()))?;
        }

        Ok(vol)
    }

    #[must_use]
    pub fn work_dir_host(&self) -> &Path {
        &self.work_dir_host
    }

    #[must_use]
    pub fn work_dir_container(&self) -> String {
        WORK_DIR_CONTAINER.to_string()
    }

    #[must_use]
    pub fn dist_dir_host(&self) -> &Path {
        &self.dist_dir_host
    }

    #[must_use]
    pub fn dist_dir_container(&self) -> String {
        join_path_container([WORK_DIR_CONTAINER, DIST_RELATIVE_PATH])
    }

    #[must_use]
    pub fn tmp_dir_host(&self) -> &Path {
        &self.tmp_dir_host
    }

    #[must_use]
    pub fn tmp_dir_container(&self) -> String {
        join_path_container([WORK_DIR_CONTAINER, TMP_RELATIVE_PATH])
    }

    #[must_use]
    pub fn cache_dir_host(&self) -> &Path {
        &self.cache_dir_host
    }

    #[must_use]
    pub fn cache_dir_container(&self) -> String {
        CACHE_DIR_CONTAINER.to_string()
    }

    #[must_use]
    pub fn go_cache_dir_container(&self) -> String {
        join_path_container([CACHE_DIR_CONTAINER, GO_CACHE_DIR_NAME])
    }

    /// Empties the temporary directory of an image, leaving an
    /// existing empty directory behind.
    ///
    /// # Errors
    /// Will error if the directory can't be removed or created.
    pub fn reset_tmp_dir_host(&self, id: &str) -> Result<PathBuf> {
        let dir = self.tmp_dir_host.join(id);
        trace!("Volume::reset_tmp_dir_host({})", dir.display());

        if dir.exists() {
            fs::remove_dir_all(&dir)
                .into_diagnostic()
                .wrap_err_with(|| format!("Cannot clean the temp dir {}", dir.display()))?;
        }
        fs::create_dir_all(&dir)
            .into_diagnostic()
            .wrap_err_with(|| format!("Cannot create the temp dir {}", dir.display()))?;

        Ok(dir)
    }

    /// Translates a user supplied path relative to the project root
    /// into its location inside the container.
    ///
    /// When `must_exist` is set the path also has to exist on the host.
    ///
    /// # Errors
    /// Will error if the path is absolute, escapes the project root or,
    /// when `must_exist` is set, doesn't exist under the project root.
    pub fn project_path_container(&self, relative: &str, must_exist: bool) -> Result<String> {
        trace!("Volume::project_path_container({relative}, {must_exist})");

        if Path::new(relative).is_absolute() || relative.starts_with('/') {
            bail!(
                "Location {relative} must be relative to the project root: {}",
                self.work_dir_host.display()
            );
        }

        if escapes_root(relative) {
            bail!(
                "Location {relative} must be under the project root: {}",
                self.work_dir_host.display()
            );
        }

        if must_exist && !self.work_dir_host.join(relative).exists() {
            bail!(
                "Location {relative} must be under the project root: {}",
                self.work_dir_host.display()
            );
        }

        Ok(join_path_container([WORK_DIR_CONTAINER, relative]))
    }
}

fn escapes_root(relative: &str) -> bool {
    let mut depth: usize = 0;
    for component in Path::new(relative).components() {
        match component {
            Component::ParentDir => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return true,
            },
            Component::Normal(_) => depth += 1,
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    false
}

/// Joins path elements for the host filesystem.
pub fn join_path_host<I, P>(elements: I) -> PathBuf
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    elements
        .into_iter()
        .fold(PathBuf::new(), |acc, elem| acc.join(elem))
}

/// Joins path elements for the container filesystem.
///
/// Container paths always use `/` as separator regardless of the host.
/// The result is cleaned: empty and `.` segments are dropped and `..`
/// removes the previous segment.
pub fn join_path_container<I, S>(elements: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut absolute = None;
    let mut segments: Vec<String> = Vec::new();

    for elem in elements {
        let elem = elem.as_ref();
        if elem.is_empty() {
            continue;
        }
        absolute.get_or_insert_with(|| elem.starts_with('/'));

        for segment in elem.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.last().is_some_and(|s| s != "..") {
                        segments.pop();
                    } else if absolute != Some(true) {
                        segments.push(segment.to_string());
                    }
                }
                s => segments.push(s.to_string()),
            }
        }
    }

    let joined = segments.join("/");
    match absolute {
        Some(true) => format!("/{joined}"),
        _ if joined.is_empty() => ".".to_string(),
        _ => joined,
    }
}
