use std::sync::Arc;

use bon::Builder;
use crossbox_utils::{constants::CACHE_MOUNT, Architecture, Volume};
use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    drivers::{types::Host, Engine},
    error::ContainerError,
};

use super::{image_id, ContainerImage};

/// Configuration shared by every image of a runner. It is
/// read-only once the runner is created.
#[derive(Debug, Clone, Builder)]
pub struct RunnerSettings {
    pub engine: Engine,

    #[builder(default = Host::current())]
    pub host: Host,

    pub volume: Volume,

    /// Environment passed to every container, before the
    /// image's own environment.
    #[builder(default)]
    pub env: IndexMap<String, String>,

    /// Build tags handed to the packaging tool.
    #[builder(default)]
    pub tags: Vec<String>,

    /// Pull a newer image before using it.
    #[builder(default)]
    pub pull: bool,

    /// Mount the cache dir into every container.
    #[builder(default)]
    pub cache_enabled: bool,

    #[builder(default)]
    pub debug: bool,
}

/// Creates and owns the build containers of one tool invocation.
///
/// The runner never executes anything itself.
#[derive(Debug)]
pub struct ContainerRunner {
    settings: Arc<RunnerSettings>,
    images: Vec<ContainerImage>,
}

impl ContainerRunner {
    #[must_use]
    pub fn new(settings: RunnerSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            images: Vec::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    #[must_use]
    pub fn volume(&self) -> &Volume {
        &self.settings.volume
    }

    /// Creates the container for an architecture of a target OS.
    ///
    /// The image inherits the shared environment and tags, and gets the
    /// cache dir mounted when caching is enabled.
    ///
    /// # Errors
    /// Will error if an image for the same OS and architecture was
    /// already created.
    pub fn new_image_container(
        &mut self,
        arch: Architecture,
        os: &str,
        image: &str,
    ) -> Result<&mut ContainerImage, ContainerError> {
        trace!("ContainerRunner::new_image_container({arch}, {os}, {image})");

        let id = image_id(os, arch);
        if self.images.iter().any(|i| i.id() == id) {
            return Err(ContainerError::Configuration(format!(
                "target {id} was requested more than once"
            )));
        }

        let mut container = ContainerImage::new(arch, os, image, Arc::clone(&self.settings));

        if self.settings.cache_enabled {
            let vol = &self.settings.volume;
            container.insert_mount(
                CACHE_MOUNT,
                vol.cache_dir_host(),
                vol.cache_dir_container(),
            );
        }

        debug!("Created image {} using {image}", container.id());
        self.images.push(container);

        self.images
            .last_mut()
            .ok_or_else(|| ContainerError::Configuration(format!("image {id} was not created")))
    }

    #[must_use]
    pub fn images(&self) -> &[ContainerImage] {
        &self.images
    }

    pub fn images_mut(&mut self) -> impl Iterator<Item = &mut ContainerImage> {
        self.images.iter_mut()
    }
}
