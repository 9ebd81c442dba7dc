use clap::{crate_authors, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colored::Colorize;
use crossbox_process_management::container::{ContainerImage, ContainerRunner};
use crossbox_utils::{constants::PROJECT_MOUNT, Architecture, Volume};
use log::{error, info, trace};
use miette::{bail, Context as _, Result};

pub mod android;
mod context;
mod flags;
pub mod freebsd;
pub mod linux;
mod package;
pub mod windows;

pub use context::Context;
pub use flags::CommonFlags;

pub trait CrossboxCommand {
    /// Runs the command and returns a result
    /// of the execution
    ///
    /// # Errors
    /// Can return a `miette` Error
    fn try_run(&mut self) -> Result<()>;

    /// Runs the command and exits if there is an error.
    fn run(&mut self) {
        if let Err(e) = self.try_run() {
            error!("{e:?}");
            std::process::exit(1);
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "crossbox",
    about,
    long_about = None,
    author = crate_authors!(),
    version,
)]
pub struct CrossboxArgs {
    #[command(subcommand)]
    pub command: CommandArgs,

    #[clap(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, Subcommand)]
pub enum CommandArgs {
    /// Build and package an application for the android OS
    Android(android::AndroidCommand),

    /// Build and package an application for the freebsd OS
    Freebsd(freebsd::FreebsdCommand),

    /// Build and package an application for the linux OS
    Linux(linux::LinuxCommand),

    /// Build and package an application for the windows OS
    Windows(windows::WindowsCommand),
}

/// A target OS: which architectures and images it supports, how its
/// containers are set up and how an application is packaged in them.
pub trait PlatformBuilder {
    const OS: &'static str;
    const SUPPORTED_ARCH: &'static [Architecture];
    const DEFAULT_ARCH: Architecture;

    fn context(&self) -> &Context;

    /// The engine image used for `arch` unless overridden.
    fn default_image(&self, arch: Architecture) -> &'static str;

    /// Sets the target specific environment of a new image.
    ///
    /// # Errors
    /// Will error if the image can no longer be configured.
    fn configure(&self, image: &mut ContainerImage) -> Result<()>;

    /// Packages the application in a prepared image and leaves the
    /// artifact in the image temp dir, returning its file name.
    ///
    /// # Errors
    /// Will error if any step run in the container fails.
    fn run_each(&self, image: &mut ContainerImage) -> Result<String>;

    /// Creates one image per requested architecture.
    ///
    /// Every architecture is validated before the first image exists.
    ///
    /// # Errors
    /// Will error on an unknown or unsupported architecture.
    fn make_runner(&self) -> Result<ContainerRunner> {
        let ctx = self.context();
        let requested = ctx
            .arch
            .as_deref()
            .unwrap_or_else(|| Self::DEFAULT_ARCH.as_str());
        let archs = Architecture::parse_list(requested, Self::SUPPORTED_ARCH)
            .wrap_err_with(|| format!("Could not make build context for {} OS", Self::OS))?;
        trace!("Target architectures for {}: {archs:?}", Self::OS);

        let mut runner = ctx.runner();
        for arch in archs {
            let image_ref = ctx
                .image
                .as_deref()
                .unwrap_or_else(|| self.default_image(arch));
            let image = runner.new_image_container(arch, Self::OS, image_ref)?;
            image.set_mount(
                PROJECT_MOUNT,
                ctx.volume.work_dir_host(),
                ctx.volume.work_dir_container(),
            )?;
            self.configure(image)?;
        }

        Ok(runner)
    }

    /// Builds and packages every requested architecture.
    ///
    /// # Errors
    /// Will error if the images can't be made or any of them fails.
    fn build(&self) -> Result<()>
    where
        Self: Sized,
    {
        let mut runner = self.make_runner()?;
        run_targets(self, &mut runner)
    }
}

/// Runs every image of the runner through prepare, packaging and
/// finalize, one after the other.
///
/// A failing image doesn't stop the others. Each failure is logged
/// and the run ends with an error naming every failed image.
///
/// # Errors
/// Will error if at least one image failed.
pub fn run_targets<B>(builder: &B, runner: &mut ContainerRunner) -> Result<()>
where
    B: PlatformBuilder,
{
    let vol = &builder.context().volume;
    let mut failed = Vec::new();

    for image in runner.images_mut() {
        info!(
            "Target: {} ({})",
            image.os().bold(),
            image.arch().to_string().bold()
        );

        if let Err(e) = package_target(builder, vol, image) {
            error!("{e:?}");
            failed.push(image.id().to_string());
        }

        image.close();
    }

    if !failed.is_empty() {
        bail!("Packaging failed for {}", failed.join(", "));
    }

    Ok(())
}

fn package_target<B>(builder: &B, vol: &Volume, image: &mut ContainerImage) -> Result<()>
where
    B: PlatformBuilder,
{
    image.prepare()?;
    vol.reset_tmp_dir_host(image.id())?;
    let package = builder.run_each(image)?;
    image.finalize(&package)?;
    Ok(())
}
