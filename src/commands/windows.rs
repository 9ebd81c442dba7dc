use clap::Args;
use crossbox_process_management::container::ContainerImage;
use crossbox_utils::{
    constants::{CC, GOARCH, GOOS, WINDOWS_IMAGE, WINDOWS_OS},
    Architecture,
};
use miette::Result;

use super::{
    package::{fyne, package_args, prepare_icon, relocate},
    CommonFlags, Context, CrossboxCommand, PlatformBuilder,
};

#[derive(Debug, Args)]
pub struct WindowsCommand {
    #[command(flatten)]
    common: CommonFlags,
}

impl CrossboxCommand for WindowsCommand {
    fn try_run(&mut self) -> Result<()> {
        Windows::new(Context::try_from_flags(&self.common)?).build()
    }
}

/// Packages the application as a self contained executable.
#[derive(Debug)]
pub struct Windows {
    ctx: Context,
}

impl Windows {
    #[must_use]
    pub const fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

impl PlatformBuilder for Windows {
    const OS: &'static str = WINDOWS_OS;
    const SUPPORTED_ARCH: &'static [Architecture] = &[Architecture::Amd64, Architecture::I386];
    const DEFAULT_ARCH: Architecture = Architecture::Amd64;

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn default_image(&self, _arch: Architecture) -> &'static str {
        WINDOWS_IMAGE
    }

    fn configure(&self, image: &mut ContainerImage) -> Result<()> {
        let arch = image.arch();
        let cc = if arch == Architecture::I386 {
            "i686-w64-mingw32-gcc"
        } else {
            "x86_64-w64-mingw32-gcc"
        };

        image.set_env(GOOS, WINDOWS_OS)?;
        image.set_env(GOARCH, arch.as_str())?;
        image.set_env(CC, cc)?;
        Ok(())
    }

    fn run_each(&self, image: &mut ContainerImage) -> Result<String> {
        let package_name = format!("{}.exe", self.ctx.name);

        let icon = prepare_icon(&self.ctx, image)?;
        let args = package_args(&self.ctx, image, WINDOWS_OS, &icon);
        fyne(&self.ctx, image, &args)?;
        relocate(&self.ctx, image, "*.exe", &package_name)?;

        Ok(package_name)
    }
}
