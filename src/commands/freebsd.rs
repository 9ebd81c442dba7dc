use clap::Args;
use crossbox_process_management::container::ContainerImage;
use crossbox_utils::{
    constants::{CC, FREEBSD_AMD64_IMAGE, FREEBSD_ARM64_IMAGE, FREEBSD_OS, GOARCH, GOOS},
    Architecture,
};
use miette::Result;

use super::{
    package::{fyne, package_args, prepare_icon, relocate},
    CommonFlags, Context, CrossboxCommand, PlatformBuilder,
};

#[derive(Debug, Args)]
pub struct FreebsdCommand {
    #[command(flatten)]
    common: CommonFlags,
}

impl CrossboxCommand for FreebsdCommand {
    fn try_run(&mut self) -> Result<()> {
        Freebsd::new(Context::try_from_flags(&self.common)?).build()
    }
}

#[derive(Debug)]
pub struct Freebsd {
    ctx: Context,
}

impl Freebsd {
    #[must_use]
    pub const fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

impl PlatformBuilder for Freebsd {
    const OS: &'static str = FREEBSD_OS;
    const SUPPORTED_ARCH: &'static [Architecture] = &[Architecture::Amd64, Architecture::Arm64];
    const DEFAULT_ARCH: Architecture = Architecture::Amd64;

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn default_image(&self, arch: Architecture) -> &'static str {
        if arch == Architecture::Arm64 {
            FREEBSD_ARM64_IMAGE
        } else {
            FREEBSD_AMD64_IMAGE
        }
    }

    fn configure(&self, image: &mut ContainerImage) -> Result<()> {
        let arch = image.arch();
        let cc = if arch == Architecture::Arm64 {
            "aarch64-unknown-freebsd12-clang"
        } else {
            "x86_64-unknown-freebsd12-clang"
        };

        image.set_env(GOOS, FREEBSD_OS)?;
        image.set_env(GOARCH, arch.as_str())?;
        image.set_env(CC, cc)?;
        Ok(())
    }

    fn run_each(&self, image: &mut ContainerImage) -> Result<String> {
        let package_name = format!("{}.tar.xz", self.ctx.name);

        let icon = prepare_icon(&self.ctx, image)?;
        let args = package_args(&self.ctx, image, FREEBSD_OS, &icon);
        fyne(&self.ctx, image, &args)?;
        relocate(&self.ctx, image, "*.tar.xz", &package_name)?;

        Ok(package_name)
    }
}
