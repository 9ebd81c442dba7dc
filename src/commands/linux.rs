use clap::Args;
use crossbox_process_management::container::ContainerImage;
use crossbox_utils::{
    constants::{
        CC, GOARCH, GOARM, GOOS, LINUX_386_IMAGE, LINUX_ARM64_IMAGE, LINUX_ARM_IMAGE, LINUX_IMAGE,
        LINUX_OS,
    },
    Architecture,
};
use miette::Result;

use super::{
    package::{fyne, package_args, prepare_icon, relocate},
    CommonFlags, Context, CrossboxCommand, PlatformBuilder,
};

#[derive(Debug, Args)]
pub struct LinuxCommand {
    #[command(flatten)]
    common: CommonFlags,
}

impl CrossboxCommand for LinuxCommand {
    fn try_run(&mut self) -> Result<()> {
        Linux::new(Context::try_from_flags(&self.common)?).build()
    }
}

/// Packages the application as a `tar.xz` archive.
#[derive(Debug)]
pub struct Linux {
    ctx: Context,
}

impl Linux {
    #[must_use]
    pub const fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

impl PlatformBuilder for Linux {
    const OS: &'static str = LINUX_OS;
    const SUPPORTED_ARCH: &'static [Architecture] = &[
        Architecture::Amd64,
        Architecture::I386,
        Architecture::Arm,
        Architecture::Arm64,
    ];
    const DEFAULT_ARCH: Architecture = Architecture::Amd64;

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn default_image(&self, arch: Architecture) -> &'static str {
        match arch {
            Architecture::I386 => LINUX_386_IMAGE,
            Architecture::Arm => LINUX_ARM_IMAGE,
            Architecture::Arm64 => LINUX_ARM64_IMAGE,
            Architecture::Amd64 | Architecture::Multiple => LINUX_IMAGE,
        }
    }

    fn configure(&self, image: &mut ContainerImage) -> Result<()> {
        let arch = image.arch();
        image.set_env(GOOS, LINUX_OS)?;
        image.set_env(GOARCH, arch.as_str())?;

        match arch {
            Architecture::I386 => image.set_env(CC, "i686-linux-gnu-gcc")?,
            Architecture::Arm => {
                image.set_env(CC, "arm-linux-gnueabihf-gcc")?;
                image.set_env(GOARM, "7")?;
            }
            Architecture::Arm64 => image.set_env(CC, "aarch64-linux-gnu-gcc")?,
            Architecture::Amd64 | Architecture::Multiple => image.set_env(CC, "gcc")?,
        }

        Ok(())
    }

    fn run_each(&self, image: &mut ContainerImage) -> Result<String> {
        let package_name = format!("{}.tar.xz", self.ctx.name);

        let icon = prepare_icon(&self.ctx, image)?;
        let args = package_args(&self.ctx, image, LINUX_OS, &icon);
        fyne(&self.ctx, image, &args)?;
        relocate(&self.ctx, image, "*.tar.xz", &package_name)?;

        Ok(package_name)
    }
}

#[cfg(test)]
mod test {
    use crossbox_process_management::drivers::{types::EngineType, Engine};
    use crossbox_utils::Volume;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn linux(arch: &str) -> Linux {
        Linux::new(
            Context::builder()
                .engine(Engine::new("docker", EngineType::Docker))
                .volume(Volume::new("/home/user/hello", "/home/user/.cache/crossbox"))
                .arch(arch)
                .name("hello")
                .build(),
        )
    }

    #[rstest]
    #[case("amd64", LINUX_IMAGE, vec![("GOARCH", "amd64"), ("CC", "gcc")])]
    #[case("386", LINUX_386_IMAGE, vec![("GOARCH", "386"), ("CC", "i686-linux-gnu-gcc")])]
    #[case(
        "arm",
        LINUX_ARM_IMAGE,
        vec![("GOARCH", "arm"), ("CC", "arm-linux-gnueabihf-gcc"), ("GOARM", "7")]
    )]
    #[case("arm64", LINUX_ARM64_IMAGE, vec![("GOARCH", "arm64"), ("CC", "aarch64-linux-gnu-gcc")])]
    fn images_per_arch(
        #[case] arch: &str,
        #[case] expected_image: &str,
        #[case] expected_env: Vec<(&str, &str)>,
    ) {
        let runner = linux(arch).make_runner().unwrap();
        let image = &runner.images()[0];

        assert_eq!(image.id(), format!("linux-{arch}"));
        assert_eq!(image.image(), expected_image);
        assert_eq!(
            image
                .env()
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect::<Vec<_>>(),
            [vec![("GOOS", "linux")], expected_env].concat()
        );
    }

    #[test]
    fn all_architectures() {
        let runner = linux("*").make_runner().unwrap();

        assert_eq!(
            runner
                .images()
                .iter()
                .map(ContainerImage::id)
                .collect::<Vec<_>>(),
            vec!["linux-amd64", "linux-386", "linux-arm", "linux-arm64"]
        );
    }

    #[test]
    fn defaults_to_amd64() {
        let mut linux = linux("amd64");
        linux.ctx.arch = None;

        let runner = linux.make_runner().unwrap();

        assert_eq!(runner.images().len(), 1);
        assert_eq!(runner.images()[0].arch(), Architecture::Amd64);
    }
}
