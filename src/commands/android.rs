use clap::Args;
use crossbox_process_management::container::ContainerImage;
use crossbox_utils::{
    constants::{ANDROID_IMAGE, ANDROID_OS},
    Architecture,
};
use log::trace;
use miette::{bail, Context as _, Result};

use super::{
    package::{fyne, package_args, prepare_icon, relocate, release_args},
    CommonFlags, Context, CrossboxCommand, PlatformBuilder,
};

#[derive(Debug, Args)]
pub struct AndroidCommand {
    #[command(flatten)]
    common: CommonFlags,

    /// The location of the .keystore file containing the signing
    /// information, relative to the project root.
    #[arg(long)]
    keystore: Option<String>,

    /// Password for the .keystore file.
    #[arg(long)]
    keystore_pass: Option<String>,

    /// Password for the signer's private key, needed if the private
    /// key is password-protected.
    #[arg(long)]
    key_pass: Option<String>,
}

impl CrossboxCommand for AndroidCommand {
    fn try_run(&mut self) -> Result<()> {
        let ctx = Context::try_from_flags(&self.common)?;

        Android::try_new(
            ctx,
            self.keystore.as_deref(),
            self.keystore_pass.clone(),
            self.key_pass.clone(),
        )?
        .build()
    }
}

/// Packages the application as an APK. Without an architecture the
/// APK targets every instruction set.
#[derive(Debug)]
pub struct Android {
    ctx: Context,

    /// Keystore location inside the container.
    keystore: Option<String>,
    keystore_pass: Option<String>,
    key_pass: Option<String>,
}

impl Android {
    /// Validates the android specific settings.
    ///
    /// # Errors
    /// Will error if the application ID is missing, the keystore is
    /// outside of the project root or a release has no keystore.
    pub fn try_new(
        ctx: Context,
        keystore: Option<&str>,
        keystore_pass: Option<String>,
        key_pass: Option<String>,
    ) -> Result<Self> {
        trace!("Android::try_new({keystore:?})");

        if ctx.app_id.is_none() {
            bail!("appID is mandatory for {ANDROID_OS}");
        }

        let keystore = keystore
            .map(|keystore| {
                ctx.volume
                    .project_path_container(keystore, !ctx.no_project_upload)
                    .wrap_err("Invalid keystore location")
            })
            .transpose()?;

        if ctx.release && keystore.is_none() {
            bail!("A keystore is required to release for {ANDROID_OS}");
        }

        Ok(Self {
            ctx,
            keystore,
            keystore_pass,
            key_pass,
        })
    }

    /// The `-os` value for the packaging tool: `android` builds a fat
    /// APK, `android/<arch>` a single instruction set.
    fn target(arch: Architecture) -> String {
        if arch.is_multiple() {
            ANDROID_OS.to_string()
        } else {
            format!("{ANDROID_OS}/{arch}")
        }
    }

    fn release_args(&self, image: &ContainerImage, icon: &str) -> Vec<String> {
        let mut args = release_args(&self.ctx, image, &Self::target(image.arch()), icon);

        let signing = [
            ("-keyStore", self.keystore.as_ref()),
            ("-keyStorePass", self.keystore_pass.as_ref()),
            ("-keyPass", self.key_pass.as_ref()),
        ];
        args.extend(
            signing
                .into_iter()
                .filter_map(|(flag, value)| value.map(|value| [flag.to_string(), value.clone()]))
                .flatten(),
        );

        args
    }
}

impl PlatformBuilder for Android {
    const OS: &'static str = ANDROID_OS;
    const SUPPORTED_ARCH: &'static [Architecture] = &[
        Architecture::Multiple,
        Architecture::Amd64,
        Architecture::I386,
        Architecture::Arm,
        Architecture::Arm64,
    ];
    const DEFAULT_ARCH: Architecture = Architecture::Multiple;

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn default_image(&self, _arch: Architecture) -> &'static str {
        ANDROID_IMAGE
    }

    fn configure(&self, _image: &mut ContainerImage) -> Result<()> {
        Ok(())
    }

    fn run_each(&self, image: &mut ContainerImage) -> Result<String> {
        let package_name = format!("{}.apk", self.ctx.name);

        let icon = prepare_icon(&self.ctx, image)?;
        let args = if self.ctx.release {
            self.release_args(image, &icon)
        } else {
            package_args(&self.ctx, image, &Self::target(image.arch()), &icon)
        };
        fyne(&self.ctx, image, &args)?;
        relocate(&self.ctx, image, "*.apk", &package_name)?;

        Ok(package_name)
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use crossbox_process_management::drivers::{types::EngineType, Engine};
    use crossbox_utils::Volume;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn context(root: &std::path::Path) -> Context {
        Context::builder()
            .engine(Engine::new("docker", EngineType::Docker))
            .volume(Volume::new(root, root.join("cache")))
            .name("hello")
            .app_id("org.example.hello")
            .build()
    }

    #[test]
    fn app_id_is_mandatory() {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = context(root.path());
        ctx.app_id = None;

        let err = Android::try_new(ctx, None, None, None).unwrap_err();

        assert_eq!(err.to_string(), "appID is mandatory for android");
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn absolute_keystore_is_rejected(#[case] no_project_upload: bool) {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = context(root.path());
        ctx.no_project_upload = no_project_upload;

        assert!(Android::try_new(ctx, Some("/etc/release.keystore"), None, None).is_err());
    }

    #[test]
    fn keystore_escaping_the_project_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = context(root.path());
        ctx.no_project_upload = true;

        assert!(Android::try_new(ctx, Some("../release.keystore"), None, None).is_err());
    }

    #[test]
    fn missing_keystore_is_rejected_when_uploading() {
        let root = tempfile::tempdir().unwrap();

        assert!(Android::try_new(context(root.path()), Some("release.keystore"), None, None).is_err());
    }

    #[test]
    fn missing_keystore_is_accepted_without_upload() {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = context(root.path());
        ctx.no_project_upload = true;

        let android = Android::try_new(ctx, Some("keys/release.keystore"), None, None).unwrap();

        assert_eq!(android.keystore.as_deref(), Some("/app/keys/release.keystore"));
    }

    #[test]
    fn release_requires_a_keystore() {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = context(root.path());
        ctx.release = true;

        assert!(Android::try_new(ctx, None, None, None).is_err());
    }

    #[rstest]
    #[case(None, vec!["android"])]
    #[case(Some("*"), vec!["android-amd64", "android-386", "android-arm", "android-arm64"])]
    #[case(Some("multiple,arm64"), vec!["android", "android-arm64"])]
    fn image_ids(#[case] arch: Option<&str>, #[case] expected: Vec<&str>) {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = context(root.path());
        ctx.arch = arch.map(ToString::to_string);

        let runner = Android::try_new(ctx, None, None, None)
            .unwrap()
            .make_runner()
            .unwrap();

        assert_eq!(
            runner
                .images()
                .iter()
                .map(ContainerImage::id)
                .collect::<Vec<_>>(),
            expected
        );
        assert!(runner.images().iter().all(|i| i.image() == ANDROID_IMAGE));
    }

    #[test]
    fn release_signs_with_the_keystore() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("release.keystore"), b"keys").unwrap();
        let mut ctx = context(root.path());
        ctx.release = true;
        ctx.arch = Some("arm64".to_string());

        let android = Android::try_new(
            ctx,
            Some("release.keystore"),
            Some("store-secret".to_string()),
            None,
        )
        .unwrap();
        let runner = android.make_runner().unwrap();

        let args = android.release_args(&runner.images()[0], "/app/crossbox/tmp/android-arm64/Icon.png");

        assert_eq!(args[..4], ["fyne", "release", "-os", "android/arm64"]);
        assert_eq!(
            args[args.len() - 6..],
            [
                "-appID",
                "org.example.hello",
                "-keyStore",
                "/app/release.keystore",
                "-keyStorePass",
                "store-secret",
            ]
        );
    }
}
