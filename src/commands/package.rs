use crossbox_process_management::{container::ContainerImage, drivers::opts::RunOpts};
use crossbox_utils::{constants::DEFAULT_ICON, join_path_container, string_vec};
use log::{info, trace};
use miette::{Context as _, Result};

use super::Context;

/// Copies the application icon into the image temp dir, returning
/// its location inside the container.
///
/// # Errors
/// Will error if the copy fails.
pub fn prepare_icon(ctx: &Context, image: &mut ContainerImage) -> Result<String> {
    trace!("prepare_icon({})", image.id());

    let tmp = ctx.volume.tmp_dir_container();
    let icon = join_path_container([tmp.as_str(), image.id(), DEFAULT_ICON]);

    image
        .run(
            &ctx.volume,
            RunOpts::default(),
            &string_vec!["cp", ctx.icon_container(), &icon],
        )
        .wrap_err_with(|| format!("Could not copy the icon {}", ctx.icon))?;

    Ok(icon)
}

/// Arguments for `fyne package`.
pub fn package_args(ctx: &Context, image: &ContainerImage, target: &str, icon: &str) -> Vec<String> {
    let mut args = fyne_args("package", ctx, image, target, icon);
    if ctx.release {
        args.push("-release".to_string());
    }
    args
}

/// Arguments for `fyne release`, used to produce signed store builds.
pub fn release_args(ctx: &Context, image: &ContainerImage, target: &str, icon: &str) -> Vec<String> {
    fyne_args("release", ctx, image, target, icon)
}

fn fyne_args(
    subcommand: &str,
    ctx: &Context,
    image: &ContainerImage,
    target: &str,
    icon: &str,
) -> Vec<String> {
    let mut args = string_vec![
        "fyne",
        subcommand,
        "-os",
        target,
        "-name",
        &ctx.name,
        "-icon",
        icon,
        "-appBuild",
        ctx.app_build,
        "-appVersion",
        &ctx.app_version,
    ];

    if let Some(app_id) = &ctx.app_id {
        args.extend(string_vec!["-appID", app_id]);
    }

    if !image.tags().is_empty() {
        args.extend(string_vec!["-tags", image.tags().join(",")]);
    }

    args
}

/// Runs the packaging tool inside the package directory.
///
/// # Errors
/// Will error if the packaging tool fails.
pub fn fyne(ctx: &Context, image: &mut ContainerImage, args: &[String]) -> Result<()> {
    info!("Packaging app...");

    let workdir = ctx.package_dir_container();
    image
        .run(
            &ctx.volume,
            RunOpts::builder().workdir(&workdir).build(),
            args,
        )
        .wrap_err("Could not package the Fyne app")
}

/// Moves the artifact produced by the packaging tool into the image
/// temp dir under a fixed name.
///
/// The tool sanitizes the artifact name, so it's located through
/// `pattern` by the shell instead of being computed here.
///
/// # Errors
/// Will error if no artifact matches or it can't be moved.
pub fn relocate(
    ctx: &Context,
    image: &mut ContainerImage,
    pattern: &str,
    package_name: &str,
) -> Result<()> {
    let package_dir = ctx.package_dir_container();
    let tmp = ctx.volume.tmp_dir_container();
    let command = format!(
        "mv {} {:?}",
        join_path_container([package_dir.as_str(), pattern]),
        join_path_container([tmp.as_str(), image.id(), package_name]),
    );

    image
        .run(
            &ctx.volume,
            RunOpts::default(),
            &string_vec!["sh", "-c", command],
        )
        .wrap_err_with(|| format!("Could not retrieve the packaged {pattern}"))
}
