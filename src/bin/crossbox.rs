use clap::Parser;
use crossbox::commands::{CommandArgs, CrossboxArgs, CrossboxCommand};
use crossbox_utils::logging::Logger;

fn main() {
    let args = CrossboxArgs::parse();

    Logger::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();

    log::trace!("Parsed arguments: {args:#?}");

    match args.command {
        CommandArgs::Android(mut command) => command.run(),

        CommandArgs::Freebsd(mut command) => command.run(),

        CommandArgs::Linux(mut command) => command.run(),

        CommandArgs::Windows(mut command) => command.run(),
    }
}
