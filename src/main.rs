use anyhow::Result;
use clap::Parser;

use shellgen::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, args.global.quiet);
    let log = logging::Logger::new();

    match args.command {
        cli::Command::Generate(opts) => commands::generate::run(&args.global, &opts, &log),
        cli::Command::Validate(opts) => commands::validate::run(&args.global, &opts, &log),
        cli::Command::Check(opts) => commands::check::run(&args.global, &opts, &log),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
