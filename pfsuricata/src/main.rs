use anyhow::Result;
use clap::Parser;
use pfsuricata::logging::{self, Profile};

mod cli;
mod reconcile_cmd;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let profile = if cli.global.log_json {
        Profile::Json
    } else {
        Profile::Human
    };
    logging::init(profile, cli.global.verbose);

    match cli.command {
        Command::Interface(args) => reconcile_cmd::run_interface(&cli.global, args),
        Command::Suppress(args) => reconcile_cmd::run_suppress(&cli.global, args),
    }
}
