use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "pfsuricata")]
#[command(about = "Manage Suricata interfaces and suppression lists in a pfSense config.xml")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Create, update or delete a Suricata interface.
    Interface(InterfaceArgs),
    /// Create, update or delete a Suricata suppression list.
    Suppress(SuppressArgs),
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Config file to reconcile. Defaults to the settings' config_path.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Settings TOML file. Defaults to the embedded settings.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
    /// Write the result here instead of back to --config.
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,
    /// Report what would change without writing or reloading.
    #[arg(long, global = true)]
    pub check: bool,
    /// Write the config but do not send the reload instruction.
    #[arg(long, global = true)]
    pub no_reload: bool,
    /// PHP shell program used for the reload instruction.
    #[arg(long, global = true)]
    pub shell: Option<String>,
    /// Remove stored fields that are not part of the record schema.
    #[arg(long, global = true)]
    pub prune_unknown: bool,
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Parser, Debug)]
pub struct InterfaceArgs {
    /// Interface name, e.g. `lan` or `opt1`.
    #[arg(long)]
    pub interface: String,
    /// Interface description.
    #[arg(long, default_value = "")]
    pub descr: String,
    /// Interface uuid. Assigned automatically on creation if omitted.
    #[arg(long)]
    pub uuid: Option<u32>,
    #[arg(long, value_enum, default_value_t = StateArg::Present)]
    pub state: StateArg,
}

#[derive(Parser, Debug)]
pub struct SuppressArgs {
    /// Suppression list name.
    #[arg(long)]
    pub name: String,
    /// Suppression list description.
    #[arg(long, default_value = "")]
    pub descr: String,
    /// Suppression rules, one per line.
    #[arg(long, default_value = "", conflicts_with = "rules_file")]
    pub rules: String,
    /// Read suppression rules from a file.
    #[arg(long)]
    pub rules_file: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = StateArg::Present)]
    pub state: StateArg,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum StateArg {
    Present,
    Absent,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
