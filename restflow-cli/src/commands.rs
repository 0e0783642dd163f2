use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the calls of a template in order and print the collected results.
    Run {
        template: PathBuf,
        /// JSON or YAML mapping of template parameters.
        #[arg(long)]
        params: Option<PathBuf>,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set_params: Vec<String>,
        #[arg(long, value_enum, default_value_t = EventsMode::None)]
        events: EventsMode,
        #[command(flatten)]
        request: RequestArgs,
        #[command(flatten)]
        limits: LimitArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check a template without sending any request.
    Validate {
        template: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}
