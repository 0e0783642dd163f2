use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// Connection defaults for every call. Flags override the props file.
#[derive(Debug, Args, Clone)]
pub struct RequestArgs {
    /// JSON or YAML file with `port`, `ssl`, `verify` and `hosts`.
    #[arg(long, value_name = "FILE")]
    pub props: Option<PathBuf>,
    /// Candidate host, tried in the order given. Repeatable.
    #[arg(long = "host", value_name = "HOST")]
    pub hosts: Vec<String>,
    /// `-1` derives the port from the scheme.
    #[arg(long, allow_hyphen_values = true)]
    pub port: Option<i64>,
    #[arg(long)]
    pub ssl: bool,
    /// Skip TLS certificate verification.
    #[arg(long)]
    pub insecure: bool,
}

#[derive(Debug, Args, Clone)]
pub struct LimitArgs {
    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 30000, value_name = "MS")]
    pub timeout: u64,
    /// Connect timeout in milliseconds. A host that does not accept in time is skipped.
    #[arg(long, default_value_t = 10000, value_name = "MS")]
    pub connect_timeout: u64,
    #[arg(long, default_value_t = 4_194_304)]
    pub max_response_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EventsMode {
    None,
    Stdout,
    Log,
}
