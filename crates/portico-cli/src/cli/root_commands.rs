use clap::{Args, Subcommand, ValueEnum};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Keep the catalog in sync until interrupted.
    Run,
    /// Run a single sync cycle and print its report.
    Once(OnceArgs),
    /// Print the resolved configuration with secrets redacted.
    Config,
    /// Print a JSON Schema for published data.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct OnceArgs {
    /// Seconds to wait for the first access token (defaults to the sync timeout)
    #[arg(long)]
    pub wait_secs: Option<u64>,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Which document to describe
    #[arg(value_enum, default_value = "batch")]
    pub target: SchemaTarget,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaTarget {
    /// The mutation batch handed to the catalog
    Batch,
    /// One normalized API version
    Record,
}
