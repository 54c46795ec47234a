//! Command-line interface for the `parcel` binary.
//!
//! [`Cli`] has two resource groups, `jobs` and `grants`, plus global flags
//! (`--api-url`, `--verbose`).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Manage compute jobs and access grants on the Parcel platform.
#[derive(Debug, Parser)]
#[command(name = "parcel", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// API root, overriding `parcel.toml` and `PARCEL_API_URL`.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log every request (same as `RUST_LOG=parcel=debug`).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute jobs.
    #[command(subcommand)]
    Jobs(JobsCommand),

    /// Access grants.
    #[command(subcommand)]
    Grants(GrantsCommand),
}

#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    /// Submit a job spec read from a JSON or TOML file.
    Submit {
        file: PathBuf,
    },

    /// Show one job.
    Get {
        id: String,
    },

    /// List jobs, one page at a time.
    List(ListArgs),

    /// Stop a job.
    Terminate {
        id: String,
    },

    /// Poll a job until it succeeds or fails.
    Wait {
        id: String,

        /// Seconds between polls.
        #[arg(long, default_value_t = 2)]
        interval_secs: u64,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Cursor printed by the previous `jobs list`.
    #[arg(long)]
    pub page_token: Option<String>,

    /// Extra filter as `KEY=VALUE`, passed to the server unchanged. Repeatable.
    #[arg(long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))
}

#[derive(Debug, Subcommand)]
pub enum GrantsCommand {
    /// Grant an identity (or `everyone`) access.
    Create {
        #[arg(long)]
        grantee: String,

        /// Filter as a JSON document, passed to the server unchanged.
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show one grant.
    Get {
        id: String,
    },

    /// Revoke a grant.
    Delete {
        id: String,
    },
}
