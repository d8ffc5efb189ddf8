//! # CLI Argument Definitions
//!
//! Mirrors the classic `defaults` tool: domains are addressed by name, `GlobalDomain`
//! maps onto the shared Global domain and any other name is treated as an application id.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Read and write layered preference domains")]
pub struct Cli {
    /// Directory holding the archived domains
    #[arg(long, env = "STRATA_ROOT", default_value = ".strata", global = true)]
    pub root: PathBuf,

    /// Optional TOML or JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every visible preference, a whole domain, or a single key
    Read {
        domain: Option<String>,
        key: Option<String>,
    },
    /// Store a value in a domain
    Write {
        domain: String,
        key: String,
        value: String,
        /// How VALUE is interpreted
        #[arg(short, long, value_enum, default_value_t = ValueType::String)]
        r#type: ValueType,
    },
    /// Remove a key, or every key of a domain when no key is given
    Delete {
        domain: String,
        key: Option<String>,
    },
    /// List the domains archived under the root
    Domains {},
    /// Register fallback values from a JSON or TOML file and print the merged view
    Register {
        file: PathBuf,
        /// Application domain to merge the registered values with
        #[arg(short, long)]
        domain: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueType {
    String,
    Integer,
    Real,
    Bool,
}
