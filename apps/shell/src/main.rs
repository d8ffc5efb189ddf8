#![allow(clippy::print_stdout)]

pub mod args;
pub mod commands;

use crate::args::{Cli, Command};
use crate::commands::Session;
use anyhow::Result;
use clap::Parser;
use strata_logger::Logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _logger = Logger::builder().name(env!("CARGO_PKG_NAME")).verbosity(cli.verbose).init()?;

    let session = Session::open(&cli.root, cli.config.as_deref())?;

    match cli.command {
        Command::Read { domain, key } => {
            println!("{}", session.read(domain.as_deref(), key.as_deref())?.trim_end());
        },
        Command::Write { domain, key, value, r#type } => {
            session.write(&domain, &key, &value, r#type)?;
        },
        Command::Delete { domain, key } => session.delete(&domain, key.as_deref())?,
        Command::Domains {} => {
            for domain in session.domains()? {
                println!("{domain}");
            }
        },
        Command::Register { file, domain } => {
            println!("{}", session.register(&file, domain.as_deref())?.trim_end());
        },
    }

    Ok(())
}
