use clap::{Parser, Subcommand};

use crate::cmd::*;

mod args;

pub mod io;
pub use io::*;

pub const HYPHEN: &str = "-";

/// The CLI interface for the Pakket application.
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    /// The selected command.
    #[clap(subcommand)]
    pub command: PakketCommand,

    #[clap(flatten)]
    pub verbosity: args::Verbosity,
}

/// The top-level commands supported by Pakket.
#[derive(Debug, Subcommand)]
pub enum PakketCommand {
    Decode(decode::Decode),
    Encode(encode::Encode),
}

impl Command for PakketCommand {
    fn handle(self) -> eyre::Result<()> {
        match self {
            Self::Decode(decode) => decode.handle(),
            Self::Encode(encode) => encode.handle(),
        }
    }
}
