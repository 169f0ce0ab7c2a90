//! Command-line interface of the `ckks-keygen` binary.

use crate::{Error, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Generate a CKKS key bundle if needed, then reload it and check that it
/// decrypts correctly.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "ckks-keygen", disable_version_flag = true)]
pub struct Cli {
    /// Directory holding the key bundle
    #[arg(short = 'd', long = "dir", value_name = "PATH", default_value = "./keys")]
    pub dir: PathBuf,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Run the lifecycle.
    Run(Cli),
    /// Print the rendered help text and exit successfully.
    Help(String),
}

/// Parses the command line, program name first.
pub fn parse<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Invocation::Run(cli)),
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            Ok(Invocation::Help(e.render().to_string()))
        }
        Err(e) => {
            let mut message = e.render().to_string();
            // Missing values are rendered without the usage line.
            if !message.contains("Usage:") {
                message.push('\n');
                message.push_str(&Cli::command().render_usage().to_string());
                message.push('\n');
            }
            Err(Error::Argument(message))
        }
    }
}
