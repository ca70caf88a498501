use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod build;
pub mod decode;
pub mod init;
pub mod version;

/// Global options every command sees.
#[derive(Debug)]
pub struct Context {
    pub config_path: PathBuf,
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file.
    Init(InitArgs),
    /// Encode the configured page into QR code artifacts.
    Build(BuildArgs),
    /// Reassemble a page from its artifacts.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Init(args) => init::run(args, ctx),
        Command::Build(args) => build::run(args, ctx),
        Command::Decode(args) => decode::run(args, ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Default)]
pub struct BuildArgs {}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Artifact directory. Defaults to the configured output path.
    pub dir: Option<PathBuf>,
    /// Write the page here instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
