mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use qrsite_pipeline::CONFIG_FILE_NAME;

use crate::cmd::{Command, Context};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "qrsite", version, about = "Turn a web page into QR codes and back")]
struct Cli {
    /// Path to the configuration file.
    #[arg(
        long,
        value_name = "PATH",
        default_value = CONFIG_FILE_NAME,
        env = "QRSITE_CONFIG",
        global = true
    )]
    config: PathBuf,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "QRSITE_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let context = Context {
        config_path: cli.config,
        format: cli.format.unwrap_or_else(OutputFormat::default_for_stdout),
    };
    let result = cmd::run(cli.command, &context);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
