mod cli;
mod command;
mod config;
mod error;
mod extract;
mod input;
mod report;

use std::process::ExitCode;

use clap::Parser;
use error::WrapErr;
use tracing::level_filters::LevelFilter;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command_line: cli::Cli) -> error::Result<report::Status> {
    color_eyre::install()?;

    let mut cfg = config::Config::load(command_line.config.as_deref())
        .context("Load configuration error")?;
    if let Some(jobs) = command_line.jobs {
        cfg.jobs = jobs;
    }
    if let Some(output) = command_line.output {
        cfg.output = output;
    }
    tracing::debug!(?cfg, "configuration");

    let reporter = report::Reporter::new(cfg.output);
    let format = command_line.format.input_format();

    let cmd: Box<dyn command::Command + Send + Sync> = if command_line.files.is_empty() {
        Box::new(command::CheckInputCommand::new(
            cfg,
            command_line.input,
            format,
            reporter,
        ))
    } else {
        Box::new(command::CheckFilesCommand::new(
            cfg,
            command_line.files,
            format,
            reporter,
        ))
    };
    cmd.execute().await
}

#[tokio::main]
async fn main() -> ExitCode {
    let command_line = cli::Cli::parse();
    init_tracing(command_line.verbose);

    match run(command_line).await {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(report) => ExitCode::from(error::report(&report)),
    }
}
