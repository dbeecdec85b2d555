use clap::{ArgAction, Args, Parser};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::extract::InputFormat;
use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// ES|QL statement, or a file holding one. Reads stdin when omitted.
    pub input: Option<String>,

    /// Check every file matching the glob pattern. Can be used multiple times.
    #[arg(long = "files", value_name = "GLOB", conflicts_with = "input")]
    pub files: Vec<String>,

    #[command(flatten)]
    pub format: FormatArgs,

    /// Output format, overrides the configuration file
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Files checked at the same time, overrides the configuration file
    #[arg(short, long)]
    pub jobs: Option<NonZeroUsize>,

    /// Configuration file to use instead of the user one
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// How to read the input. At most one of these.
#[derive(Args, Debug, Default)]
#[group(multiple = false)]
pub struct FormatArgs {
    /// Input is JSON; check the first property named FIELD
    #[arg(long, value_name = "FIELD")]
    pub json: Option<String>,

    /// Input is TOML; check the value under the dotted key FIELD
    #[arg(long, value_name = "FIELD")]
    pub toml: Option<String>,

    /// Input is an Elastic detection rule; check `rule.query` of ES|QL rules
    #[arg(long = "elastic-dr")]
    pub elastic_dr: bool,
}

impl FormatArgs {
    pub fn input_format(&self) -> InputFormat {
        if self.elastic_dr {
            InputFormat::ElasticDetectionRule
        } else if let Some(field) = &self.json {
            InputFormat::Json(field.clone())
        } else if let Some(field) = &self.toml {
            InputFormat::Toml(field.clone())
        } else {
            InputFormat::Esql
        }
    }
}
