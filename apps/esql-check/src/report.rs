use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use esql::ValidationResult;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human readable messages
    #[default]
    Text,
    /// One JSON object per checked input
    Json,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every input was valid or skipped
    Passed,
    /// An input was invalid
    Failed,
}

impl Status {
    pub fn exit_code(self) -> u8 {
        match self {
            Status::Passed => 0,
            Status::Failed => 1,
        }
    }
}

#[derive(Serialize)]
struct Record<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(flatten)]
    result: &'a ValidationResult,
}

#[derive(Serialize)]
struct Skipped {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    status: &'static str,
}

fn display_path(path: Option<&Path>) -> Option<String> {
    path.map(|path| path.display().to_string())
}

/// Writes verdicts to stdout and stderr
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Announce a file before its verdict. Text output only.
    pub fn checking_file(&self, path: &Path) -> Result<()> {
        if self.format == OutputFormat::Text {
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "Checking file '{}'... ", path.display())?;
            stdout.flush()?;
        }
        Ok(())
    }

    /// The input holds no ES|QL to check
    pub fn skipped(&self, path: Option<&Path>) -> Result<()> {
        match self.format {
            // files mode finishes the `Checking file` line on stdout
            OutputFormat::Text if path.is_some() => println!("Skipping validation."),
            OutputFormat::Text => eprintln!("Skipping validation."),
            OutputFormat::Json => {
                let record = Skipped {
                    path: display_path(path),
                    status: "skipped",
                };
                println!("{}", serde_json::to_string(&record)?);
            }
        }
        Ok(())
    }

    pub fn result(&self, path: Option<&Path>, result: &ValidationResult) -> Result<Status> {
        match self.format {
            OutputFormat::Text => match result {
                ValidationResult::Valid => println!("Input is valid ✅"),
                ValidationResult::Invalid(diagnostic) => {
                    // keep the `Checking file` line terminated on stdout
                    if path.is_some() {
                        println!();
                    }
                    eprintln!("Input is invalid ❌");
                    eprintln!("{diagnostic}");
                }
            },
            OutputFormat::Json => println!("{}", serde_json::to_string(&record(path, result))?),
        }

        Ok(if result.is_valid() {
            Status::Passed
        } else {
            Status::Failed
        })
    }

    pub fn file_failed(&self, path: &Path) {
        if self.format == OutputFormat::Text {
            eprintln!("Check for file '{}' failed", path.display());
        }
    }
}

fn record<'a>(path: Option<&Path>, result: &'a ValidationResult) -> Record<'a> {
    Record {
        path: display_path(path),
        result,
    }
}
