use std::path::{Path, PathBuf};

use futures::{StreamExt, stream};

use super::Command;
use crate::config::Config;
use crate::error::Result;
use crate::extract::{Extracted, InputFormat};
use crate::input;
use crate::report::{Reporter, Status};
use esql::{ValidationResult, Validator};

enum Outcome {
    Skipped,
    Checked(ValidationResult),
}

/// Check every file matching the `--files` patterns.
///
/// Up to `jobs` files are read and validated at once, but verdicts are
/// reported in input order and the run stops at the first invalid file.
pub struct CheckFilesCommand {
    config: Config,
    patterns: Vec<String>,
    format: InputFormat,
    reporter: Reporter,
}

impl CheckFilesCommand {
    pub fn new(config: Config, patterns: Vec<String>, format: InputFormat, reporter: Reporter) -> Self {
        Self {
            config,
            patterns,
            format,
            reporter,
        }
    }
}

async fn check_file(path: &Path, format: &InputFormat, validator: Validator) -> Result<Outcome> {
    let content = input::read_file(path).await?;
    match format.extract(content)? {
        Extracted::Skip => Ok(Outcome::Skipped),
        Extracted::Query(query) => {
            let result = tokio::task::spawn_blocking(move || validator.validate(&query)).await??;
            Ok(Outcome::Checked(result))
        }
    }
}

async fn check(path: PathBuf, format: InputFormat, validator: Validator) -> (PathBuf, Result<Outcome>) {
    let outcome = check_file(&path, &format, validator).await;
    (path, outcome)
}

#[async_trait::async_trait]
impl Command for CheckFilesCommand {
    async fn execute(&self) -> Result<Status> {
        let paths = input::expand(&self.patterns)?;
        tracing::info!(files = paths.len(), jobs = self.config.jobs.get(), "checking files");

        let validator = Validator::new(self.config.limits());
        let checks = stream::iter(paths)
            .map(|path| check(path, self.format.clone(), validator))
            .buffered(self.config.jobs.get());
        let mut checks = std::pin::pin!(checks);

        while let Some((path, outcome)) = checks.next().await {
            self.reporter.checking_file(&path)?;
            match outcome? {
                Outcome::Skipped => self.reporter.skipped(Some(&path))?,
                Outcome::Checked(result) => {
                    if self.reporter.result(Some(&path), &result)? == Status::Failed {
                        self.reporter.file_failed(&path);
                        return Ok(Status::Failed);
                    }
                }
            }
        }

        Ok(Status::Passed)
    }
}
