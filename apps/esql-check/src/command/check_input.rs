use super::Command;
use crate::config::Config;
use crate::error::Result;
use crate::extract::{Extracted, InputFormat};
use crate::input;
use crate::report::{Reporter, Status};
use esql::Validator;

/// Check the positional argument, or stdin when there is none
pub struct CheckInputCommand {
    config: Config,
    input: Option<String>,
    format: InputFormat,
    reporter: Reporter,
}

impl CheckInputCommand {
    pub fn new(config: Config, input: Option<String>, format: InputFormat, reporter: Reporter) -> Self {
        Self {
            config,
            input,
            format,
            reporter,
        }
    }
}

#[async_trait::async_trait]
impl Command for CheckInputCommand {
    async fn execute(&self) -> Result<Status> {
        let content = match &self.input {
            Some(argument) => input::read_argument(argument).await?,
            None => input::read_stdin().await?,
        };

        match self.format.extract(content)? {
            Extracted::Skip => {
                self.reporter.skipped(None)?;
                Ok(Status::Passed)
            }
            Extracted::Query(query) => {
                let result = Validator::new(self.config.limits()).validate(&query)?;
                self.reporter.result(None, &result)
            }
        }
    }
}
