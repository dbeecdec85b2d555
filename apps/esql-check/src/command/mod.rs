pub mod check_files;
pub mod check_input;

use crate::error::Result;
use crate::report::Status;

pub use check_files::CheckFilesCommand;
pub use check_input::CheckInputCommand;

#[async_trait::async_trait]
pub trait Command {
    async fn execute(&self) -> Result<Status>;
}
