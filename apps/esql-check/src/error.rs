use std::path::PathBuf;

use esql::EngineFault;
use thiserror::Error;

pub type Result<T> = color_eyre::Result<T>;
pub type Error = color_eyre::eyre::Report;

pub use color_eyre::eyre::WrapErr;

pub const EXIT_USAGE: u8 = 2;
pub const EXIT_IO: u8 = 10;
pub const EXIT_INPUT_FORMAT: u8 = 11;
pub const EXIT_ENGINE_FAULT: u8 = 90;
pub const EXIT_UNEXPECTED: u8 = 99;

/// Problems with what was handed to the checker, as opposed to problems with
/// the statement inside it
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("malformed {format} input: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },

    #[error("Field '{field}' not found in {format} input")]
    FieldNotFound { format: &'static str, field: String },

    #[error("Field '{field}' in {format} input is not a string")]
    NotAString { format: &'static str, field: String },
}

impl InputError {
    pub fn exit_code(&self) -> u8 {
        match self {
            InputError::Io { .. } => EXIT_IO,
            InputError::Pattern { .. } => EXIT_USAGE,
            InputError::Malformed { .. }
            | InputError::FieldNotFound { .. }
            | InputError::NotAString { .. } => EXIT_INPUT_FORMAT,
        }
    }
}

/// Exit code for a failed run, derived from the error underneath `report`
pub fn exit_code(report: &Error) -> u8 {
    if let Some(error) = report.downcast_ref::<InputError>() {
        error.exit_code()
    } else if report.downcast_ref::<EngineFault>().is_some() {
        EXIT_ENGINE_FAULT
    } else {
        EXIT_UNEXPECTED
    }
}

/// Print `report` the way its category asks for and return the exit code
pub fn report(report: &Error) -> u8 {
    let code = exit_code(report);
    match code {
        EXIT_USAGE => eprintln!("Error: {report}"),
        EXIT_IO => eprintln!("I/O error: {report}"),
        EXIT_INPUT_FORMAT => eprintln!("Input format error ❌: {report}"),
        EXIT_ENGINE_FAULT => eprintln!("Runtime error ❌: {report}"),
        _ => {
            eprintln!("Unexpected error ❌");
            eprintln!("{report:?}");
        }
    }
    code
}

#[cfg(test)]
mod test {
    use super::*;
    use color_eyre::eyre::eyre;
    use rstest::rstest;

    fn io_error() -> InputError {
        InputError::Io {
            path: PathBuf::from("missing.esql"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
    }

    #[rstest]
    #[case(io_error(), EXIT_IO)]
    #[case(InputError::Pattern { pattern: "[".into(), message: "bad".into() }, EXIT_USAGE)]
    #[case(InputError::Malformed { format: "JSON", message: "eof".into() }, EXIT_INPUT_FORMAT)]
    #[case(InputError::FieldNotFound { format: "TOML", field: "rule.query".into() }, EXIT_INPUT_FORMAT)]
    #[case(InputError::NotAString { format: "JSON", field: "query".into() }, EXIT_INPUT_FORMAT)]
    fn test_input_error_exit_codes(#[case] error: InputError, #[case] expected: u8) {
        assert_eq!(exit_code(&Error::new(error)), expected);
    }

    #[test]
    fn test_exit_code_survives_context() {
        let report = Err::<(), _>(io_error())
            .wrap_err("Reading query file")
            .unwrap_err();
        assert_eq!(exit_code(&report), EXIT_IO);
    }

    #[test]
    fn test_engine_fault_exit_code() {
        let report = Error::new(EngineFault::InputTooLarge { size: 10, limit: 1 });
        assert_eq!(exit_code(&report), EXIT_ENGINE_FAULT);
    }

    #[test]
    fn test_other_errors_are_unexpected() {
        assert_eq!(exit_code(&eyre!("something else")), EXIT_UNEXPECTED);
    }

    #[test]
    fn test_field_not_found_message() {
        let error = InputError::FieldNotFound {
            format: "JSON",
            field: "query".into(),
        };
        assert_eq!(error.to_string(), "Field 'query' not found in JSON input");
    }
}
