use std::ops::ControlFlow;

use crate::diagnostic::{Diagnostic, ValidationResult};
use crate::error::{EngineFault, Interrupt};
use crate::lexer::{Lexer, Limits};
use crate::listener::{Abort, ErrorListener, SyntaxError};
use crate::parser::EsqlParser;

/// Listener that turns the first anomaly it sees into a [`Diagnostic`] and
/// stops the recognizer that reported it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailFastSink;

impl ErrorListener for FailFastSink {
    fn syntax_error(&mut self, error: &SyntaxError) -> ControlFlow<Abort> {
        ControlFlow::Break(Abort::new(Diagnostic::new(
            error.line,
            error.column,
            error.message.clone(),
        )))
    }
}

/// Checks statements against the ES|QL grammar, stopping at the first error.
///
/// A fresh lexer and parser are built for every call, so a `Validator` holds
/// nothing but its limits and can be shared freely between threads.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    limits: Limits,
}

impl Validator {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Validate one statement.
    ///
    /// Grammar violations are reported as [`ValidationResult::Invalid`];
    /// `Err` is reserved for failures of the engine itself.
    pub fn validate(&self, text: &str) -> Result<ValidationResult, EngineFault> {
        let mut lexer = Lexer::with_limits(text, self.limits);
        lexer.remove_error_listeners();
        lexer.add_error_listener(FailFastSink);

        let mut parser = EsqlParser::new();
        parser.remove_error_listeners();
        parser.add_error_listener(FailFastSink);

        match parser.single_statement(lexer) {
            Ok(Some(statement)) => {
                tracing::debug!(
                    commands = statement.commands.len() + 1,
                    "statement is valid"
                );
                Ok(ValidationResult::Valid)
            }
            Ok(None) => Err(EngineFault::UnhandledSyntaxErrors),
            Err(Interrupt::Abort(abort)) => {
                let diagnostic = abort.into_diagnostic();
                tracing::debug!(
                    line = diagnostic.line(),
                    column = diagnostic.column(),
                    message = diagnostic.message(),
                    "statement is invalid"
                );
                Ok(ValidationResult::Invalid(diagnostic))
            }
            Err(Interrupt::Fault(fault)) => {
                tracing::warn!(%fault, "grammar engine fault");
                Err(fault)
            }
        }
    }
}

/// Validate `text` with the default limits
pub fn validate(text: &str) -> Result<ValidationResult, EngineFault> {
    Validator::default().validate(text)
}
