//! Error reporting channel shared by the lexer and the parser.
//!
//! Both recognizers report every anomaly they find to an ordered list of
//! [`ErrorListener`]s. A fresh list holds a single [`ConsoleErrorListener`],
//! which prints the anomaly and lets analysis continue. Callers that want
//! structured diagnostics clear the list and attach their own listener.

use std::fmt;
use std::ops::ControlFlow;

use crate::diagnostic::Diagnostic;

/// Which recognizer found the anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recognizer {
    Lexer,
    Parser,
}

impl fmt::Display for Recognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recognizer::Lexer => write!(f, "lexer"),
            Recognizer::Parser => write!(f, "parser"),
        }
    }
}

/// One lexical or syntactic anomaly, as reported by a recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub recognizer: Recognizer,
    /// Text of the offending token, `None` for lexical errors
    pub offending_symbol: Option<String>,
    /// 1-based line
    pub line: u32,
    /// 0-based column, counted in characters
    pub column: u32,
    /// Byte offset into the source text
    pub offset: usize,
    pub message: String,
}

/// Stops the recognizer that reported the error.
///
/// Only the fail-fast sink of the validator creates one, so every abort
/// carries the diagnostic of the first error it saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abort {
    diagnostic: Diagnostic,
}

impl Abort {
    pub(crate) fn new(diagnostic: Diagnostic) -> Self {
        Self { diagnostic }
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.diagnostic
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        self.diagnostic
    }
}

pub trait ErrorListener {
    /// Called once per anomaly, in the order the recognizer finds them.
    /// Returning `Break` ends the analysis on the spot.
    fn syntax_error(&mut self, error: &SyntaxError) -> ControlFlow<Abort>;
}

/// Default listener: prints `line L:C message` to stderr and keeps going
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleErrorListener;

impl ErrorListener for ConsoleErrorListener {
    fn syntax_error(&mut self, error: &SyntaxError) -> ControlFlow<Abort> {
        eprintln!("line {}:{} {}", error.line, error.column, error.message);
        ControlFlow::Continue(())
    }
}

/// Ordered listener list owned by a recognizer
pub(crate) struct Listeners {
    listeners: Vec<Box<dyn ErrorListener>>,
}

impl Default for Listeners {
    fn default() -> Self {
        Self {
            listeners: vec![Box::new(ConsoleErrorListener)],
        }
    }
}

impl Listeners {
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn push(&mut self, listener: Box<dyn ErrorListener>) {
        self.listeners.push(listener);
    }

    /// Deliver `error` to every listener until one of them breaks
    pub fn report(&mut self, error: &SyntaxError) -> ControlFlow<Abort> {
        for listener in &mut self.listeners {
            listener.syntax_error(error)?;
        }
        ControlFlow::Continue(())
    }
}
