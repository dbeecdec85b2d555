use std::fmt;

/// The first grammar violation found in a statement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    line: u32,
    column: u32,
    message: String,
}

impl Diagnostic {
    pub(crate) fn new(line: u32, column: u32, message: String) -> Self {
        Self {
            line: line.max(1),
            column,
            message,
        }
    }

    /// 1-based line of the offending token or character
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 0-based column of the offending token or character, in characters
    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Syntax error at line {}:{} - {}.",
            self.line, self.column, self.message
        )
    }
}

/// Verdict for one statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "status", rename_all = "lowercase")
)]
pub enum ValidationResult {
    Valid,
    Invalid(Diagnostic),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(diagnostic) => Some(diagnostic),
        }
    }
}

/// Line (1-based) and column (0-based, in characters) of a byte offset.
/// Lines are separated by `\n` only.
pub(crate) fn locate(source: &str, offset: usize) -> (u32, u32) {
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count();
    (
        u32::try_from(line).unwrap_or(u32::MAX),
        u32::try_from(column).unwrap_or(u32::MAX),
    )
}
