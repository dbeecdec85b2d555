use thiserror::Error;

use crate::listener::Abort;

/// Failure of the grammar engine itself, unrelated to whether the input
/// conforms to the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineFault {
    #[error("input of {size} bytes exceeds the limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },

    #[error("nesting depth exceeds the limit of {limit} at line {line}:{column}")]
    NestingTooDeep { limit: usize, line: u32, column: u32 },

    #[error("parser reported syntax errors but no listener stopped it")]
    UnhandledSyntaxErrors,
}

/// Why a recognizer stopped before finishing its rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interrupt {
    /// A listener aborted on a lexical or syntactic error
    Abort(Abort),
    Fault(EngineFault),
}

impl From<Abort> for Interrupt {
    fn from(abort: Abort) -> Self {
        Interrupt::Abort(abort)
    }
}

impl From<EngineFault> for Interrupt {
    fn from(fault: EngineFault) -> Self {
        Interrupt::Fault(fault)
    }
}
