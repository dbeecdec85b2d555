//! Outline of a parsed statement.
//!
//! Expressions are checked but not kept: the tree only records which
//! commands a statement is made of, plus the names a tool may want to
//! look at (sources, projected fields, enrich policies, lookup indices).

use chumsky::span::SimpleSpan;

pub type Span = SimpleSpan;
pub type Spanned<T> = (T, Span);

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub source: Spanned<SourceCommand>,
    pub commands: Vec<Spanned<ProcessingCommand>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceCommand {
    /// `FROM idx, other-* METADATA _id`
    From {
        sources: Vec<String>,
        metadata: Vec<String>,
    },
    /// `ROW a = 1, b = "x"`
    Row,
    /// `SHOW INFO`
    ShowInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingCommand {
    Where,
    Eval,
    Stats,
    Limit,
    Sort,
    Keep(Vec<String>),
    Drop(Vec<String>),
    Rename,
    Dissect,
    Grok,
    Enrich { policy: String },
    MvExpand,
    LookupJoin { index: String },
}
