use std::fmt;
use std::ops::{ControlFlow, Range};

use chumsky::span::SimpleSpan;
use logos::Logos;

use crate::diagnostic::locate;
use crate::error::{EngineFault, Interrupt};
use crate::listener::{ErrorListener, Listeners, Recognizer, SyntaxError};

pub const DEFAULT_MAX_INPUT_BYTES: usize = 4 * 1024 * 1024;
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Resource limits enforced while tokenizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_input_bytes: usize,
    /// Deepest allowed stack of open `(` and `[`
    pub max_nesting_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Raw tokens of the default mode, where expressions live
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip(r"([ \t\r\n\f]+|//[^\r\n]*|/\*([^*]|\*+[^*/])*\*+/)", allow_greedy = true))]
enum ExprToken {
    #[token("from", ignore(case))]
    From,
    #[token("row", ignore(case))]
    Row,
    #[token("show", ignore(case))]
    Show,
    #[token("where", ignore(case))]
    Where,
    #[token("eval", ignore(case))]
    Eval,
    #[token("stats", ignore(case))]
    Stats,
    #[token("by", ignore(case))]
    By,
    #[token("limit", ignore(case))]
    Limit,
    #[token("sort", ignore(case))]
    Sort,
    #[token("asc", ignore(case))]
    Asc,
    #[token("desc", ignore(case))]
    Desc,
    #[token("nulls", ignore(case))]
    Nulls,
    #[token("first", ignore(case))]
    First,
    #[token("last", ignore(case))]
    Last,
    #[token("keep", ignore(case))]
    Keep,
    #[token("drop", ignore(case))]
    Drop,
    #[token("rename", ignore(case))]
    Rename,
    #[token("dissect", ignore(case))]
    Dissect,
    #[token("grok", ignore(case))]
    Grok,
    #[token("enrich", ignore(case))]
    Enrich,
    #[token("with", ignore(case))]
    With,
    #[token("mv_expand", ignore(case))]
    MvExpand,
    #[token("lookup", ignore(case))]
    Lookup,
    #[token("join", ignore(case))]
    Join,
    #[token("and", ignore(case))]
    And,
    #[token("or", ignore(case))]
    Or,
    #[token("not", ignore(case))]
    Not,
    #[token("is", ignore(case))]
    Is,
    #[token("null", ignore(case))]
    Null,
    #[token("in", ignore(case))]
    In,
    #[token("like", ignore(case))]
    Like,
    #[token("rlike", ignore(case))]
    Rlike,
    #[token("true", ignore(case))]
    True,
    #[token("false", ignore(case))]
    False,

    #[token("|")]
    Pipe,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("=")]
    Assign,
    #[token("==")]
    Eq,
    #[token("!=")]
    Neq,
    #[token("<")]
    Lt,
    #[token("<=")]
    Lte,
    #[token(">")]
    Gt,
    #[token(">=")]
    Gte,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("::")]
    Cast,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[regex(r"[0-9]+", slice)]
    Integer(String),

    #[regex(
        r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?|\.[0-9]+([eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+",
        slice
    )]
    Decimal(String),

    #[regex(r#""([^"\\\r\n]|\\.)*""#, slice)]
    #[regex(r#""""([^"]|"[^"]|""[^"])*""""#, slice)]
    String(String),

    #[regex(r"\?([a-zA-Z_][a-zA-Z0-9_]*|[0-9]+)?", slice)]
    Param(String),

    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*|[_@][a-zA-Z0-9_]+", slice)]
    Ident(String),

    #[regex(r"`([^`]|``)*`", slice)]
    QuotedIdent(String),
}

/// Raw tokens after `FROM`, `ENRICH` and `JOIN`: index and policy names
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip(r"([ \t\r\n\f]+|//[^\r\n]*|/\*([^*]|\*+[^*/])*\*+/)", allow_greedy = true))]
enum SourceToken {
    #[token("|")]
    Pipe,
    #[token(",")]
    Comma,
    #[token("metadata", ignore(case))]
    Metadata,
    #[token("on", ignore(case))]
    On,
    #[token("with", ignore(case))]
    With,

    #[regex(r#""([^"\\\r\n]|\\.)*""#, slice)]
    String(String),

    #[regex(r#"[^ \t\r\n\f|,"/()\[\]=`]+"#, slice)]
    Pattern(String),
}

/// Raw tokens after `KEEP`, `DROP` and `RENAME`: field name patterns
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip(r"([ \t\r\n\f]+|//[^\r\n]*|/\*([^*]|\*+[^*/])*\*+/)", allow_greedy = true))]
enum ProjectionToken {
    #[token("|")]
    Pipe,
    #[token(",")]
    Comma,
    #[token("=")]
    Assign,
    #[token("as", ignore(case))]
    As,

    #[regex(r"[a-zA-Z0-9_@*.]+", slice)]
    Pattern(String),

    #[regex(r"`([^`]|``)*`", slice)]
    QuotedIdent(String),
}

fn slice<'src, T>(lex: &mut logos::Lexer<'src, T>) -> String
where
    T: Logos<'src, Source = str>,
{
    lex.slice().to_string()
}

/// The public token type, shared by all lexer modes
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    From,
    Row,
    Show,
    Where,
    Eval,
    Stats,
    By,
    Limit,
    Sort,
    Asc,
    Desc,
    Nulls,
    First,
    Last,
    Keep,
    Drop,
    Rename,
    As,
    Dissect,
    Grok,
    Enrich,
    On,
    With,
    MvExpand,
    Lookup,
    Join,
    Metadata,
    And,
    Or,
    Not,
    Is,
    Null,
    In,
    Like,
    Rlike,
    True,
    False,

    Pipe,
    Comma,
    Dot,
    Assign,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Cast,
    LParen,
    RParen,
    LBracket,
    RBracket,

    Integer(String),
    Decimal(String),
    /// Quoted string, quotes included
    String(String),
    Param(String),
    Ident(String),
    /// Back-quoted identifier, back quotes included
    QuotedIdent(String),
    /// Index, cluster or policy name pattern, e.g. `logs-*`
    SourcePattern(String),
    /// Field name pattern, e.g. `host.*`
    IdPattern(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::From => "FROM",
            Token::Row => "ROW",
            Token::Show => "SHOW",
            Token::Where => "WHERE",
            Token::Eval => "EVAL",
            Token::Stats => "STATS",
            Token::By => "BY",
            Token::Limit => "LIMIT",
            Token::Sort => "SORT",
            Token::Asc => "ASC",
            Token::Desc => "DESC",
            Token::Nulls => "NULLS",
            Token::First => "FIRST",
            Token::Last => "LAST",
            Token::Keep => "KEEP",
            Token::Drop => "DROP",
            Token::Rename => "RENAME",
            Token::As => "AS",
            Token::Dissect => "DISSECT",
            Token::Grok => "GROK",
            Token::Enrich => "ENRICH",
            Token::On => "ON",
            Token::With => "WITH",
            Token::MvExpand => "MV_EXPAND",
            Token::Lookup => "LOOKUP",
            Token::Join => "JOIN",
            Token::Metadata => "METADATA",
            Token::And => "AND",
            Token::Or => "OR",
            Token::Not => "NOT",
            Token::Is => "IS",
            Token::Null => "NULL",
            Token::In => "IN",
            Token::Like => "LIKE",
            Token::Rlike => "RLIKE",
            Token::True => "TRUE",
            Token::False => "FALSE",
            Token::Pipe => "|",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Assign => "=",
            Token::Eq => "==",
            Token::Neq => "!=",
            Token::Lt => "<",
            Token::Lte => "<=",
            Token::Gt => ">",
            Token::Gte => ">=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Cast => "::",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Integer(s)
            | Token::Decimal(s)
            | Token::String(s)
            | Token::Param(s)
            | Token::Ident(s)
            | Token::QuotedIdent(s)
            | Token::SourcePattern(s)
            | Token::IdPattern(s) => s,
        };
        f.write_str(text)
    }
}

impl From<ExprToken> for Token {
    fn from(raw: ExprToken) -> Self {
        match raw {
            ExprToken::From => Token::From,
            ExprToken::Row => Token::Row,
            ExprToken::Show => Token::Show,
            ExprToken::Where => Token::Where,
            ExprToken::Eval => Token::Eval,
            ExprToken::Stats => Token::Stats,
            ExprToken::By => Token::By,
            ExprToken::Limit => Token::Limit,
            ExprToken::Sort => Token::Sort,
            ExprToken::Asc => Token::Asc,
            ExprToken::Desc => Token::Desc,
            ExprToken::Nulls => Token::Nulls,
            ExprToken::First => Token::First,
            ExprToken::Last => Token::Last,
            ExprToken::Keep => Token::Keep,
            ExprToken::Drop => Token::Drop,
            ExprToken::Rename => Token::Rename,
            ExprToken::Dissect => Token::Dissect,
            ExprToken::Grok => Token::Grok,
            ExprToken::Enrich => Token::Enrich,
            ExprToken::With => Token::With,
            ExprToken::MvExpand => Token::MvExpand,
            ExprToken::Lookup => Token::Lookup,
            ExprToken::Join => Token::Join,
            ExprToken::And => Token::And,
            ExprToken::Or => Token::Or,
            ExprToken::Not => Token::Not,
            ExprToken::Is => Token::Is,
            ExprToken::Null => Token::Null,
            ExprToken::In => Token::In,
            ExprToken::Like => Token::Like,
            ExprToken::Rlike => Token::Rlike,
            ExprToken::True => Token::True,
            ExprToken::False => Token::False,
            ExprToken::Pipe => Token::Pipe,
            ExprToken::Comma => Token::Comma,
            ExprToken::Dot => Token::Dot,
            ExprToken::Assign => Token::Assign,
            ExprToken::Eq => Token::Eq,
            ExprToken::Neq => Token::Neq,
            ExprToken::Lt => Token::Lt,
            ExprToken::Lte => Token::Lte,
            ExprToken::Gt => Token::Gt,
            ExprToken::Gte => Token::Gte,
            ExprToken::Plus => Token::Plus,
            ExprToken::Minus => Token::Minus,
            ExprToken::Star => Token::Star,
            ExprToken::Slash => Token::Slash,
            ExprToken::Percent => Token::Percent,
            ExprToken::Cast => Token::Cast,
            ExprToken::LParen => Token::LParen,
            ExprToken::RParen => Token::RParen,
            ExprToken::LBracket => Token::LBracket,
            ExprToken::RBracket => Token::RBracket,
            ExprToken::Integer(s) => Token::Integer(s),
            ExprToken::Decimal(s) => Token::Decimal(s),
            ExprToken::String(s) => Token::String(s),
            ExprToken::Param(s) => Token::Param(s),
            ExprToken::Ident(s) => Token::Ident(s),
            ExprToken::QuotedIdent(s) => Token::QuotedIdent(s),
        }
    }
}

impl From<SourceToken> for Token {
    fn from(raw: SourceToken) -> Self {
        match raw {
            SourceToken::Pipe => Token::Pipe,
            SourceToken::Comma => Token::Comma,
            SourceToken::Metadata => Token::Metadata,
            SourceToken::On => Token::On,
            SourceToken::With => Token::With,
            SourceToken::String(s) => Token::String(s),
            SourceToken::Pattern(s) => Token::SourcePattern(s),
        }
    }
}

impl From<ProjectionToken> for Token {
    fn from(raw: ProjectionToken) -> Self {
        match raw {
            ProjectionToken::Pipe => Token::Pipe,
            ProjectionToken::Comma => Token::Comma,
            ProjectionToken::Assign => Token::Assign,
            ProjectionToken::As => Token::As,
            ProjectionToken::Pattern(s) => Token::IdPattern(s),
            ProjectionToken::QuotedIdent(s) => Token::QuotedIdent(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Expression,
    Source,
    Projection,
}

impl Mode {
    /// Mode in effect after `token` was produced in `self`
    fn after(self, token: &Token) -> Mode {
        match (self, token) {
            (Mode::Expression, Token::From | Token::Enrich | Token::Join) => Mode::Source,
            (Mode::Expression, Token::Keep | Token::Drop | Token::Rename) => Mode::Projection,
            (Mode::Source, Token::Pipe | Token::Metadata | Token::On | Token::With) => {
                Mode::Expression
            }
            (Mode::Projection, Token::Pipe) => Mode::Expression,
            (mode, _) => mode,
        }
    }
}

/// Reason the token stream ended before the end of the source
#[derive(Debug)]
pub(crate) struct Halt {
    /// Byte offset where tokenizing stopped
    pub offset: usize,
    pub interrupt: Interrupt,
}

/// A mode-switching ES|QL lexer.
///
/// Yields tokens with their spans and is pulled lazily by the parser, so a
/// lexical error is only found once the parser asks for the token. Errors go
/// to the lexer's listeners; when one of them aborts, or a limit is hit, the
/// stream ends and the reason is kept for the parser to collect.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, ExprToken>,
    mode: Mode,
    limits: Limits,
    depth: usize,
    started: bool,
    halt: Option<Halt>,
    listeners: Listeners,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::with_limits(source, Limits::default())
    }

    pub fn with_limits(source: &'src str, limits: Limits) -> Self {
        Self {
            inner: ExprToken::lexer(source),
            mode: Mode::Expression,
            limits,
            depth: 0,
            started: false,
            halt: None,
            listeners: Listeners::default(),
        }
    }

    pub fn source(&self) -> &'src str {
        self.inner.source()
    }

    pub fn remove_error_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn add_error_listener(&mut self, listener: impl ErrorListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Take the reason the stream stopped early, if it did
    pub(crate) fn take_halt(&mut self) -> Option<Halt> {
        self.halt.take()
    }

    /// Run one step of the logos lexer for token set `T`, starting where the
    /// previous step ended.
    fn step<T>(&mut self) -> Option<(Result<Token, ()>, Range<usize>)>
    where
        T: Logos<'src, Source = str, Extras = (), Error = ()> + Into<Token>,
    {
        let mut sub: logos::Lexer<'src, T> = self.inner.clone().morph();
        let item = sub.next().map(|result| (result.map(Into::into), sub.span()));
        self.inner = sub.morph();
        item
    }

    fn lex(&mut self) -> Option<(Result<Token, ()>, Range<usize>)> {
        match self.mode {
            Mode::Expression => self.step::<ExprToken>(),
            Mode::Source => self.step::<SourceToken>(),
            Mode::Projection => self.step::<ProjectionToken>(),
        }
    }

    fn stop(&mut self, offset: usize, interrupt: Interrupt) {
        tracing::debug!(offset, ?interrupt, "lexer halted");
        self.halt = Some(Halt { offset, interrupt });
    }

    fn track_nesting(&mut self, token: &Token, offset: usize) -> Result<(), EngineFault> {
        match token {
            Token::LParen | Token::LBracket => {
                self.depth += 1;
                if self.depth > self.limits.max_nesting_depth {
                    let (line, column) = locate(self.source(), offset);
                    return Err(EngineFault::NestingTooDeep {
                        limit: self.limits.max_nesting_depth,
                        line,
                        column,
                    });
                }
            }
            Token::RParen | Token::RBracket => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        Ok(())
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = (Token, SimpleSpan);

    fn next(&mut self) -> Option<Self::Item> {
        if self.halt.is_some() {
            return None;
        }

        if !self.started {
            self.started = true;
            let size = self.source().len();
            if size > self.limits.max_input_bytes {
                let fault = EngineFault::InputTooLarge {
                    size,
                    limit: self.limits.max_input_bytes,
                };
                self.stop(0, fault.into());
                return None;
            }
        }

        loop {
            let (result, range) = self.lex()?;
            match result {
                Ok(token) => {
                    if let Err(fault) = self.track_nesting(&token, range.start) {
                        self.stop(range.start, fault.into());
                        return None;
                    }
                    let mode = self.mode.after(&token);
                    if mode != self.mode {
                        tracing::trace!(from = ?self.mode, to = ?mode, "lexer mode switch");
                        self.mode = mode;
                    }
                    return Some((token, range.into()));
                }
                Err(()) => {
                    let source = self.source();
                    let (line, column) = locate(source, range.start);
                    let text = source.get(range.clone()).unwrap_or_default();
                    let error = SyntaxError {
                        recognizer: Recognizer::Lexer,
                        offending_symbol: None,
                        line,
                        column,
                        offset: range.start,
                        message: format!("token recognition error at: '{text}'"),
                    };
                    if let ControlFlow::Break(abort) = self.listeners.report(&error) {
                        self.stop(range.start, abort.into());
                        return None;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::listener::test::Recorder;
    use crate::validator::FailFastSink;
    use rstest::rstest;

    fn silent(input: &str) -> Lexer<'_> {
        let mut lexer = Lexer::new(input);
        lexer.remove_error_listeners();
        lexer
    }

    fn tokens(input: &str) -> Vec<Token> {
        silent(input).map(|(token, _)| token).collect()
    }

    fn ident(s: &str) -> Token {
        Token::Ident(s.into())
    }

    #[rstest]
    #[case("from")]
    #[case("FROM")]
    #[case("From")]
    fn test_keywords_ignore_case(#[case] keyword: &str) {
        assert_eq!(tokens(keyword), vec![Token::From]);
    }

    #[test]
    fn test_identifier_with_keyword_prefix() {
        assert_eq!(
            tokens("ROW from_date = 1"),
            vec![Token::Row, ident("from_date"), Token::Assign, Token::Integer("1".into())]
        );
    }

    #[test]
    fn test_source_mode_after_from() {
        let input = r#"FROM logs-*, "my index", remote:idx METADATA _id, _index | LIMIT 1"#;
        assert_eq!(
            tokens(input),
            vec![
                Token::From,
                Token::SourcePattern("logs-*".into()),
                Token::Comma,
                Token::String(r#""my index""#.into()),
                Token::Comma,
                Token::SourcePattern("remote:idx".into()),
                Token::Metadata,
                ident("_id"),
                Token::Comma,
                ident("_index"),
                Token::Pipe,
                Token::Limit,
                Token::Integer("1".into()),
            ]
        );
    }

    #[test]
    fn test_projection_mode_after_keep() {
        let input = "ROW a = 1 | KEEP host.*, `a b` | RENAME x AS y";
        assert_eq!(
            tokens(input),
            vec![
                Token::Row,
                ident("a"),
                Token::Assign,
                Token::Integer("1".into()),
                Token::Pipe,
                Token::Keep,
                Token::IdPattern("host.*".into()),
                Token::Comma,
                Token::QuotedIdent("`a b`".into()),
                Token::Pipe,
                Token::Rename,
                Token::IdPattern("x".into()),
                Token::As,
                Token::IdPattern("y".into()),
            ]
        );
    }

    #[test]
    fn test_enrich_switches_back_on_keyword() {
        let input = "ENRICH my-policy ON host.name WITH zone = region";
        assert_eq!(
            tokens(input),
            vec![
                Token::Enrich,
                Token::SourcePattern("my-policy".into()),
                Token::On,
                ident("host"),
                Token::Dot,
                ident("name"),
                Token::With,
                ident("zone"),
                Token::Assign,
                ident("region"),
            ]
        );
    }

    #[test]
    fn test_operators_and_literals() {
        let input = r#"a >= 1.5e3 AND b != "x\"y" OR c :: long <= ?p"#;
        assert_eq!(
            tokens(input),
            vec![
                ident("a"),
                Token::Gte,
                Token::Decimal("1.5e3".into()),
                Token::And,
                ident("b"),
                Token::Neq,
                Token::String(r#""x\"y""#.into()),
                Token::Or,
                ident("c"),
                Token::Cast,
                ident("long"),
                Token::Lte,
                Token::Param("?p".into()),
            ]
        );
    }

    #[test]
    fn test_triple_quoted_string() {
        let input = r#"ROW s = """a "quoted" b""""#;
        assert_eq!(
            tokens(input),
            vec![
                Token::Row,
                ident("s"),
                Token::Assign,
                Token::String(r#""""a "quoted" b""""#.into()),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let input = "FROM idx // trailing\n/* block\ncomment */ | LIMIT 1";
        assert_eq!(
            tokens(input),
            vec![
                Token::From,
                Token::SourcePattern("idx".into()),
                Token::Pipe,
                Token::Limit,
                Token::Integer("1".into()),
            ]
        );
    }

    #[test]
    fn test_line_comments_and_lowercase_keywords_in_every_mode() {
        let input = "from idx // source\nmetadata _id // expression\n| keep a // projection\n| rename a as b";
        assert_eq!(
            tokens(input),
            vec![
                Token::From,
                Token::SourcePattern("idx".into()),
                Token::Metadata,
                ident("_id"),
                Token::Pipe,
                Token::Keep,
                Token::IdPattern("a".into()),
                Token::Pipe,
                Token::Rename,
                Token::IdPattern("a".into()),
                Token::As,
                Token::IdPattern("b".into()),
            ]
        );
    }

    #[test]
    fn test_spans() {
        let spanned: Vec<(Token, std::ops::Range<usize>)> = silent("FROM t | LIMIT 10")
            .map(|(token, span)| (token, span.start..span.end))
            .collect();
        assert_eq!(
            spanned,
            vec![
                (Token::From, 0..4),
                (Token::SourcePattern("t".into()), 5..6),
                (Token::Pipe, 7..8),
                (Token::Limit, 9..14),
                (Token::Integer("10".into()), 15..17),
            ]
        );
    }

    #[test]
    fn test_lexical_error_reported_and_skipped_when_listener_continues() {
        let recorder = Recorder::default();
        let mut lexer = silent("ROW a = 1 $ | LIMIT 2");
        lexer.add_error_listener(recorder.clone());

        let lexed: Vec<Token> = lexer.by_ref().map(|(token, _)| token).collect();
        assert_eq!(lexed.last(), Some(&Token::Integer("2".into())));
        assert!(lexer.take_halt().is_none());

        let errors = recorder.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].recognizer, Recognizer::Lexer);
        assert_eq!((errors[0].line, errors[0].column), (1, 10));
        assert!(errors[0].message.starts_with("token recognition error at: '$"));
    }

    #[test]
    fn test_lexical_error_halts_when_listener_aborts() {
        let mut lexer = silent("ROW a = 1 $ | LIMIT 2");
        lexer.add_error_listener(FailFastSink);

        let lexed: Vec<Token> = lexer.by_ref().map(|(token, _)| token).collect();
        assert_eq!(lexed.len(), 4);
        assert!(lexer.next().is_none());

        let halt = lexer.take_halt().expect("lexer should halt");
        assert_eq!(halt.offset, 10);
        let Interrupt::Abort(abort) = halt.interrupt else {
            panic!("Expected an abort");
        };
        assert_eq!(abort.diagnostic().column(), 10);
    }

    #[test]
    fn test_unterminated_string_is_a_lexical_error() {
        let mut lexer = silent(r#"ROW s = "abc"#);
        lexer.add_error_listener(FailFastSink);

        assert_eq!(lexer.by_ref().count(), 3);
        let halt = lexer.take_halt().expect("lexer should halt");
        assert_eq!(halt.offset, 8);
    }

    #[test]
    fn test_nesting_limit_is_an_engine_fault() {
        let limits = Limits {
            max_nesting_depth: 2,
            ..Limits::default()
        };
        let mut lexer = Lexer::with_limits("ROW a = ((( 1 )))", limits);
        lexer.remove_error_listeners();

        assert_eq!(lexer.by_ref().count(), 5);
        let halt = lexer.take_halt().expect("lexer should halt");
        assert_eq!(
            halt.interrupt,
            Interrupt::Fault(EngineFault::NestingTooDeep {
                limit: 2,
                line: 1,
                column: 10
            })
        );
    }

    #[test]
    fn test_nesting_within_limit() {
        let limits = Limits {
            max_nesting_depth: 2,
            ..Limits::default()
        };
        let mut lexer = Lexer::with_limits("ROW a = ((1)) + ((2))", limits);
        lexer.remove_error_listeners();

        assert_eq!(lexer.by_ref().count(), 14);
        assert!(lexer.take_halt().is_none());
    }

    #[test]
    fn test_input_size_limit_is_an_engine_fault() {
        let limits = Limits {
            max_input_bytes: 4,
            ..Limits::default()
        };
        let mut lexer = Lexer::with_limits("FROM t", limits);

        assert!(lexer.next().is_none());
        let halt = lexer.take_halt().expect("lexer should halt");
        assert_eq!(
            halt.interrupt,
            Interrupt::Fault(EngineFault::InputTooLarge { size: 6, limit: 4 })
        );
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::MvExpand.to_string(), "MV_EXPAND");
        assert_eq!(Token::Lte.to_string(), "<=");
        assert_eq!(Token::SourcePattern("logs-*".into()).to_string(), "logs-*");
    }
}
