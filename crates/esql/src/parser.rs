use std::collections::BTreeSet;
use std::ops::ControlFlow;

use chumsky::{
    error::RichPattern,
    input::{Stream, ValueInput},
    prelude::*,
};

use crate::ast::{ProcessingCommand, SourceCommand, Statement};
use crate::diagnostic::locate;
use crate::error::Interrupt;
use crate::lexer::{Lexer, Token};
use crate::listener::{ErrorListener, Listeners, Recognizer, SyntaxError};

type Extra<'tokens> = extra::Err<Rich<'tokens, Token>>;

fn identifier<'tokens, I>() -> impl Parser<'tokens, I, String, Extra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = SimpleSpan>,
{
    select! {
        Token::Ident(s) => s,
        Token::QuotedIdent(s) => s,
    }
    .labelled("identifier")
}

/// `host.name`, `` `first name` ``
fn qualified_name<'tokens, I>() -> impl Parser<'tokens, I, String, Extra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = SimpleSpan>,
{
    identifier()
        .separated_by(just(Token::Dot))
        .at_least(1)
        .collect::<Vec<_>>()
        .map(|parts| parts.join("."))
        .labelled("qualified name")
}

/// Literal values: `null`, booleans, numbers, strings, parameters,
/// time spans such as `1 day` and arrays such as `[1, -2, 3]`
fn constant<'tokens, I>() -> impl Parser<'tokens, I, (), Extra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = SimpleSpan>,
{
    let number = select! {
        Token::Integer(_) => (),
        Token::Decimal(_) => (),
    };

    let time_span = select! { Token::Integer(_) => () }
        .then(select! { Token::Ident(_) => () })
        .ignored();

    let element = choice((
        just(Token::Null).ignored(),
        just(Token::True).ignored(),
        just(Token::False).ignored(),
        select! { Token::String(_) => () },
        select! { Token::Param(_) => () },
        choice((just(Token::Minus), just(Token::Plus)))
            .or_not()
            .then(number.clone())
            .ignored(),
    ));

    let array = element
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBracket), just(Token::RBracket))
        .ignored();

    choice((
        just(Token::Null).ignored(),
        just(Token::True).ignored(),
        just(Token::False).ignored(),
        select! { Token::String(_) => () },
        select! { Token::Param(_) => () },
        time_span,
        number,
        array,
    ))
}

/// Boolean expressions.
///
/// Grammar (lower to higher priority):
/// ```text
/// expression  := and_expr (OR and_expr)*
/// and_expr    := not_expr (AND not_expr)*
/// not_expr    := NOT* predicate
/// predicate   := comparison (IS NOT? NULL | NOT? IN '(' list ')' | NOT? (LIKE | RLIKE) string)?
/// comparison  := additive (cmp_op additive)?
/// additive    := term (('+' | '-') term)*
/// term        := unary (('*' | '/' | '%') unary)*
/// unary       := ('-' | '+')* postfix
/// postfix     := primary ('::' identifier)*
/// primary     := constant | function '(' args? ')' | qualified_name | '(' expression ')'
/// ```
pub(crate) fn expression<'tokens, I>() -> impl Parser<'tokens, I, (), Extra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let arguments = choice((
            just(Token::Star).ignored(),
            expr.clone()
                .separated_by(just(Token::Comma))
                .at_least(1)
                .collect::<Vec<_>>()
                .ignored(),
        ))
        .or_not()
        .delimited_by(just(Token::LParen), just(Token::RParen));

        let function_call = select! { Token::Ident(_) => () }
            .then(arguments)
            .ignored();

        let primary = choice((
            constant(),
            function_call,
            qualified_name().ignored(),
            expr.clone()
                .delimited_by(just(Token::LParen), just(Token::RParen)),
        ));

        let postfix = primary
            .then(
                just(Token::Cast)
                    .then(identifier())
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .ignored();

        let unary = choice((just(Token::Minus), just(Token::Plus)))
            .repeated()
            .collect::<Vec<_>>()
            .then(postfix)
            .ignored()
            .boxed();

        let term = unary
            .clone()
            .then(
                choice((just(Token::Star), just(Token::Slash), just(Token::Percent)))
                    .then(unary)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .ignored();

        let additive = term
            .clone()
            .then(
                choice((just(Token::Plus), just(Token::Minus)))
                    .then(term)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .ignored();

        let comparison = additive
            .clone()
            .then(
                choice((
                    just(Token::Eq),
                    just(Token::Neq),
                    just(Token::Lt),
                    just(Token::Lte),
                    just(Token::Gt),
                    just(Token::Gte),
                ))
                .then(additive)
                .or_not(),
            )
            .ignored()
            .boxed();

        let pattern = select! {
            Token::String(_) => (),
            Token::Param(_) => (),
        }
        .labelled("string");

        let suffix = choice((
            just(Token::Is)
                .then(just(Token::Not).or_not())
                .then(just(Token::Null))
                .ignored(),
            just(Token::Not)
                .or_not()
                .then(just(Token::In))
                .then(
                    comparison
                        .clone()
                        .separated_by(just(Token::Comma))
                        .at_least(1)
                        .collect::<Vec<_>>()
                        .delimited_by(just(Token::LParen), just(Token::RParen)),
                )
                .ignored(),
            just(Token::Not)
                .or_not()
                .then(choice((just(Token::Like), just(Token::Rlike))))
                .then(pattern)
                .ignored(),
        ));

        let predicate = comparison.then(suffix.or_not()).ignored();

        let not_expr = just(Token::Not)
            .repeated()
            .collect::<Vec<_>>()
            .then(predicate)
            .ignored()
            .boxed();

        let and_expr = not_expr
            .clone()
            .then(
                just(Token::And)
                    .then(not_expr)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .ignored();

        and_expr
            .clone()
            .then(
                just(Token::Or)
                    .then(and_expr)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .ignored()
    })
    .labelled("expression")
}

/// Top-level rule: one complete statement followed by the end of input.
///
/// ```text
/// statement          := source_command ('|' processing_command)* EOF
/// source_command     := from | row | show_info
/// processing_command := where | eval | stats | limit | sort | keep | drop
///                     | rename | dissect | grok | enrich | mv_expand | lookup_join
/// ```
pub(crate) fn statement<'tokens, I>() -> impl Parser<'tokens, I, Statement, Extra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = SimpleSpan>,
{
    let expr = expression().boxed();

    // `name = expr` or a bare `expr`
    let field = qualified_name()
        .then_ignore(just(Token::Assign))
        .or_not()
        .then(expr.clone())
        .ignored();
    let fields = field
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>()
        .ignored()
        .boxed();

    // Source commands
    let index = select! {
        Token::SourcePattern(s) => s,
        Token::String(s) => s,
    }
    .labelled("index pattern");

    let metadata = just(Token::Metadata).ignore_then(
        identifier()
            .separated_by(just(Token::Comma))
            .at_least(1)
            .collect::<Vec<_>>(),
    );

    let from = just(Token::From)
        .ignore_then(
            index
                .clone()
                .separated_by(just(Token::Comma))
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .then(metadata.or_not())
        .map(|(sources, metadata)| SourceCommand::From {
            sources,
            metadata: metadata.unwrap_or_default(),
        });

    let row = just(Token::Row)
        .ignore_then(fields.clone())
        .to(SourceCommand::Row);

    let show_info = just(Token::Show)
        .ignore_then(
            select! { Token::Ident(s) if s.eq_ignore_ascii_case("info") => () }.labelled("INFO"),
        )
        .to(SourceCommand::ShowInfo);

    let source_command = choice((from, row, show_info))
        .map_with(|command, e| (command, e.span()))
        .labelled("source command");

    // Processing commands
    let where_ = just(Token::Where)
        .ignore_then(expr.clone())
        .to(ProcessingCommand::Where);

    let eval = just(Token::Eval)
        .ignore_then(fields.clone())
        .to(ProcessingCommand::Eval);

    let by = just(Token::By).ignore_then(fields.clone());
    let stats = just(Token::Stats)
        .ignore_then(choice((
            fields.clone().then(by.clone().or_not()).ignored(),
            by,
        )))
        .to(ProcessingCommand::Stats);

    let limit = just(Token::Limit)
        .ignore_then(
            select! {
                Token::Integer(_) => (),
                Token::Param(_) => (),
            }
            .labelled("integer"),
        )
        .to(ProcessingCommand::Limit);

    let order = expr
        .clone()
        .then(choice((just(Token::Asc), just(Token::Desc))).or_not())
        .then(
            just(Token::Nulls)
                .then(choice((just(Token::First), just(Token::Last))))
                .or_not(),
        )
        .ignored();
    let sort = just(Token::Sort)
        .ignore_then(
            order
                .separated_by(just(Token::Comma))
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .to(ProcessingCommand::Sort);

    let field_pattern = select! {
        Token::IdPattern(s) => s,
        Token::QuotedIdent(s) => s,
    }
    .labelled("field pattern");
    let field_patterns = field_pattern
        .clone()
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>();

    let keep = just(Token::Keep)
        .ignore_then(field_patterns.clone())
        .map(ProcessingCommand::Keep);

    let drop = just(Token::Drop)
        .ignore_then(field_patterns)
        .map(ProcessingCommand::Drop);

    // `old AS new` or `new = old`
    let rename_clause = field_pattern
        .clone()
        .then(choice((just(Token::As), just(Token::Assign))))
        .then(field_pattern)
        .ignored();
    let rename = just(Token::Rename)
        .ignore_then(
            rename_clause
                .separated_by(just(Token::Comma))
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .to(ProcessingCommand::Rename);

    let string = select! { Token::String(_) => () }.labelled("string");

    // `APPEND_SEPARATOR = "-"`
    let command_option = select! { Token::Ident(_) => () }
        .then_ignore(just(Token::Assign))
        .then(constant())
        .ignored();
    let dissect = just(Token::Dissect)
        .ignore_then(qualified_name())
        .then(string.clone())
        .then(
            command_option
                .separated_by(just(Token::Comma))
                .collect::<Vec<_>>(),
        )
        .to(ProcessingCommand::Dissect);

    let grok = just(Token::Grok)
        .ignore_then(qualified_name())
        .then(string)
        .to(ProcessingCommand::Grok);

    let policy = select! { Token::SourcePattern(s) => s }.labelled("policy name");
    let enrich_clause = qualified_name()
        .then(just(Token::Assign).ignore_then(qualified_name()).or_not())
        .ignored();
    let enrich = just(Token::Enrich)
        .ignore_then(policy)
        .then_ignore(just(Token::On).ignore_then(qualified_name()).or_not())
        .then_ignore(
            just(Token::With)
                .ignore_then(
                    enrich_clause
                        .separated_by(just(Token::Comma))
                        .at_least(1)
                        .collect::<Vec<_>>(),
                )
                .or_not(),
        )
        .map(|policy| ProcessingCommand::Enrich { policy });

    let mv_expand = just(Token::MvExpand)
        .ignore_then(qualified_name())
        .to(ProcessingCommand::MvExpand);

    let lookup_join = just(Token::Lookup)
        .ignore_then(just(Token::Join))
        .ignore_then(index)
        .then_ignore(just(Token::On))
        .then_ignore(
            qualified_name()
                .separated_by(just(Token::Comma))
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .map(|index| ProcessingCommand::LookupJoin { index });

    let processing_command = choice((
        where_,
        eval,
        stats,
        limit,
        sort,
        keep,
        drop,
        rename,
        dissect,
        grok,
        enrich,
        mv_expand,
        lookup_join,
    ))
    .map_with(|command, e| (command, e.span()))
    .labelled("processing command");

    source_command
        .then(
            just(Token::Pipe)
                .ignore_then(processing_command)
                .repeated()
                .collect::<Vec<_>>(),
        )
        .then_ignore(end())
        .map(|(source, commands)| Statement { source, commands })
}

const EOF: &str = "'<EOF>'";

/// Turn a chumsky error into the report handed to error listeners
fn syntax_error(source: &str, error: &Rich<'_, Token>) -> SyntaxError {
    let offset = error.span().start;
    let (line, column) = locate(source, offset);

    let symbol = match error.found() {
        Some(token) => format!("'{token}'"),
        None => EOF.to_string(),
    };

    let expected: BTreeSet<String> = error
        .expected()
        .filter_map(|pattern| match pattern {
            RichPattern::SomethingElse => None,
            RichPattern::EndOfInput => Some(EOF.to_string()),
            pattern => Some(pattern.to_string()),
        })
        .collect();
    let message = match expected.len() {
        0 => format!("extraneous input {symbol}"),
        1 => format!(
            "mismatched input {symbol} expecting {}",
            expected.iter().next().map_or("", String::as_str)
        ),
        _ => format!(
            "mismatched input {symbol} expecting {{{}}}",
            expected.into_iter().collect::<Vec<_>>().join(", ")
        ),
    };

    SyntaxError {
        recognizer: Recognizer::Parser,
        offending_symbol: Some(symbol),
        line,
        column,
        offset,
        message,
    }
}

/// Syntactic stage of the grammar engine.
///
/// Pulls tokens from a [`Lexer`] and reports syntax errors to its own
/// listener list, which starts out with the console listener.
pub struct EsqlParser {
    listeners: Listeners,
}

impl Default for EsqlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl EsqlParser {
    pub fn new() -> Self {
        Self {
            listeners: Listeners::default(),
        }
    }

    pub fn remove_error_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn add_error_listener(&mut self, listener: impl ErrorListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Match the whole token stream against the `statement` rule.
    ///
    /// Returns `Ok(None)` when syntax errors were reported but no listener
    /// stopped the parser. When the lexer stopped early, its reason wins
    /// unless the parser failed strictly before the point where it stopped.
    pub fn single_statement(&mut self, mut tokens: Lexer<'_>) -> Result<Option<Statement>, Interrupt> {
        let source = tokens.source();
        let eoi = SimpleSpan::from(source.len()..source.len());

        let (statement, mut errors) = {
            let input = Stream::from_iter(tokens.by_ref()).map(eoi, |(t, s): (_, _)| (t, s));
            let (statement, errors) = statement().parse(input).into_output_errors();
            let errors: Vec<SyntaxError> = errors
                .iter()
                .map(|error| syntax_error(source, error))
                .collect();
            (statement, errors)
        };
        errors.sort_by_key(|error| error.offset);

        if let Some(halt) = tokens.take_halt() {
            let parser_failed_first = errors
                .first()
                .is_some_and(|error| error.offset < halt.offset);
            if !parser_failed_first {
                return Err(halt.interrupt);
            }
        }

        for error in &errors {
            if let ControlFlow::Break(abort) = self.listeners.report(error) {
                return Err(Interrupt::Abort(abort));
            }
        }

        if errors.is_empty() {
            Ok(statement)
        } else {
            Ok(None)
        }
    }
}
