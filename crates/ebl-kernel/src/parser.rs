//! Parser for EBL source code.
//!
//! Transforms a token stream from the lexer into a [`Document`].
//! Uses chumsky for parser combinators with good error recovery.

use chumsky::span::Span as _;
use chumsky::{input::ValueInput, prelude::*};
use ebl_types::Span;

use crate::ast::{
    Access, AttrValue, DataObjectDef, DataUse, Document, EntityDef, Field, FieldAttr, Ident, Item,
    ItAssetDef, Metadata, ProcessDef, RelationshipDef, ReportDef, RuleDef, Step,
};
use crate::lexer::{self, Token};

/// Span type used by the combinators.
pub type TokenSpan = SimpleSpan;

type ParserExtra<'tokens> = extra::Err<Rich<'tokens, Token, TokenSpan>>;

fn to_span(span: TokenSpan) -> Span {
    Span::new(span.start(), span.end())
}

/// Parse error with location and context.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub span: Span,
    pub message: String,
}

impl ParseError {
    /// Render with a `line:col` prefix resolved against `source`.
    pub fn format(&self, source: &str) -> String {
        let (line, col) = self.span.line_col(source);
        format!("{line}:{col}: {}", self.message)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

impl std::error::Error for ParseError {}

/// Parse EBL source code into a Document AST.
pub fn parse(source: &str) -> Result<Document, Vec<ParseError>> {
    // Tokenize with logos
    let tokens = lexer::tokenize(source).map_err(|errs| {
        errs.into_iter()
            .map(|e| ParseError {
                span: Span::new(e.span.start, e.span.end),
                message: format!("lexer error: {e}"),
            })
            .collect::<Vec<_>>()
    })?;

    // Convert tokens to (Token, SimpleSpan) pairs
    let tokens: Vec<(Token, TokenSpan)> = tokens
        .into_iter()
        .map(|spanned| (spanned.token, (spanned.span.start..spanned.span.end).into()))
        .collect();

    // End-of-input span
    let end_span: TokenSpan = (source.len()..source.len()).into();

    let parser = document_parser();
    let result = parser.parse(tokens.as_slice().map(end_span, |(t, s)| (t, s)));

    let document = result.into_result().map_err(|errs| {
        errs.into_iter()
            .map(|e| ParseError {
                span: to_span(*e.span()),
                message: e.to_string(),
            })
            .collect::<Vec<_>>()
    })?;

    tracing::trace!(items = document.items.len(), "parsed document");
    Ok(document)
}

// ═══════════════════════════════════════════════════════════════════════════
// Parser Combinators - generic over input type
// ═══════════════════════════════════════════════════════════════════════════

/// Top-level document parser.
fn document_parser<'tokens, I>() -> impl Parser<'tokens, I, Document, ParserExtra<'tokens>>
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    item_parser()
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(|items| Document { items })
}

/// Item parser - dispatches based on the leading keyword.
fn item_parser<'tokens, I>() -> impl Parser<'tokens, I, Item, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    choice((
        metadata_parser().map(Item::Metadata),
        data_object_parser().map(Item::DataObject),
        entity_parser().map(Item::Entity),
        it_asset_parser().map(Item::ItAsset),
        relationship_parser().map(Item::Relationship),
        process_parser().map(Item::Process),
        rule_parser().map(Item::Rule),
        report_parser().map(Item::Report),
    ))
    .boxed()
}

/// Metadata: `Metadata { Key: value ... }`
fn metadata_parser<'tokens, I>() -> impl Parser<'tokens, I, Metadata, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    let entry = ident_parser()
        .then_ignore(just(Token::Colon))
        .then(value_parser());

    just(Token::Metadata)
        .ignore_then(
            entry
                .repeated()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        )
        .map(|entries| Metadata { entries })
        .labelled("metadata")
        .boxed()
}

/// DataObject: `DataObject NAME { field* }`
fn data_object_parser<'tokens, I>(
) -> impl Parser<'tokens, I, DataObjectDef, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    just(Token::DataObject)
        .ignore_then(ident_parser())
        .then(fields_block_parser())
        .map(|(name, fields)| DataObjectDef { name, fields })
        .labelled("data object")
        .boxed()
}

/// Entity: `Entity NAME { [dataRef: DO_X] field* }`
fn entity_parser<'tokens, I>() -> impl Parser<'tokens, I, EntityDef, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    let data_ref = just(Token::DataRef)
        .ignore_then(just(Token::Colon))
        .ignore_then(ident_parser());

    just(Token::Entity)
        .ignore_then(ident_parser())
        .then(
            data_ref
                .or_not()
                .then(field_parser().repeated().collect::<Vec<_>>())
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        )
        .map(|(name, (data_ref, properties))| EntityDef {
            name,
            data_ref,
            properties,
        })
        .labelled("entity")
        .boxed()
}

/// ITAsset: `ITAsset NAME { field* }`
fn it_asset_parser<'tokens, I>() -> impl Parser<'tokens, I, ItAssetDef, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    just(Token::ItAsset)
        .ignore_then(ident_parser())
        .then(fields_block_parser())
        .map(|(name, fields)| ItAssetDef { name, fields })
        .labelled("IT asset")
        .boxed()
}

/// `{ field* }`
fn fields_block_parser<'tokens, I>(
) -> impl Parser<'tokens, I, Vec<Field>, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    field_parser()
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBrace), just(Token::RBrace))
}

/// Field: `name: Type attr=value ...`
fn field_parser<'tokens, I>() -> impl Parser<'tokens, I, Field, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    let attr = ident_parser()
        .then_ignore(just(Token::Eq))
        .then(value_parser())
        .map(|(name, value)| FieldAttr { name, value });

    ident_parser()
        .then_ignore(just(Token::Colon))
        .then(ident_parser())
        .then(attr.repeated().collect::<Vec<_>>())
        .map(|((name, ty), attrs)| Field { name, ty, attrs })
        .labelled("field")
        .boxed()
}

/// Relationship: `Relationship NAME { From: A To: B Type: t }`
fn relationship_parser<'tokens, I>(
) -> impl Parser<'tokens, I, RelationshipDef, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    let key = |token: Token| just(token).ignore_then(just(Token::Colon)).ignore_then(ident_parser());

    just(Token::Relationship)
        .ignore_then(ident_parser())
        .then(
            key(Token::From)
                .then(key(Token::To))
                .then(key(Token::Type))
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        )
        .map(|(name, ((from, to), rel_type))| RelationshipDef {
            name,
            from,
            to,
            rel_type,
        })
        .labelled("relationship")
        .boxed()
}

/// Process: `Process NAME { [Actors: [A, B]] [Steps: step*] }`
fn process_parser<'tokens, I>() -> impl Parser<'tokens, I, ProcessDef, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    let actors = just(Token::Actors).ignore_then(just(Token::Colon)).ignore_then(
        ident_parser()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LBracket), just(Token::RBracket)),
    );

    let steps = just(Token::Steps)
        .ignore_then(just(Token::Colon))
        .ignore_then(step_parser().repeated().collect::<Vec<_>>());

    just(Token::Process)
        .ignore_then(ident_parser())
        .then(
            actors
                .or_not()
                .then(steps.or_not())
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        )
        .map(|(name, (actors, steps))| ProcessDef {
            name,
            actors: actors.unwrap_or_default(),
            steps: steps.unwrap_or_default(),
        })
        .labelled("process")
        .boxed()
}

/// Step: `- Actor Verb [reads|writes] DataObject ... ["note"]`
fn step_parser<'tokens, I>() -> impl Parser<'tokens, I, Step, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    let access = select! {
        Token::Reads => Access::Read,
        Token::Writes => Access::Write,
    };

    let data_use = access
        .or_not()
        .then(ident_parser())
        .map(|(access, object)| DataUse { object, access });

    just(Token::Dash)
        .ignore_then(ident_parser())
        .then(ident_parser())
        .then(data_use.repeated().collect::<Vec<_>>())
        .then(string_parser().or_not())
        .map(|(((actor, verb), data), note)| Step {
            actor,
            verb,
            data,
            note,
        })
        .labelled("step")
        .boxed()
}

/// Rule: `Rule NAME { Description: "..." Trigger: "..." }`
fn rule_parser<'tokens, I>() -> impl Parser<'tokens, I, RuleDef, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    just(Token::Rule)
        .ignore_then(ident_parser())
        .then(
            just(Token::Description)
                .ignore_then(just(Token::Colon))
                .ignore_then(string_parser())
                .then(
                    just(Token::Trigger)
                        .ignore_then(just(Token::Colon))
                        .ignore_then(string_parser()),
                )
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        )
        .map(|(name, (description, trigger))| RuleDef {
            name,
            description,
            trigger,
        })
        .labelled("rule")
        .boxed()
}

/// Report: `Report NAME { Query: "..." }`
fn report_parser<'tokens, I>() -> impl Parser<'tokens, I, ReportDef, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    just(Token::Report)
        .ignore_then(ident_parser())
        .then(
            just(Token::Query)
                .ignore_then(just(Token::Colon))
                .ignore_then(string_parser())
                .delimited_by(just(Token::LBrace), just(Token::RBrace)),
        )
        .map(|(name, query)| ReportDef { name, query })
        .labelled("report")
        .boxed()
}

/// Attribute value: string, number, bare word, or `[v, v, ...]`.
fn value_parser<'tokens, I>() -> impl Parser<'tokens, I, AttrValue, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    recursive(|value| {
        let scalar = select! {
            Token::String(s) => AttrValue::Str(s),
            Token::Number(n) => AttrValue::Number(n),
            Token::Ident(w) => AttrValue::Word(w),
        };

        let list = value
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LBracket), just(Token::RBracket))
            .map(AttrValue::List);

        choice((scalar, list))
    })
    .labelled("value")
    .boxed()
}

/// String literal parser.
fn string_parser<'tokens, I>() -> impl Parser<'tokens, I, String, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    select! {
        Token::String(s) => s,
    }
    .labelled("string")
}

/// Identifier parser, keeping the source span.
fn ident_parser<'tokens, I>() -> impl Parser<'tokens, I, Ident, ParserExtra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = TokenSpan>,
{
    select! {
        Token::Ident(s) => s,
    }
    .map_with(|name, e| Ident::new(name, to_span(e.span())))
    .labelled("identifier")
}
