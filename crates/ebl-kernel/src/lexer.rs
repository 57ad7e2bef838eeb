//! Lexer for EBL source, built on logos.
//!
//! Whitespace (including newlines) and `//` comments are insignificant; block
//! structure comes from braces and the leading `-` of each process step.

use std::fmt;
use std::ops::Range;

use logos::Logos;

/// A lexical token.
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip(r"//[^\n]*", allow_greedy = true))]
pub enum Token {
    // Top-level constructs
    #[token("Metadata")]
    Metadata,
    #[token("DataObject")]
    DataObject,
    #[token("Entity")]
    Entity,
    #[token("ITAsset")]
    ItAsset,
    #[token("Relationship")]
    Relationship,
    #[token("Process")]
    Process,
    #[token("Rule")]
    Rule,
    #[token("Report")]
    Report,

    // Section keys
    #[token("Actors")]
    Actors,
    #[token("Steps")]
    Steps,
    #[token("From")]
    From,
    #[token("To")]
    To,
    #[token("Type")]
    Type,
    #[token("dataRef")]
    DataRef,
    #[token("Description")]
    Description,
    #[token("Trigger")]
    Trigger,
    #[token("Query")]
    Query,

    // Data access qualifiers in steps
    #[token("reads")]
    Reads,
    #[token("writes")]
    Writes,

    // Punctuation
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("-")]
    Dash,

    // Literals
    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unescape(lex.slice()), allow_greedy = true)]
    String(String),
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Metadata => f.write_str("Metadata"),
            Token::DataObject => f.write_str("DataObject"),
            Token::Entity => f.write_str("Entity"),
            Token::ItAsset => f.write_str("ITAsset"),
            Token::Relationship => f.write_str("Relationship"),
            Token::Process => f.write_str("Process"),
            Token::Rule => f.write_str("Rule"),
            Token::Report => f.write_str("Report"),
            Token::Actors => f.write_str("Actors"),
            Token::Steps => f.write_str("Steps"),
            Token::From => f.write_str("From"),
            Token::To => f.write_str("To"),
            Token::Type => f.write_str("Type"),
            Token::DataRef => f.write_str("dataRef"),
            Token::Description => f.write_str("Description"),
            Token::Trigger => f.write_str("Trigger"),
            Token::Query => f.write_str("Query"),
            Token::Reads => f.write_str("reads"),
            Token::Writes => f.write_str("writes"),
            Token::LBrace => f.write_str("{"),
            Token::RBrace => f.write_str("}"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::Colon => f.write_str(":"),
            Token::Comma => f.write_str(","),
            Token::Eq => f.write_str("="),
            Token::Dash => f.write_str("-"),
            Token::Number(n) => write!(f, "number {n}"),
            Token::String(s) => write!(f, "string {s:?}"),
            Token::Ident(s) => write!(f, "identifier {s}"),
        }
    }
}

/// Strip the surrounding quotes and process escapes.
///
/// Returns `None` for an unknown escape, which logos reports as a lexer error.
fn unescape(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            _ => return None,
        }
    }
    Some(out)
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

/// Text the lexer could not turn into a token.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub span: Range<usize>,
    pub text: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unexpected input {:?}", self.text)
    }
}

/// Tokenize a whole document.
///
/// Collects every lexer error rather than stopping at the first one.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, Vec<LexError>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push(Spanned { token, span }),
            Err(_) => errors.push(LexError {
                text: source[span.clone()].to_string(),
                span,
            }),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}
