//! Lexer for CSS style values using logos
//!
//! Whitespace is kept as a token: it separates the values of a list, and
//! function arguments are sliced from the source between their parentheses.

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub(crate) enum StyleToken<'src> {
    #[regex(r"[ \t\r\n\f]+")]
    Space,

    /// `#` followed by anything alphanumeric; hex digits are checked later
    #[regex(r"#[0-9a-zA-Z]*", |lex| lex.slice())]
    Hash(&'src str),

    #[regex(r"[-+]?([0-9]+(\.[0-9]*)?|\.[0-9]+)", |lex| lex.slice())]
    Number(&'src str),

    /// Number with a unit suffix, e.g. `16px`, `100%` or `1fr`
    #[regex(r"[-+]?([0-9]+(\.[0-9]*)?|\.[0-9]+)[a-zA-Z%]+", |lex| lex.slice())]
    Dimension(&'src str),

    #[regex(r"-?[a-zA-Z_][a-zA-Z0-9_-]*", |lex| lex.slice())]
    Ident(&'src str),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    #[regex(r"'([^'\\]|\\.)*'", |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    String(&'src str),

    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    /// Any other single character, e.g. the `/` and `.` of a url
    #[regex(r##"[^ \t\r\n\f,()'"#0-9a-zA-Z_]"##)]
    Delim,
}

pub(crate) type Spanned<'src> = (StyleToken<'src>, Range<usize>);

/// Lex `input`, or `None` if it holds a character sequence no token accepts
pub(crate) fn tokenize(input: &str) -> Option<Vec<Spanned<'_>>> {
    StyleToken::lexer(input)
        .spanned()
        .map(|(token, span)| token.ok().map(|token| (token, span)))
        .collect()
}
