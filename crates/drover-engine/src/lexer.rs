//! Line tokenizer for the command language.
//!
//! This module provides zero-copy tokenizing of one input line using the
//! nom parser combinator library for the piece parsers and a lazy cursor
//! ([`TokenStream`]) over them.
//!
//! The marker rule is load-bearing for named binding and worth spelling
//! out: a word starting with one dash is a [`TokenKind::Flag`], a word
//! starting with two dashes is a [`TokenKind::Key`], and a dash followed
//! immediately by an ASCII digit starts a negative [`TokenKind::Number`]
//! instead. `"-5"` is the number minus five; `"--5"` is a key named `5`.
//!
//! Tokens are separated by runs of ASCII whitespace; other Unicode
//! whitespace is ordinary word content. Quoted strings run from `"` to
//! the next `"` with no escape sequences; they may span any characters
//! except the closing quote, including whitespace, and may be empty. A
//! quote appearing mid-word has no special meaning.

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::char,
    sequence::delimited,
    IResult,
};

use crate::error::LexError;

/// The classification of one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A bare word: command names and enumeration member values.
    Literal,
    /// A `"`-delimited run of characters, quotes stripped.
    String,
    /// A word shaped like a number: leading ASCII digit, or a dash
    /// followed by one.
    Number,
    /// A `-`-prefixed word, dash stripped.
    Flag,
    /// A `--`-prefixed word, dashes stripped.
    Key,
    /// End of line. Reads past it stay at end of line.
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Literal => "word",
            TokenKind::String => "quoted string",
            TokenKind::Number => "number",
            TokenKind::Flag => "flag",
            TokenKind::Key => "key",
            TokenKind::Eof => "end of line",
        };
        f.write_str(name)
    }
}

/// One classified token, borrowing its text from the input line.
///
/// For [`String`](TokenKind::String) tokens the text excludes the
/// quotes; for [`Flag`](TokenKind::Flag) and [`Key`](TokenKind::Key)
/// tokens it excludes the dashes. [`Eof`](TokenKind::Eof) carries empty
/// text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// What the token is.
    pub kind: TokenKind,
    /// The token's text, with any delimiters stripped.
    pub text: &'a str,
}

/// Parse a quoted string body (the part between `"` and `"`).
fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_until("\""), char('"'))(input)
}

/// Parse one word: everything up to the next ASCII whitespace.
fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_ascii_whitespace())(input)
}

/// Whether `text` is shaped like a number: `5`, `5.5`, `-5`, `-5.5`.
///
/// Only the leading characters are inspected. `5x` still classifies as
/// a number here and fails later, at coercion, with the field name in
/// hand for a better error.
fn number_shaped(text: &str) -> bool {
    match text.as_bytes() {
        [b'-', second, ..] => second.is_ascii_digit(),
        [first, ..] => first.is_ascii_digit(),
        [] => false,
    }
}

/// Produce the next token from `rest`, returning the remaining input.
///
/// `line_len` is the length of the whole original line, used to report
/// byte offsets in errors.
fn next_token(rest: &str, line_len: usize) -> Result<(&str, Token<'_>), LexError> {
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let at = line_len - rest.len();

    if rest.is_empty() {
        return Ok((
            rest,
            Token {
                kind: TokenKind::Eof,
                text: "",
            },
        ));
    }

    if rest.starts_with('"') {
        return match quoted(rest) {
            Ok((remaining, text)) => Ok((
                remaining,
                Token {
                    kind: TokenKind::String,
                    text,
                },
            )),
            Err(_) => Err(LexError::UnterminatedString { at }),
        };
    }

    let (remaining, text) = match word(rest) {
        Ok(parsed) => parsed,
        // take_while1 cannot fail here: rest is trimmed and non-empty.
        Err(_) => return Err(LexError::DanglingMarker { at }),
    };

    let token = if number_shaped(text) {
        Token {
            kind: TokenKind::Number,
            text,
        }
    } else if let Some(name) = text.strip_prefix("--") {
        if name.is_empty() {
            return Err(LexError::DanglingMarker { at });
        }
        Token {
            kind: TokenKind::Key,
            text: name,
        }
    } else if let Some(name) = text.strip_prefix('-') {
        if name.is_empty() {
            return Err(LexError::DanglingMarker { at });
        }
        Token {
            kind: TokenKind::Flag,
            text: name,
        }
    } else {
        Token {
            kind: TokenKind::Literal,
            text,
        }
    };

    Ok((remaining, token))
}

/// A lazy, single-lookahead cursor over the tokens of one line.
///
/// Construction lexes the first token; [`advance`](TokenStream::advance)
/// lexes the next one. A lexical error therefore surfaces exactly when
/// the walk reaches the bad token, never earlier, and tokens before it
/// are still consumed normally.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    line: &'a str,
    rest: &'a str,
    current: Token<'a>,
}

impl<'a> TokenStream<'a> {
    /// Start a stream over `line`, positioned at its first token.
    pub fn new(line: &'a str) -> Result<Self, LexError> {
        let (rest, current) = next_token(line, line.len())?;
        Ok(Self {
            line,
            rest,
            current,
        })
    }

    /// The token under the cursor. Does not consume it.
    pub fn current(&self) -> Token<'a> {
        self.current
    }

    /// Move the cursor past the current token.
    ///
    /// At end of line this is a no-op: the stream stays parked on
    /// [`TokenKind::Eof`] forever.
    pub fn advance(&mut self) -> Result<(), LexError> {
        if self.current.kind == TokenKind::Eof {
            return Ok(());
        }
        let (rest, current) = next_token(self.rest, self.line.len())?;
        self.rest = rest;
        self.current = current;
        Ok(())
    }
}
