//! Java tokenizer.
//!
//! Produces every token, whitespace and comments included, so that the
//! concatenation of all token texts is the input. Operators are emitted one
//! character at a time; the structural parser only needs delimiters,
//! `;`, `=`, `@` and `.`.

use nom::{
    branch::alt,
    bytes::complete::{escaped, is_not, tag, take_till, take_until, take_while},
    character::complete::{anychar, char, multispace1, satisfy},
    combinator::{opt, recognize, value},
    error::ErrorKind,
    sequence::{delimited, pair, tuple},
    IResult,
};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    LineComment,
    BlockComment,
    DocComment,
    Ident,
    StringLit,
    TextBlock,
    CharLit,
    Number,
    Punct,
}

impl TokenKind {
    /// Tokens that carry no syntax
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::DocComment
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::DocComment
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the token in the tokenized text
    pub offset: usize,
}

impl<'a> Token<'a> {
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct && self.text.len() == c.len_utf8() && self.text.starts_with(c)
    }

    pub fn is_ident(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == word
    }
}

/// Split `source` into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let mut rest = source;

    while !rest.is_empty() {
        let offset = source.len() - rest.len();
        match token(rest) {
            Ok((remaining, kind)) => {
                let len = rest.len() - remaining.len();
                tokens.push(Token {
                    kind,
                    text: &rest[..len],
                    offset,
                });
                rest = remaining;
            }
            Err(_) => {
                let (line, column) = line_col(source, offset);
                return Err(ParseError::Lex {
                    line,
                    column,
                    message: describe_failure(rest),
                });
            }
        }
    }

    Ok(tokens)
}

/// Significant tokens only
pub fn significant<'a>(tokens: &[Token<'a>]) -> Vec<Token<'a>> {
    tokens.iter().filter(|t| !t.kind.is_trivia()).copied().collect()
}

/// 1-based line and column of a byte offset
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map(|nl| before[nl + 1..].chars().count())
        .unwrap_or_else(|| before.chars().count())
        + 1;
    (line, column)
}

fn token(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::Whitespace, multispace1),
        value(TokenKind::DocComment, doc_comment),
        value(TokenKind::BlockComment, block_comment),
        value(TokenKind::LineComment, line_comment),
        value(TokenKind::TextBlock, text_block),
        value(TokenKind::StringLit, string_literal),
        value(TokenKind::CharLit, char_literal),
        value(TokenKind::Number, number),
        value(TokenKind::Ident, identifier),
        value(TokenKind::Punct, punct),
    ))(input)
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), take_till(|c: char| c == '\n')))(input)
}

fn doc_comment(input: &str) -> IResult<&str, &str> {
    // `/**/` is an empty block comment, not a doc comment
    recognize(tuple((tag("/**"), satisfy(|c| c != '/'), take_until("*/"), tag("*/"))))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

fn text_block(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("\"\"\""), take_until("\"\"\""), tag("\"\"\""))))(input)
}

fn string_literal(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('"'),
        opt(escaped(is_not("\\\"\n"), '\\', anychar)),
        char('"'),
    ))(input)
}

fn char_literal(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('\''),
        escaped(is_not("\\'\n"), '\\', anychar),
        char('\''),
    ))(input)
}

fn number(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_digit()),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.'),
    ))(input)
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub(crate) fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_ident_start), take_while(is_ident_part)))(input)
}

fn punct(input: &str) -> IResult<&str, &str> {
    // an unterminated comment or literal must not degrade into punctuation
    if input.starts_with("/*") {
        return Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Char)));
    }
    recognize(satisfy(|c| c.is_ascii_punctuation() && c != '"' && c != '\''))(input)
}

fn describe_failure(rest: &str) -> String {
    if rest.starts_with("/*") {
        "unterminated block comment".to_string()
    } else if rest.starts_with("\"\"\"") {
        "unterminated text block".to_string()
    } else if rest.starts_with('"') {
        "unterminated string literal".to_string()
    } else if rest.starts_with('\'') {
        "malformed character literal".to_string()
    } else {
        let c = rest.chars().next().unwrap_or_default();
        format!("unexpected character {:?}", c)
    }
}
