//! Structural parser for Java member declarations.
//!
//! Works on significant tokens (no whitespace or comments). It recognises
//! the shape of declarations and balances delimiters; expressions, statements
//! and types are skipped over, never interpreted.

use crate::error::ParseError;
use crate::models::{DeclarationKind, DeclarationNode, Modifier};

use super::lexer::{line_col, Token, TokenKind};

pub(crate) struct Parser<'s, 't> {
    source: &'s str,
    tokens: &'t [Token<'s>],
    pos: usize,
}

impl<'s, 't> Parser<'s, 't> {
    pub(crate) fn new(source: &'s str, tokens: &'t [Token<'s>]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    pub(crate) fn peek(&self) -> Option<&Token<'s>> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, n: usize) -> Option<&Token<'s>> {
        self.tokens.get(self.pos + n)
    }

    pub(crate) fn bump(&mut self) -> Option<Token<'s>> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn at_punct(&self, c: char) -> bool {
        self.peek().is_some_and(|t| t.is_punct(c))
    }

    pub(crate) fn at_ident(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.is_ident(word))
    }

    pub(crate) fn expect_punct(
        &mut self,
        c: char,
        expected: &str,
    ) -> Result<Token<'s>, ParseError> {
        match self.peek().copied() {
            Some(t) if t.is_punct(c) => {
                self.pos += 1;
                Ok(t)
            }
            Some(t) => Err(self.unexpected(&t, expected)),
            None => Err(eof(expected)),
        }
    }

    pub(crate) fn expect_ident(&mut self, expected: &str) -> Result<Token<'s>, ParseError> {
        match self.peek().copied() {
            Some(t) if t.kind == TokenKind::Ident => {
                self.pos += 1;
                Ok(t)
            }
            Some(t) => Err(self.unexpected(&t, expected)),
            None => Err(eof(expected)),
        }
    }

    pub(crate) fn unexpected(&self, token: &Token<'_>, expected: &str) -> ParseError {
        let (line, column) = line_col(self.source, token.offset);
        ParseError::UnexpectedToken {
            line,
            column,
            found: token.text.to_string(),
            expected: expected.to_string(),
        }
    }

    fn unbalanced(&self, token: &Token<'_>) -> ParseError {
        let (line, column) = line_col(self.source, token.offset);
        ParseError::Unbalanced {
            line,
            column,
            delimiter: token.text.chars().next().unwrap_or_default(),
        }
    }

    /// Consume a delimited group starting at the current opening token.
    ///
    /// Returns the closing token.
    fn skip_balanced(&mut self) -> Result<Token<'s>, ParseError> {
        let mut stack: Vec<char> = Vec::new();

        while let Some(token) = self.bump() {
            if token.kind != TokenKind::Punct {
                continue;
            }
            match token.text {
                "(" => stack.push(')'),
                "[" => stack.push(']'),
                "{" => stack.push('}'),
                ")" | "]" | "}" => {
                    let close = token.text.chars().next().unwrap_or_default();
                    if stack.pop() != Some(close) {
                        return Err(self.unbalanced(&token));
                    }
                    if stack.is_empty() {
                        return Ok(token);
                    }
                }
                _ => {}
            }
            if stack.is_empty() {
                // the group did not start with an opening delimiter
                return Err(self.unexpected(&token, "`(`, `[` or `{`"));
            }
        }

        let expected = stack
            .last()
            .map(|c| format!("`{}`", c))
            .unwrap_or_else(|| "a delimiter".to_string());
        Err(eof(&expected))
    }

    /// Parse member declarations up to the closing `}` of the enclosing body
    /// (left unconsumed) or, when `until_close` is false, up to the end of input.
    pub(crate) fn parse_members(
        &mut self,
        until_close: bool,
        enclosing: &mut Vec<String>,
    ) -> Result<Vec<DeclarationNode>, ParseError> {
        let mut members = Vec::new();

        loop {
            match self.peek().copied() {
                None if until_close => return Err(eof("`}`")),
                None => return Ok(members),
                Some(t) if t.is_punct('}') => {
                    if until_close {
                        return Ok(members);
                    }
                    return Err(self.unbalanced(&t));
                }
                Some(t) if t.is_punct(';') => {
                    self.bump();
                }
                Some(_) => members.push(self.parse_member(enclosing)?),
            }
        }
    }

    fn parse_member(&mut self, enclosing: &mut Vec<String>) -> Result<DeclarationNode, ParseError> {
        let start = self.peek().map(|t| t.offset).unwrap_or(self.source.len());
        let mut annotations = Vec::new();
        let mut modifiers = Vec::new();

        loop {
            if self.at_punct('@') {
                if self.peek_at(1).is_some_and(|t| t.is_ident("interface")) {
                    break;
                }
                annotations.push(self.parse_annotation()?);
            } else if let Some(modifier) = self
                .peek()
                .filter(|t| t.kind == TokenKind::Ident)
                .and_then(|t| Modifier::from_keyword(t.text))
            {
                modifiers.push(modifier);
                self.bump();
            } else if self.at_ident("non")
                && self.peek_at(1).is_some_and(|t| t.is_punct('-'))
                && self.peek_at(2).is_some_and(|t| t.is_ident("sealed"))
            {
                modifiers.push(Modifier::NonSealed);
                self.pos += 3;
            } else {
                break;
            }
        }

        let Some(first) = self.peek().copied() else {
            return Err(eof("a declaration"));
        };
        let signature_start = first.offset;
        let header = Header {
            start,
            signature_start,
            annotations,
            modifiers,
        };

        if first.is_punct('@') {
            self.pos += 2;
            return self.parse_type(DeclarationKind::AnnotationType, header, enclosing);
        }

        if first.kind == TokenKind::Ident {
            let kind = match first.text {
                "class" => Some(DeclarationKind::Class),
                "interface" => Some(DeclarationKind::Interface),
                "enum" => Some(DeclarationKind::Enum),
                "record"
                    if self.peek_at(1).is_some_and(|t| t.kind == TokenKind::Ident)
                        && self
                            .peek_at(2)
                            .is_some_and(|t| t.is_punct('(') || t.is_punct('<')) =>
                {
                    Some(DeclarationKind::Record)
                }
                _ => None,
            };
            if let Some(kind) = kind {
                self.bump();
                return self.parse_type(kind, header, enclosing);
            }
        }

        if first.is_punct('{') {
            let close = self.skip_balanced()?;
            let body = first.offset..close.end();
            return Ok(self.finish(
                DeclarationKind::Initializer,
                None,
                header,
                Vec::new(),
                close.end(),
                Some(body),
            ));
        }

        self.parse_method_or_field(header)
    }

    fn parse_annotation(&mut self) -> Result<String, ParseError> {
        let at = self.expect_punct('@', "`@`")?;
        let mut end = self.expect_ident("annotation name")?.end();

        while self.at_punct('.') && self.peek_at(1).is_some_and(|t| t.kind == TokenKind::Ident) {
            self.bump();
            end = self.bump().map(|t| t.end()).unwrap_or(end);
        }

        if self.at_punct('(') {
            end = self.skip_balanced()?.end();
        }

        Ok(self.source[at.offset..end].to_string())
    }

    fn parse_type(
        &mut self,
        kind: DeclarationKind,
        header: Header,
        enclosing: &mut Vec<String>,
    ) -> Result<DeclarationNode, ParseError> {
        let name = self.expect_ident("type name")?;
        let name = name.text.to_string();

        if enclosing.iter().any(|outer| *outer == name) {
            return Err(ParseError::ShadowsEnclosing { name });
        }

        // type parameters, record components, extends / implements / permits clauses
        loop {
            match self.peek().copied() {
                Some(t) if t.is_punct('{') => break,
                Some(t) if t.is_punct('(') || t.is_punct('[') => {
                    self.skip_balanced()?;
                }
                Some(t)
                    if t.is_punct(';') || t.is_punct('}') || t.is_punct(')') || t.is_punct(']') =>
                {
                    return Err(self.unexpected(&t, "`{`"));
                }
                Some(_) => {
                    self.bump();
                }
                None => return Err(eof("`{`")),
            }
        }

        let open = self.expect_punct('{', "`{`")?;
        enclosing.push(name.clone());

        let members = if kind == DeclarationKind::Enum {
            self.skip_enum_constants()?;
            if self.at_punct(';') {
                self.bump();
                self.parse_members(true, enclosing)?
            } else {
                Vec::new()
            }
        } else {
            self.parse_members(true, enclosing)?
        };

        enclosing.pop();
        let close = self.expect_punct('}', "`}`")?;
        let body = open.offset..close.end();

        Ok(self.finish(kind, Some(name), header, members, close.end(), Some(body)))
    }

    /// Skip enum constants up to the `;` that starts the body declarations or the closing `}`
    fn skip_enum_constants(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek().copied() {
                Some(t) if t.is_punct(';') || t.is_punct('}') => return Ok(()),
                Some(t) if t.is_punct('(') || t.is_punct('[') || t.is_punct('{') => {
                    self.skip_balanced()?;
                }
                Some(t) if t.is_punct(')') || t.is_punct(']') => return Err(self.unbalanced(&t)),
                Some(_) => {
                    self.bump();
                }
                None => return Err(eof("`}`")),
            }
        }
    }

    fn parse_method_or_field(&mut self, header: Header) -> Result<DeclarationNode, ParseError> {
        let signature_pos = self.pos;

        // leading type parameters of a generic method or constructor
        let mut name_pos = signature_pos;
        if self.at_punct('<') {
            let mut depth = 0usize;
            while let Some(t) = self.bump() {
                if t.is_punct('<') {
                    depth += 1;
                } else if t.is_punct('>') {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
            }
            name_pos = self.pos;
        }

        let mut previous: Option<Token<'s>> = None;
        let mut callable: Option<(String, usize)> = None;
        let mut field_name: Option<String> = None;
        let mut assigned = false;
        // type argument nesting before the initializer
        let mut angles = 0usize;

        loop {
            let Some(token) = self.peek().copied() else {
                return Err(eof("`;`"));
            };

            if token.kind == TokenKind::Punct {
                match token.text {
                    "(" => {
                        if callable.is_none() && !assigned {
                            let name = previous
                                .filter(|p| p.kind == TokenKind::Ident)
                                .ok_or_else(|| self.unexpected(&token, "a method name"))?;
                            callable = Some((name.text.to_string(), self.pos - 1));
                        }
                        previous = Some(self.skip_balanced()?);
                        continue;
                    }
                    "[" => {
                        previous = Some(self.skip_balanced()?);
                        continue;
                    }
                    "{" => {
                        let close = self.skip_balanced()?;
                        if let (Some((name, at)), false) = (callable.clone(), assigned) {
                            let kind = if at == name_pos {
                                DeclarationKind::Constructor
                            } else {
                                DeclarationKind::Method
                            };
                            let body = token.offset..close.end();
                            return Ok(self.finish(
                                kind,
                                Some(name),
                                header,
                                Vec::new(),
                                close.end(),
                                Some(body),
                            ));
                        }
                        previous = Some(close);
                        continue;
                    }
                    ";" => {
                        self.bump();
                        let end = token.end();
                        return Ok(match (callable, assigned) {
                            (Some((name, _)), false) => self.finish(
                                DeclarationKind::Method,
                                Some(name),
                                header,
                                Vec::new(),
                                end,
                                None,
                            ),
                            _ => {
                                let name = field_name.or_else(|| ident_text(previous));
                                self.finish(
                                    DeclarationKind::Field,
                                    name,
                                    header,
                                    Vec::new(),
                                    end,
                                    None,
                                )
                            }
                        });
                    }
                    "=" => {
                        if callable.is_none() && !assigned {
                            assigned = true;
                            if field_name.is_none() {
                                field_name = ident_text(previous);
                            }
                        }
                    }
                    "<" if !assigned => angles += 1,
                    ">" if !assigned => angles = angles.saturating_sub(1),
                    "," => {
                        if callable.is_none() && !assigned && angles == 0 && field_name.is_none() {
                            field_name = ident_text(previous);
                        }
                    }
                    ")" | "]" => return Err(self.unbalanced(&token)),
                    "}" => return Err(self.unexpected(&token, "`;`")),
                    _ => {}
                }
            }

            previous = Some(token);
            self.bump();
        }
    }

    fn finish(
        &self,
        kind: DeclarationKind,
        name: Option<String>,
        header: Header,
        members: Vec<DeclarationNode>,
        end: usize,
        body: Option<std::ops::Range<usize>>,
    ) -> DeclarationNode {
        let source = self.source[header.start..end].to_string();
        let signature = self.source[header.signature_start..end].to_string();
        DeclarationNode::parsed(
            kind,
            name,
            header.annotations,
            header.modifiers,
            members,
            source,
            signature,
            header.start..end,
            body,
        )
    }
}

/// Annotations and modifiers read before the declaration proper
struct Header {
    start: usize,
    signature_start: usize,
    annotations: Vec<String>,
    modifiers: Vec<Modifier>,
}

fn ident_text(token: Option<Token<'_>>) -> Option<String> {
    token
        .filter(|t| t.kind == TokenKind::Ident)
        .map(|t| t.text.to_string())
}

pub(crate) fn eof(expected: &str) -> ParseError {
    ParseError::UnexpectedEof {
        expected: expected.to_string(),
    }
}
