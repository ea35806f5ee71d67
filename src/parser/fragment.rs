use crate::error::ParseError;
use crate::models::{DeclarationNode, TypePath};

use super::declaration_parser::Parser;
use super::lexer::{significant, tokenize};

/// The scope a fragment is parsed in: the names of its enclosing types,
/// outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    enclosing: Vec<String>,
}

impl ParseContext {
    /// Context for a member of the type at `target`
    pub fn for_target(target: &TypePath) -> Self {
        Self {
            enclosing: target.segments().to_vec(),
        }
    }

    pub fn top_level() -> Self {
        Self::default()
    }

    pub fn enclosing(&self) -> &[String] {
        &self.enclosing
    }

    fn describe(&self) -> String {
        if self.enclosing.is_empty() {
            "<top level>".to_string()
        } else {
            self.enclosing.join(".")
        }
    }
}

/// Turns source text into a single member declaration
pub trait FragmentParser {
    fn parse_declaration(
        &self,
        source: &str,
        context: &ParseContext,
    ) -> Result<DeclarationNode, ParseError>;
}

/// Parses fragments as Java class body declarations
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaFragmentParser;

impl FragmentParser for JavaFragmentParser {
    fn parse_declaration(
        &self,
        source: &str,
        context: &ParseContext,
    ) -> Result<DeclarationNode, ParseError> {
        let tokens = tokenize(source)?;
        let tokens = significant(&tokens);
        let mut parser = Parser::new(source, &tokens);

        if let Some(first) = parser.peek().copied() {
            if first.is_ident("package") || first.is_ident("import") {
                return Err(parser.unexpected(&first, "a member declaration"));
            }
        }

        let mut enclosing = context.enclosing.clone();
        let mut members = parser.parse_members(false, &mut enclosing)?;

        if members.len() != 1 {
            return Err(ParseError::DeclarationCount {
                context: context.describe(),
                found: members.len(),
            });
        }

        Ok(members.remove(0))
    }
}
