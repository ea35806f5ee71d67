//! Error taxonomy of the generation core.
//!
//! Structural errors (`InvalidIdentifier`, `MissingTarget`, `Parse`,
//! `DuplicateMember`) abort the request before the host is touched.
//! Cosmetic problems found while normalizing are reported as
//! [`NormalizationWarning`] values and never fail a request.

use std::fmt;

use thiserror::Error;

/// A type name that cannot be used as a Java identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid identifier `{value}`: {reason}")]
pub struct InvalidIdentifier {
    /// The rejected input.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

impl InvalidIdentifier {
    pub fn new(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised while substituting placeholders in a code template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template uses a placeholder that has no binding.
    #[error("placeholder `{0}` has no binding")]
    Unbound(String),
    /// The template contains a placeholder-like token outside the known set.
    #[error("unknown placeholder `{0}`")]
    Unknown(String),
}

/// Error raised while turning Java source text into declarations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The text could not be split into tokens.
    #[error("lexical error at {line}:{column}: {message}")]
    Lex {
        line: usize,
        column: usize,
        message: String,
    },
    /// A token appeared where the grammar does not allow it.
    #[error("unexpected `{found}` at {line}:{column}, expected {expected}")]
    UnexpectedToken {
        line: usize,
        column: usize,
        found: String,
        expected: String,
    },
    /// The input ended in the middle of a construct.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
    /// A closing delimiter does not match the innermost open one.
    #[error("unbalanced `{delimiter}` at {line}:{column}")]
    Unbalanced {
        line: usize,
        column: usize,
        delimiter: char,
    },
    /// A fragment must contain exactly one member declaration.
    #[error("expected exactly one declaration inside `{context}`, found {found}")]
    DeclarationCount { context: String, found: usize },
    /// The fragment parsed, but not into a type declaration.
    #[error("`{name}` is not a type declaration")]
    NotATypeDeclaration { name: String },
    /// A nested type cannot reuse the name of an enclosing type.
    #[error("nested type `{name}` has the same name as an enclosing type")]
    ShadowsEnclosing { name: String },
    /// Rendering the fragment text failed before parsing could start.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Everything that can make a generation request fail.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),
    /// No host class could be resolved for the request.
    #[error("no target class: {0}")]
    MissingTarget(String),
    #[error("generated source does not parse: {0}")]
    Parse(#[from] ParseError),
    /// The host already declares a member with the generated name.
    #[error("`{host}` already declares a member named `{name}`")]
    DuplicateMember { host: String, name: String },
}

impl GenerationError {
    /// Stable name of the error kind, used by the CLI when reporting failures.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::InvalidIdentifier(_) => "InvalidIdentifierError",
            GenerationError::MissingTarget(_) => "MissingTargetError",
            GenerationError::Parse(_) => "ParseError",
            GenerationError::DuplicateMember { .. } => "DuplicateMemberError",
        }
    }
}

/// The normalization step that produced a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeStep {
    ShortenReferences,
    AddImports,
    OptimizeImports,
    Reformat,
    Reparse,
}

impl fmt::Display for NormalizeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NormalizeStep::ShortenReferences => "shorten references",
            NormalizeStep::AddImports => "add imports",
            NormalizeStep::OptimizeImports => "optimize imports",
            NormalizeStep::Reformat => "reformat",
            NormalizeStep::Reparse => "reparse",
        };
        f.write_str(name)
    }
}

/// A cosmetic normalization step that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationWarning {
    pub step: NormalizeStep,
    pub message: String,
}

impl NormalizationWarning {
    pub fn new(step: NormalizeStep, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}

impl fmt::Display for NormalizationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} skipped: {}", self.step, self.message)
    }
}
