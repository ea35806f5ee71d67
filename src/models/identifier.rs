use std::fmt;

use crate::error::InvalidIdentifier;
use crate::known_types;
use crate::naming::{self, CaseStyle};

/// A validated Java type name
///
/// Only ASCII letters, digits, `_` and `$` are accepted, the first character
/// is not a digit, and reserved words are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validate `raw` as a Java type name
    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        let Some(first) = raw.chars().next() else {
            return Err(InvalidIdentifier::new(raw, "type name is empty"));
        };

        if first.is_ascii_digit() {
            return Err(InvalidIdentifier::new(raw, "type name starts with a digit"));
        }

        if let Some(bad) = raw
            .chars()
            .find(|&c| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        {
            return Err(InvalidIdentifier::new(
                raw,
                format!("character {:?} is not allowed in a Java identifier", bad),
            ));
        }

        if known_types::is_reserved_word(raw) || known_types::is_restricted_type_name(raw) {
            return Err(InvalidIdentifier::new(raw, "type name is a reserved word"));
        }

        Ok(Identifier(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render this name in another naming convention, assuming UpperCamel input
    pub fn to_style(&self, style: CaseStyle) -> Result<String, InvalidIdentifier> {
        naming::convert(&self.0, CaseStyle::UpperCamel, style)
    }

    /// Append a suffix, e.g. `Foo` + `ViewBinder`
    pub fn with_suffix(&self, suffix: &str) -> String {
        format!("{}{}", self.0, suffix)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
