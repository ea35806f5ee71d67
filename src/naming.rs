//! Identifier case conversion between the naming conventions used by the
//! generated code: `UpperCamel` type names, `lowerCamel` parameter names and
//! `lower_underscore` resource names.
//!
//! Splitting is ASCII-only: camel styles break before every uppercase letter,
//! so `URLParser` is the four words `U`, `R`, `L`, `Parser`.

use std::fmt;

use crate::error::InvalidIdentifier;

/// A naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStyle {
    /// `UserProfile`
    UpperCamel,
    /// `userProfile`
    LowerCamel,
    /// `user_profile`
    LowerUnderscore,
}

impl fmt::Display for CaseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaseStyle::UpperCamel => "UpperCamel",
            CaseStyle::LowerCamel => "lowerCamel",
            CaseStyle::LowerUnderscore => "lower_underscore",
        };
        f.write_str(name)
    }
}

/// Convert `identifier`, written in `from`, to the `to` convention.
pub fn convert(
    identifier: &str,
    from: CaseStyle,
    to: CaseStyle,
) -> Result<String, InvalidIdentifier> {
    validate(identifier, from)?;

    let words = split_words(identifier, from);
    let converted = match to {
        CaseStyle::UpperCamel => words.iter().map(|w| capitalize(w)).collect(),
        CaseStyle::LowerCamel => {
            let mut result = String::with_capacity(identifier.len());
            for (i, word) in words.iter().enumerate() {
                if i == 0 {
                    result.push_str(&word.to_ascii_lowercase());
                } else {
                    result.push_str(&capitalize(word));
                }
            }
            result
        }
        CaseStyle::LowerUnderscore => words
            .iter()
            .map(|w| w.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join("_"),
    };

    Ok(converted)
}

/// Shorthand for `convert(name, UpperCamel, LowerCamel)`.
pub fn to_lower_camel(name: &str) -> Result<String, InvalidIdentifier> {
    convert(name, CaseStyle::UpperCamel, CaseStyle::LowerCamel)
}

/// Shorthand for `convert(name, UpperCamel, LowerUnderscore)`.
pub fn to_lower_underscore(name: &str) -> Result<String, InvalidIdentifier> {
    convert(name, CaseStyle::UpperCamel, CaseStyle::LowerUnderscore)
}

fn validate(identifier: &str, style: CaseStyle) -> Result<(), InvalidIdentifier> {
    let Some(first) = identifier.chars().next() else {
        return Err(InvalidIdentifier::new(identifier, "identifier is empty"));
    };

    let allowed: fn(char) -> bool = match style {
        CaseStyle::UpperCamel | CaseStyle::LowerCamel => {
            |c| c.is_ascii_alphanumeric() || c == '_' || c == '$'
        }
        CaseStyle::LowerUnderscore => |c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_',
    };

    if let Some(bad) = identifier.chars().find(|&c| !allowed(c)) {
        return Err(InvalidIdentifier::new(
            identifier,
            format!("character {:?} is not allowed in {} names", bad, style),
        ));
    }

    if first.is_ascii_digit() {
        return Err(InvalidIdentifier::new(identifier, "identifier starts with a digit"));
    }

    Ok(())
}

fn split_words(identifier: &str, style: CaseStyle) -> Vec<&str> {
    match style {
        CaseStyle::LowerUnderscore => identifier.split('_').collect(),
        CaseStyle::UpperCamel | CaseStyle::LowerCamel => {
            let mut words = Vec::new();
            let mut start = 0;
            for (i, c) in identifier.char_indices() {
                if i > 0 && c.is_ascii_uppercase() {
                    words.push(&identifier[start..i]);
                    start = i;
                }
            }
            words.push(&identifier[start..]);
            words
        }
    }
}

/// First character uppercased, the rest lowercased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut result = String::with_capacity(word.len());
            result.push(first.to_ascii_uppercase());
            result.push_str(&chars.as_str().to_ascii_lowercase());
            result
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "Foo",
        "UserProfile",
        "URLParser",
        "Item2Detail",
        "A",
        "ImageTextCard",
        "HTTPResponseV2",
    ];

    #[test]
    fn test_to_lower_camel() {
        assert_eq!(to_lower_camel("UserProfile").unwrap(), "userProfile");
        assert_eq!(to_lower_camel("Foo").unwrap(), "foo");
        assert_eq!(to_lower_camel("URLParser").unwrap(), "uRLParser");
        assert_eq!(to_lower_camel("Item2Detail").unwrap(), "item2Detail");
    }

    #[test]
    fn test_to_lower_underscore() {
        assert_eq!(to_lower_underscore("UserProfile").unwrap(), "user_profile");
        assert_eq!(to_lower_underscore("Foo").unwrap(), "foo");
        assert_eq!(to_lower_underscore("URLParser").unwrap(), "u_r_l_parser");
        assert_eq!(to_lower_underscore("Item2Detail").unwrap(), "item2_detail");
    }

    #[test]
    fn test_lower_camel_only_touches_first_character() {
        for sample in SAMPLES {
            let converted = to_lower_camel(sample).unwrap();
            assert_eq!(converted.len(), sample.len());
            assert_eq!(&converted[1..], &sample[1..], "sample {}", sample);
            assert_eq!(
                converted.chars().next(),
                sample.chars().next().map(|c| c.to_ascii_lowercase())
            );
        }
    }

    #[test]
    fn test_lower_camel_is_idempotent() {
        for sample in SAMPLES {
            let once = to_lower_camel(sample).unwrap();
            let twice = convert(&once, CaseStyle::LowerCamel, CaseStyle::LowerCamel).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_lower_underscore_round_trip() {
        for sample in SAMPLES {
            let underscored = to_lower_underscore(sample).unwrap();
            let internal_uppercase = sample
                .chars()
                .skip(1)
                .filter(|c| c.is_ascii_uppercase())
                .count();
            assert_eq!(underscored.matches('_').count(), internal_uppercase);
            assert!(!underscored.chars().any(|c| c.is_ascii_uppercase()));

            let back =
                convert(&underscored, CaseStyle::LowerUnderscore, CaseStyle::UpperCamel).unwrap();
            assert_eq!(&back, sample);
        }
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(to_lower_camel("").is_err());
        assert!(to_lower_camel("User Profile").is_err());
        assert!(to_lower_camel("User-Profile").is_err());
        assert!(to_lower_camel("2Fast").is_err());
        assert!(to_lower_camel("Größe").is_err());
        assert!(convert("UserProfile", CaseStyle::LowerUnderscore, CaseStyle::UpperCamel).is_err());
    }

    #[test]
    fn test_error_mentions_offending_character() {
        let err = to_lower_underscore("User Profile").unwrap_err();
        assert_eq!(err.value, "User Profile");
        assert!(err.reason.contains("' '"));
    }
}
