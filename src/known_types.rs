//! Known names module - reserved Java words and the well-known classes the
//! binder template refers to by simple name.
//!
//! This module is the single source of truth for name recognition, shared by
//! identifier validation and import resolution.

use serde::{Deserialize, Serialize};

/// Java keywords and literals that can never be identifiers
pub const RESERVED_WORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "true", "false", "null", "_",
];

/// Contextual keywords that cannot name a type
pub const RESTRICTED_TYPE_NAMES: &[&str] = &["var", "yield", "record", "sealed", "permits"];

/// Classes that are visible without an import
pub const IMPLICIT_PACKAGE: &str = "java.lang";

/// Binder base class shipped by the MultiType library
pub const MULTITYPE_IMPORTS: &[(&str, &str)] =
    &[("ItemViewBinder", "me.drakeet.multitype.ItemViewBinder")];

/// Android framework classes used by the binder template
pub const ANDROID_IMPORTS: &[(&str, &str)] = &[
    ("LayoutInflater", "android.view.LayoutInflater"),
    ("View", "android.view.View"),
    ("ViewGroup", "android.view.ViewGroup"),
];

/// Jetpack locations of the annotation and RecyclerView classes
pub const ANDROIDX_IMPORTS: &[(&str, &str)] = &[
    ("NonNull", "androidx.annotation.NonNull"),
    ("RecyclerView", "androidx.recyclerview.widget.RecyclerView"),
];

/// Legacy support library locations of the same classes
pub const SUPPORT_IMPORTS: &[(&str, &str)] = &[
    ("NonNull", "android.support.annotation.NonNull"),
    ("RecyclerView", "android.support.v7.widget.RecyclerView"),
];

/// Which Android library generation the host project builds against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AndroidFlavor {
    #[default]
    Androidx,
    Support,
}

/// Check if a word is reserved in Java
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Check if a word may be used as a method or variable name but not as a type name
pub fn is_restricted_type_name(name: &str) -> bool {
    RESTRICTED_TYPE_NAMES.contains(&name)
}

/// Default simple name to fully-qualified name table for a flavor
pub fn default_imports(flavor: AndroidFlavor) -> Vec<(&'static str, &'static str)> {
    let flavored = match flavor {
        AndroidFlavor::Androidx => ANDROIDX_IMPORTS,
        AndroidFlavor::Support => SUPPORT_IMPORTS,
    };

    MULTITYPE_IMPORTS
        .iter()
        .chain(ANDROID_IMPORTS)
        .chain(flavored)
        .copied()
        .collect()
}

/// Package part of a fully-qualified name (`a.b.C` -> `a.b`)
pub fn package_of(qualified: &str) -> &str {
    qualified.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
}

/// Simple name part of a fully-qualified name (`a.b.C` -> `C`)
pub fn simple_name_of(qualified: &str) -> &str {
    qualified.rsplit_once('.').map(|(_, name)| name).unwrap_or(qualified)
}
