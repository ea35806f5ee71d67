//! Placeholder substitution for the generated binder source.
//!
//! Placeholders come from a closed set ([`Placeholder`]). Rendering fails on
//! an unbound placeholder and on any placeholder-looking token that is not in
//! the set, so a template typo never reaches the parser as half-rendered code.

use std::collections::BTreeMap;

use crate::error::{InvalidIdentifier, TemplateError};
use crate::models::Identifier;
use crate::naming::CaseStyle;

/// Bumped whenever the text of [`BINDER_TEMPLATE`] changes.
pub const TEMPLATE_VERSION: u32 = 1;

/// Suffix appended to the type name to name its binder.
pub const BINDER_SUFFIX: &str = "ViewBinder";

/// Skeleton of a MultiType item view binder nested inside the host class.
pub const BINDER_TEMPLATE: &str = "private static class ${NAME} extends ItemViewBinder<MTI_CLASS, ${NAME}.ViewHolder> {

    @NonNull @Override
    protected ViewHolder onCreateViewHolder(@NonNull LayoutInflater inflater, @NonNull ViewGroup parent) {
        View root = inflater.inflate(R.layout.item_MTI_LOWER_NAME, parent, false);
        return new ViewHolder(root);
    }

    @Override
    protected void onBindViewHolder(@NonNull ViewHolder holder, @NonNull MTI_CLASS MTI_NAME) {

    }

    static class ViewHolder extends RecyclerView.ViewHolder {

        ViewHolder(View itemView) {
            super(itemView);
        }
    }
}";

/// Simple names the binder template refers to. A data type reusing one would
/// shadow it inside the host.
pub const BINDER_TYPE_NAMES: &[&str] = &[
    "ItemViewBinder",
    "ViewHolder",
    "RecyclerView",
    "LayoutInflater",
    "ViewGroup",
    "View",
    "NonNull",
    "Override",
    "R",
];

/// Parameters declared alongside `MTI_NAME` in `onBindViewHolder`
pub const BINDER_PARAMETER_NAMES: &[&str] = &["holder"];

/// The placeholders a template may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    /// Name of the generated binder class
    Name,
    /// The data type, UpperCamel
    MtiClass,
    /// The data type, lower_underscore (layout resource name)
    MtiLowerName,
    /// The data type, lowerCamel (parameter name)
    MtiName,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::Name,
        Placeholder::MtiClass,
        Placeholder::MtiLowerName,
        Placeholder::MtiName,
    ];

    /// Literal text of the placeholder inside a template
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::Name => "${NAME}",
            Placeholder::MtiClass => "MTI_CLASS",
            Placeholder::MtiLowerName => "MTI_LOWER_NAME",
            Placeholder::MtiName => "MTI_NAME",
        }
    }
}

/// Values for the placeholders of one render call
pub type Bindings = BTreeMap<Placeholder, String>;

/// A template with its declared placeholder tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeTemplate<'a> {
    text: &'a str,
}

impl<'a> CodeTemplate<'a> {
    pub const fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// The built-in binder skeleton
    pub const fn binder() -> CodeTemplate<'static> {
        CodeTemplate::new(BINDER_TEMPLATE)
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Placeholders occurring in the template text
    pub fn placeholders(&self) -> Vec<Placeholder> {
        Placeholder::ALL
            .into_iter()
            .filter(|p| self.text.contains(p.token()))
            .collect()
    }

    pub fn render(&self, bindings: &Bindings) -> Result<String, TemplateError> {
        render(self.text, bindings)
    }
}

/// Substitute every placeholder of `template` with its binding.
///
/// Substitution is a single left-to-right pass; substituted values are never
/// scanned again.
pub fn render(template: &str, bindings: &Bindings) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while !rest.is_empty() {
        if let Some(placeholder) = longest_match(rest) {
            let value = bindings
                .get(&placeholder)
                .ok_or_else(|| TemplateError::Unbound(placeholder.token().to_string()))?;
            output.push_str(value);
            rest = &rest[placeholder.token().len()..];
            continue;
        }

        if let Some(unknown) = unknown_placeholder(rest) {
            return Err(TemplateError::Unknown(unknown.to_string()));
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            output.push(c);
        }
        rest = chars.as_str();
    }

    Ok(output)
}

/// Bindings for the binder template, derived from the data type name
pub fn binder_bindings(type_name: &Identifier) -> Result<Bindings, InvalidIdentifier> {
    let mut bindings = Bindings::new();
    bindings.insert(Placeholder::Name, type_name.with_suffix(BINDER_SUFFIX));
    bindings.insert(Placeholder::MtiClass, type_name.to_string());
    bindings.insert(
        Placeholder::MtiLowerName,
        type_name.to_style(CaseStyle::LowerUnderscore)?,
    );
    bindings.insert(Placeholder::MtiName, type_name.to_style(CaseStyle::LowerCamel)?);
    Ok(bindings)
}

fn longest_match(text: &str) -> Option<Placeholder> {
    Placeholder::ALL
        .into_iter()
        .filter(|p| text.starts_with(p.token()))
        .max_by_key(|p| p.token().len())
}

/// A `${...}` or `MTI_...` token at the start of `text` that is not a known placeholder
fn unknown_placeholder(text: &str) -> Option<&str> {
    if let Some(inner) = text.strip_prefix("${") {
        let end = inner.find('}').map(|i| i + 3).unwrap_or(text.len());
        return Some(&text[..end]);
    }

    if text.starts_with("MTI_") {
        let end = text
            .find(|c: char| !(c.is_ascii_uppercase() || c == '_'))
            .unwrap_or(text.len());
        return Some(&text[..end]);
    }

    None
}
