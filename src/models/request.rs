use std::fmt;
use std::str::FromStr;

use super::{DeclarationNode, HostNode};

/// Which declarations a request produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// The data holder type followed by its view binder
    HolderAndBinder,
    /// Only the view binder; the data type already exists elsewhere
    BinderOnly,
}

impl GenerationMode {
    pub fn from_only_binder(only_binder: bool) -> Self {
        if only_binder {
            GenerationMode::BinderOnly
        } else {
            GenerationMode::HolderAndBinder
        }
    }

    pub fn includes_holder(self) -> bool {
        matches!(self, GenerationMode::HolderAndBinder)
    }
}

/// Names of the nested types leading to a host class, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypePath(Vec<String>);

impl TypePath {
    pub fn new(segments: Vec<String>) -> Self {
        TypePath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Simple name of the innermost type
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Path of a type nested inside this one
    pub fn child(&self, name: &str) -> TypePath {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        TypePath(segments)
    }
}

impl FromStr for TypePath {
    type Err = std::convert::Infallible;

    /// Parse `Outer.Inner`; empty segments are dropped
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TypePath(
            s.split('.')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// One user action: generate code for `type_name` inside the class at `target`
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Raw type name as typed by the user; validated by the generator
    pub type_name: String,
    pub mode: GenerationMode,
    pub target: TypePath,
}

impl GenerationRequest {
    pub fn new(type_name: impl Into<String>, only_binder: bool, target: TypePath) -> Self {
        Self {
            type_name: type_name.into(),
            mode: GenerationMode::from_only_binder(only_binder),
            target,
        }
    }
}

/// Rendered source text together with the declaration parsed from it
#[derive(Debug, Clone)]
pub struct GeneratedFragment {
    pub source: String,
    pub declaration: DeclarationNode,
}

/// Owner of the host nodes a request can target
pub trait Document {
    type Host: HostNode;

    /// Resolve a nested class path to its node
    fn host_mut(&mut self, target: &TypePath) -> Option<&mut Self::Host>;
}
