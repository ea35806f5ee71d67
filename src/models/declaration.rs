use std::fmt;
use std::ops::Range;

/// What a member declaration declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Class,
    Interface,
    Enum,
    Record,
    AnnotationType,
    Method,
    Constructor,
    Field,
    Initializer,
}

impl DeclarationKind {
    /// Whether this declaration has a body of members
    pub fn is_type(self) -> bool {
        matches!(
            self,
            DeclarationKind::Class
                | DeclarationKind::Interface
                | DeclarationKind::Enum
                | DeclarationKind::Record
                | DeclarationKind::AnnotationType
        )
    }
}

/// Java modifiers, in the canonical order they are printed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Static,
    Final,
    Sealed,
    NonSealed,
    Transient,
    Volatile,
    Synchronized,
    Native,
    Strictfp,
    Default,
}

impl Modifier {
    /// Parse a modifier keyword (`non-sealed` is handled by the parser)
    pub fn from_keyword(word: &str) -> Option<Self> {
        let modifier = match word {
            "public" => Modifier::Public,
            "protected" => Modifier::Protected,
            "private" => Modifier::Private,
            "abstract" => Modifier::Abstract,
            "static" => Modifier::Static,
            "final" => Modifier::Final,
            "sealed" => Modifier::Sealed,
            "transient" => Modifier::Transient,
            "volatile" => Modifier::Volatile,
            "synchronized" => Modifier::Synchronized,
            "native" => Modifier::Native,
            "strictfp" => Modifier::Strictfp,
            "default" => Modifier::Default,
            _ => return None,
        };
        Some(modifier)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Abstract => "abstract",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Sealed => "sealed",
            Modifier::NonSealed => "non-sealed",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Synchronized => "synchronized",
            Modifier::Native => "native",
            Modifier::Strictfp => "strictfp",
            Modifier::Default => "default",
        }
    }

    fn is_access(self) -> bool {
        matches!(self, Modifier::Public | Modifier::Protected | Modifier::Private)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a declaration node came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Parsed out of the text it still lives in; spans are valid for that text.
    Parsed,
    /// Appended by the generator; printed from its own source text.
    Synthesized,
}

/// One member declaration and, for types, its nested members
#[derive(Debug, Clone)]
pub struct DeclarationNode {
    pub kind: DeclarationKind,
    pub name: Option<String>,
    /// Annotation texts, e.g. `@NonNull`, in source order
    pub annotations: Vec<String>,
    pub modifiers: Vec<Modifier>,
    pub members: Vec<DeclarationNode>,
    /// Verbatim text of the whole declaration
    source: String,
    /// Text following the modifiers, from the first token of the declaration proper
    signature: String,
    /// Byte range of the declaration in the parsed text
    pub(crate) span: Range<usize>,
    /// Byte range of `{ ... }` in the parsed text, braces included
    pub(crate) body: Option<Range<usize>>,
    pub(crate) origin: Origin,
}

impl DeclarationNode {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn parsed(
        kind: DeclarationKind,
        name: Option<String>,
        annotations: Vec<String>,
        modifiers: Vec<Modifier>,
        members: Vec<DeclarationNode>,
        source: String,
        signature: String,
        span: Range<usize>,
        body: Option<Range<usize>>,
    ) -> Self {
        Self {
            kind,
            name,
            annotations,
            modifiers,
            members,
            source,
            signature,
            span,
            body,
            origin: Origin::Parsed,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Source text of the declaration
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_type(&self) -> bool {
        self.kind.is_type()
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Turn a modifier on or off and rewrite the declaration text accordingly.
    ///
    /// Enabling an access modifier removes any other access modifier.
    pub fn set_modifier(&mut self, modifier: Modifier, enabled: bool) {
        if enabled {
            if modifier.is_access() {
                self.modifiers.retain(|m| !m.is_access());
            }
            if !self.modifiers.contains(&modifier) {
                self.modifiers.push(modifier);
            }
        } else {
            self.modifiers.retain(|m| *m != modifier);
        }
        self.modifiers.sort();
        self.rebuild_source();
    }

    /// Names of the nested type declarations
    pub fn member_type_names(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .filter(|m| m.is_type())
            .filter_map(|m| m.name())
    }

    /// Nested member with the given name
    pub fn find_member(&self, name: &str) -> Option<&DeclarationNode> {
        self.members.iter().find(|m| m.name() == Some(name))
    }

    pub(crate) fn find_member_mut(&mut self, name: &str) -> Option<&mut DeclarationNode> {
        self.members
            .iter_mut()
            .find(|m| m.is_type() && m.name() == Some(name))
    }

    fn rebuild_source(&mut self) {
        let mut source = String::new();
        for annotation in &self.annotations {
            source.push_str(annotation);
            source.push('\n');
        }
        for modifier in &self.modifiers {
            source.push_str(modifier.as_str());
            source.push(' ');
        }
        source.push_str(&self.signature);
        self.source = source;
    }
}

/// A syntax-tree node that generated members can be appended to
pub trait HostNode {
    /// Simple name of the host type
    fn name(&self) -> &str;

    /// Current members, in declaration order
    fn members(&self) -> &[DeclarationNode];

    /// Append a member as the last one
    fn append_member(&mut self, member: DeclarationNode);

    /// Whether `private static class` members are legal in this host
    fn accepts_private_classes(&self) -> bool {
        true
    }
}

impl HostNode for DeclarationNode {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    fn members(&self) -> &[DeclarationNode] {
        &self.members
    }

    fn append_member(&mut self, mut member: DeclarationNode) {
        member.origin = Origin::Synthesized;
        self.members.push(member);
    }

    /// Interface and annotation members are implicitly public
    fn accepts_private_classes(&self) -> bool {
        !matches!(self.kind, DeclarationKind::Interface | DeclarationKind::AnnotationType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_node(name: &str, modifiers: Vec<Modifier>) -> DeclarationNode {
        let signature = format!("class {} {{\n}}", name);
        let mut node = DeclarationNode::parsed(
            DeclarationKind::Class,
            Some(name.to_string()),
            Vec::new(),
            modifiers,
            Vec::new(),
            signature.clone(),
            signature.clone(),
            0..signature.len(),
            Some(signature.len() - 3..signature.len()),
        );
        node.rebuild_source();
        node
    }

    #[test]
    fn test_set_modifier_canonical_order() {
        let mut node = class_node("Foo", vec![Modifier::Public]);
        node.set_modifier(Modifier::Static, true);
        node.set_modifier(Modifier::Private, true);

        assert_eq!(node.modifiers, vec![Modifier::Private, Modifier::Static]);
        assert_eq!(node.source(), "private static class Foo {\n}");
    }

    #[test]
    fn test_unset_modifier() {
        let mut node = class_node("Foo", vec![Modifier::Final, Modifier::Static]);
        node.set_modifier(Modifier::Final, false);
        assert!(!node.has_modifier(Modifier::Final));
        assert_eq!(node.source(), "static class Foo {\n}");
    }

    #[test]
    fn test_append_member_marks_synthesized() {
        let mut host = class_node("Host", vec![]);
        host.append_member(class_node("Foo", vec![]));

        assert_eq!(HostNode::name(&host), "Host");
        assert_eq!(host.members().len(), 1);
        assert_eq!(host.members()[0].origin(), Origin::Synthesized);
        assert_eq!(host.member_type_names().collect::<Vec<_>>(), vec!["Foo"]);
    }
}
