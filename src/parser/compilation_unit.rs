//! Whole-file model: package, imports and type declarations of one `.java`
//! file, plus the printer that splices generated members back into the text.

use std::collections::HashSet;
use std::ops::Range;

use crate::error::ParseError;
use crate::known_types;
use crate::models::{DeclarationKind, DeclarationNode, Document, Modifier, Origin, TypePath};

use super::declaration_parser::{eof, Parser};
use super::lexer::{significant, tokenize, TokenKind};

/// Indentation added per nesting level when splicing generated members
const SPLICE_INDENT: &str = "    ";

/// One `import` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Imported name, e.g. `android.view.View` or `java.util.*`
    pub path: String,
    pub is_static: bool,
    /// Byte range of the statement, `import` through `;`
    pub span: Range<usize>,
}

impl ImportDecl {
    pub fn new(path: impl Into<String>, is_static: bool) -> Self {
        Self {
            path: path.into(),
            is_static,
            span: 0..0,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.path.ends_with(".*")
    }

    /// Last segment of the path (`*` for on-demand imports)
    pub fn simple_name(&self) -> &str {
        known_types::simple_name_of(&self.path)
    }

    /// The statement as it is printed in an import block
    pub fn to_source(&self) -> String {
        if self.is_static {
            format!("import static {};", self.path)
        } else {
            format!("import {};", self.path)
        }
    }
}

/// A parsed Java compilation unit
#[derive(Debug, Clone)]
pub struct JavaFile {
    source: String,
    package: Option<String>,
    /// End offset of the `package` statement
    package_end: Option<usize>,
    imports: Vec<ImportDecl>,
    types: Vec<DeclarationNode>,
}

impl JavaFile {
    /// Parse a compilation unit
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(source)?;
        let tokens = significant(&tokens);
        let mut parser = Parser::new(source, &tokens);

        let (package, package_end) = if parser.at_ident("package") {
            parser.bump();
            let (name, end) = qualified_name(&mut parser, "package name")?;
            (Some(name), Some(end))
        } else {
            (None, None)
        };

        let mut imports = Vec::new();
        while parser.at_ident("import") {
            let start = parser.bump().map(|t| t.offset).unwrap_or_default();
            let is_static = parser.at_ident("static");
            if is_static {
                parser.bump();
            }
            let (path, end) = qualified_name(&mut parser, "imported name")?;
            imports.push(ImportDecl {
                path,
                is_static,
                span: start..end,
            });
        }

        let types = parser.parse_members(false, &mut Vec::new())?;
        if let Some(member) = types.iter().find(|m| !m.is_type()) {
            let tokens = tokenize(source)?;
            let first = tokens
                .iter()
                .find(|t| t.offset == member.span.start)
                .copied()
                .ok_or_else(|| eof("a type declaration"))?;
            return Err(parser.unexpected(&first, "a type declaration"));
        }

        Ok(Self {
            source: source.to_string(),
            package,
            package_end,
            imports,
            types,
        })
    }

    /// Text the file was parsed from
    pub fn original_source(&self) -> &str {
        &self.source
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub(crate) fn package_end(&self) -> Option<usize> {
        self.package_end
    }

    pub fn imports(&self) -> &[ImportDecl] {
        &self.imports
    }

    pub fn types(&self) -> &[DeclarationNode] {
        &self.types
    }

    pub fn find_type(&self, path: &TypePath) -> Option<&DeclarationNode> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = self
            .types
            .iter()
            .find(|t| t.name() == Some(first.as_str()))?;
        for segment in rest {
            node = node
                .members
                .iter()
                .find(|m| m.is_type() && m.name() == Some(segment.as_str()))?;
        }
        Some(node)
    }

    pub fn find_type_mut(&mut self, path: &TypePath) -> Option<&mut DeclarationNode> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = self
            .types
            .iter_mut()
            .find(|t| t.name() == Some(first.as_str()))?;
        for segment in rest {
            node = node.find_member_mut(segment)?;
        }
        Some(node)
    }

    /// The public top-level type, or the first one
    pub fn primary_type(&self) -> Option<TypePath> {
        self.types
            .iter()
            .find(|t| t.has_modifier(Modifier::Public))
            .or_else(|| self.types.first())
            .and_then(|t| t.name())
            .map(|name| TypePath::new(vec![name.to_string()]))
    }

    /// Innermost type declaration overlapping the given 1-based line
    pub fn type_at_line(&self, line: usize) -> Option<TypePath> {
        let range = line_range(&self.source, line)?;
        let mut path = Vec::new();
        let mut candidates = self.types.as_slice();

        while let Some(node) = candidates
            .iter()
            .filter(|m| m.is_type() && m.origin() == Origin::Parsed)
            .find(|m| m.span.start < range.end && m.span.end > range.start)
        {
            path.push(node.name()?.to_string());
            candidates = &node.members;
        }

        if path.is_empty() {
            None
        } else {
            Some(TypePath::new(path))
        }
    }

    /// Simple names of every type declared in the file, at any depth
    pub fn declared_type_names(&self) -> HashSet<String> {
        fn collect(nodes: &[DeclarationNode], names: &mut HashSet<String>) {
            for node in nodes.iter().filter(|n| n.is_type()) {
                if let Some(name) = node.name() {
                    names.insert(name.to_string());
                }
                collect(&node.members, names);
            }
        }

        let mut names = HashSet::new();
        collect(&self.types, &mut names);
        names
    }

    /// Print the file, with synthesized members spliced into their hosts
    pub fn to_source(&self) -> String {
        let mut insertions = Vec::new();
        for node in &self.types {
            collect_insertions(&self.source, node, &mut insertions);
        }

        insertions.sort_by(|a, b| b.0.cmp(&a.0));
        let mut output = self.source.clone();
        for (offset, text) in insertions {
            output.insert_str(offset, &text);
        }
        output
    }
}

impl Document for JavaFile {
    type Host = DeclarationNode;

    fn host_mut(&mut self, target: &TypePath) -> Option<&mut DeclarationNode> {
        self.find_type_mut(target)
    }
}

/// Dotted name up to the terminating `;`; returns the name and the end offset of `;`
fn qualified_name(
    parser: &mut Parser<'_, '_>,
    expected: &str,
) -> Result<(String, usize), ParseError> {
    let mut name = String::new();

    loop {
        let Some(token) = parser.bump() else {
            return Err(eof("`;`"));
        };
        match token.kind {
            TokenKind::Punct if token.text == ";" => {
                if name.is_empty() {
                    return Err(parser.unexpected(&token, expected));
                }
                return Ok((name, token.end()));
            }
            TokenKind::Ident => name.push_str(token.text),
            TokenKind::Punct if token.text == "." || token.text == "*" => name.push_str(token.text),
            _ => return Err(parser.unexpected(&token, expected)),
        }
    }
}

/// Byte range of a 1-based line
fn line_range(source: &str, line: usize) -> Option<Range<usize>> {
    if line == 0 {
        return None;
    }
    let mut start = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            return Some(start..start + text.len());
        }
        start += text.len();
    }
    None
}

/// Leading whitespace of the line containing `offset`
pub(crate) fn indentation_at(source: &str, offset: usize) -> &str {
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &source[line_start..];
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

fn collect_insertions(source: &str, node: &DeclarationNode, out: &mut Vec<(usize, String)>) {
    if node.origin() != Origin::Parsed {
        return;
    }

    if let Some(body) = &node.body {
        let generated: Vec<&DeclarationNode> = node
            .members
            .iter()
            .filter(|m| m.origin() == Origin::Synthesized)
            .collect();
        if !generated.is_empty() {
            out.push(render_insertion(source, node, body, &generated));
            // pushed second so it lands first when both share an offset
            if node.kind == DeclarationKind::Enum {
                if let Some(at) = unterminated_enum_constants(source, body) {
                    out.push((at, ";".to_string()));
                }
            }
        }
    }

    for member in &node.members {
        collect_insertions(source, member, out);
    }
}

/// Where a `;` must go so that members can follow the enum constants, if the
/// body has none at the top level
fn unterminated_enum_constants(source: &str, body: &Range<usize>) -> Option<usize> {
    let inner_start = body.start + 1;
    let tokens = tokenize(&source[inner_start..body.end - 1]).ok()?;
    let tokens = significant(&tokens);

    let mut depth = 0usize;
    for token in &tokens {
        if token.kind != TokenKind::Punct {
            continue;
        }
        match token.text {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            ";" if depth == 0 => return None,
            _ => {}
        }
    }

    Some(inner_start + tokens.last().map(|t| t.end()).unwrap_or(0))
}

fn render_insertion(
    source: &str,
    host: &DeclarationNode,
    body: &Range<usize>,
    members: &[&DeclarationNode],
) -> (usize, String) {
    let close = body.end - 1;
    let host_indent = indentation_at(source, host.span.start);
    let member_indent = format!("{}{}", host_indent, SPLICE_INDENT);

    let close_line_start = source[..close].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let own_line =
        close_line_start > body.start && source[close_line_start..close].trim().is_empty();
    let at = if own_line { close_line_start } else { close };

    let mut text = String::new();
    if !own_line {
        text.push('\n');
    }

    let after_open_brace = source[body.start..at].trim_end().ends_with('{');
    for (i, member) in members.iter().enumerate() {
        if i > 0 || !after_open_brace {
            text.push('\n');
        }
        for line in member.source().lines() {
            if line.trim().is_empty() {
                text.push('\n');
            } else {
                text.push_str(&member_indent);
                text.push_str(line);
                text.push('\n');
            }
        }
    }

    if !own_line {
        text.push_str(host_indent);
    }

    (at, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HostNode;
    use crate::parser::{FragmentParser, JavaFragmentParser, ParseContext};
    use pretty_assertions::assert_eq;

    const ACTIVITY: &str = r#"package com.example.feed;

import android.os.Bundle;
import static java.util.Objects.requireNonNull;
import java.util.*;

/** Shows the feed. */
public class FeedActivity extends Activity {

    private final Items items = new Items();

    @Override
    protected void onCreate(Bundle state) {
        super.onCreate(state);
    }

    static class Adapter {
        void bind() { }
    }
}

class Helper {}
"#;

    fn fragment(source: &str) -> DeclarationNode {
        JavaFragmentParser
            .parse_declaration(source, &ParseContext::top_level())
            .unwrap()
    }

    #[test]
    fn test_parse_file_structure() {
        let file = JavaFile::parse(ACTIVITY).unwrap();

        assert_eq!(file.package(), Some("com.example.feed"));
        assert_eq!(
            file.imports(),
            &[
                ImportDecl {
                    path: "android.os.Bundle".to_string(),
                    is_static: false,
                    span: 27..52,
                },
                ImportDecl {
                    path: "java.util.Objects.requireNonNull".to_string(),
                    is_static: true,
                    span: 53..100,
                },
                ImportDecl {
                    path: "java.util.*".to_string(),
                    is_static: false,
                    span: 101..120,
                },
            ]
        );
        assert!(file.imports()[2].is_wildcard());
        assert_eq!(file.types().len(), 2);
        assert_eq!(file.primary_type().unwrap().to_string(), "FeedActivity");

        let adapter = file.find_type(&"FeedActivity.Adapter".parse().unwrap()).unwrap();
        assert_eq!(adapter.members.len(), 1);
        assert!(file.find_type(&"FeedActivity.Missing".parse().unwrap()).is_none());
    }

    #[test]
    fn test_print_unchanged_file() {
        let file = JavaFile::parse(ACTIVITY).unwrap();
        assert_eq!(file.to_source(), ACTIVITY);
    }

    #[test]
    fn test_type_at_line() {
        let file = JavaFile::parse(ACTIVITY).unwrap();
        assert_eq!(file.type_at_line(12).unwrap().to_string(), "FeedActivity");
        assert_eq!(file.type_at_line(18).unwrap().to_string(), "FeedActivity.Adapter");
        assert_eq!(file.type_at_line(22).unwrap().to_string(), "Helper");
        assert!(file.type_at_line(1).is_none());
        assert!(file.type_at_line(500).is_none());
    }

    #[test]
    fn test_declared_type_names() {
        let file = JavaFile::parse(ACTIVITY).unwrap();
        let names = file.declared_type_names();
        assert!(names.contains("FeedActivity"));
        assert!(names.contains("Adapter"));
        assert!(names.contains("Helper"));
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_splice_into_multiline_body() {
        let mut file = JavaFile::parse("class Host {\n    int x;\n}\n").unwrap();
        let host = file.host_mut(&"Host".parse().unwrap()).unwrap();
        host.append_member(fragment("class Foo {\n}"));
        host.append_member(fragment("class Bar {\n}"));

        assert_eq!(
            file.to_source(),
            "class Host {\n    int x;\n\n    class Foo {\n    }\n\n    class Bar {\n    }\n}\n"
        );
    }

    #[test]
    fn test_splice_into_empty_inline_body() {
        let mut file = JavaFile::parse("class Host {}").unwrap();
        file.host_mut(&"Host".parse().unwrap())
            .unwrap()
            .append_member(fragment("class Foo {\n}"));

        assert_eq!(file.to_source(), "class Host {\n    class Foo {\n    }\n}");
    }

    #[test]
    fn test_splice_into_nested_host() {
        let source = "class Outer {\n    static class Inner {\n    }\n}\n";
        let mut file = JavaFile::parse(source).unwrap();
        file.host_mut(&"Outer.Inner".parse().unwrap())
            .unwrap()
            .append_member(fragment("class Foo {\n\n    int a;\n}"));

        assert_eq!(
            file.to_source(),
            "class Outer {\n    static class Inner {\n        class Foo {\n\n            int a;\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn test_splice_into_enum_terminates_constants() {
        let source = "enum Mode {\n    A(1), B { void x() {} } // last\n}\n";
        let mut file = JavaFile::parse(source).unwrap();
        file.host_mut(&"Mode".parse().unwrap())
            .unwrap()
            .append_member(fragment("class Foo {\n}"));

        let output = file.to_source();
        assert_eq!(
            output,
            "enum Mode {\n    A(1), B { void x() {} }; // last\n\n    class Foo {\n    }\n}\n"
        );
        let reparsed = JavaFile::parse(&output).unwrap();
        assert_eq!(reparsed.types()[0].members.len(), 1);
    }

    #[test]
    fn test_splice_into_enum_with_body_declarations() {
        let source = "enum Mode {\n    A;\n\n    int weight;\n}\n";
        let mut file = JavaFile::parse(source).unwrap();
        file.host_mut(&"Mode".parse().unwrap())
            .unwrap()
            .append_member(fragment("class Foo {\n}"));

        assert_eq!(
            file.to_source(),
            "enum Mode {\n    A;\n\n    int weight;\n\n    class Foo {\n    }\n}\n"
        );
    }

    #[test]
    fn test_splice_into_empty_enum() {
        let mut file = JavaFile::parse("enum Mode {}").unwrap();
        file.host_mut(&"Mode".parse().unwrap())
            .unwrap()
            .append_member(fragment("class Foo {\n}"));

        let output = file.to_source();
        assert_eq!(output, "enum Mode {;\n    class Foo {\n    }\n}");
        assert_eq!(JavaFile::parse(&output).unwrap().types()[0].members.len(), 1);
    }

    #[test]
    fn test_top_level_member_is_rejected() {
        assert!(matches!(
            JavaFile::parse("int x;"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            JavaFile::parse("import ;"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }
}
