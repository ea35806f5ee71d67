//! Integration tests for parsing Java source files

use multitype_codegen::error::ParseError;
use multitype_codegen::models::{DeclarationKind, Modifier};
use multitype_codegen::parser::JavaFile;

use super::read_fixture;

#[test]
fn test_fixtures_print_back_unchanged() {
    for name in ["FeedActivity.java", "LegacyFeedFragment.java", "Screens.java"] {
        let source = read_fixture(name);
        let file = JavaFile::parse(&source).expect("Failed to parse fixture");
        assert_eq!(file.to_source(), source, "{} changed when printed", name);
    }
}

#[test]
fn test_parse_feed_activity() {
    let file = JavaFile::parse(&read_fixture("FeedActivity.java")).unwrap();

    assert_eq!(file.package(), Some("com.example.feed"));
    assert_eq!(file.imports().len(), 6);
    assert_eq!(file.primary_type().unwrap().to_string(), "FeedActivity");

    let activity = &file.types()[0];
    assert_eq!(activity.kind, DeclarationKind::Class);
    assert!(activity.has_modifier(Modifier::Public));

    let members: Vec<_> = activity.members.iter().map(|m| (m.kind, m.name())).collect();
    assert_eq!(
        members,
        vec![
            (DeclarationKind::Field, Some("items")),
            (DeclarationKind::Method, Some("onCreate")),
        ]
    );
    assert_eq!(activity.members[1].annotations, vec!["@Override"]);
}

#[test]
fn test_parse_braces_inside_literals() {
    let file = JavaFile::parse(&read_fixture("Screens.java")).unwrap();

    let kinds: Vec<_> = file.types().iter().map(|t| (t.kind, t.name())).collect();
    assert_eq!(
        kinds,
        vec![
            (DeclarationKind::Class, Some("Screens")),
            (DeclarationKind::AnnotationType, Some("Marker")),
        ]
    );
    // no public type: the first one is primary
    assert_eq!(file.primary_type().unwrap().to_string(), "Screens");

    let detail = file.find_type(&"Screens.Detail".parse().unwrap()).unwrap();
    let members: Vec<_> = detail.members.iter().map(|m| m.name()).collect();
    assert_eq!(members, vec![Some("text"), Some("render")]);

    let kind = file.find_type(&"Screens.Kind".parse().unwrap()).unwrap();
    assert_eq!(kind.kind, DeclarationKind::Enum);
}

#[test]
fn test_type_at_line_in_fixture() {
    let file = JavaFile::parse(&read_fixture("Screens.java")).unwrap();

    assert_eq!(file.type_at_line(6).unwrap().to_string(), "Screens");
    assert_eq!(file.type_at_line(16).unwrap().to_string(), "Screens.Detail");
    assert_eq!(file.type_at_line(23).unwrap().to_string(), "Marker");
    assert!(file.type_at_line(2).is_none());
}

#[test]
fn test_parse_error_location() {
    let err = JavaFile::parse("class A {\n    void m() {\n        call(;\n    }\n}\n").unwrap_err();
    assert_eq!(
        err,
        ParseError::Unbalanced {
            line: 4,
            column: 5,
            delimiter: '}',
        }
    );
}
