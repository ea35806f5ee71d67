//! Integration tests for the generation entry point, against an in-memory host

use std::collections::HashMap;

use multitype_codegen::error::{
    GenerationError, NormalizationWarning, NormalizeStep, ParseError, TemplateError,
};
use multitype_codegen::generator::{
    GenerationState, Generator, Normalize, NormalizeReport, NormalizeScope, NoopNormalizer,
};
use multitype_codegen::models::{
    DeclarationKind, DeclarationNode, Document, GenerationRequest, HostNode, Modifier, TypePath,
};
use multitype_codegen::parser::{FragmentParser, JavaFragmentParser, ParseContext};
use multitype_codegen::template::CodeTemplate;

/// A host that records what was appended to it
struct MemoryHost {
    name: String,
    members: Vec<DeclarationNode>,
    appended: usize,
}

impl HostNode for MemoryHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> &[DeclarationNode] {
        &self.members
    }

    fn append_member(&mut self, member: DeclarationNode) {
        self.appended += 1;
        self.members.push(member);
    }
}

#[derive(Default)]
struct MemoryDocument {
    hosts: HashMap<String, MemoryHost>,
}

impl MemoryDocument {
    fn with_host(name: &str, existing: &[&str]) -> Self {
        let context = ParseContext::for_target(&name.parse().unwrap());
        let members = existing
            .iter()
            .map(|source| JavaFragmentParser.parse_declaration(source, &context).unwrap())
            .collect();

        let mut document = Self::default();
        document.hosts.insert(
            name.to_string(),
            MemoryHost {
                name: name.rsplit('.').next().unwrap().to_string(),
                members,
                appended: 0,
            },
        );
        document
    }

    fn host(&self, name: &str) -> &MemoryHost {
        &self.hosts[name]
    }
}

impl Document for MemoryDocument {
    type Host = MemoryHost;

    fn host_mut(&mut self, target: &TypePath) -> Option<&mut MemoryHost> {
        self.hosts.get_mut(&target.to_string())
    }
}

/// Reports a warning for every step without touching the document
struct FailingNormalizer;

impl Normalize<MemoryDocument> for FailingNormalizer {
    fn normalize(&self, _document: &mut MemoryDocument, scope: &NormalizeScope) -> NormalizeReport {
        NormalizeReport {
            applied: Vec::new(),
            warnings: vec![NormalizationWarning::new(
                NormalizeStep::Reformat,
                format!("formatter unavailable for {}", scope.target),
            )],
        }
    }
}

fn request(type_name: &str, only_binder: bool) -> GenerationRequest {
    GenerationRequest::new(type_name, only_binder, "FeedActivity".parse().unwrap())
}

#[test]
fn test_generates_holder_then_binder() {
    let mut document = MemoryDocument::with_host("FeedActivity", &["private int count;"]);

    let report = Generator::new(NoopNormalizer)
        .generate(&mut document, &request("Foo", false))
        .unwrap();

    assert_eq!(report.inserted, vec!["Foo", "FooViewBinder"]);
    let host = document.host("FeedActivity");
    assert_eq!(host.appended, 2);

    let holder = &host.members[1];
    assert_eq!(holder.kind, DeclarationKind::Class);
    assert_eq!(holder.name(), Some("Foo"));
    assert_eq!(holder.modifiers, vec![Modifier::Private, Modifier::Static]);
    assert!(holder.members.is_empty());

    let binder = &host.members[2];
    assert_eq!(binder.name(), Some("FooViewBinder"));
    assert_eq!(binder.modifiers, vec![Modifier::Private, Modifier::Static]);
}

#[test]
fn test_binder_only() {
    let mut document = MemoryDocument::with_host("FeedActivity", &[]);

    let report = Generator::new(NoopNormalizer)
        .generate(&mut document, &request("Foo", true))
        .unwrap();

    assert_eq!(report.inserted, vec!["FooViewBinder"]);
    assert_eq!(document.host("FeedActivity").appended, 1);
    assert!(!report.states.contains(&GenerationState::RenderingHolder));
}

#[test]
fn test_rendered_binder_for_two_word_name() {
    let mut document = MemoryDocument::with_host("FeedActivity", &[]);

    Generator::new(NoopNormalizer)
        .generate(&mut document, &request("UserProfile", true))
        .unwrap();

    let binder = &document.host("FeedActivity").members[0];
    let source = binder.source();
    assert!(source.starts_with(
        "private static class UserProfileViewBinder extends ItemViewBinder<UserProfile, UserProfileViewBinder.ViewHolder> {"
    ));
    assert!(source.contains("inflater.inflate(R.layout.item_user_profile, parent, false)"));
    let bind = "onBindViewHolder(@NonNull ViewHolder holder, @NonNull UserProfile userProfile)";
    assert!(source.contains(bind));
    assert!(!source.contains("MTI_"));
    assert!(!source.contains("${"));

    let view_holder = binder.find_member("ViewHolder").unwrap();
    assert!(view_holder.has_modifier(Modifier::Static));
}

#[test]
fn test_invalid_names_leave_host_untouched() {
    for name in ["", "User Profile", "1Foo", "Foo-Bar", "class", "Int", "Holder"] {
        let mut document = MemoryDocument::with_host("FeedActivity", &[]);

        let err = Generator::new(NoopNormalizer)
            .generate(&mut document, &request(name, false))
            .unwrap_err();

        assert!(
            matches!(err, GenerationError::InvalidIdentifier(_)),
            "{:?} gave {:?}",
            name,
            err
        );
        assert_eq!(err.kind(), "InvalidIdentifierError");
        assert_eq!(document.host("FeedActivity").appended, 0);
    }
}

#[test]
fn test_corrupted_template_leaves_host_untouched() {
    let mut document = MemoryDocument::with_host("FeedActivity", &[]);
    let generator = Generator::new(NoopNormalizer)
        .with_template(CodeTemplate::new("private static class ${NAME} { void onBind( }"));

    let err = generator.generate(&mut document, &request("Foo", false)).unwrap_err();

    assert!(matches!(err, GenerationError::Parse(ParseError::Unbalanced { .. })));
    assert_eq!(err.kind(), "ParseError");
    // the holder was staged, but nothing reached the host
    assert_eq!(document.host("FeedActivity").appended, 0);
}

#[test]
fn test_unknown_placeholder_is_a_parse_error() {
    let mut document = MemoryDocument::with_host("FeedActivity", &[]);
    let generator = Generator::new(NoopNormalizer)
        .with_template(CodeTemplate::new("private static class ${NAME} { MTI_PLURAL items; }"));

    let err = generator.generate(&mut document, &request("Foo", true)).unwrap_err();

    let GenerationError::Parse(ParseError::Template(TemplateError::Unknown(token))) = &err else {
        panic!("expected an unknown placeholder, got {:?}", err);
    };
    assert_eq!(token, "MTI_PLURAL");
    assert_eq!(document.host("FeedActivity").appended, 0);
}

#[test]
fn test_missing_target() {
    let mut document = MemoryDocument::with_host("FeedActivity", &[]);
    let generator = Generator::new(NoopNormalizer);

    let unknown = GenerationRequest::new("Foo", false, "DetailActivity".parse().unwrap());
    let err = generator.generate(&mut document, &unknown).unwrap_err();
    assert_eq!(err.kind(), "MissingTargetError");

    let empty = GenerationRequest::new("Foo", false, TypePath::default());
    let err = generator.generate(&mut document, &empty).unwrap_err();
    assert_eq!(err.kind(), "MissingTargetError");
}

#[test]
fn test_duplicate_binder_rejects_whole_request() {
    let mut document =
        MemoryDocument::with_host("FeedActivity", &["static class FooViewBinder {}"]);

    let err = Generator::new(NoopNormalizer)
        .generate(&mut document, &request("Foo", false))
        .unwrap_err();

    let GenerationError::DuplicateMember { host, name } = &err else {
        panic!("expected a duplicate member, got {:?}", err);
    };
    assert_eq!((host.as_str(), name.as_str()), ("FeedActivity", "FooViewBinder"));
    assert_eq!(document.host("FeedActivity").appended, 0);
}

#[test]
fn test_normalization_failure_is_only_a_warning() {
    let mut document = MemoryDocument::with_host("FeedActivity", &[]);

    let report = Generator::new(FailingNormalizer)
        .generate(&mut document, &request("Foo", false))
        .unwrap();

    assert_eq!(report.inserted, vec!["Foo", "FooViewBinder"]);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].step, NormalizeStep::Reformat);
    assert_eq!(report.states.last(), Some(&GenerationState::Done));
    assert_eq!(document.host("FeedActivity").appended, 2);
}
