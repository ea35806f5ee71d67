//! Integration tests for the full pipeline

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use multitype_codegen::config::Config;
use multitype_codegen::generator::DuplicatePolicy;
use multitype_codegen::known_types::AndroidFlavor;
use multitype_codegen::pipeline::{Job, Location, Pipeline, TargetSelector};

use super::{fixture_path, read_fixture};

/// Copy a fixture into `dir` and return the copy's path
fn copy_fixture(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::copy(fixture_path(name), &path).unwrap();
    path
}

fn job(type_name: &str, location: Location) -> Job {
    Job {
        type_name: type_name.to_string(),
        location,
        target: TargetSelector::Default,
        only_binder: false,
        dry_run: false,
    }
}

#[test]
fn test_generate_into_primary_class() {
    let temp = tempdir().unwrap();
    let path = copy_fixture(temp.path(), "FeedActivity.java");

    let outcome = Pipeline::new(Config::default_config())
        .run(&job("UserProfile", Location::File(path.clone())))
        .unwrap();

    assert!(outcome.written);
    assert_eq!(outcome.target.to_string(), "FeedActivity");
    assert_eq!(outcome.report.inserted, vec!["UserProfile", "UserProfileViewBinder"]);
    assert!(outcome.report.warnings.is_empty(), "{:?}", outcome.report.warnings);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        read_fixture("expected/FeedActivity_UserProfile.java")
    );
}

#[test]
fn test_generate_binder_into_nested_class_with_support_imports() {
    let temp = tempdir().unwrap();
    let path = copy_fixture(temp.path(), "LegacyFeedFragment.java");

    let mut config = Config::default_config();
    config.imports.flavor = AndroidFlavor::Support;

    let mut job = job("Photo", Location::File(path.clone()));
    job.target = TargetSelector::Path("LegacyFeedFragment.Adapter".parse().unwrap());
    job.only_binder = true;

    let outcome = Pipeline::new(config).run(&job).unwrap();

    assert_eq!(outcome.report.inserted, vec!["PhotoViewBinder"]);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        read_fixture("expected/LegacyFeedFragment_Photo.java")
    );
}

#[test]
fn test_dry_run_does_not_write() {
    let temp = tempdir().unwrap();
    let path = copy_fixture(temp.path(), "FeedActivity.java");

    let mut job = job("UserProfile", Location::File(path.clone()));
    job.dry_run = true;

    let outcome = Pipeline::new(Config::default_config()).run(&job).unwrap();

    assert!(!outcome.written);
    assert_eq!(outcome.output, read_fixture("expected/FeedActivity_UserProfile.java"));
    assert_eq!(fs::read_to_string(&path).unwrap(), read_fixture("FeedActivity.java"));
}

#[test]
fn test_failure_leaves_file_byte_identical() {
    let temp = tempdir().unwrap();
    let path = copy_fixture(temp.path(), "FeedActivity.java");
    let pipeline = Pipeline::new(Config::default_config());

    let err = pipeline
        .run(&job("User Profile", Location::File(path.clone())))
        .unwrap_err();
    assert!(err.to_string().contains("InvalidIdentifierError"), "{:#}", err);

    let mut missing = job("UserProfile", Location::File(path.clone()));
    missing.target = TargetSelector::Path("FeedActivity.Adapter".parse().unwrap());
    let err = pipeline.run(&missing).unwrap_err();
    assert!(err.to_string().contains("MissingTargetError"), "{:#}", err);

    assert_eq!(fs::read_to_string(&path).unwrap(), read_fixture("FeedActivity.java"));
}

#[test]
fn test_regeneration_rejects_or_skips_duplicates() {
    let temp = tempdir().unwrap();
    let path = copy_fixture(temp.path(), "FeedActivity.java");
    let request = job("UserProfile", Location::File(path.clone()));

    Pipeline::new(Config::default_config()).run(&request).unwrap();
    let generated = fs::read_to_string(&path).unwrap();

    let err = Pipeline::new(Config::default_config()).run(&request).unwrap_err();
    assert!(err.to_string().contains("DuplicateMemberError"), "{:#}", err);
    assert_eq!(fs::read_to_string(&path).unwrap(), generated);

    let mut config = Config::default_config();
    config.generation.on_duplicate = DuplicatePolicy::Skip;
    let outcome = Pipeline::new(config).run(&request).unwrap();

    assert!(outcome.report.inserted.is_empty());
    assert_eq!(outcome.report.skipped, vec!["UserProfile", "UserProfileViewBinder"]);
    assert!(!outcome.written);
    assert_eq!(fs::read_to_string(&path).unwrap(), generated);
}

#[test]
fn test_locate_file_by_class_name() {
    let temp = tempdir().unwrap();
    let package = temp.path().join("com").join("example").join("screens");
    fs::create_dir_all(&package).unwrap();
    let path = copy_fixture(&package, "Screens.java");
    copy_fixture(temp.path(), "FeedActivity.java");

    let mut config = Config::default_config();
    config.input.source_dir = Some(temp.path().to_path_buf());

    let mut job = job("Comment", Location::Class("Detail".to_string()));
    job.only_binder = true;

    let outcome = Pipeline::new(config).run(&job).unwrap();

    assert_eq!(outcome.path, path);
    assert_eq!(outcome.target.to_string(), "Screens.Detail");

    let written = fs::read_to_string(&path).unwrap();
    assert!(written
        .starts_with("package com.example.screens;\n\nimport android.view.LayoutInflater;\n"));
    assert!(written.contains(
        "\n        private static class CommentViewBinder extends ItemViewBinder<Comment, CommentViewBinder.ViewHolder> {\n"
    ));
    // text block contents are never re-indented
    assert!(written.contains("\n            {not a brace}\n"));
}

#[test]
fn test_target_by_line() {
    let temp = tempdir().unwrap();
    let path = copy_fixture(temp.path(), "Screens.java");

    let mut job = job("Comment", Location::File(path));
    job.target = TargetSelector::Line(16);
    job.dry_run = true;

    let outcome = Pipeline::new(Config::default_config()).run(&job).unwrap();
    assert_eq!(outcome.target.to_string(), "Screens.Detail");

    job.target = TargetSelector::Line(2);
    assert!(Pipeline::new(Config::default_config()).run(&job).is_err());
}

#[test]
fn test_unknown_class_name() {
    let temp = tempdir().unwrap();
    copy_fixture(temp.path(), "FeedActivity.java");

    let mut config = Config::default_config();
    config.input.source_dir = Some(temp.path().to_path_buf());

    let err = Pipeline::new(config)
        .run(&job("Comment", Location::Class("ProfileActivity".to_string())))
        .unwrap_err();
    assert!(err.to_string().contains("ProfileActivity"));
}
