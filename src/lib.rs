//! # multitype-codegen
//!
//! A CLI tool and library for generating [MultiType] item view binders into
//! Android Java sources.
//!
//! Given a data type name such as `UserProfile`, it inserts into a host class:
//! - **a data holder**: an empty `private static class UserProfile`.
//! - **a view binder**: `UserProfileViewBinder`, extending
//!   `ItemViewBinder<UserProfile, UserProfileViewBinder.ViewHolder>` and
//!   inflating `R.layout.item_user_profile`.
//!
//! Afterwards the file is tidied: qualified names in the host are shortened,
//! the imports the generated code needs are added, unused imports are
//! dropped and the host class is re-indented.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use multitype_codegen::generator::{Generator, JavaNormalizer};
//! use multitype_codegen::models::GenerationRequest;
//! use multitype_codegen::parser::JavaFile;
//!
//! fn main() -> anyhow::Result<()> {
//!     let source = std::fs::read_to_string("FeedActivity.java")?;
//!     let mut file = JavaFile::parse(&source)?;
//!
//!     let request = GenerationRequest::new("UserProfile", false, "FeedActivity".parse()?);
//!     let report = Generator::new(JavaNormalizer::default()).generate(&mut file, &request)?;
//!
//!     println!("inserted {:?}", report.inserted);
//!     std::fs::write("FeedActivity.java", file.to_source())?;
//!     Ok(())
//! }
//! ```
//!
//! [MultiType]: https://github.com/drakeet/MultiType

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod known_types;
pub mod models;
pub mod naming;
pub mod parser;
pub mod pipeline;
pub mod scanner;
pub mod template;
