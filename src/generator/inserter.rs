//! Staged insertion of generated members into a host class.
//!
//! Members are parsed and checked while being staged; the host is only
//! touched by [`Insertion::commit`], which cannot fail. An insertion that is
//! dropped before commit leaves the host exactly as it was.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GenerationError, ParseError};
use crate::models::{DeclarationNode, GeneratedFragment, HostNode, Identifier, Modifier};
use crate::parser::{FragmentParser, ParseContext};
use crate::template::{self, CodeTemplate};

/// What to do when the host already declares a type with a generated name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail the request
    #[default]
    Reject,
    /// Keep the existing member and generate only what is missing
    Skip,
}

/// Members staged for one host
pub struct Insertion<'p, P> {
    parser: &'p P,
    context: ParseContext,
    host_name: String,
    existing: HashSet<String>,
    policy: DuplicatePolicy,
    staged: Vec<GeneratedFragment>,
    skipped: Vec<String>,
}

/// Outcome of a committed insertion
#[derive(Debug, Clone, Default)]
pub struct CommitSummary {
    /// Names of the appended members, in order
    pub inserted: Vec<String>,
    /// Names left out because the host already had them
    pub skipped: Vec<String>,
    /// The appended declarations
    pub declarations: Vec<DeclarationNode>,
}

impl<'p, P: FragmentParser> Insertion<'p, P> {
    pub fn new<H: HostNode + ?Sized>(
        parser: &'p P,
        host: &H,
        context: ParseContext,
        policy: DuplicatePolicy,
    ) -> Self {
        let existing = host
            .members()
            .iter()
            .filter(|m| m.is_type())
            .filter_map(|m| m.name())
            .map(str::to_string)
            .collect();

        Self {
            parser,
            context,
            host_name: host.name().to_string(),
            existing,
            policy,
            staged: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Stage an empty `private static class <type_name>`
    pub fn insert_holder(
        &mut self,
        type_name: &Identifier,
    ) -> Result<Option<&DeclarationNode>, GenerationError> {
        let source = format!("public class {} {{\n}}", type_name);
        let mut declaration = self.parser.parse_declaration(&source, &self.context)?;
        declaration.set_modifier(Modifier::Private, true);
        declaration.set_modifier(Modifier::Static, true);

        let source = declaration.source().to_string();
        self.stage(GeneratedFragment { source, declaration })
    }

    /// Stage the view binder for `type_name`, rendered from `template`
    pub fn insert_binder(
        &mut self,
        type_name: &Identifier,
        template: &CodeTemplate<'_>,
    ) -> Result<Option<&DeclarationNode>, GenerationError> {
        let bindings = template::binder_bindings(type_name)?;
        let source = template.render(&bindings).map_err(ParseError::from)?;
        let declaration = self.parser.parse_declaration(&source, &self.context)?;

        if !declaration.is_type() {
            return Err(ParseError::NotATypeDeclaration {
                name: declaration.name().unwrap_or("<anonymous>").to_string(),
            }
            .into());
        }

        self.stage(GeneratedFragment { source, declaration })
    }

    pub fn staged(&self) -> &[GeneratedFragment] {
        &self.staged
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Append every staged member to `host`, in staging order
    pub fn commit<H: HostNode + ?Sized>(self, host: &mut H) -> CommitSummary {
        let mut summary = CommitSummary {
            skipped: self.skipped,
            ..Default::default()
        };

        for fragment in self.staged {
            let name = fragment.declaration.name().unwrap_or_default().to_string();
            summary.declarations.push(fragment.declaration.clone());
            host.append_member(fragment.declaration);
            summary.inserted.push(name);
        }

        summary
    }

    fn stage(
        &mut self,
        fragment: GeneratedFragment,
    ) -> Result<Option<&DeclarationNode>, GenerationError> {
        let name = fragment.declaration.name().unwrap_or_default().to_string();
        let taken = self.existing.contains(&name)
            || self
                .staged
                .iter()
                .any(|f| f.declaration.name() == Some(name.as_str()));

        if taken {
            return match self.policy {
                DuplicatePolicy::Reject => Err(GenerationError::DuplicateMember {
                    host: self.host_name.clone(),
                    name,
                }),
                DuplicatePolicy::Skip => {
                    debug!(
                        host = %self.host_name,
                        member = %name,
                        "member already exists, skipping"
                    );
                    self.skipped.push(name);
                    Ok(None)
                }
            };
        }

        debug!(host = %self.host_name, member = %name, "staged member");
        self.staged.push(fragment);
        Ok(self.staged.last().map(|f| &f.declaration))
    }
}
