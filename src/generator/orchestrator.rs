use std::fmt;

use tracing::{debug, info, warn};

use crate::error::{GenerationError, InvalidIdentifier, NormalizationWarning};
use crate::known_types;
use crate::models::{Document, GenerationRequest, HostNode, Identifier};
use crate::naming::CaseStyle;
use crate::parser::{FragmentParser, JavaFragmentParser, ParseContext};
use crate::template::{CodeTemplate, BINDER_PARAMETER_NAMES, BINDER_TYPE_NAMES};

use super::inserter::{DuplicatePolicy, Insertion};
use super::normalizer::{Normalize, NormalizeScope};

/// Phases of one generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Validating,
    RenderingHolder,
    RenderingBinder,
    Inserting,
    Normalizing,
    Done,
    Failed,
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a successful request did
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Names of the inserted members, in insertion order
    pub inserted: Vec<String>,
    /// Names that already existed in the host and were left alone
    pub skipped: Vec<String>,
    pub warnings: Vec<NormalizationWarning>,
    /// Every state the request passed through, `Idle` first
    pub states: Vec<GenerationState>,
}

/// Generates a data holder and its view binder into a host class.
///
/// The document is only modified once every generated member has been
/// rendered and parsed; any error before that leaves it untouched.
pub struct Generator<N, P = JavaFragmentParser> {
    parser: P,
    normalizer: N,
    template: CodeTemplate<'static>,
    on_duplicate: DuplicatePolicy,
}

impl<N> Generator<N, JavaFragmentParser> {
    pub fn new(normalizer: N) -> Self {
        Self {
            parser: JavaFragmentParser,
            normalizer,
            template: CodeTemplate::binder(),
            on_duplicate: DuplicatePolicy::default(),
        }
    }
}

impl<N, P: FragmentParser> Generator<N, P> {
    /// Use a different fragment parser
    pub fn with_parser<Q: FragmentParser>(self, parser: Q) -> Generator<N, Q> {
        Generator {
            parser,
            normalizer: self.normalizer,
            template: self.template,
            on_duplicate: self.on_duplicate,
        }
    }

    /// Render binders from `template` instead of the built-in one
    pub fn with_template(mut self, template: CodeTemplate<'static>) -> Self {
        self.template = template;
        self
    }

    pub fn on_duplicate(mut self, policy: DuplicatePolicy) -> Self {
        self.on_duplicate = policy;
        self
    }

    pub fn generate<D>(
        &self,
        document: &mut D,
        request: &GenerationRequest,
    ) -> Result<GenerationReport, GenerationError>
    where
        D: Document,
        N: Normalize<D>,
    {
        let mut states = vec![GenerationState::Idle];
        match self.run(document, request, &mut states) {
            Ok(mut report) => {
                enter(&mut states, GenerationState::Done);
                report.states = states;
                Ok(report)
            }
            Err(err) => {
                enter(&mut states, GenerationState::Failed);
                debug!(kind = err.kind(), error = %err, "generation failed");
                Err(err)
            }
        }
    }

    fn run<D>(
        &self,
        document: &mut D,
        request: &GenerationRequest,
        states: &mut Vec<GenerationState>,
    ) -> Result<GenerationReport, GenerationError>
    where
        D: Document,
        N: Normalize<D>,
    {
        enter(states, GenerationState::Validating);
        let type_name = validate_type_name(&request.type_name)?;
        if request.target.is_empty() {
            return Err(GenerationError::MissingTarget("no target class was given".to_string()));
        }
        let host = document.host_mut(&request.target).ok_or_else(|| {
            GenerationError::MissingTarget(format!("class `{}` not found", request.target))
        })?;
        if !host.accepts_private_classes() {
            return Err(GenerationError::MissingTarget(format!(
                "`{}` cannot declare private nested classes",
                request.target
            )));
        }

        let context = ParseContext::for_target(&request.target);
        let mut insertion = Insertion::new(&self.parser, &*host, context, self.on_duplicate);

        if request.mode.includes_holder() {
            enter(states, GenerationState::RenderingHolder);
            insertion.insert_holder(&type_name)?;
        }

        enter(states, GenerationState::RenderingBinder);
        insertion.insert_binder(&type_name, &self.template)?;

        enter(states, GenerationState::Inserting);
        let committed = insertion.commit(host);
        if !committed.inserted.is_empty() {
            info!(
                host = %request.target,
                members = ?committed.inserted,
                "inserted generated members"
            );
        }

        enter(states, GenerationState::Normalizing);
        let mut warnings = Vec::new();
        if !committed.declarations.is_empty() {
            let scope = NormalizeScope {
                target: request.target.clone(),
                generated: committed.declarations,
            };
            warnings = self.normalizer.normalize(document, &scope).warnings;
            for warning in &warnings {
                warn!(step = %warning.step, "{}", warning);
            }
        }

        Ok(GenerationReport {
            inserted: committed.inserted,
            skipped: committed.skipped,
            warnings,
            states: Vec::new(),
        })
    }
}

fn enter(states: &mut Vec<GenerationState>, state: GenerationState) {
    if let Some(previous) = states.last() {
        debug!(from = %previous, to = %state, "generation state");
    }
    states.push(state);
}

/// The type name also becomes a lowerCamel parameter name in the binder
fn validate_type_name(raw: &str) -> Result<Identifier, InvalidIdentifier> {
    let type_name = Identifier::parse(raw)?;
    if BINDER_TYPE_NAMES.contains(&type_name.as_str()) {
        return Err(InvalidIdentifier::new(
            raw,
            "it would shadow a class the binder refers to",
        ));
    }

    let parameter = type_name.to_style(CaseStyle::LowerCamel)?;
    if known_types::is_reserved_word(&parameter) {
        return Err(InvalidIdentifier::new(
            raw,
            format!("its parameter name `{}` is a reserved word", parameter),
        ));
    }
    if BINDER_PARAMETER_NAMES.contains(&parameter.as_str()) {
        return Err(InvalidIdentifier::new(
            raw,
            format!("its parameter name `{}` clashes with a binder parameter", parameter),
        ));
    }
    Ok(type_name)
}
