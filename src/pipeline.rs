use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cli::GenerateArgs;
use crate::config::Config;
use crate::generator::{GenerationReport, Generator, JavaNormalizer};
use crate::models::{DeclarationNode, GenerationRequest, TypePath};
use crate::parser::JavaFile;
use crate::scanner::Scanner;

/// Where the file to generate into comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    /// The file declaring this class, found under the configured source directory
    Class(String),
}

/// How the host class is chosen inside the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelector {
    Path(TypePath),
    /// Innermost class around a 1-based line
    Line(usize),
    /// The class named by [`Location::Class`], else the file's primary class
    Default,
}

/// One generation run
#[derive(Debug, Clone)]
pub struct Job {
    pub type_name: String,
    pub location: Location,
    pub target: TargetSelector,
    pub only_binder: bool,
    pub dry_run: bool,
}

impl Job {
    pub fn from_args(args: &GenerateArgs) -> Result<Self> {
        let location = match (&args.file, &args.class) {
            (Some(file), _) => Location::File(file.clone()),
            (None, Some(class)) => Location::Class(class.clone()),
            (None, None) => anyhow::bail!("Either --file or --class is required"),
        };

        let target = match (&args.target, args.line) {
            (Some(path), _) => TargetSelector::Path(path.parse().unwrap_or_default()),
            (None, Some(line)) => TargetSelector::Line(line),
            (None, None) => TargetSelector::Default,
        };

        Ok(Self {
            type_name: args.type_name.clone(),
            location,
            target,
            only_binder: args.only_binder,
            dry_run: args.dry_run,
        })
    }
}

/// Result of a run
#[derive(Debug, Clone)]
pub struct Outcome {
    pub path: PathBuf,
    pub target: TypePath,
    pub report: GenerationReport,
    /// The file contents after generation
    pub output: String,
    /// Whether the file on disk was rewritten
    pub written: bool,
}

/// Resolves the file and host class, generates, and writes the result
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self, job: &Job) -> Result<Outcome> {
        let path = self.resolve_file(&job.location)?;
        debug!(file = %path.display(), "resolved file");

        let source = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut file = JavaFile::parse(&source)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let target = resolve_target(&file, job, &path)?;
        debug!(target = %target, "resolved host class");

        let request =
            GenerationRequest::new(job.type_name.as_str(), job.only_binder, target.clone());
        let generator = Generator::new(JavaNormalizer::new(self.config.normalize_options()))
            .on_duplicate(self.config.generation.on_duplicate);

        let report = generator.generate(&mut file, &request).map_err(|err| {
            let kind = err.kind();
            anyhow::Error::new(err).context(format!(
                "{} while generating `{}` into {}",
                kind,
                job.type_name,
                path.display()
            ))
        })?;

        let output = file.to_source();
        let written = !job.dry_run && output != source;
        if written {
            fs::write(&path, &output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(file = %path.display(), "wrote generated members");
        }

        Ok(Outcome {
            path,
            target,
            report,
            output,
            written,
        })
    }

    fn resolve_file(&self, location: &Location) -> Result<PathBuf> {
        let class = match location {
            Location::File(path) => return Ok(path.clone()),
            Location::Class(class) => class,
        };

        let source_dir = self.config.input.source_dir();
        if !source_dir.exists() {
            anyhow::bail!("Source directory does not exist: {}", source_dir.display());
        }
        let scanner = Scanner::new(source_dir.clone(), self.config.input.exclude.clone());
        let mut found = scanner.find_class(class)?;

        match found.len() {
            0 => anyhow::bail!(
                "No Java file under {} declares class {}",
                source_dir.display(),
                class
            ),
            1 => Ok(found.remove(0)),
            _ => anyhow::bail!(
                "Class {} is declared in several files: {}",
                class,
                found
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

fn resolve_target(file: &JavaFile, job: &Job, path: &Path) -> Result<TypePath> {
    match (&job.target, &job.location) {
        (TargetSelector::Path(target), _) => Ok(target.clone()),
        (TargetSelector::Line(line), _) => file
            .type_at_line(*line)
            .with_context(|| format!("No class encloses line {} of {}", line, path.display())),
        (TargetSelector::Default, Location::Class(class)) => class_path(file, class)
            .with_context(|| format!("Class {} not found in {}", class, path.display())),
        (TargetSelector::Default, Location::File(_)) => file
            .primary_type()
            .with_context(|| format!("{} declares no class", path.display())),
    }
}

/// Path from a top-level type to the first type with the given name
fn class_path(file: &JavaFile, name: &str) -> Option<TypePath> {
    fn search(nodes: &[DeclarationNode], name: &str, path: &mut Vec<String>) -> bool {
        for node in nodes.iter().filter(|n| n.is_type()) {
            let Some(node_name) = node.name() else {
                continue;
            };
            path.push(node_name.to_string());
            if node_name == name || search(&node.members, name, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    search(file.types(), name, &mut path).then(|| TypePath::new(path))
}
