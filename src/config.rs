use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::generator::{DuplicatePolicy, NormalizeOptions};
use crate::generator::normalizer::known_imports;
use crate::known_types::AndroidFlavor;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub imports: ImportsConfig,
    #[serde(default)]
    pub format: FormatConfig,
}

/// Input configuration - where to look for host classes given by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory to scan for Java files, `app/src/main/java` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,
    /// Directories or files to exclude from scanning
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source_dir: None,
            exclude: vec!["build".to_string(), "generated".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerationConfig {
    /// What to do when the host already has a member with a generated name
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
}

/// Import handling after generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportsConfig {
    /// Which Android support library the project uses
    #[serde(default)]
    pub flavor: AndroidFlavor,
    /// Drop unused imports
    #[serde(default = "enabled")]
    pub organize: bool,
    /// Replace fully-qualified names in the host with imports
    #[serde(default = "enabled")]
    pub shorten_references: bool,
    /// Import the types the generated code refers to
    #[serde(default = "enabled")]
    pub add_missing: bool,
    /// Extra or overriding simple name -> fully-qualified name entries
    #[serde(default)]
    pub known: BTreeMap<String, String>,
}

impl Default for ImportsConfig {
    fn default() -> Self {
        Self {
            flavor: AndroidFlavor::default(),
            organize: true,
            shorten_references: true,
            add_missing: true,
            known: BTreeMap::new(),
        }
    }
}

/// Re-indentation of the host class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
    #[serde(default = "default_continuation_indent")]
    pub continuation_indent: usize,
    #[serde(default = "default_max_blank_lines")]
    pub max_blank_lines: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            indent_width: default_indent_width(),
            continuation_indent: default_continuation_indent(),
            max_blank_lines: default_max_blank_lines(),
        }
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("app/src/main/java")
}

impl InputConfig {
    /// The configured source directory, or the Android default
    pub fn source_dir(&self) -> PathBuf {
        self.source_dir.clone().unwrap_or_else(default_source_dir)
    }
}

fn enabled() -> bool {
    true
}

fn default_indent_width() -> usize {
    4
}

fn default_continuation_indent() -> usize {
    8
}

fn default_max_blank_lines() -> usize {
    1
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default_config())
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if let Some(source_dir) = &self.input.source_dir {
            if !source_dir.exists() {
                anyhow::bail!("Source directory does not exist: {}", source_dir.display());
            }
        }

        if self.format.indent_width == 0 {
            anyhow::bail!("format.indent_width must be at least 1");
        }

        Ok(())
    }

    /// Generate a default configuration
    pub fn default_config() -> Self {
        Config::default()
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Options for the post-generation normalizer
    pub fn normalize_options(&self) -> NormalizeOptions {
        let mut known = known_imports(self.imports.flavor);
        known.extend(self.imports.known.clone());

        NormalizeOptions {
            shorten_references: self.imports.shorten_references,
            add_missing_imports: self.imports.add_missing,
            organize_imports: self.imports.organize,
            reformat: self.format.enabled,
            indent_width: self.format.indent_width,
            continuation_indent: self.format.continuation_indent,
            max_blank_lines: self.format.max_blank_lines,
            known_imports: known,
        }
    }
}
