use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::parser::JavaFile;

/// Scanner for finding Java source files in a directory
pub struct Scanner {
    /// Root directory to scan
    source_dir: PathBuf,
    /// Directory or file names to exclude
    exclude_patterns: Vec<String>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(source_dir: PathBuf, exclude_patterns: Vec<String>) -> Self {
        Scanner {
            source_dir,
            exclude_patterns,
        }
    }

    /// Scan for all Java source files
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let mut java_files = Vec::new();

        for entry in WalkDir::new(&self.source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e.path()))
        {
            let entry =
                entry.with_context(|| format!("Failed to scan {}", self.source_dir.display()))?;
            let path = entry.path();

            if path.is_file() && self.is_java_file(path) {
                java_files.push(path.to_path_buf());
            }
        }

        Ok(java_files)
    }

    /// Files declaring a class with the given simple name.
    ///
    /// Files named after the class win; other files are only parsed when no
    /// file carries the name.
    pub fn find_class(&self, class_name: &str) -> Result<Vec<PathBuf>> {
        let files = self.scan()?;

        let named: Vec<PathBuf> = files
            .iter()
            .filter(|p| p.file_stem().is_some_and(|stem| stem == class_name))
            .cloned()
            .collect();
        if !named.is_empty() {
            return Ok(named);
        }

        let mut declaring = Vec::new();
        for path in files {
            let source = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            match JavaFile::parse(&source) {
                Ok(file) if file.declared_type_names().contains(class_name) => declaring.push(path),
                Ok(_) => {}
                Err(err) => {
                    debug!(file = %path.display(), error = %err, "skipping unparsable file")
                }
            }
        }

        Ok(declaring)
    }

    /// Check if a path is a Java source file
    fn is_java_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext == "java")
            .unwrap_or(false)
    }

    /// Check if any component below the source directory matches an exclude pattern
    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.source_dir).unwrap_or(path);

        relative.components().any(|component| {
            let name = component.as_os_str().to_string_lossy();
            self.exclude_patterns.iter().any(|pattern| name == pattern.as_str())
        })
    }
}
