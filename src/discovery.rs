//! # Model Discovery
//!
//! Finds model files and reads their class identity by scanning the source
//! text for `namespace` and `class` declarations. No PHP is executed.
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use fs_err as fs;
use lazy_static::lazy_static;
use regex::Regex;
use walkdir::{DirEntry, WalkDir};

use crate::{resolver::normalize, Error, Result};

lazy_static! {
    static ref NAMESPACE: Regex = Regex::new(r"^namespace\s+([^;\s]+)\s*;").unwrap();
    static ref CLASS: Regex =
        Regex::new(r"^(?:final\s+|readonly\s+)*class\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();
    static ref ABSTRACT_CLASS: Regex =
        Regex::new(r"^(?:readonly\s+)?abstract\s+(?:readonly\s+)?class\s+[A-Za-z_]").unwrap();
    static ref EXTENDS: Regex = Regex::new(
        r"^(?:final\s+|readonly\s+)*class\s+[A-Za-z_][A-Za-z0-9_]*\s+extends\s+\\?([A-Za-z0-9_\\]+)"
    )
    .unwrap();
}

/// Folders never searched when discovering model folders.
const SKIPPED_FOLDERS: &[&str] = &["vendor", "node_modules", "storage"];

/// Identity of one model class, read from its source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Namespace of the class, empty for the global namespace
    pub namespace: String,
    pub class_name: String,
    pub source_file: PathBuf,
    /// Folder holding `source_file`, the start of output path resolution
    pub source_dir: PathBuf,
}

impl ModelDescriptor {
    /// Fully qualified class name, e.g. `App\Models\User`.
    #[must_use]
    pub fn fqcn(&self) -> String {
        if self.namespace.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}\\{}", self.namespace, self.class_name)
        }
    }

    /// Read a model file.
    ///
    /// Returns `Ok(None)` for abstract classes, which are never seeded.
    ///
    /// # Errors
    ///
    /// When the file cannot be read or declares no class
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        let content = fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Scan `content` line by line for the namespace and class declarations.
    ///
    /// # Errors
    ///
    /// When the content declares no class
    pub fn parse(path: &Path, content: &str) -> Result<Option<Self>> {
        let mut namespace = None;
        let mut class_name = None;

        for line in content.lines() {
            if let Some(captures) = NAMESPACE.captures(line) {
                namespace = Some(captures[1].to_string());
            } else if ABSTRACT_CLASS.is_match(line) {
                tracing::debug!(path = %path.display(), "skipping abstract class");
                return Ok(None);
            } else if let Some(captures) = CLASS.captures(line) {
                class_name = Some(captures[1].to_string());
            }
        }

        let class_name = class_name.ok_or_else(|| Error::InvalidModel(path.to_path_buf()))?;
        let source_dir = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::InvalidModel(path.to_path_buf()))?;

        Ok(Some(Self {
            namespace: namespace.unwrap_or_default(),
            class_name,
            source_file: path.to_path_buf(),
            source_dir,
        }))
    }
}

fn is_php_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "php")
}

fn is_skipped_folder(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || SKIPPED_FOLDERS.contains(&name))
}

/// All PHP files below `dir`, sorted by path.
///
/// # Errors
///
/// When the folder cannot be walked
pub fn model_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if is_php_file(&entry) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Find the folders, relative to `root`, holding classes that extend one of
/// `base_classes`.
///
/// # Errors
///
/// When the project cannot be walked or a PHP file cannot be read
pub fn discover_model_dirs(root: &Path, base_classes: &[String]) -> Result<Vec<PathBuf>> {
    let mut dirs = BTreeSet::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_folder(entry));

    for entry in walker {
        let entry = entry?;
        if !is_php_file(&entry) {
            continue;
        }
        let content = fs::read_to_string(entry.path())?;
        let extends_model = content.lines().any(|line| {
            EXTENDS.captures(line).is_some_and(|captures| {
                let parent = captures[1].rsplit('\\').next().unwrap_or_default();
                base_classes.iter().any(|base| base == parent)
            })
        });
        if extends_model {
            if let Some(dir) = entry.path().parent() {
                let relative = dir.strip_prefix(root).unwrap_or(dir);
                tracing::debug!(dir = %relative.display(), "discovered model folder");
                dirs.insert(relative.to_path_buf());
            }
        }
    }

    Ok(dirs.into_iter().collect())
}

/// Where model files are searched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePaths {
    /// Folders relative to the project root
    Configured(Vec<PathBuf>),
    /// Discover folders holding model classes across the project
    Auto,
}

/// Read every model below the configured folders, keeping only the classes
/// named in `only` when it is not empty.
///
/// Folders are walked recursively, so a file below two of them (a model
/// folder and its sub folder) is read once.
///
/// # Errors
///
/// When a folder cannot be walked or a file is not a valid model
pub fn extract_models(
    root: &Path,
    source: &SourcePaths,
    base_classes: &[String],
    only: &[String],
) -> Result<Vec<ModelDescriptor>> {
    let paths = match source {
        SourcePaths::Configured(paths) => paths.clone(),
        SourcePaths::Auto => discover_model_dirs(root, base_classes)?,
    };

    let mut seen = BTreeSet::new();
    let mut models = vec![];
    for path in paths {
        let dir = normalize(&root.join(path));
        for file in model_files(&dir)? {
            if !seen.insert(file.clone()) {
                tracing::debug!(path = %file.display(), "model file already read");
                continue;
            }
            if let Some(model) = ModelDescriptor::from_file(&file)? {
                models.push(model);
            }
        }
    }

    if !only.is_empty() {
        models.retain(|model| only.iter().any(|name| *name == model.class_name));
    }

    Ok(models)
}
