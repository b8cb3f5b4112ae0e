//! # Output Path Resolution
//!
//! Locates the seeders folder for a model by walking up from the model's
//! folder until a sibling `database` folder shows up, and derives the PHP
//! namespace of that folder from its path below the project root.
use std::path::{Component, Path, PathBuf};

use fs_err as fs;
use heck::ToKebabCase;

use crate::{Error, Result};

/// Upper bound on ancestor folders searched for a `database` folder.
pub const MAX_ANCESTOR_HOPS: usize = 10;

/// Folders that end namespace derivation.
pub const GROUPING_FOLDERS: &[&str] = &["Models", "Entities"];

const NAMESPACE_SEPARATOR: &str = "\\";

/// Folder seeders are written to, with the namespace they live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputLocation {
    pub directory: PathBuf,
    pub namespace: String,
}

impl ResolvedOutputLocation {
    /// Location of a fixed output folder, created when missing.
    ///
    /// # Errors
    ///
    /// When the folder cannot be created
    pub fn fixed(directory: PathBuf, root: &Path) -> Result<Self> {
        let directory = absolute(&directory)?;
        if !directory.is_dir() {
            fs::create_dir_all(&directory)?;
        }
        let namespace = derive_namespace(&directory, &absolute(root)?);
        Ok(Self {
            directory,
            namespace,
        })
    }

    /// Resolve the seeders folder for models stored in `source_dir`.
    ///
    /// # Errors
    ///
    /// See [`find_output_path`]
    pub fn resolve(source_dir: &Path, root: &Path) -> Result<Self> {
        let found = find_output_path(source_dir)?;
        let namespace = derive_namespace(&found.path, &absolute(root)?);
        Ok(Self {
            directory: found.path,
            namespace,
        })
    }
}

/// Result of [`find_output_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundOutputPath {
    pub path: PathBuf,
    /// Number of ancestor folders listed before the `database` folder was found
    pub attempts: usize,
}

/// Collapse `.` and `..` components of `path` without touching the
/// filesystem. `..` above the root is dropped.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(Component::ParentDir),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

/// `path` made absolute against the working directory, then normalized.
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}

fn is_database_folder(name: &str) -> bool {
    name.to_lowercase().to_kebab_case() == "database"
}

/// `Seeders` next to a capitalized `Database` folder, `seeders` otherwise.
fn seeders_folder_name(anchor: &str) -> &'static str {
    if anchor.chars().next().is_some_and(char::is_uppercase) {
        "Seeders"
    } else {
        "seeders"
    }
}

fn find_database_folder(dir: &Path) -> Result<Option<(PathBuf, String)>> {
    let mut candidates = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_database_folder(name) {
                candidates.push((entry.path(), name.to_string()));
            }
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}

/// Walk up from `start`, listing the sub folders of each ancestor, until one
/// of them is a `database` folder. The seeders folder inside it is created
/// when missing.
///
/// # Errors
///
/// [`Error::OutputPathNotFound`] naming `start` when no `database` folder is
/// found within [`MAX_ANCESTOR_HOPS`] ancestors, or an IO error when a folder
/// cannot be listed or created.
pub fn find_output_path(start: &Path) -> Result<FoundOutputPath> {
    let from = absolute(start)?;
    for (index, parent) in from.ancestors().skip(1).take(MAX_ANCESTOR_HOPS).enumerate() {
        let attempts = index + 1;
        let Some((anchor, name)) = find_database_folder(parent)? else {
            continue;
        };

        let path = anchor.join(seeders_folder_name(&name));
        if !path.is_dir() {
            fs::create_dir(&path)?;
        }
        tracing::debug!(
            start = %start.display(),
            path = %path.display(),
            attempts,
            "resolved output path"
        );
        return Ok(FoundOutputPath { path, attempts });
    }

    Err(Error::OutputPathNotFound(start.to_path_buf()))
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Namespace of `path` following the folder-per-namespace convention.
///
/// Segments below `root` are capitalized and joined with `\`. Segments shorter
/// than three characters are skipped, and derivation stops at the first
/// grouping folder (`Models`, `Entities`).
#[must_use]
pub fn derive_namespace(path: &Path, root: &Path) -> String {
    let path = normalize(path);
    let root = normalize(root);
    let relative = path.strip_prefix(&root).unwrap_or(path.as_path());

    let mut segments = vec![];
    for component in relative.components() {
        let Component::Normal(segment) = component else {
            continue;
        };
        let segment = segment.to_string_lossy();
        if segment.len() < 3 {
            continue;
        }
        if GROUPING_FOLDERS.contains(&segment.as_ref()) {
            break;
        }
        segments.push(capitalize(&segment));
    }

    segments
        .join(NAMESPACE_SEPARATOR)
        .trim_end_matches(NAMESPACE_SEPARATOR)
        .to_string()
}
