//! Manifest loading, source resolution and name-keyed merging.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use super::model::{Function, Module, kind, scalar_string};
use crate::error::{Result, ShellgenError};
use crate::logging::Log;

/// Directory under the source root holding the manifest and config file.
pub const MANIFEST_DIR: &str = ".shellgen";

/// Conventional manifest filename looked up inside a source directory.
pub const MANIFEST_FILENAME: &str = "shell.yaml";

/// A manifest document with items kept as raw YAML until validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub functions: Vec<Value>,
    pub modules: Vec<Value>,
}

impl Manifest {
    /// Parse a manifest from YAML text. `path` is used for error context only.
    ///
    /// An empty document yields an empty manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ShellgenError::Parse`] for invalid YAML and
    /// [`ShellgenError::InvalidManifest`] when the top level or either list
    /// has the wrong shape.
    pub fn from_yaml_str(text: &str, path: &Path) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let root: Value = serde_yaml::from_str(text).map_err(|source| ShellgenError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let map = match root {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(map) => map,
            other => {
                return Err(ShellgenError::InvalidManifest {
                    path: path.to_path_buf(),
                    message: format!("top level must be a mapping, found {}", kind(&other)),
                });
            }
        };

        let list = |key: &str| -> Result<Vec<Value>> {
            match map.get(key) {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(Value::Sequence(items)) => Ok(items.clone()),
                Some(other) => Err(ShellgenError::InvalidManifest {
                    path: path.to_path_buf(),
                    message: format!("'{key}' must be a list, found {}", kind(other)),
                }),
            }
        };

        Ok(Self {
            functions: list("functions")?,
            modules: list("modules")?,
        })
    }

    /// Total number of functions and modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len() + self.modules.len()
    }

    /// Returns `true` if the manifest declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.modules.is_empty()
    }

    /// Convert every function item to its typed form.
    ///
    /// # Errors
    ///
    /// Returns the first item that fails conversion.
    pub fn typed_functions(&self) -> Result<Vec<Function>> {
        self.functions.iter().map(Function::from_value).collect()
    }

    /// Convert every module item to its typed form.
    ///
    /// # Errors
    ///
    /// Returns the first item that fails conversion.
    pub fn typed_modules(&self) -> Result<Vec<Module>> {
        self.modules.iter().map(Module::from_value).collect()
    }
}

/// Load one manifest file. A missing file yields an empty manifest.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Ok(Manifest::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ShellgenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Manifest::from_yaml_str(&text, path)
}

/// Merge `extra` into `base`, keyed by item `name`.
///
/// For each list, a later item replaces an earlier one with the same name
/// in the earlier item's position. Items without a usable name are kept in
/// place so validation can report them.
#[must_use]
pub fn merge_manifests(base: Manifest, extra: Manifest) -> Manifest {
    Manifest {
        functions: merge_items(base.functions, extra.functions),
        modules: merge_items(base.modules, extra.modules),
    }
}

fn merge_items(base: Vec<Value>, extra: Vec<Value>) -> Vec<Value> {
    let mut merged: Vec<Value> = Vec::with_capacity(base.len() + extra.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for item in base.into_iter().chain(extra) {
        let Some(name) = item.get("name").and_then(scalar_string) else {
            merged.push(item);
            continue;
        };
        if let Some(slot) = positions.get(&name).and_then(|&i| merged.get_mut(i)) {
            *slot = item;
        } else {
            positions.insert(name, merged.len());
            merged.push(item);
        }
    }
    merged
}

/// Resolve source arguments to manifest files, in order.
///
/// A file is taken as-is; a directory contributes its [`MANIFEST_FILENAME`]
/// when present. Anything else is skipped with a warning.
#[must_use]
pub fn resolve_sources(paths: &[PathBuf], log: &dyn Log) -> Vec<PathBuf> {
    let mut resolved = Vec::with_capacity(paths.len());
    for path in paths {
        if path.is_file() {
            resolved.push(path.clone());
        } else if path.is_dir() {
            let candidate = path.join(MANIFEST_FILENAME);
            if candidate.is_file() {
                resolved.push(candidate);
            } else {
                log.warn(&format!(
                    "no {MANIFEST_FILENAME} in {}, skipping",
                    path.display()
                ));
            }
        } else {
            log.warn(&format!("source not found: {}, skipping", path.display()));
        }
    }
    resolved
}

/// Load and merge every resolved source strictly left to right.
///
/// # Errors
///
/// Returns the first load error encountered.
pub fn load_sources(paths: &[PathBuf], log: &dyn Log) -> Result<Manifest> {
    let mut merged = Manifest::default();
    for path in paths {
        let manifest = load_manifest(path)?;
        log.debug(&format!(
            "{}: {} function(s), {} module(s)",
            path.display(),
            manifest.functions.len(),
            manifest.modules.len()
        ));
        merged = merge_manifests(merged, manifest);
    }
    Ok(merged)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    fn parse(text: &str) -> Manifest {
        Manifest::from_yaml_str(text, Path::new("test.yaml")).unwrap()
    }

    fn names(items: &[Value]) -> Vec<String> {
        items
            .iter()
            .map(|i| i.get("name").and_then(Value::as_str).unwrap().to_string())
            .collect()
    }

    #[test]
    fn empty_document_is_empty_manifest() {
        assert!(parse("").is_empty());
        assert!(parse("# just a comment\n").is_empty());
        assert!(parse("functions:\nmodules:\n").is_empty());
    }

    #[test]
    fn non_mapping_root_is_rejected() {
        let err = Manifest::from_yaml_str("- a\n- b\n", Path::new("x.yaml")).unwrap_err();
        assert!(matches!(err, ShellgenError::InvalidManifest { .. }));
        assert!(err.to_string().contains("top level must be a mapping"));
    }

    #[test]
    fn non_list_section_is_rejected() {
        let err = Manifest::from_yaml_str("modules: {a: 1}\n", Path::new("x.yaml")).unwrap_err();
        assert!(err.to_string().contains("'modules' must be a list"));
    }

    #[test]
    fn invalid_yaml_reports_path() {
        let err = Manifest::from_yaml_str("modules: [\n", Path::new("broken.yaml")).unwrap_err();
        assert!(matches!(err, ShellgenError::Parse { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = load_manifest(&dir.path().join("absent.yaml")).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn merge_keeps_first_position_and_last_value() {
        let base = parse(
            "modules:\n\
             - {name: m1, prefix: '00', description: a, paths: [/a]}\n\
             - {name: m2, prefix: '10', description: b, paths: [/c]}\n",
        );
        let extra = parse(
            "modules:\n\
             - {name: m3, prefix: '20', description: c, paths: [/d]}\n\
             - {name: m1, prefix: '01', description: a, paths: [/b]}\n",
        );
        let merged = merge_manifests(base, extra);
        assert_eq!(names(&merged.modules), vec!["m1", "m2", "m3"]);
        let m1 = &merged.modules[0];
        assert_eq!(m1.get("prefix").and_then(Value::as_str), Some("01"));
        assert_eq!(m1["paths"][0].as_str(), Some("/b"));
    }

    #[test]
    fn merge_collapses_duplicates_within_one_source() {
        let base = parse(
            "functions:\n\
             - {name: f, description: one, predicate: os_is_linux}\n\
             - {name: f, description: two, predicate: os_is_darwin}\n",
        );
        let merged = merge_manifests(base, Manifest::default());
        assert_eq!(merged.functions.len(), 1);
        assert_eq!(merged.functions[0]["description"].as_str(), Some("two"));
    }

    #[test]
    fn merge_keeps_nameless_items() {
        let base = parse("modules:\n- {prefix: '00', description: x}\n");
        let merged = merge_manifests(base.clone(), base);
        assert_eq!(merged.modules.len(), 2);
    }

    #[test]
    fn resolve_sources_handles_files_dirs_and_missing() {
        let (log, _guard) = isolated_logger();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("extra.yaml");
        fs::write(&file, "modules: []\n").unwrap();
        let with_manifest = dir.path().join("with");
        fs::create_dir(&with_manifest).unwrap();
        fs::write(with_manifest.join(MANIFEST_FILENAME), "").unwrap();
        let without = dir.path().join("without");
        fs::create_dir(&without).unwrap();

        let resolved = resolve_sources(
            &[
                file.clone(),
                without,
                dir.path().join("missing.yaml"),
                with_manifest.clone(),
                file.clone(),
            ],
            &log,
        );
        assert_eq!(
            resolved,
            vec![file.clone(), with_manifest.join(MANIFEST_FILENAME), file]
        );
        assert_eq!(log.warning_count(), 2);
    }

    #[test]
    fn load_sources_merges_left_to_right() {
        let (log, _guard) = isolated_logger();
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.yaml");
        let b = dir.path().join("b.yaml");
        fs::write(
            &a,
            "functions:\n- {name: f, description: base, predicate: os_is_linux}\n",
        )
        .unwrap();
        fs::write(
            &b,
            "functions:\n- {name: f, description: local, predicate: os_is_wsl}\n",
        )
        .unwrap();
        let merged = load_sources(&[a, b], &log).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.functions[0]["description"].as_str(), Some("local"));
    }
}
