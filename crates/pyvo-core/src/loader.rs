//! Reads a directory of YAML files into one nested mapping.
//!
//! Directories become mappings keyed by child name (extension stripped) and
//! files become their parsed content, annotated with a `_source` key that
//! holds the path of the file relative to the data root.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::LoadError;

/// The only data format version this crate understands.
pub const SUPPORTED_VERSION: u32 = 2;

/// Key added to every file mapping, holding its path relative to the root.
pub const SOURCE_KEY: &str = "_source";

const HIDDEN_MARKER: char = '.';

/// Contents of the top-level `meta.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Meta {
    pub version: u32,
    #[serde(default)]
    pub ignored_files: Vec<PathBuf>,
}

impl Meta {
    /// Read `meta.yaml` from the data root, rejecting unsupported versions.
    pub fn read(root: &Path) -> Result<Self, LoadError> {
        let path = root.join("meta.yaml");
        let text = read_file(&path)?;
        let meta: Meta =
            serde_yaml::from_str(&text).map_err(|source| LoadError::Yaml { path, source })?;
        if meta.version != SUPPORTED_VERSION {
            return Err(LoadError::UnsupportedVersion(meta.version));
        }
        Ok(meta)
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_files.iter().any(|p| p.as_os_str() == name)
    }
}

/// Load the whole data tree. Fails fast if `meta.yaml` declares a version
/// other than [`SUPPORTED_VERSION`].
pub fn load_tree(root: &Path) -> Result<(Meta, Mapping), LoadError> {
    let meta = Meta::read(root)?;
    let tree = read_directory(root, root, Some(&meta))?;
    tracing::debug!("Read data tree from {}", root.display());
    Ok((meta, tree))
}

/// `meta` is only given at the top level, where `ignored_files` applies.
fn read_directory(dir: &Path, base: &Path, meta: Option<&Meta>) -> Result<Mapping, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(HIDDEN_MARKER) || meta.is_some_and(|m| m.is_ignored(&name)) {
            continue;
        }
        children.push((name, entry.path()));
    }
    // read_dir order is platform dependent
    children.sort();

    let mut result = Mapping::new();
    for (_, path) in children {
        let key = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let node = if path.is_dir() {
            Value::Mapping(read_directory(&path, base, None)?)
        } else {
            Value::Mapping(read_document(&path, base)?)
        };
        result.insert(Value::String(key), node);
    }
    Ok(result)
}

fn read_document(path: &Path, base: &Path) -> Result<Mapping, LoadError> {
    let text = read_file(path)?;
    let value: Value = serde_yaml::from_str(&text).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    let relative = path.strip_prefix(base).unwrap_or(path);
    let Value::Mapping(mut mapping) = value else {
        return Err(LoadError::InvalidField {
            origin: relative.display().to_string(),
            field: "<document>".to_string(),
            expected: "a mapping",
        });
    };
    mapping.insert(
        Value::String(SOURCE_KEY.to_string()),
        Value::String(relative.display().to_string()),
    );
    Ok(mapping)
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::write_tree;
    use tempfile::tempdir;

    #[test]
    fn test_tree_mirrors_directories() {
        let dir = tempdir().unwrap();
        write_tree(
            dir.path(),
            &[
                ("meta.yaml", "version: 2\nignored_files: [README.md]\n"),
                ("README.md", "not: yaml data"),
                ("cities/brno/city.yaml", "name: Brno\n"),
                ("cities/.git/HEAD.yaml", "ref: x\n"),
            ],
        );

        let (meta, tree) = load_tree(dir.path()).unwrap();
        assert_eq!(meta.version, 2);
        assert!(tree.get("README").is_none());

        let city = &tree["cities"]["brno"]["city"];
        assert_eq!(city["name"], Value::from("Brno"));
        assert_eq!(city[SOURCE_KEY], Value::from("cities/brno/city.yaml"));
        assert!(tree["cities"].get(".git").is_none());
    }

    #[test]
    fn test_ignored_files_only_apply_at_top_level() {
        let dir = tempdir().unwrap();
        write_tree(
            dir.path(),
            &[
                ("meta.yaml", "version: 2\nignored_files: [notes.yaml]\n"),
                ("notes.yaml", "a: 1\n"),
                ("cities/notes.yaml", "b: 2\n"),
                ("cities/brno/venues/notes.yaml", "c: 3\n"),
            ],
        );

        let (_, tree) = load_tree(dir.path()).unwrap();
        assert!(tree.get("notes").is_none());
        assert_eq!(tree["cities"]["notes"]["b"], Value::from(2));
        assert_eq!(
            tree["cities"]["brno"]["venues"]["notes"][SOURCE_KEY],
            Value::from("cities/brno/venues/notes.yaml")
        );
    }

    #[test]
    fn test_unsupported_version() {
        let dir = tempdir().unwrap();
        write_tree(dir.path(), &[("meta.yaml", "version: 1\n")]);

        let err = load_tree(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedVersion(1)));
    }

    #[test]
    fn test_missing_meta() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_tree(dir.path()),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        let dir = tempdir().unwrap();
        write_tree(
            dir.path(),
            &[("meta.yaml", "version: 2\n"), ("x.yaml", "a: [1, 2\n")],
        );
        assert!(matches!(
            load_tree(dir.path()),
            Err(LoadError::Yaml { .. })
        ));
    }

    #[test]
    fn test_document_must_be_mapping() {
        let dir = tempdir().unwrap();
        write_tree(
            dir.path(),
            &[("meta.yaml", "version: 2\n"), ("list.yaml", "- 1\n- 2\n")],
        );
        let err = load_tree(dir.path()).unwrap_err();
        assert!(err.to_string().contains("list.yaml"));
    }
}
