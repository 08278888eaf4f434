//! Fixture discovery.
//!
//! Walks a root directory and maps every regular file beneath it, at any
//! depth, to a target collection named by the file's base name with its
//! final extension stripped (`users.json` → `users`). No manifest file is
//! read; the layout is the convention.

use crate::error::LoadError;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Mapping from collection name to the fixture file that feeds it.
///
/// Built once per load. Directory entries are visited in lexicographic
/// file-name order, so when two files share a base name the
/// lexicographically last path wins, deterministically.
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    paths: BTreeMap<String, PathBuf>,
}

impl FixtureSet {
    /// Discover fixtures under `root`.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self, LoadError> {
        let root = root.as_ref();
        let mut set = FixtureSet::default();
        walk(root, &mut set).map_err(|source| LoadError::Discovery {
            root: root.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            root = %root.display(),
            collections = set.len(),
            "discovered fixtures"
        );
        Ok(set)
    }

    /// Register `path` as the fixture for `collection`, replacing any
    /// earlier registration for the same collection.
    pub fn insert(&mut self, collection: impl Into<String>, path: impl Into<PathBuf>) {
        self.paths.insert(collection.into(), path.into());
    }

    pub fn get(&self, collection: &str) -> Option<&Path> {
        self.paths.get(collection).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.paths
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FromIterator<(String, PathBuf)> for FixtureSet {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

fn walk(dir: &Path, set: &mut FixtureSet) -> io::Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk(&path, set)?;
        } else {
            match collection_name(&path) {
                Some(name) => set.insert(name, path),
                None => {
                    tracing::warn!(path = %path.display(), "skipping fixture with non-UTF-8 name")
                }
            }
        }
    }
    Ok(())
}

/// Base file name with the final extension stripped.
fn collection_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    #[test]
    fn test_extension_stripping() {
        assert_eq!(
            collection_name(Path::new("/tmp/users.json")),
            Some("users".to_string())
        );
        assert_eq!(
            collection_name(Path::new("/tmp/users.backup.json")),
            Some("users.backup".to_string())
        );
        assert_eq!(
            collection_name(Path::new("/tmp/noext")),
            Some("noext".to_string())
        );
    }

    #[test]
    fn test_nested_files_all_discovered() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("users.json"));
        touch(&dir.path().join("deep/orders.json"));
        touch(&dir.path().join("deep/deeper/items.json"));

        let set = FixtureSet::discover(dir.path()).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.get("users").is_some());
        assert!(set.get("orders").is_some());
        assert!(set.get("items").is_some());
    }

    #[test]
    fn test_duplicate_base_name_last_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a/users.json"));
        touch(&dir.path().join("b/users.json"));

        let set = FixtureSet::discover(dir.path()).unwrap();
        assert_eq!(set.len(), 1);
        // Lexicographic walk order: a/ before b/, so b/ wins.
        assert_eq!(set.get("users").unwrap(), dir.path().join("b/users.json"));
    }

    #[test]
    fn test_missing_root_is_discovery_error() {
        let err = FixtureSet::discover("/definitely/not/here").unwrap_err();
        assert!(matches!(err, LoadError::Discovery { .. }));
    }
}
