//! Helpers that write fixture files from native documents.
//!
//! Documents are rendered as canonical extended JSON literals, one after
//! another, the exact shape the decoder consumes.

use anyhow::Context;
use bson::Document;
use extjson_types::reverse;
use std::path::{Path, PathBuf};

/// Render documents as concatenated extended JSON literals.
pub fn render_fixture(documents: &[Document]) -> String {
    let mut out = String::new();
    for document in documents {
        let json = reverse::document_to_json(&reverse::document_from_bson(document));
        out.push_str(&json.to_string());
        out.push('\n');
    }
    out
}

/// Write `documents` as the fixture file `dir/<file_name>`.
///
/// The collection the loader targets is the file's base name with the
/// extension stripped, so `write_fixture(dir, "users.json", ...)` feeds
/// the `users` collection.
pub fn write_fixture(
    dir: &Path,
    file_name: &str,
    documents: &[Document],
) -> anyhow::Result<PathBuf> {
    let path = dir.join(file_name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create fixture directory {}", parent.display()))?;
    }
    std::fs::write(&path, render_fixture(documents))
        .with_context(|| format!("failed to write fixture file {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_render_one_literal_per_document() {
        let rendered = render_fixture(&[doc! {"a": 1}, doc! {"b": 2}]);
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.starts_with('{'));
    }

    #[test]
    fn test_write_fixture_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "nested/users.json", &[doc! {"_id": 1}]).unwrap();
        assert!(path.exists());
        assert_eq!(path, dir.path().join("nested/users.json"));
    }
}
