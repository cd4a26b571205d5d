// src/assets/store.rs
// =============================================================================
// Local asset storage: one folder under the storage root, files written as
// raw bytes. File names come from the last segment of the image URL.
// =============================================================================

use crate::error::ImportError;
use std::path::PathBuf;

/// The `assets/` folder inside the notes vault (or any other root).
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    dir: String,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>, dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            dir: dir.into().trim_matches('/').to_string(),
        }
    }

    pub fn container(&self) -> PathBuf {
        self.root.join(&self.dir)
    }

    /// Creates the folder if needed. Succeeds when it already exists, and is
    /// safe to call from several downloads at once.
    pub async fn ensure_container(&self) -> Result<(), ImportError> {
        let path = self.container();
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| ImportError::Storage { path, source })
    }

    /// Writes `bytes` as `<dir>/<file_name>` and returns that vault-relative
    /// path (always with `/`, which is what Markdown links want).
    pub async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<String, ImportError> {
        self.ensure_container().await?;

        let path = self.container().join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| ImportError::Storage {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "stored asset");
        Ok(format!("{}/{}", self.dir, file_name))
    }
}

/// Last path segment of a URL, query and fragment excluded.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    let name = sanitize_filename(segment);
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name)
}

/// Replaces path separators and control characters with `_` and trims dots
/// and spaces from the ends.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '\0' || c.is_control() || c == ':' {
                '_'
            } else {
                c
            }
        })
        .collect();
    replaced
        .trim_matches(|c: char| c == ' ' || c == '.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://github.com/a/b/blob/main/img/logo.png?raw=true").as_deref(),
            Some("logo.png")
        );
        assert_eq!(
            filename_from_url("https://example.com/shots/demo.gif#frame").as_deref(),
            Some("demo.gif")
        );
        assert_eq!(filename_from_url("https://example.com/"), None);
        assert_eq!(filename_from_url("not a url"), None);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a\\b:c.png"), "a_b_c.png");
        assert_eq!(sanitize_filename("  ..hidden.png "), "hidden.png");
    }

    #[tokio::test]
    async fn test_write_creates_container_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path(), "assets/");

        let first = store.write("a.png", b"one").await.unwrap();
        let second = store.write("b.png", b"two").await.unwrap();

        assert_eq!(first, "assets/a.png");
        assert_eq!(second, "assets/b.png");
        assert_eq!(std::fs::read(dir.path().join("assets/a.png")).unwrap(), b"one");
        assert_eq!(std::fs::read(dir.path().join("assets/b.png")).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_ensure_container_tolerates_existing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        let store = AssetStore::new(dir.path(), "assets");
        store.ensure_container().await.unwrap();
        store.ensure_container().await.unwrap();
    }

    #[tokio::test]
    async fn test_write_failure_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the folder should be.
        std::fs::write(dir.path().join("assets"), b"").unwrap();
        let store = AssetStore::new(dir.path(), "assets");

        let err = store.write("a.png", b"x").await.unwrap_err();
        assert_eq!(err.stage(), "storage");
    }
}
