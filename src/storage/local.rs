//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml           # Crawler Configuration
//! └── courses/              # One record per course code
//!     ├── CSC108H1.json
//!     └── MAT137Y1.json
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::CourseStorage;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Relative file name for a course key.
    fn course_key(key: &str) -> Result<String> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(AppError::storage(format!("invalid course key '{key}'")));
        }
        Ok(format!("courses/{key}.json"))
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl CourseStorage for LocalStorage {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.write_bytes(&Self::course_key(key)?, value.as_bytes()).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.read_bytes(&Self::course_key(key)?).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| AppError::storage(format!("{key} is not valid UTF-8: {e}"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_stores_payload_verbatim() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let payload = r#"{"Code":"CSC108H1","Name":"Intro to CS","Activities":[]}"#;

        storage.put("CSC108H1", payload).await.unwrap();

        assert_eq!(
            storage.get("CSC108H1").await.unwrap().as_deref(),
            Some(payload)
        );
        let on_disk = std::fs::read_to_string(tmp.path().join("courses/CSC108H1.json")).unwrap();
        assert_eq!(on_disk, payload);
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(storage.get("CSC108H1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_whole_record() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let first = Course {
            code: "CSC108H1".to_string(),
            term: "2024 Fall".to_string(),
            ..Course::default()
        };
        let second = Course {
            code: "CSC108H1".to_string(),
            campus: "St. George".to_string(),
            ..Course::default()
        };

        for course in [&first, &second] {
            let json = serde_json::to_string(course).unwrap();
            storage.put(&course.code, &json).await.unwrap();
        }

        let stored = storage.get("CSC108H1").await.unwrap().unwrap();
        let loaded: Course = serde_json::from_str(&stored).unwrap();
        assert_eq!(loaded, second);
        assert!(loaded.term.is_empty());
        assert!(!tmp.path().join("courses/CSC108H1.tmp").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(storage.put("../escape", "{}").await.is_err());
        assert!(storage.put("", "{}").await.is_err());
    }
}
