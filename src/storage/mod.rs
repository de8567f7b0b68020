//! Storage abstractions for course persistence.
//!
//! Two capabilities are consumed by the crawler:
//! - [`CourseStorage`]: plain key/value, the course code maps to its JSON record
//! - [`IndexedStorage`]: search index documents with `code` and `name`
//!   searchable and the JSON record carried as an opaque field
//!
//! [`CourseSink`] picks one of them at startup and is what the detail fetcher
//! hands finished courses to.

pub mod local;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redisearch;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Course, StorageBackend, StorageConfig};

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "redis")]
pub use redisearch::RedisStorage;

/// Key/value store for serialized courses.
#[async_trait]
pub trait CourseStorage: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

/// A search index document for one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    pub id: String,
    pub code: String,
    pub name: String,
    /// Full course record, stored but not indexed
    pub json: String,
}

/// Write semantics of [`IndexedStorage::upsert_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexingOptions {
    /// Overwrite a document that already exists
    pub replace: bool,
    /// Only touch the fields being written, keep any others
    pub partial: bool,
}

impl IndexingOptions {
    /// Replace existing documents, merging at the field level.
    pub fn upsert() -> Self {
        Self {
            replace: true,
            partial: true,
        }
    }
}

/// Search index over courses.
#[async_trait]
pub trait IndexedStorage: Send + Sync {
    /// Create the index schema: sortable text `code`, text `name`,
    /// non-indexed text `json`.
    async fn create_index(&self) -> Result<()>;

    /// Write a document with the given semantics.
    async fn upsert_document(&self, doc: &IndexedDocument, options: IndexingOptions)
    -> Result<()>;
}

/// Destination of extracted courses.
#[derive(Clone)]
pub enum CourseSink {
    KeyValue(Arc<dyn CourseStorage>),
    Indexed(Arc<dyn IndexedStorage>),
}

impl CourseSink {
    /// Serialize and persist a full course record.
    pub async fn store(&self, course: &Course) -> Result<()> {
        let json = serde_json::to_string(course)?;

        match self {
            CourseSink::KeyValue(storage) => storage.put(&course.code, &json).await,
            CourseSink::Indexed(index) => {
                let doc = IndexedDocument {
                    id: course.code.clone(),
                    code: course.code.clone(),
                    name: course.name.clone(),
                    json,
                };
                index.upsert_document(&doc, IndexingOptions::upsert()).await
            }
        }
    }
}

/// Build the sink selected by configuration.
///
/// Index creation happens here, once, before any course is stored.
pub async fn open_sink(config: &StorageConfig, root_dir: &Path) -> Result<CourseSink> {
    match config.backend {
        StorageBackend::Memory => Ok(CourseSink::KeyValue(Arc::new(MemoryStorage::new()))),
        StorageBackend::Local => Ok(CourseSink::KeyValue(Arc::new(LocalStorage::new(root_dir)))),
        #[cfg(feature = "redis")]
        StorageBackend::Redis => {
            let storage = Arc::new(RedisStorage::connect(config).await?);
            if !config.indexed {
                return Ok(CourseSink::KeyValue(storage));
            }
            if config.create_index {
                if let Err(e) = storage.create_index().await {
                    log::warn!("Index creation failed: {}", e);
                }
            }
            Ok(CourseSink::Indexed(storage))
        }
        #[cfg(not(feature = "redis"))]
        StorageBackend::Redis => Err(crate::error::AppError::config(
            "Redis storage requires the `redis` feature",
        )),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Index double that records every write.
    #[derive(Default)]
    pub struct RecordingIndex {
        pub docs: Mutex<Vec<(IndexedDocument, IndexingOptions)>>,
    }

    #[async_trait]
    impl IndexedStorage for RecordingIndex {
        async fn create_index(&self) -> Result<()> {
            Ok(())
        }

        async fn upsert_document(
            &self,
            doc: &IndexedDocument,
            options: IndexingOptions,
        ) -> Result<()> {
            self.docs.lock().unwrap().push((doc.clone(), options));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingIndex;
    use super::*;
    use crate::models::Activity;

    fn sample_course() -> Course {
        Course {
            code: "CSC108H1".to_string(),
            name: "Intro to CS".to_string(),
            campus: "St. George".to_string(),
            activities: vec![Activity {
                name: "LEC0101".to_string(),
                class_size: 500,
                ..Activity::default()
            }],
            ..Course::default()
        }
    }

    #[tokio::test]
    async fn test_key_value_sink_stores_under_code() {
        let storage = Arc::new(MemoryStorage::new());
        let sink = CourseSink::KeyValue(storage.clone());

        sink.store(&sample_course()).await.unwrap();

        let stored = storage.get("CSC108H1").await.unwrap().unwrap();
        let parsed: Course = serde_json::from_str(&stored).unwrap();
        assert_eq!(parsed, sample_course());
    }

    #[tokio::test]
    async fn test_indexed_sink_writes_code_name_and_payload() {
        let index = Arc::new(RecordingIndex::default());
        let sink = CourseSink::Indexed(index.clone());

        sink.store(&sample_course()).await.unwrap();

        let docs = index.docs.lock().unwrap();
        assert_eq!(docs.len(), 1);
        let (doc, options) = &docs[0];
        assert_eq!(doc.id, "CSC108H1");
        assert_eq!(doc.code, "CSC108H1");
        assert_eq!(doc.name, "Intro to CS");
        assert_eq!(*options, IndexingOptions::upsert());

        let payload: Course = serde_json::from_str(&doc.json).unwrap();
        assert_eq!(payload.activities.len(), 1);
    }

    #[tokio::test]
    async fn test_open_sink_memory_and_local() {
        let tmp = tempfile::TempDir::new().unwrap();

        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..StorageConfig::default()
        };
        assert!(matches!(
            open_sink(&config, tmp.path()).await.unwrap(),
            CourseSink::KeyValue(_)
        ));

        let config = StorageConfig {
            backend: StorageBackend::Local,
            ..StorageConfig::default()
        };
        let sink = open_sink(&config, tmp.path()).await.unwrap();
        sink.store(&sample_course()).await.unwrap();
        assert!(tmp.path().join("courses/CSC108H1.json").exists());
    }
}
