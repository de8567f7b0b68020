//! RediSearch storage implementation.
//!
//! Courses are stored as hashes under `{key_prefix}{code}` with three fields:
//! `code` (sortable text), `name` (text) and `json` (the full record, not
//! indexed). The index is declared over the key prefix, so every write is
//! searchable as soon as it lands.
//!
//! Used as plain key/value storage, records are strings under the same key.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, IntoConnectionInfo};

use crate::error::{AppError, Result};
use crate::models::StorageConfig;
use crate::storage::{CourseStorage, IndexedDocument, IndexedStorage, IndexingOptions};

/// Indexed course storage on a RediSearch-enabled Redis server.
#[derive(Clone)]
pub struct RedisStorage {
    conn: ConnectionManager,
    index_name: String,
    key_prefix: String,
    timeout: Duration,
}

impl RedisStorage {
    /// Connect using the storage configuration.
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let mut info = config.redis_url.as_str().into_connection_info()?;
        if let Some(password) = &config.password {
            info.redis.password = Some(password.clone());
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = redis::Client::open(info)?;
        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| AppError::storage(format!("connect timed out after {timeout:?}")))??;

        log::info!("Connected to Redis at {}", config.redis_url);

        Ok(Self {
            conn,
            index_name: config.index_name.clone(),
            key_prefix: config.key_prefix.clone(),
            timeout,
        })
    }

    fn document_key(&self, id: &str) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    /// Run a storage call under the configured timeout.
    async fn with_timeout<T>(
        &self,
        op: &str,
        call: impl Future<Output = redis::RedisResult<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(AppError::storage(format!(
                "{op} timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

/// `FT.CREATE` for the course schema.
fn index_command(index_name: &str, key_prefix: &str) -> redis::Cmd {
    let mut cmd = redis::cmd("FT.CREATE");
    cmd.arg(index_name)
        .arg("ON")
        .arg("HASH")
        .arg("PREFIX")
        .arg(1)
        .arg(key_prefix)
        .arg("SCHEMA")
        .arg("code")
        .arg("TEXT")
        .arg("SORTABLE")
        .arg("name")
        .arg("TEXT")
        .arg("json")
        .arg("TEXT")
        .arg("NOINDEX");
    cmd
}

/// Write pipeline for a document; `DEL` first when the old hash must not survive.
fn upsert_pipeline(key: &str, doc: &IndexedDocument, options: IndexingOptions) -> redis::Pipeline {
    let fields = [
        ("code", doc.code.as_str()),
        ("name", doc.name.as_str()),
        ("json", doc.json.as_str()),
    ];

    let mut pipe = redis::pipe();
    pipe.atomic();
    if !options.partial {
        pipe.del(key).ignore();
    }
    pipe.hset_multiple(key, &fields).ignore();
    pipe
}

#[async_trait]
impl CourseStorage for RedisStorage {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = self.document_key(key);
        let _: () = self.with_timeout("SET", conn.set(&key, value)).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let key = self.document_key(key);
        self.with_timeout("GET", conn.get(&key)).await
    }
}

#[async_trait]
impl IndexedStorage for RedisStorage {
    async fn create_index(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let cmd = index_command(&self.index_name, &self.key_prefix);
        let reply: Result<()> = self.with_timeout("FT.CREATE", cmd.query_async(&mut conn)).await;

        match reply {
            Ok(()) => {
                log::info!("Created search index '{}'", self.index_name);
                Ok(())
            }
            Err(AppError::Redis(e)) if e.to_string().contains("Index already exists") => {
                log::info!("Search index '{}' already exists", self.index_name);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn upsert_document(
        &self,
        doc: &IndexedDocument,
        options: IndexingOptions,
    ) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = self.document_key(&doc.id);

        if !options.replace {
            let exists: bool = self.with_timeout("EXISTS", conn.exists(&key)).await?;
            if exists {
                return Err(AppError::storage(format!("document {key} already exists")));
            }
        }

        let pipe = upsert_pipeline(&key, doc, options);
        let _: () = self.with_timeout("HSET", pipe.query_async(&mut conn)).await?;
        log::debug!("Indexed {}", key);
        Ok(())
    }
}
