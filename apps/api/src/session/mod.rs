//! Session store: one JSON blob per browser session, keyed by a random id
//! carried in a cookie.
//!
//! The record is opaque to the store. It is overwritten on save, removed on
//! clear, and treated as absent once it is older than the configured TTL.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::report::ReviewReport;
use crate::models::resume::ResumeDraft;

pub mod cookie;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session blob is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub draft: Option<ResumeDraft>,
    pub report: Option<ReviewReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            draft: None,
            report: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.updated_at > ttl
    }
}

/// Persistence for session records. Carried in `AppState` as `Arc<dyn SessionStore>`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns `None` for unknown or expired sessions.
    async fn load(&self, id: Uuid) -> Result<Option<SessionRecord>, SessionError>;

    /// Overwrites the stored record, stamping `updated_at`.
    async fn save(&self, record: &mut SessionRecord) -> Result<(), SessionError>;

    /// Removes the record. Clearing an unknown session is not an error.
    async fn clear(&self, id: Uuid) -> Result<(), SessionError>;
}

/// Loads the caller's record, or starts a fresh one if there is none yet.
pub async fn load_or_new(store: &dyn SessionStore, id: Uuid) -> Result<SessionRecord, AppError> {
    Ok(store
        .load(id)
        .await?
        .unwrap_or_else(|| SessionRecord::new(id)))
}

// ────────────────────────────────────────────────────────────────────────────
// Filesystem backend
// ────────────────────────────────────────────────────────────────────────────

/// Stores each session as `<dir>/<uuid>.json`.
pub struct FileSessionStore {
    dir: PathBuf,
    ttl: Duration,
}

impl FileSessionStore {
    /// Creates the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>, ttl: Duration) -> Result<Self, SessionError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| SessionError::Io {
                path: dir.clone(),
                source,
            })?;
        Ok(Self { dir, ttl })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn remove_file(&self, path: &Path) -> Result<(), SessionError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<SessionRecord>, SessionError> {
        let path = self.path_for(id);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SessionError::Io { path, source }),
        };

        let record: SessionRecord = match serde_json::from_slice(&raw) {
            Ok(record) => record,
            Err(e) => {
                // Unreadable blobs read as absent.
                warn!("Discarding unreadable session {id}: {e}");
                self.remove_file(&path).await?;
                return Ok(None);
            }
        };

        if record.is_expired(self.ttl, Utc::now()) {
            debug!("Session {id} expired, removing");
            self.remove_file(&path).await?;
            return Ok(None);
        }

        Ok(Some(record))
    }

    async fn save(&self, record: &mut SessionRecord) -> Result<(), SessionError> {
        record.updated_at = Utc::now();
        let body = serde_json::to_vec(record)?;

        // Readers never see a partial blob.
        let path = self.path_for(record.id);
        let tmp = self.dir.join(format!("{}.json.tmp", record.id));
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|source| SessionError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| SessionError::Io { path, source })?;

        debug!("Session {} saved", record.id);
        Ok(())
    }

    async fn clear(&self, id: Uuid) -> Result<(), SessionError> {
        self.remove_file(&self.path_for(id)).await
    }
}
