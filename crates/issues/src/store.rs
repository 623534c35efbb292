//! Persistence for issue records.
//!
//! Stores are append-only: issues are never updated or deleted. Every store
//! performs the capacity check and the insert under a single lock so that
//! concurrent creations cannot push the total past the limit.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tokio::sync::{Mutex, RwLock};

use crate::error::StorageError;
use crate::facility::Facility;
use crate::issue::Issue;

/// Boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(Issue),
    /// Nothing was written; the store already holds `count` issues.
    LimitReached { count: usize },
}

/// Methods return boxed futures for dyn-compatibility.
pub trait IssueStore: Send + Sync {
    /// Issues of one facility in insertion order.
    fn list(&self, facility: Facility) -> BoxFuture<'_, Result<Vec<Issue>, StorageError>>;

    /// Total number of issues across all facilities.
    fn count(&self) -> BoxFuture<'_, Result<usize, StorageError>>;

    /// Appends `issue` unless the store already holds `limit` or more issues.
    fn insert_within_limit(
        &self,
        issue: Issue,
        limit: usize,
    ) -> BoxFuture<'_, Result<InsertOutcome, StorageError>>;
}

#[derive(Debug, Default)]
pub struct MemoryIssueStore {
    issues: RwLock<Vec<Issue>>,
}

impl MemoryIssueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IssueStore for MemoryIssueStore {
    fn list(&self, facility: Facility) -> BoxFuture<'_, Result<Vec<Issue>, StorageError>> {
        Box::pin(async move {
            let issues = self.issues.read().await;
            Ok(issues
                .iter()
                .filter(|i| i.facility == facility)
                .cloned()
                .collect())
        })
    }

    fn count(&self) -> BoxFuture<'_, Result<usize, StorageError>> {
        Box::pin(async move { Ok(self.issues.read().await.len()) })
    }

    fn insert_within_limit(
        &self,
        issue: Issue,
        limit: usize,
    ) -> BoxFuture<'_, Result<InsertOutcome, StorageError>> {
        Box::pin(async move {
            let mut issues = self.issues.write().await;
            if issues.len() >= limit {
                return Ok(InsertOutcome::LimitReached {
                    count: issues.len(),
                });
            }
            issues.push(issue.clone());
            Ok(InsertOutcome::Inserted(issue))
        })
    }
}

/// Issues kept as a JSON array on disk.
///
/// Writes go to a temporary sibling file which is then renamed over the
/// target. A missing file reads as an empty store.
pub struct JsonFileIssueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileIssueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load_unlocked(&self) -> Result<Vec<Issue>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(s) if s.trim().is_empty() => Ok(Vec::new()),
            Ok(s) => serde_json::from_str(&s).map_err(|e| StorageError::Corrupt(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    async fn save_unlocked(&self, issues: &[Issue]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::Io(e.to_string()))?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        let text =
            serde_json::to_string_pretty(issues).map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::write(&tmp, text)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(())
    }
}

impl IssueStore for JsonFileIssueStore {
    fn list(&self, facility: Facility) -> BoxFuture<'_, Result<Vec<Issue>, StorageError>> {
        Box::pin(async move {
            let _g = self.lock.lock().await;
            let issues = self.load_unlocked().await?;
            Ok(issues.into_iter().filter(|i| i.facility == facility).collect())
        })
    }

    fn count(&self) -> BoxFuture<'_, Result<usize, StorageError>> {
        Box::pin(async move {
            let _g = self.lock.lock().await;
            Ok(self.load_unlocked().await?.len())
        })
    }

    fn insert_within_limit(
        &self,
        issue: Issue,
        limit: usize,
    ) -> BoxFuture<'_, Result<InsertOutcome, StorageError>> {
        Box::pin(async move {
            let _g = self.lock.lock().await;
            let mut issues = self.load_unlocked().await?;
            if issues.len() >= limit {
                return Ok(InsertOutcome::LimitReached {
                    count: issues.len(),
                });
            }
            issues.push(issue.clone());
            self.save_unlocked(&issues).await?;
            Ok(InsertOutcome::Inserted(issue))
        })
    }
}
