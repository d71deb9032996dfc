//! In-memory list of research records, replaced wholesale on every refresh.
//!
//! A failed refresh never blanks a good list: the records stay as they were
//! and the error is kept separately for the banner. Deletion goes to the
//! server first and then re-lists, so the displayed list always matches
//! server truth.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::models::ResearchRecord;
use crate::errors::{RemoveError, TransportError};
use crate::models::RecordId;
use crate::transport::ResearchBackend;

/// Read-only view of the cache handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchSnapshot {
    pub records: Arc<[ResearchRecord]>,
    /// Set after a failed refresh or delete; cleared by the next success.
    pub error: Option<TransportError>,
    /// `true` once any refresh has succeeded.
    pub loaded: bool,
}

impl ResearchSnapshot {
    pub fn contains(&self, id: &RecordId) -> bool {
        self.records.iter().any(|r| &r.id == id)
    }
}

pub struct ResearchCache<B: ResearchBackend> {
    backend: Arc<B>,
    records: Arc<[ResearchRecord]>,
    error: Option<TransportError>,
    loaded: bool,
}

impl<B: ResearchBackend> ResearchCache<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            records: Arc::from(Vec::new()),
            error: None,
            loaded: false,
        }
    }

    pub fn snapshot(&self) -> ResearchSnapshot {
        ResearchSnapshot {
            records: Arc::clone(&self.records),
            error: self.error.clone(),
            loaded: self.loaded,
        }
    }

    pub fn records(&self) -> &[ResearchRecord] {
        &self.records
    }

    pub fn error(&self) -> Option<&TransportError> {
        self.error.as_ref()
    }

    pub fn get(&self, id: &RecordId) -> Option<&ResearchRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Replace the list with the server's. On failure the list is untouched.
    pub async fn refresh(&mut self) -> Result<(), TransportError> {
        match self.backend.list_research().await {
            Ok(records) => {
                debug!(count = records.len(), "research list refreshed");
                self.records = Arc::from(records);
                self.error = None;
                self.loaded = true;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "research refresh failed; keeping previous list");
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Delete on the server, then refresh. A failed delete leaves the list
    /// untouched and skips the refresh. A failed refresh after a successful
    /// delete is reported as `RemoveError::Reload`.
    pub async fn remove(&mut self, id: &RecordId) -> Result<(), RemoveError> {
        if let Err(e) = self.backend.delete_research(id).await {
            warn!(research_id = %id, error = %e, "delete failed");
            self.error = Some(e.clone());
            return Err(RemoveError::Delete(e));
        }
        info!(research_id = %id, "research deleted");
        self.refresh().await.map_err(RemoveError::Reload)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    pub(crate) fn record(id: &str) -> ResearchRecord {
        ResearchRecord {
            id: RecordId::from(id),
            name: format!("research {}", id),
            source: "reddit".to_string(),
            created_at: "2024-05-01T10:00:00Z".to_string(),
            urls: vec![format!("https://reddit.com/r/{}", id)],
            community_analysis: Default::default(),
            market_analysis: Default::default(),
        }
    }

    /// Server double: a mutable list plus scripted failures.
    #[derive(Default)]
    pub(crate) struct FakeServer {
        pub(crate) records: Mutex<Vec<ResearchRecord>>,
        pub(crate) fail_list: Mutex<Option<TransportError>>,
        pub(crate) fail_delete: Mutex<Option<TransportError>>,
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl FakeServer {
        pub(crate) fn with(ids: &[&str]) -> Arc<Self> {
            let server = Self::default();
            *server.records.lock().unwrap() = ids.iter().map(|id| record(id)).collect();
            Arc::new(server)
        }
    }

    #[async_trait]
    impl ResearchBackend for FakeServer {
        async fn list_research(&self) -> Result<Vec<ResearchRecord>, TransportError> {
            self.calls.lock().unwrap().push("list".to_string());
            if let Some(e) = self.fail_list.lock().unwrap().clone() {
                return Err(e);
            }
            Ok(self.records.lock().unwrap().clone())
        }

        async fn delete_research(&self, id: &RecordId) -> Result<(), TransportError> {
            self.calls.lock().unwrap().push(format!("delete {}", id));
            if let Some(e) = self.fail_delete.lock().unwrap().clone() {
                return Err(e);
            }
            self.records.lock().unwrap().retain(|r| &r.id != id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_wholesale() {
        let server = FakeServer::with(&["r1", "r2"]);
        let mut cache = ResearchCache::new(server.clone());
        cache.refresh().await.unwrap();
        assert_eq!(cache.records().len(), 2);

        *server.records.lock().unwrap() = vec![record("r3")];
        cache.refresh().await.unwrap();

        let ids: Vec<&str> = cache.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r3"]);
        assert!(cache.snapshot().loaded);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_list() {
        let server = FakeServer::with(&["r1", "r2"]);
        let mut cache = ResearchCache::new(server.clone());
        cache.refresh().await.unwrap();
        let before = cache.snapshot();

        *server.fail_list.lock().unwrap() = Some(TransportError::network("offline"));
        let err = cache.refresh().await.unwrap_err();

        let after = cache.snapshot();
        assert_eq!(after.records, before.records);
        assert_eq!(after.error, Some(err));
    }

    #[tokio::test]
    async fn test_success_clears_error_banner() {
        let server = FakeServer::with(&["r1"]);
        let mut cache = ResearchCache::new(server.clone());
        *server.fail_list.lock().unwrap() = Some(TransportError::server("500"));
        assert!(cache.refresh().await.is_err());
        assert!(cache.error().is_some());
        assert!(!cache.snapshot().loaded);

        *server.fail_list.lock().unwrap() = None;
        cache.refresh().await.unwrap();
        assert!(cache.error().is_none());
    }

    #[tokio::test]
    async fn test_remove_deletes_then_refreshes() {
        let server = FakeServer::with(&["r1", "r2"]);
        let mut cache = ResearchCache::new(server.clone());
        cache.refresh().await.unwrap();

        cache.remove(&RecordId::from("r1")).await.unwrap();

        assert!(!cache.snapshot().contains(&RecordId::from("r1")));
        assert_eq!(
            *server.calls.lock().unwrap(),
            vec!["list", "delete r1", "list"]
        );
    }

    #[tokio::test]
    async fn test_failed_remove_keeps_item_and_skips_refresh() {
        let server = FakeServer::with(&["r1"]);
        let mut cache = ResearchCache::new(server.clone());
        cache.refresh().await.unwrap();
        *server.fail_delete.lock().unwrap() = Some(TransportError::network("offline"));

        let err = cache.remove(&RecordId::from("r1")).await.unwrap_err();

        assert!(!err.deleted());
        assert!(cache.snapshot().contains(&RecordId::from("r1")));
        assert_eq!(cache.error(), Some(err.transport()));
        assert_eq!(*server.calls.lock().unwrap(), vec!["list", "delete r1"]);
    }

    #[tokio::test]
    async fn test_reload_failure_after_delete_is_distinct() {
        let server = FakeServer::with(&["r1", "r2"]);
        let mut cache = ResearchCache::new(server.clone());
        cache.refresh().await.unwrap();
        *server.fail_list.lock().unwrap() = Some(TransportError::network("offline"));

        let err = cache.remove(&RecordId::from("r1")).await.unwrap_err();

        assert_eq!(err, RemoveError::Reload(TransportError::network("offline")));
        assert!(err.deleted());
        assert!(!server.records.lock().unwrap().iter().any(|r| r.id.as_str() == "r1"));
        assert_eq!(cache.error().map(|e| e.message.as_str()), Some("offline"));
    }

    #[tokio::test]
    async fn test_deleted_item_never_reappears() {
        let server = FakeServer::with(&["r1", "r2"]);
        let mut cache = ResearchCache::new(server.clone());
        cache.refresh().await.unwrap();
        cache.remove(&RecordId::from("r2")).await.unwrap();
        cache.refresh().await.unwrap();
        cache.refresh().await.unwrap();
        assert!(!cache.snapshot().contains(&RecordId::from("r2")));
        assert!(cache.get(&RecordId::from("r1")).is_some());
    }
}
