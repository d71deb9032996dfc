//! The research list view: cache plus delete-confirmation dialog.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use super::cache::{ResearchCache, ResearchSnapshot};
use super::delete_dialog::DeleteDialog;
use crate::errors::{DeleteDialogError, RemoveError, TransportError};
use crate::models::RecordId;
use crate::transport::ResearchBackend;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ListViewError {
    #[error(transparent)]
    Dialog(#[from] DeleteDialogError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Remove(#[from] RemoveError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListViewSnapshot {
    pub research: ResearchSnapshot,
    pub dialog: DeleteDialog,
}

pub struct ResearchListView<B: ResearchBackend> {
    cache: ResearchCache<B>,
    dialog: DeleteDialog,
}

impl<B: ResearchBackend> ResearchListView<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            cache: ResearchCache::new(backend),
            dialog: DeleteDialog::default(),
        }
    }

    pub fn cache(&self) -> &ResearchCache<B> {
        &self.cache
    }

    pub fn snapshot(&self) -> ListViewSnapshot {
        ListViewSnapshot {
            research: self.cache.snapshot(),
            dialog: self.dialog.clone(),
        }
    }

    pub async fn refresh(&mut self) -> Result<(), TransportError> {
        self.cache.refresh().await
    }

    pub fn request_delete(&mut self, id: RecordId) -> Result<(), ListViewError> {
        Ok(self.dialog.open(id)?)
    }

    pub fn cancel_delete(&mut self) -> Result<(), ListViewError> {
        Ok(self.dialog.cancel()?)
    }

    /// Run the confirmed delete. The dialog closes once the call resolves,
    /// whether it succeeded or not. `ListViewError::Remove` tells a failed
    /// delete apart from a failed reload after a successful one.
    pub async fn confirm_delete(&mut self) -> Result<RecordId, ListViewError> {
        let id = self.dialog.confirm()?;
        let outcome = self.cache.remove(&id).await;
        self.dialog.resolve()?;
        outcome?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportErrorKind;
    use crate::research::cache::tests::FakeServer;

    #[tokio::test]
    async fn test_confirmed_delete_removes_and_closes() {
        let server = FakeServer::with(&["r1", "r2"]);
        let mut view = ResearchListView::new(server);
        view.refresh().await.unwrap();

        view.request_delete(RecordId::from("r1")).unwrap();
        let deleted = view.confirm_delete().await.unwrap();

        assert_eq!(deleted.as_str(), "r1");
        let snap = view.snapshot();
        assert_eq!(snap.dialog, DeleteDialog::Closed);
        assert!(!snap.research.contains(&RecordId::from("r1")));
        assert!(snap.research.contains(&RecordId::from("r2")));
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_item_closes_dialog_and_surfaces_error() {
        let server = FakeServer::with(&["r1"]);
        *server.fail_delete.lock().unwrap() = Some(TransportError::network("offline"));
        let mut view = ResearchListView::new(server);
        view.refresh().await.unwrap();

        view.request_delete(RecordId::from("r1")).unwrap();
        let err = view.confirm_delete().await.unwrap_err();

        match err {
            ListViewError::Remove(RemoveError::Delete(e)) => {
                assert_eq!(e.kind, TransportErrorKind::Network)
            }
            other => panic!("Expected delete error, got {:?}", other),
        }
        let snap = view.snapshot();
        assert!(snap.research.contains(&RecordId::from("r1")));
        assert_eq!(snap.dialog, DeleteDialog::Closed);
        assert!(snap.research.error.is_some());
    }

    #[tokio::test]
    async fn test_reload_failure_after_delete_reports_deleted() {
        let server = FakeServer::with(&["r1", "r2"]);
        let mut view = ResearchListView::new(server.clone());
        view.refresh().await.unwrap();
        *server.fail_list.lock().unwrap() = Some(TransportError::network("offline"));

        view.request_delete(RecordId::from("r1")).unwrap();
        let err = view.confirm_delete().await.unwrap_err();

        match err {
            ListViewError::Remove(e) => assert!(e.deleted()),
            other => panic!("Expected reload error, got {:?}", other),
        }
        assert!(server.records.lock().unwrap().iter().all(|r| r.id.as_str() != "r1"));
        assert_eq!(view.snapshot().dialog, DeleteDialog::Closed);
    }

    #[tokio::test]
    async fn test_cancel_issues_no_calls() {
        let server = FakeServer::with(&["r1"]);
        let mut view = ResearchListView::new(server.clone());
        view.request_delete(RecordId::from("r1")).unwrap();
        view.cancel_delete().unwrap();
        assert!(server.calls.lock().unwrap().is_empty());
        assert!(matches!(
            view.confirm_delete().await,
            Err(ListViewError::Dialog(DeleteDialogError::NotOpen))
        ));
    }

    #[tokio::test]
    async fn test_second_intent_rejected_while_open() {
        let server = FakeServer::with(&["r1", "r2"]);
        let mut view = ResearchListView::new(server);
        view.request_delete(RecordId::from("r1")).unwrap();
        assert_eq!(
            view.request_delete(RecordId::from("r2")),
            Err(ListViewError::Dialog(DeleteDialogError::AlreadyOpen))
        );
    }
}
