//! Delete-confirmation state machine.
//!
//! ```text
//!  Closed ──open(id)──> Open ──confirm──> Confirming ──resolve──> Closed
//!                        │
//!                        └──cancel──> Closed
//! ```
//!
//! `Confirming` keeps the confirm control disabled until the delete call
//! resolves, whatever the outcome.

use serde::Serialize;

use crate::errors::DeleteDialogError;
use crate::models::RecordId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "target", rename_all = "snake_case")]
pub enum DeleteDialog {
    #[default]
    Closed,
    Open(RecordId),
    Confirming(RecordId),
}

impl DeleteDialog {
    pub fn target(&self) -> Option<&RecordId> {
        match self {
            Self::Closed => None,
            Self::Open(id) | Self::Confirming(id) => Some(id),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Whether the confirm control is enabled.
    pub fn can_confirm(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn open(&mut self, target: RecordId) -> Result<(), DeleteDialogError> {
        match self {
            Self::Closed => {
                *self = Self::Open(target);
                Ok(())
            }
            _ => Err(DeleteDialogError::AlreadyOpen),
        }
    }

    pub fn cancel(&mut self) -> Result<(), DeleteDialogError> {
        match self {
            Self::Open(_) => {
                *self = Self::Closed;
                Ok(())
            }
            Self::Confirming(_) => Err(DeleteDialogError::AlreadyConfirming),
            Self::Closed => Err(DeleteDialogError::NotOpen),
        }
    }

    /// Move to `Confirming` and return the id to delete.
    pub fn confirm(&mut self) -> Result<RecordId, DeleteDialogError> {
        match self {
            Self::Open(id) => {
                let id = id.clone();
                *self = Self::Confirming(id.clone());
                Ok(id)
            }
            Self::Confirming(_) => Err(DeleteDialogError::AlreadyConfirming),
            Self::Closed => Err(DeleteDialogError::NotOpen),
        }
    }

    /// The delete call resolved (either way); close unconditionally.
    pub fn resolve(&mut self) -> Result<(), DeleteDialogError> {
        match self {
            Self::Confirming(_) => {
                *self = Self::Closed;
                Ok(())
            }
            _ => Err(DeleteDialogError::NotConfirming),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RecordId {
        RecordId::from(s)
    }

    #[test]
    fn test_happy_path() {
        let mut dialog = DeleteDialog::default();
        dialog.open(id("r1")).unwrap();
        assert!(dialog.can_confirm());
        assert_eq!(dialog.confirm().unwrap(), id("r1"));
        assert!(!dialog.can_confirm());
        assert_eq!(dialog.target(), Some(&id("r1")));
        dialog.resolve().unwrap();
        assert_eq!(dialog, DeleteDialog::Closed);
    }

    #[test]
    fn test_cancel_has_no_side_effect() {
        let mut dialog = DeleteDialog::default();
        dialog.open(id("r1")).unwrap();
        dialog.cancel().unwrap();
        assert_eq!(dialog, DeleteDialog::Closed);
        assert_eq!(dialog.cancel(), Err(DeleteDialogError::NotOpen));
    }

    #[test]
    fn test_double_confirm_rejected() {
        let mut dialog = DeleteDialog::default();
        dialog.open(id("r1")).unwrap();
        dialog.confirm().unwrap();
        assert_eq!(dialog.confirm(), Err(DeleteDialogError::AlreadyConfirming));
        assert_eq!(dialog.cancel(), Err(DeleteDialogError::AlreadyConfirming));
    }

    #[test]
    fn test_only_one_intent_at_a_time() {
        let mut dialog = DeleteDialog::default();
        dialog.open(id("r1")).unwrap();
        assert_eq!(dialog.open(id("r2")), Err(DeleteDialogError::AlreadyOpen));
        assert_eq!(dialog.target(), Some(&id("r1")));
    }

    #[test]
    fn test_resolve_requires_confirming() {
        let mut dialog = DeleteDialog::default();
        assert_eq!(dialog.resolve(), Err(DeleteDialogError::NotConfirming));
        dialog.open(id("r1")).unwrap();
        assert_eq!(dialog.resolve(), Err(DeleteDialogError::NotConfirming));
    }

    #[test]
    fn test_serializes_for_views() {
        let json = serde_json::to_value(DeleteDialog::Open(id("r1"))).unwrap();
        assert_eq!(json, serde_json::json!({"state": "open", "target": "r1"}));
    }
}
