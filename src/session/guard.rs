//! Route guard consulted before any protected command runs.

use thiserror::Error;

use super::store::{Session, SessionStore};

/// How the guard reads the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardPolicy {
    /// Trust the in-memory session.
    Cached,
    /// Re-read durable storage first, catching external logouts.
    #[default]
    Revalidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardRejection {
    #[error("Not logged in. Run `marketlens login` first.")]
    NotAuthenticated,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard {
    policy: GuardPolicy,
}

impl RouteGuard {
    pub fn new(policy: GuardPolicy) -> Self {
        Self { policy }
    }

    pub fn check(&self, store: &SessionStore) -> Result<Session, GuardRejection> {
        let session = match self.policy {
            GuardPolicy::Cached => store.session(),
            GuardPolicy::Revalidate => store.revalidate(),
        };
        if session.is_authenticated() {
            Ok(session)
        } else {
            Err(GuardRejection::NotAuthenticated)
        }
    }
}
