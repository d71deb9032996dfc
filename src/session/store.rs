//! The session store: the single source of truth for "who is logged in".
//!
//! Every write goes to durable storage first and only then to memory, under
//! one write lock, so no reader observes memory and storage disagreeing and
//! a reload right after `set_auth`/`clear_auth` sees the new state.
//!
//! Storage write failures are swallowed here. The session ends up empty
//! ("still logged out") and a warning is logged.

use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::storage::{SessionStorage, TOKEN_KEY, USER_KEY};
use crate::errors::SessionError;
use crate::models::User;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// The client's belief about who is logged in.
///
/// Token and user are either both present or both absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    fn authenticated(token: String, user: User) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Emitted after storage has been written.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn { user: User },
    SignedOut,
}

pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    session: RwLock<Session>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionStore {
    /// Read the persisted session. Never fails: missing, partial or
    /// malformed data yields the empty session.
    pub fn initialize(storage: Arc<dyn SessionStorage>) -> Self {
        let session = read_persisted(storage.as_ref());
        debug!(authenticated = session.is_authenticated(), "session initialized");
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            session: RwLock::new(session),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn user(&self) -> Option<User> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated()
    }

    /// Persist `token` + `user`, then publish them.
    ///
    /// Only `EmptyToken` is reported. A storage failure leaves the store
    /// logged out.
    pub fn set_auth(&self, token: &str, user: User) -> Result<(), SessionError> {
        if token.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        match self.persist(token, &user) {
            Ok(()) => {
                *session = Session::authenticated(token.to_string(), user.clone());
                drop(session);
                debug!(user_id = %user.id, "session stored");
                let _ = self.events.send(SessionEvent::SignedIn { user });
            }
            Err(e) => {
                warn!(error = %e, "could not persist session; staying logged out");
                self.remove_keys();
                let was_authenticated = session.is_authenticated();
                *session = Session::empty();
                drop(session);
                if was_authenticated {
                    let _ = self.events.send(SessionEvent::SignedOut);
                }
            }
        }
        Ok(())
    }

    /// Remove the persisted session and reset memory.
    pub fn clear_auth(&self) {
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        self.remove_keys();
        let was_authenticated = session.is_authenticated();
        *session = Session::empty();
        drop(session);
        debug!("session cleared");
        if was_authenticated {
            let _ = self.events.send(SessionEvent::SignedOut);
        }
    }

    /// Re-read durable storage; external clearing is only noticed here.
    pub fn revalidate(&self) -> Session {
        let persisted = read_persisted(self.storage.as_ref());
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        if *session == persisted {
            return persisted;
        }
        *session = persisted.clone();
        drop(session);
        debug!(
            authenticated = persisted.is_authenticated(),
            "session changed in storage"
        );
        let event = match persisted.user() {
            Some(user) => SessionEvent::SignedIn { user: user.clone() },
            None => SessionEvent::SignedOut,
        };
        let _ = self.events.send(event);
        persisted
    }

    fn persist(&self, token: &str, user: &User) -> Result<(), SessionError> {
        let user_json = serde_json::to_string(user).map_err(|e| SessionError::Storage {
            key: USER_KEY.to_string(),
            source: e.into(),
        })?;
        self.storage
            .set(TOKEN_KEY, token)
            .map_err(|source| SessionError::Storage {
                key: TOKEN_KEY.to_string(),
                source,
            })?;
        self.storage
            .set(USER_KEY, &user_json)
            .map_err(|source| SessionError::Storage {
                key: USER_KEY.to_string(),
                source,
            })
    }

    fn remove_keys(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "could not remove persisted session key");
            }
        }
    }
}

fn read_persisted(storage: &dyn SessionStorage) -> Session {
    let token = match storage.get(TOKEN_KEY) {
        Ok(Some(token)) if !token.trim().is_empty() => token,
        Ok(_) => return Session::empty(),
        Err(e) => {
            warn!(error = %e, "could not read persisted token");
            return Session::empty();
        }
    };
    let user = match storage.get(USER_KEY) {
        Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "persisted user is malformed; ignoring session");
                return Session::empty();
            }
        },
        Ok(None) => {
            debug!("persisted token without user; ignoring session");
            return Session::empty();
        }
        Err(e) => {
            warn!(error = %e, "could not read persisted user");
            return Session::empty();
        }
    };
    Session::authenticated(token, user)
}
