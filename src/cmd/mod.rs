//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module         | Commands handled                              |
//! |----------------|-----------------------------------------------|
//! | `auth`         | `Login`, `Register`, `Logout`, `Whoami`       |
//! | `research`     | `Research`                                    |
//! | `advertorials` | `Advertorials`                                |
//! | `config`       | `Config`                                      |
//!
//! Commands are the "pages" of the client: protected ones run the route
//! guard first and own their `Unauthorized` handling.

pub mod advertorials;
pub mod auth;
pub mod config;
pub mod research;

pub use advertorials::cmd_advertorials;
pub use auth::{cmd_login, cmd_logout, cmd_register, cmd_whoami};
pub use config::cmd_config;
pub use research::cmd_research;

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use marketlens::config::Settings;
use marketlens::errors::TransportError;
use marketlens::session::{FileStorage, RouteGuard, Session, SessionStore};
use marketlens::ApiClient;

/// Everything a command needs, built once per invocation.
pub struct AppContext {
    pub settings: Settings,
    pub session: Arc<SessionStore>,
    pub client: Arc<ApiClient>,
    pub json: bool,
}

impl AppContext {
    pub fn new(settings: Settings, json: bool) -> Result<Self> {
        let storage = Arc::new(FileStorage::new(settings.storage_dir.clone()));
        let session = Arc::new(SessionStore::initialize(storage));
        let client = Arc::new(
            ApiClient::new(&settings, Arc::clone(&session)).context("Failed to set up API client")?,
        );
        Ok(Self {
            settings,
            session,
            client,
            json,
        })
    }

    /// Run the route guard; protected commands call this first.
    pub fn require_session(&self) -> Result<Session> {
        Ok(RouteGuard::default().check(&self.session)?)
    }

    /// Turn a transport failure into a command error. An `Unauthorized`
    /// response means the stored token is no good, so the session is dropped.
    pub fn transport_failure(&self, err: TransportError) -> anyhow::Error {
        if err.is_unauthorized() {
            self.session.clear_auth();
            anyhow::anyhow!(
                "Session expired or rejected ({}). Run `marketlens login` again.",
                err.message
            )
        } else {
            anyhow::Error::new(err)
        }
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
        println!("{}", out);
        Ok(())
    }
}
