//! Transport adapter: the only code allowed to talk to the remote service.
//!
//! ## Operations
//!
//! | Trait                | Method                  | HTTP                                               | Retry-safe |
//! |----------------------|-------------------------|----------------------------------------------------|------------|
//! | `AuthBackend`        | `login`                 | `POST /api/users/login` (JSON)                     | no         |
//! | `AuthBackend`        | `register`              | `POST /auth/register` (form)                       | no         |
//! | `ResearchBackend`    | `list_research`         | `GET /research`                                    | yes        |
//! | `ResearchBackend`    | `delete_research`       | `DELETE /research/{id}`                            | no         |
//! | `AdvertorialBackend` | `generate_advertorials` | `POST /projects/{pid}/advertorials/generate`       | no         |
//! | `AdvertorialBackend` | `fetch_advertorial`     | `GET /projects/{pid}/advertorials/{aid}`           | yes        |
//! | `AnalysisBackend`    | `analyze_url`           | `POST /agents/analyze-url`                         | no         |
//!
//! Every method returns `Result<T, TransportError>` and never panics across
//! the boundary. The adapter never clears the session on `Unauthorized`;
//! that is the consuming command's call.

pub mod client;
pub mod response;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::TransportError;
use crate::generation::models::{Artifact, GeneratedIds};
use crate::models::{RecordId, User};
use crate::research::models::{AnalysisResult, ResearchRecord};

pub use client::ApiClient;

/// Email + password pair for login and registration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Cheap local checks before any network call.
    pub fn validate(&self) -> Result<(), TransportError> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(TransportError::validation("Please enter a valid email address"));
        }
        if self.password.is_empty() {
            return Err(TransportError::validation("Password must not be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login / registration payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, TransportError>;
    async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, TransportError>;
}

#[async_trait]
pub trait ResearchBackend: Send + Sync {
    async fn list_research(&self) -> Result<Vec<ResearchRecord>, TransportError>;
    async fn delete_research(&self, id: &RecordId) -> Result<(), TransportError>;
}

#[async_trait]
pub trait AdvertorialBackend: Send + Sync {
    async fn generate_advertorials(
        &self,
        project_id: &RecordId,
        description: &str,
    ) -> Result<GeneratedIds, TransportError>;

    async fn fetch_advertorial(
        &self,
        project_id: &RecordId,
        advertorial_id: &RecordId,
    ) -> Result<Artifact, TransportError>;
}

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze_url(&self, url: &str) -> Result<AnalysisResult, TransportError>;
}

/// Local URL check done before `analyze_url` touches the network.
pub fn validate_url(raw: &str) -> Result<reqwest::Url, TransportError> {
    let trimmed = raw.trim();
    let url = reqwest::Url::parse(trimmed)
        .map_err(|_| TransportError::validation(format!("'{}' is not a valid URL", trimmed)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(TransportError::validation(format!(
            "URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(TransportError::validation("URL must include a host"));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportErrorKind;

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("https://www.reddit.com/r/running").is_ok());
        assert!(validate_url("  http://example.com  ").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_garbage() {
        for bad in ["", "reddit.com/r/running", "ftp://example.com", "mailto:a@b.com"] {
            let err = validate_url(bad).unwrap_err();
            assert_eq!(err.kind, TransportErrorKind::Validation, "{}", bad);
        }
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new("a@b.com", "secret1").validate().is_ok());
        assert!(Credentials::new("ab.com", "secret1").validate().is_err());
        assert!(Credentials::new("a@b.com", "").validate().is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("a@b.com", "secret1"));
        assert!(!rendered.contains("secret1"));
        assert!(rendered.contains("a@b.com"));
    }

    #[test]
    fn test_auth_response_deserialize() {
        let resp: AuthResponse =
            serde_json::from_str(r#"{"access_token":"tok1","user":{"id":1}}"#).unwrap();
        assert_eq!(resp.access_token, "tok1");
        assert_eq!(resp.user.id.as_str(), "1");
    }
}
