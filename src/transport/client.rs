use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, debug, debug_span, warn};
use uuid::Uuid;

use super::response::interpret;
use super::{
    AdvertorialBackend, AnalysisBackend, AuthBackend, AuthResponse, Credentials, ResearchBackend,
    validate_url,
};
use crate::config::Settings;
use crate::errors::TransportError;
use crate::generation::models::{Artifact, GeneratedIds};
use crate::models::RecordId;
use crate::research::models::{AnalysisResult, ResearchRecord};
use crate::session::SessionStore;

const USER_AGENT: &str = concat!("marketlens/", env!("CARGO_PKG_VERSION"));
const REQUEST_ID_HEADER: &str = "X-Request-Id";
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(5);

/// HTTP client for the remote analysis service.
///
/// Reads the bearer token from the session store on every request; never
/// writes to it.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
    max_retries: u32,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl ApiClient {
    pub fn new(settings: &Settings, session: Arc<SessionStore>) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url)
            .with_context(|| format!("Invalid API base URL: {}", settings.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot carry paths: {}", settings.base_url);
        }
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url,
            session,
            max_retries: settings.max_retries,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.endpoint(segments))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send once and normalize the outcome. Each attempt gets a fresh
    /// `X-Request-Id`, recorded on the `request` span.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        operation: &'static str,
    ) -> Result<T, TransportError> {
        let request_id = Uuid::new_v4().to_string();
        let span = debug_span!("request", operation, request_id = %request_id);
        let builder = builder.header(REQUEST_ID_HEADER, &request_id);
        execute(builder).instrument(span).await
    }

    /// Send with retries on connectivity failures. Only for idempotent calls.
    async fn send_idempotent<T, F>(
        &self,
        make_request: F,
        operation: &'static str,
    ) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            match self.send(make_request(), operation).await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = retry_delay(attempt);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}

async fn execute<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, TransportError> {
    let start = Instant::now();
    let response = builder.send().await.map_err(|e| {
        warn!(error = %e, "request failed before a response arrived");
        network_error(&e)
    })?;
    let status = response.status().as_u16();
    let bytes = response.bytes().await.map_err(|e| {
        warn!(status, error = %e, "failed to read response body");
        network_error(&e)
    })?;
    debug!(
        status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "response received"
    );
    interpret(status, &bytes)
}

fn network_error(e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::network("Request timed out")
    } else if e.is_connect() {
        TransportError::network(format!("Could not reach the server: {}", e))
    } else {
        TransportError::network(e.to_string())
    }
}

/// Exponential backoff: 200ms, 400ms, 800ms, ... capped at 5s.
fn retry_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    RETRY_BASE_DELAY.saturating_mul(factor).min(RETRY_MAX_DELAY)
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, TransportError> {
        credentials.validate()?;
        let builder = self
            .request(Method::POST, &["api", "users", "login"])
            .json(credentials);
        self.send(builder, "login").await
    }

    async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, TransportError> {
        credentials.validate()?;
        let builder = self.request(Method::POST, &["auth", "register"]).form(&[
            ("email", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
        ]);
        self.send(builder, "register").await
    }
}

#[async_trait]
impl ResearchBackend for ApiClient {
    async fn list_research(&self) -> Result<Vec<ResearchRecord>, TransportError> {
        self.send_idempotent(|| self.request(Method::GET, &["research"]), "list_research")
            .await
    }

    async fn delete_research(&self, id: &RecordId) -> Result<(), TransportError> {
        let builder = self.request(Method::DELETE, &["research", id.as_str()]);
        self.send::<IgnoredAny>(builder, "delete_research").await?;
        Ok(())
    }
}

#[async_trait]
impl AdvertorialBackend for ApiClient {
    async fn generate_advertorials(
        &self,
        project_id: &RecordId,
        description: &str,
    ) -> Result<GeneratedIds, TransportError> {
        let builder = self
            .request(
                Method::POST,
                &["projects", project_id.as_str(), "advertorials", "generate"],
            )
            .json(&serde_json::json!({ "description": description }));
        self.send(builder, "generate_advertorials").await
    }

    async fn fetch_advertorial(
        &self,
        project_id: &RecordId,
        advertorial_id: &RecordId,
    ) -> Result<Artifact, TransportError> {
        self.send_idempotent(
            || {
                self.request(
                    Method::GET,
                    &[
                        "projects",
                        project_id.as_str(),
                        "advertorials",
                        advertorial_id.as_str(),
                    ],
                )
            },
            "fetch_advertorial",
        )
        .await
    }
}

#[async_trait]
impl AnalysisBackend for ApiClient {
    async fn analyze_url(&self, url: &str) -> Result<AnalysisResult, TransportError> {
        let url = validate_url(url)?;
        let builder = self
            .request(Method::POST, &["agents", "analyze-url"])
            .json(&serde_json::json!({ "url": url.as_str() }));
        self.send(builder, "analyze_url").await
    }
}
