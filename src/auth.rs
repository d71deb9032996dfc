//! Login, registration and logout: the only writers of the session.

use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::AuthError;
use crate::models::User;
use crate::session::SessionStore;
use crate::transport::{AuthBackend, AuthResponse, Credentials};

pub struct AuthFlow<B: AuthBackend> {
    backend: Arc<B>,
    session: Arc<SessionStore>,
}

impl<B: AuthBackend> AuthFlow<B> {
    pub fn new(backend: Arc<B>, session: Arc<SessionStore>) -> Self {
        Self { backend, session }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        credentials.validate()?;
        let response = self.backend.login(credentials).await.inspect_err(|e| {
            warn!(email = %credentials.email, error = %e, "login failed");
        })?;
        self.store(response)
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<User, AuthError> {
        credentials.validate()?;
        let response = self.backend.register(credentials).await.inspect_err(|e| {
            warn!(email = %credentials.email, error = %e, "registration failed");
        })?;
        self.store(response)
    }

    pub fn logout(&self) {
        self.session.clear_auth();
        info!("logged out");
    }

    fn store(&self, response: AuthResponse) -> Result<User, AuthError> {
        let AuthResponse { access_token, user } = response;
        self.session.set_auth(&access_token, user.clone())?;
        info!(user_id = %user.id, "signed in");
        Ok(user)
    }
}
