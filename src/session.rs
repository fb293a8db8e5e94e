//! # Sessions
//!
//! Authentication against the hosted identity store and the
//! application-wide session state.
//!
//! [`AuthClient`] speaks the auth endpoint's wire protocol. [`SessionGate`]
//! owns the current session for the whole app: initialized at startup,
//! updated on every auth event, observable through a watch subscription so
//! the root view can route between the signed-in and signed-out stacks.
//! Reads work anonymously; every mutation asks the gate for the current
//! identity first and fails fast without one. A failed session lookup means
//! "anonymous", never an error.

use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;
use tracing::warn;

use crate::{
    config::Config,
    error::AppError,
    models::{Identity, Session},
};

/// Sign-up form state. The profile row itself is created by a backend
/// trigger; the display name travels as user metadata.
#[derive(Debug, Clone)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub fn validate_registration(registration: &Registration) -> Result<(), AppError> {
    if registration.full_name.is_empty()
        || registration.email.is_empty()
        || registration.password.is_empty()
        || registration.confirm_password.is_empty()
    {
        return Err(AppError::Validation("Please fill in all fields".to_string()));
    }

    if registration.password != registration.confirm_password {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }

    if registration.password.chars().count() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    Ok(())
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: Identity,
}

#[derive(Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

// Auth failures surface the backend's own message (bad credentials,
// duplicate email), not a rephrased one.
async fn auth_checked(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<AuthErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.error_description.or(parsed.msg).or(parsed.message))
        .unwrap_or_else(|| format!("{status}: {body}"));

    Err(AppError::Auth(message))
}

pub struct AuthClient {
    client: Client,
    base: String,
    anon_key: String,
}

impl AuthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base: config.backend_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let body: TokenResponse = auth_checked(response).await?.json().await?;

        Ok(Session {
            access_token: body.access_token,
            user: body.user,
        })
    }

    pub async fn sign_up(&self, registration: &Registration) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "email": registration.email,
                "password": registration.password,
                "data": { "full_name": registration.full_name },
            }))
            .send()
            .await?;

        auth_checked(response).await?;
        Ok(())
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        auth_checked(response).await?;
        Ok(())
    }

    pub async fn fetch_user(&self, access_token: &str) -> Result<Identity, AppError> {
        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        Ok(auth_checked(response).await?.json().await?)
    }
}

pub struct SessionGate {
    auth: AuthClient,
    sessions: watch::Sender<Option<Session>>,
}

impl SessionGate {
    pub fn new(auth: AuthClient) -> Self {
        Self {
            auth,
            sessions: watch::Sender::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.sessions.borrow().clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.sessions.borrow().as_ref().map(|s| s.user.clone())
    }

    /// Revalidates a stored token at startup. Any failure leaves the app
    /// anonymous.
    pub async fn restore(&self, access_token: &str) {
        match self.auth.fetch_user(access_token).await {
            Ok(user) => {
                self.sessions.send_replace(Some(Session {
                    access_token: access_token.to_string(),
                    user,
                }));
            }
            Err(e) => warn!("Session restore failed, continuing anonymous: {e}"),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation("Please fill in all fields".to_string()));
        }

        let session = self.auth.sign_in(email, password).await?;
        let identity = session.user.clone();
        self.sessions.send_replace(Some(session));

        Ok(identity)
    }

    /// Validates the form before any remote call. Success does not open a
    /// session: the account has to be confirmed by email first.
    pub async fn sign_up(&self, registration: &Registration) -> Result<(), AppError> {
        validate_registration(registration)?;
        self.auth.sign_up(registration).await
    }

    /// Revokes the token remotely when possible, clears the local session
    /// either way.
    pub async fn sign_out(&self) {
        if let Some(session) = self.current_session() {
            if let Err(e) = self.auth.sign_out(&session.access_token).await {
                warn!("Sign-out revoke failed: {e}");
            }
        }

        self.sessions.send_replace(None);
    }
}
