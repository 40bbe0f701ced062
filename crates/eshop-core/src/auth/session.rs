use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::{ApiError, AUTH_TOKEN_HEADER};
use crate::models::{SignInRequest, SignInResponse};
use crate::storage::{IS_ADMIN_KEY, ORDER_PRODUCT_KEY, ORDER_QUANTITY_KEY};

use super::{Credential, TokenStore};

/// Protected endpoint used as a cheap "is my token still accepted" probe
const VALIDATION_PATH: &str = "/addresses";

/// Default lifetime stamped on a new credential
pub const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Default interval between background re-validations
pub const DEFAULT_REVALIDATION_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Single authority for whether the user is signed in.
/// Clone is cheap - the store and reqwest::Client are Arc-backed.
#[derive(Clone)]
pub struct SessionManager {
    store: TokenStore,
    client: Client,
    base_url: String,
    token_lifetime: Option<chrono::Duration>,
}

impl SessionManager {
    pub fn new(store: TokenStore, client: Client, base_url: impl Into<String>) -> Self {
        Self {
            store,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_lifetime: Some(chrono::Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS)),
        }
    }

    /// Lifetime stamped on credentials issued by `login`; `None` stores no expiry
    pub fn with_token_lifetime(mut self, lifetime: Option<chrono::Duration>) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The current credential, if present and unexpired.
    /// An expired credential is cleared as a side effect.
    pub fn current(&self) -> Option<Credential> {
        let credential = self.store.read()?;
        if credential.is_expired() {
            info!("Stored credential has expired, clearing it");
            self.store.clear();
            return None;
        }
        Some(credential)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated()
            && matches!(
                self.store.durable().get(IS_ADMIN_KEY),
                Ok(Some(ref v)) if v == "true"
            )
    }

    /// Exchange username and password for a credential and store it.
    /// Nothing is written unless the sign-in succeeds.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/signin"))
            .json(&SignInRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(username, status = status.as_u16(), "Sign-in rejected");
            return Err(ApiError::AuthenticationFailed);
        }

        let header_token = response
            .headers()
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string());

        let text = response.text().await?;
        let body: SignInResponse = if text.trim().is_empty() {
            SignInResponse::default()
        } else {
            serde_json::from_str(&text).unwrap_or_else(|e| {
                debug!(error = %e, "Sign-in response body is not the expected JSON");
                SignInResponse::default()
            })
        };

        let token = header_token
            .filter(|t| !t.is_empty())
            .or_else(|| body.token.clone().filter(|t| !t.is_empty()))
            .ok_or_else(|| {
                warn!(username, "Sign-in succeeded but no token was issued");
                ApiError::AuthenticationFailed
            })?;

        let credential = match self.token_lifetime {
            Some(lifetime) => Credential::with_expiry(token, Utc::now() + lifetime),
            None => Credential::new(token),
        };
        self.store.save(&credential);
        self.set_admin(body.is_admin());

        info!(username, admin = body.is_admin(), "Signed in");
        Ok(credential)
    }

    /// Forget the credential and everything tied to it. There is no
    /// server-side session to end.
    pub fn logout(&self) {
        self.forget_credential();
        for key in [ORDER_PRODUCT_KEY, ORDER_QUANTITY_KEY] {
            if let Err(e) = self.store.durable().remove(key) {
                warn!(key, error = %e, "Failed to clear pending order");
            }
        }
        info!("Signed out");
    }

    /// Clear local state after the remote API rejected `credential`.
    /// A credential replaced by a newer sign-in in the meantime is kept.
    pub(crate) fn invalidate(&self, credential: &Credential) {
        match self.store.read() {
            Some(current) if current.value == credential.value => {
                info!(token = %credential.preview(), "Credential rejected by server, clearing session");
                self.forget_credential();
            }
            Some(_) => debug!("Rejected credential was already replaced, keeping the newer one"),
            None => {}
        }
    }

    /// Ask the remote API whether the stored credential is still accepted.
    pub async fn validate(&self) -> bool {
        match self.current() {
            Some(credential) => self.validate_credential(&credential).await,
            None => false,
        }
    }

    async fn validate_credential(&self, credential: &Credential) -> bool {
        let result = self
            .client
            .get(self.url(VALIDATION_PATH))
            .header(AUTH_TOKEN_HEADER, &credential.value)
            .send()
            .await;

        match result {
            Ok(response) => {
                let ok = response.status().is_success();
                debug!(status = response.status().as_u16(), ok, "Token validation");
                ok
            }
            Err(e) => {
                warn!(error = %e, "Token validation request failed");
                false
            }
        }
    }

    /// One background re-validation pass: clears the session if the
    /// server no longer accepts the credential.
    pub async fn revalidate(&self) -> SessionState {
        let Some(credential) = self.current() else {
            return SessionState::Anonymous;
        };
        if self.validate_credential(&credential).await {
            SessionState::Authenticated
        } else {
            self.invalidate(&credential);
            self.state()
        }
    }

    /// Re-validate the session every `interval` until the handle is dropped.
    pub fn spawn_revalidation(&self, interval: Duration) -> RevalidationHandle {
        let session = self.clone();
        let (tx, rx) = watch::channel(self.state());

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let state = session.revalidate().await;
                tx.send_if_modified(|current| {
                    if *current != state {
                        debug!(?state, "Session state changed");
                        *current = state;
                        true
                    } else {
                        false
                    }
                });
            }
        });

        RevalidationHandle { task, state: rx }
    }

    fn forget_credential(&self) {
        self.store.clear();
        if let Err(e) = self.store.durable().remove(IS_ADMIN_KEY) {
            warn!(error = %e, "Failed to clear admin flag");
        }
    }

    fn set_admin(&self, admin: bool) {
        let result = if admin {
            self.store.durable().set(IS_ADMIN_KEY, "true")
        } else {
            self.store.durable().remove(IS_ADMIN_KEY)
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to store admin flag");
        }
    }
}

/// Running background re-validation. Dropping it stops the task.
pub struct RevalidationHandle {
    task: JoinHandle<()>,
    state: watch::Receiver<SessionState>,
}

impl RevalidationHandle {
    /// Receiver notified whenever a pass changes the session state
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    pub fn stop(self) {}
}

impl Drop for RevalidationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
