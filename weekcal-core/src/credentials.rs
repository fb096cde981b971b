//! OAuth credentials and the shared store that refreshes them.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::header::ACCEPT;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{self, ACCESS_TOKEN, REFRESH_TOKEN};
use crate::error::{AuthError, ConfigError};
use crate::google::Endpoints;
use crate::google::oauth::TokenResponse;

/// OAuth client, tokens and target calendar.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub calendar_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("calendar_id", &self.calendar_id)
            .finish()
    }
}

/// Process-wide credential holder, cheap to clone.
///
/// Readers take a snapshot of the access token per request. Token
/// replacement is serialized: one refresh runs at a time, and the new token
/// is persisted before it becomes visible.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<Inner>,
}

struct Inner {
    credentials: RwLock<Credentials>,
    refresh_lock: Mutex<()>,
    http: reqwest::Client,
    token_url: String,
    config_path: Option<PathBuf>,
}

impl CredentialStore {
    /// `config_path` is where refreshed tokens are persisted; `None` keeps
    /// them in memory only.
    pub fn new(credentials: Credentials, endpoints: &Endpoints, config_path: Option<PathBuf>) -> Self {
        Self::with_http(reqwest::Client::new(), credentials, endpoints, config_path)
    }

    pub fn with_http(
        http: reqwest::Client,
        credentials: Credentials,
        endpoints: &Endpoints,
        config_path: Option<PathBuf>,
    ) -> Self {
        CredentialStore {
            inner: Arc::new(Inner {
                credentials: RwLock::new(credentials),
                refresh_lock: Mutex::new(()),
                http,
                token_url: endpoints.token_url.clone(),
                config_path,
            }),
        }
    }

    pub fn current_access_token(&self) -> String {
        self.read(|c| c.access_token.clone())
    }

    pub fn calendar_id(&self) -> String {
        self.read(|c| c.calendar_id.clone())
    }

    pub fn snapshot(&self) -> Credentials {
        self.read(Credentials::clone)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// On any failure the stored tokens are left exactly as they were.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let seen = self.current_access_token();
        let _guard = self.inner.refresh_lock.lock().await;

        // Another caller refreshed while we were waiting for the lock
        if self.current_access_token() != seen {
            debug!("Access token already refreshed by a concurrent caller");
            return Ok(());
        }

        let creds = self.snapshot();
        info!("Refreshing access token");

        let response = self
            .inner
            .http
            .post(&self.inner.token_url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("refresh_token", creds.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .inspect_err(|e| warn!("Token refresh request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Token refresh failed with status {}: {}", status, body);
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let tokens: TokenResponse = response.json().await?;
        self.replace_tokens(&tokens.access_token, tokens.refresh_token.as_deref())?;

        info!("Access token refreshed");
        Ok(())
    }

    /// Install new tokens, persisting them first.
    ///
    /// An empty or absent refresh token keeps the current one; Google
    /// usually omits it on refresh.
    pub fn replace_tokens(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), ConfigError> {
        let refresh_token = refresh_token.filter(|t| !t.is_empty());

        if let Some(path) = &self.inner.config_path {
            let mut updates = vec![(ACCESS_TOKEN, access_token)];
            if let Some(rt) = refresh_token {
                updates.push((REFRESH_TOKEN, rt));
            }
            config::update_env_file(path, &updates)?;
        }

        let mut creds = self
            .inner
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        creds.access_token = access_token.to_string();
        if let Some(rt) = refresh_token {
            creds.refresh_token = rt.to_string();
        }

        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&Credentials) -> T) -> T {
        let creds = self
            .inner
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&creds)
    }
}
