//! Google OAuth 2.0 authorization-code flow.

use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::credentials::Credentials;
use crate::error::AuthError;
use crate::google::Endpoints;

pub const SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

/// Token endpoint response, for both code exchange and refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Only sent on code exchange, and on refresh when Google rotates it.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: String,
}

/// The consent page URL the user is redirected to.
///
/// Requests offline access with a forced consent prompt so Google always
/// returns a refresh token.
pub fn consent_url(
    endpoints: &Endpoints,
    client_id: &str,
    redirect_uri: &str,
) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        &endpoints.auth_url,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
}

/// Exchange an authorization code for tokens.
pub async fn exchange_code(
    http: &reqwest::Client,
    endpoints: &Endpoints,
    creds: &Credentials,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse, AuthError> {
    info!("Exchanging authorization code for tokens");

    let response = http
        .post(&endpoints.token_url)
        .header(ACCEPT, "application/json")
        .form(&[
            ("code", code),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Token exchange failed with status {}: {}", status, body);
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}
