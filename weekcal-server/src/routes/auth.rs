//! Browser authorization endpoints

use axum::{
    Router,
    extract::{Query, State},
    response::Redirect,
    routing::get,
};
use serde::Deserialize;
use tracing::{info, warn};
use weekcal_core::google::oauth;

use crate::routes::AppError;
use crate::state::RelayState;

pub const AUTHORIZED_BODY: &str = "Authorization successful. You can close this window.";

pub fn router() -> Router<RelayState> {
    Router::new()
        .route("/auth/google", get(start))
        .route("/auth/callback", get(callback))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// GET /auth/google - Redirect the browser to Google's consent page
async fn start(State(state): State<RelayState>) -> Result<Redirect, AppError> {
    let client_id = state.credentials().snapshot().client_id;
    let url = oauth::consent_url(state.client().endpoints(), &client_id, state.redirect_uri())?;

    info!("GET /auth/google: redirecting to consent page");
    Ok(Redirect::temporary(url.as_str()))
}

/// GET /auth/callback?code=... - Exchange the code and store the new tokens
async fn callback(
    State(state): State<RelayState>,
    Query(params): Query<CallbackParams>,
) -> Result<&'static str, AppError> {
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        if let Some(error) = params.error {
            warn!("Authorization denied: {}", error);
        }
        return Err(AppError::bad_request("No authorization code received"));
    };

    let creds = state.credentials().snapshot();
    let tokens = oauth::exchange_code(
        state.client().http(),
        state.client().endpoints(),
        &creds,
        &code,
        state.redirect_uri(),
    )
    .await?;

    state
        .credentials()
        .replace_tokens(&tokens.access_token, tokens.refresh_token.as_deref())?;
    state.signal_authorized();

    info!("GET /auth/callback: tokens stored");
    Ok(AUTHORIZED_BODY)
}
