use axum::{Router, extract::State, routing::post};
use tracing::info;

use crate::routes::AppError;
use crate::state::RelayState;

pub const REFRESHED_BODY: &str = "Successfully refreshed access token";

pub fn router() -> Router<RelayState> {
    Router::new().route("/admin/refresh", post(refresh))
}

/// POST /admin/refresh - Force an access token refresh
async fn refresh(State(state): State<RelayState>) -> Result<&'static str, AppError> {
    state.credentials().refresh().await?;

    info!("POST /admin/refresh: access token refreshed");
    Ok(REFRESHED_BODY)
}
