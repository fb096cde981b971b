//! The single refresh-and-retry after a 401.

use std::future::Future;

use tracing::warn;

use crate::credentials::CredentialStore;
use crate::error::{ApiError, Error};

/// Run `op`; if it fails with [`ApiError::Unauthorized`], refresh the
/// access token and run it exactly once more.
///
/// A failed refresh is returned as [`Error::Auth`] without a second call.
/// A second 401 is returned as is.
pub async fn with_refresh<T, F, Fut>(credentials: &CredentialStore, mut op: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    match op().await {
        Err(ApiError::Unauthorized) => {
            warn!("Access token rejected, refreshing and retrying once");
            credentials.refresh().await?;
            Ok(op().await?)
        }
        result => Ok(result?),
    }
}
