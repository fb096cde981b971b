//! Local HTTP relay in front of the Google Calendar API.
//!
//! The relay holds the OAuth credentials so local clients never see them.
//! It runs as a task owned by a [`RelayHandle`]; dropping the handle's
//! shutdown sender or calling [`RelayHandle::stop`] ends it.

pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tokio::sync::{Notify, oneshot};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use weekcal_core::CalendarClient;

use crate::state::RelayState;

/// A relay waiting to be started on `port` (0 picks a free one).
pub struct RelayServer {
    client: CalendarClient,
    port: u16,
}

impl RelayServer {
    pub fn new(client: CalendarClient, port: u16) -> Self {
        RelayServer { client, port }
    }

    /// Bind `127.0.0.1:<port>` and serve in a background task.
    pub async fn start(self) -> Result<RelayHandle> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind relay on {}", addr))?;
        let addr = listener.local_addr()?;

        let authorized = Arc::new(Notify::new());
        let redirect_uri = format!("http://localhost:{}/auth/callback", addr.port());
        let state = RelayState::new(self.client, redirect_uri, authorized.clone());
        let app = router(state, addr.port())?;

        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = signal.await;
                })
                .await
        });

        info!("weekcal relay listening on http://{}", addr);
        Ok(RelayHandle {
            addr,
            shutdown: Some(shutdown),
            task,
            authorized,
        })
    }
}

/// All relay routes with CORS for `http://localhost:<port>`.
pub fn router(state: RelayState, port: u16) -> Result<Router> {
    let origin = HeaderValue::from_str(&format!("http://localhost:{}", port))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Ok(Router::new()
        .merge(routes::events::router())
        .merge(routes::admin::router())
        .merge(routes::auth::router())
        .with_state(state)
        .layer(cors))
}

/// A running relay.
pub struct RelayHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
    authorized: Arc<Notify>,
}

impl RelayHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL clients should use, e.g. `http://localhost:8080`.
    pub fn base_url(&self) -> String {
        format!("http://localhost:{}", self.addr.port())
    }

    /// Resolves once `/auth/callback` has stored new tokens.
    pub async fn authorized(&self) {
        self.authorized.notified().await;
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        match self.task.await {
            Ok(result) => result.context("Relay server failed")?,
            Err(e) => warn!("Relay task ended abnormally: {}", e),
        }

        info!("weekcal relay on {} stopped", self.addr);
        Ok(())
    }
}
