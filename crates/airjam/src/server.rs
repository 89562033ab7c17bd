//! Router assembly, process bootstrap, and graceful shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use airjam_room::RoomRegistry;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{AuthMode, Config};
use crate::handler::handle_socket;
use crate::AppError;

/// State shared across every connection task.
pub(crate) struct AppState {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) verifier: AuthMode,
    next_conn_id: AtomicU64,
}

impl AppState {
    fn new(verifier: AuthMode) -> Self {
        Self {
            registry: Mutex::new(RoomRegistry::new()),
            verifier,
            next_conn_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn next_conn_id(&self) -> u64 {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        handle_socket(socket, state).await;
    })
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Builds the router and the shutdown future that drains every room, given
/// an already-resolved auth mode. Split out from [`run`] so tests can bind
/// their own (ephemeral) listener instead of a configured port.
pub async fn build_app(verifier: AuthMode) -> (Router, impl std::future::Future<Output = ()>) {
    let state = Arc::new(AppState::new(verifier));
    let router = build_router(Arc::clone(&state));
    (router, shutdown_signal(state))
}

/// Builds the app state and router, binds the configured port, and serves
/// until the process receives a shutdown signal (SIGINT/SIGTERM), draining
/// every live room before returning.
pub async fn run(config: Config) -> Result<(), AppError> {
    let verifier = config.build_verifier().await?;
    let (router, shutdown) = build_app(verifier).await;

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "airjam listening");

    axum::serve(listener, router).with_graceful_shutdown(shutdown).await?;

    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, draining rooms");
    state.registry.lock().await.shutdown_all().await;
}
