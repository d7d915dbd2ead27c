//! HTTP listener and top-level server wiring.
//!
//! This module:
//! - Builds the [`Hub`]: the session registry plus the single router
//!   task that owns the scene.
//! - Serves `GET /ws` as the scene WebSocket, assigning each upgrade a
//!   `ClientId` and handing it to a per-client gateway task.
//! - Serves every other path from the static asset directory.
//!
//! The per-client logic and router loop live in `client` and
//! `router_task` respectively.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::client;
use crate::config::Config;
use crate::registry::SessionRegistry;
use crate::router_task;
use crate::types::{ClientId, RouterTx};

/// Route of the scene WebSocket.
pub const WS_PATH: &str = "/ws";

/// Process-scoped scene service: the router queue and the session registry.
///
/// Built once at startup; the router task lives as long as any clone
/// of the queue sender does.
#[derive(Debug)]
pub struct Hub {
    router_tx: RouterTx,
    registry: SessionRegistry,
    next_client_id: AtomicU64,
    /// Gateways accepted and not yet finished, joined or not.
    connections: AtomicUsize,
}

impl Hub {
    /// Spawn the router task and return the hub in front of it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start() -> Arc<Hub> {
        let registry = SessionRegistry::new();
        let (router_tx, router_rx) = mpsc::unbounded_channel();

        tokio::spawn(router_task::run_router_loop(router_rx, registry.clone()));

        Arc::new(Hub {
            router_tx,
            registry,
            next_client_id: AtomicU64::new(1),
            connections: AtomicUsize::new(0),
        })
    }

    /// Reserve a connection slot if fewer than `max` are in use.
    ///
    /// The slot is released when the returned guard is dropped.
    pub fn try_connect(self: &Arc<Self>, max: usize) -> Option<ConnectionSlot> {
        self.connections
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .ok()
            .map(|_| ConnectionSlot {
                hub: Arc::clone(self),
            })
    }

    /// Number of connection slots currently held.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::Acquire)
    }

    pub fn next_client_id(&self) -> ClientId {
        ClientId(self.next_client_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn router(&self) -> &RouterTx {
        &self.router_tx
    }
}

/// One held connection slot; see [`Hub::try_connect`].
#[derive(Debug)]
pub struct ConnectionSlot {
    hub: Arc<Hub>,
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.hub.connections.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Clone)]
struct AppState {
    hub: Arc<Hub>,
    max_clients: usize,
}

/// Build the axum application for `hub`.
pub fn app(hub: Arc<Hub>, config: &Config) -> Router {
    let state = AppState {
        hub,
        max_clients: config.max_clients,
    };

    Router::new()
        .route(WS_PATH, get(ws_handler))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let Some(slot) = state.hub.try_connect(state.max_clients) else {
        warn!(
            connected = state.hub.connections(),
            max_clients = state.max_clients,
            "rejecting connection: max_clients reached"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "too many clients").into_response();
    };

    let client_id = state.hub.next_client_id();
    info!(%client_id, "incoming connection");

    let router_tx = state.hub.router().clone();
    ws.on_failed_upgrade(move |e| warn!(%client_id, error = %e, "websocket upgrade failed"))
        .on_upgrade(move |socket| async move {
            client::run_client(client_id, socket, router_tx).await;
            drop(slot);
        })
}

/// Serve the hub on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, config: Config, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let hub = Hub::start();
    let app = app(hub, &config);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("serve scene hub")
}

/// Bind the configured address and run until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, static_dir = %config.static_dir.display(), "listening");

    serve(listener, config, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
