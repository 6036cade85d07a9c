//! WebSocket-Listener – Bindet Socket, akzeptiert Verbindungen
//!
//! Der `SignalingServer` stellt einen axum-Router bereit:
//! - `GET <ws_pfad>` – WebSocket-Upgrade, pro Verbindung ein Task
//! - `GET /health`   – Health-Check JSON
//!
//! Beim Shutdown erhaelt jede Verbindung ein Close-Frame und der Listener
//! nimmt keine neuen Verbindungen mehr an.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use fluester_observability::{health_router, KennzahlenQuelle};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::broadcast::EventBroadcaster;
use crate::connection::ClientConnection;
use crate::error::SignalingResult;
use crate::server_state::SignalingState;

/// Zustand des Upgrade-Handlers
#[derive(Clone)]
struct UpgradeState {
    state: Arc<SignalingState<EventBroadcaster>>,
    shutdown_rx: watch::Receiver<bool>,
}

/// WebSocket-Signaling-Server
pub struct SignalingServer {
    state: Arc<SignalingState<EventBroadcaster>>,
    bind_addr: SocketAddr,
}

impl SignalingServer {
    /// Erstellt einen neuen SignalingServer
    pub fn neu(state: Arc<SignalingState<EventBroadcaster>>, bind_addr: SocketAddr) -> Self {
        Self { state, bind_addr }
    }

    /// Bindet den Listener und bedient Verbindungen
    ///
    /// Laeuft bis `shutdown_rx` ein `true`-Signal empfaengt.
    pub async fn starten(self, shutdown_rx: watch::Receiver<bool>) -> SignalingResult<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        self.mit_listener(listener, shutdown_rx).await
    }

    /// Bedient Verbindungen auf einem bereits gebundenen Listener
    pub async fn mit_listener(
        self,
        listener: TcpListener,
        shutdown_rx: watch::Receiver<bool>,
    ) -> SignalingResult<()> {
        let lokale_addr = listener.local_addr()?;
        let app = router(Arc::clone(&self.state), shutdown_rx.clone());

        tracing::info!(
            adresse = %lokale_addr,
            pfad = %self.state.config.ws_pfad,
            "WebSocket Signaling-Server gestartet"
        );

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_abwarten(shutdown_rx))
        .await?;

        tracing::info!(
            uptime_sek = self.state.uptime_sek(),
            "WebSocket Signaling-Server gestoppt"
        );
        Ok(())
    }
}

/// Baut den Router aus WebSocket-Route und Health-Check
pub fn router(
    state: Arc<SignalingState<EventBroadcaster>>,
    shutdown_rx: watch::Receiver<bool>,
) -> Router {
    let ws_pfad = state.config.ws_pfad.clone();
    let quelle: Arc<dyn KennzahlenQuelle> = state.clone();

    Router::new()
        .route(&ws_pfad, get(ws_handler))
        .with_state(UpgradeState { state, shutdown_rx })
        .merge(health_router(quelle))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// `GET <ws_pfad>` – WebSocket-Upgrade
async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    State(upgrade): State<UpgradeState>,
) -> Response {
    let max_bytes = upgrade.state.config.max_nachricht_bytes;
    ws.max_message_size(max_bytes)
        .max_frame_size(max_bytes)
        .on_upgrade(move |socket| async move {
            let verbindung = ClientConnection::neu(upgrade.state, peer_addr);
            verbindung.verarbeiten(socket, upgrade.shutdown_rx).await;
        })
}

/// Wartet bis das Shutdown-Signal gesetzt oder der Sender weg ist
async fn shutdown_abwarten(mut shutdown_rx: watch::Receiver<bool>) {
    while !*shutdown_rx.borrow_and_update() {
        if shutdown_rx.changed().await.is_err() {
            break;
        }
    }
    tracing::info!("Signaling-Server: Shutdown-Signal empfangen");
}
