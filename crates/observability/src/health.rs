//! Health-Check-Endpunkt fuer Fluester
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime, Anzahl lebender Channels und
//! offener Verbindungen

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Liefert die Kennzahlen fuer den Health-Check
///
/// Wird vom Signaling-Zustand implementiert, damit dieser Crate den Kern
/// nicht kennen muss.
pub trait KennzahlenQuelle: Send + Sync + 'static {
    /// Anzahl der aktuell lebenden Channels
    fn aktive_channels(&self) -> usize;

    /// Anzahl der offenen Verbindungen
    fn verbindungen(&self) -> usize;
}

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub aktive_channels: usize,
    pub verbindungen: usize,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
struct HealthState {
    start_time: Instant,
    quelle: Arc<dyn KennzahlenQuelle>,
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(quelle: Arc<dyn KennzahlenQuelle>) -> Router {
    let state = HealthState {
        start_time: Instant::now(),
        quelle,
    };
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        aktive_channels: state.quelle.aktive_channels(),
        verbindungen: state.quelle.verbindungen(),
    };

    (StatusCode::OK, Json(response))
}
