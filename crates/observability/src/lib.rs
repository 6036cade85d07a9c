//! # fluester-observability
//!
//! Observability-Crate fuer Fluester:
//! - Health-Check-Endpunkt (`/health`) mit Kennzahlen des Signaling-Kerns
//! - Structured Logging via tracing-subscriber (Text oder JSON)

pub mod health;
pub mod logging;

pub use health::{health_router, HealthResponse, HealthStatus, KennzahlenQuelle};
pub use logging::logging_initialisieren;
