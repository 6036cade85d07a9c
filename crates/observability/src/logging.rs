//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `FL_LOG_LEVEL`: Log-Level oder Filter-Direktive, Standard: info
//! - `FL_LOG_FORMAT`: Format (text/json), Standard: text
//!
//! Umgebungsvariablen haben Vorrang vor den Werten aus der Konfiguration.
//! Geloggt werden Verbindungs-IDs und Channel-Namen, niemals Codes oder
//! Payload-Inhalte.

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "FL_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "FL_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Liest `FL_LOG_LEVEL` und `FL_LOG_FORMAT` aus der Umgebung.
/// Faellt auf die uebergebenen Werte und zuletzt auf `info` / `text` zurueck.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format_env = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| format.to_string());

    match format_env.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_current_span(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
