//! Fluester Server – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Server.

use anyhow::Result;
use fluester_observability::logging_initialisieren;
use fluester_server::{config::ServerConfig, Server};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("FLUESTER_CONFIG").unwrap_or_else(|_| "config.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let geladen = ServerConfig::laden(&config_pfad)?;
    let aus_datei = geladen.is_some();
    let config = geladen.unwrap_or_default();

    // Logging initialisieren
    logging_initialisieren(&config.logging.level, &config.logging.format);

    if !aus_datei {
        tracing::warn!(
            pfad = %config_pfad,
            "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
        );
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Fluester Server wird initialisiert"
    );

    Server::neu(config).starten().await
}
