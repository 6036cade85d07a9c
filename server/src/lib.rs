//! fluester-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;

use anyhow::Result;
use config::ServerConfig;
use fluester_auth::CodeHasher;
use fluester_signaling::{EventBroadcaster, SignalingServer, SignalingState};
use tokio::sync::watch;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Signaling-Service und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Konfiguration pruefen
    /// 2. Code-Hasher, Broadcaster und Zustand aufbauen
    /// 3. WebSocket-Listener starten
    /// 4. Auf Ctrl-C warten, dann alle Verbindungen schliessen
    pub async fn starten(self) -> Result<()> {
        self.config.validieren()?;
        let bind_addr = self.config.bind_adresse()?;

        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %bind_addr,
            ws_pfad = %self.config.netzwerk.ws_pfad,
            "Server startet"
        );

        let hasher = CodeHasher::neu(self.config.hash_parameter())?;
        let broadcaster =
            EventBroadcaster::mit_queue_groesse(self.config.verbindung.send_queue_groesse);
        let state = SignalingState::neu(self.config.signaling_config(), broadcaster, hasher);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server = SignalingServer::neu(state, bind_addr);
        let mut server_task = tokio::spawn(server.starten(shutdown_rx));

        tokio::select! {
            ergebnis = tokio::signal::ctrl_c() => {
                ergebnis?;
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
                let _ = shutdown_tx.send(true);
            }
            // Listener hat sich vorzeitig beendet
            ergebnis = &mut server_task => {
                ergebnis??;
                return Ok(());
            }
        }

        server_task.await??;
        Ok(())
    }
}
