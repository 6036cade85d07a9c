//! Gemeinsamer Server-Zustand fuer den Signaling-Service
//!
//! Haelt Registry, Transport und Code-Hasher zusammen. Der Zustand wird
//! einmal pro Prozess erzeugt und als `Arc` an alle Verbindungs-Tasks
//! verteilt, es gibt keinen globalen Zustand.

use fluester_auth::CodeHasher;
use fluester_observability::KennzahlenQuelle;
use std::sync::Arc;
use std::time::Instant;

use crate::broadcast::EventBroadcaster;
use crate::registry::SessionRegistry;
use crate::transport::Transport;

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Pfad des WebSocket-Endpunkts
    pub ws_pfad: String,
    /// Kapazitaet der Send-Queue pro Verbindung
    pub send_queue_groesse: usize,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
    /// Maximale Groesse eines WebSocket-Frames in Bytes
    pub max_nachricht_bytes: usize,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            ws_pfad: "/ws".to_string(),
            send_queue_groesse: 64,
            keepalive_sek: 25,
            verbindungs_timeout_sek: 60,
            max_nachricht_bytes: 1024 * 1024,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct SignalingState<T: Transport> {
    /// Signaling-Konfiguration
    pub config: Arc<SignalingConfig>,
    /// Lebende Channels
    pub registry: SessionRegistry,
    /// Zustellung an Verbindungen und Raeume
    pub transport: T,
    /// Hasht und prueft Join-Codes
    pub code_hasher: CodeHasher,
    /// Startzeitpunkt des Servers (fuer Uptime-Berechnung)
    pub start_time: Instant,
}

impl<T: Transport> SignalingState<T> {
    /// Erstellt einen neuen SignalingState
    pub fn neu(config: SignalingConfig, transport: T, code_hasher: CodeHasher) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            registry: SessionRegistry::neu(),
            transport,
            code_hasher,
            start_time: Instant::now(),
        })
    }

    /// Gibt die Uptime in Sekunden zurueck
    pub fn uptime_sek(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl KennzahlenQuelle for SignalingState<EventBroadcaster> {
    fn aktive_channels(&self) -> usize {
        self.registry.anzahl()
    }

    fn verbindungen(&self) -> usize {
        self.transport.client_anzahl()
    }
}
