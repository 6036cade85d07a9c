//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use fluester_auth::{CodeHasher, HashParameter};
use fluester_observability::logging::{log_format_gueltig, log_level_gueltig};
use fluester_signaling::SignalingConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;

/// Fehler einer inhaltlich ungueltigen Konfiguration
#[derive(Debug, Error, PartialEq)]
pub enum KonfigurationsFehler {
    #[error("verbindung.send_queue_groesse muss groesser als 0 sein")]
    QueueGroesseNull,

    #[error("verbindung.max_nachricht_bytes muss groesser als 0 sein")]
    NachrichtGroesseNull,

    #[error("verbindung.keepalive_sek muss groesser als 0 sein")]
    KeepaliveNull,

    #[error("verbindungs_timeout_sek ({timeout}) muss keepalive_sek ({keepalive}) uebersteigen")]
    TimeoutZuKurz { timeout: u64, keepalive: u64 },

    #[error("netzwerk.ws_pfad ungueltig (fuehrendes '/', keine Platzhalter): '{0}'")]
    UngueltigerPfad(String),

    #[error("netzwerk.ws_pfad ist bereits belegt: '{0}'")]
    ReservierterPfad(String),

    #[error("netzwerk.bind_adresse ungueltig: '{0}'")]
    UngueltigeAdresse(String),

    #[error("Ungueltiges Log-Level: '{0}'")]
    UngueltigesLogLevel(String),

    #[error("Ungueltiges Log-Format: '{0}'")]
    UngueltigesLogFormat(String),

    #[error("Hashing-Parameter ungueltig: {0}")]
    UngueltigeHashParameter(String),
}

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Einstellungen pro WebSocket-Verbindung
    pub verbindung: VerbindungsEinstellungen,
    /// Argon2id-Parameter fuer Join-Codes
    pub hashing: HashingEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers (nur fuer Logs)
    pub name: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Fluester Server".into(),
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer HTTP und WebSocket
    pub bind_adresse: String,
    /// Port fuer HTTP und WebSocket
    pub port: u16,
    /// Pfad des WebSocket-Endpunkts
    pub ws_pfad: String,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 5000,
            ws_pfad: "/ws".into(),
        }
    }
}

/// Einstellungen pro WebSocket-Verbindung
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerbindungsEinstellungen {
    /// Kapazitaet der ausgehenden Queue pro Verbindung
    pub send_queue_groesse: usize,
    /// Ping-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Trennung nach so vielen Sekunden ohne eingehenden Frame
    pub verbindungs_timeout_sek: u64,
    /// Maximale Groesse einer eingehenden Nachricht in Bytes
    pub max_nachricht_bytes: usize,
}

impl Default for VerbindungsEinstellungen {
    fn default() -> Self {
        let signaling = SignalingConfig::default();
        Self {
            send_queue_groesse: signaling.send_queue_groesse,
            keepalive_sek: signaling.keepalive_sek,
            verbindungs_timeout_sek: signaling.verbindungs_timeout_sek,
            max_nachricht_bytes: signaling.max_nachricht_bytes,
        }
    }
}

/// Argon2id-Parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingEinstellungen {
    /// Speicherbedarf in KiB
    pub speicher_kib: u32,
    /// Anzahl Iterationen
    pub iterationen: u32,
    /// Parallelismus (Lanes)
    pub parallelitaet: u32,
}

impl Default for HashingEinstellungen {
    fn default() -> Self {
        let parameter = HashParameter::default();
        Self {
            speicher_kib: parameter.speicher_kib,
            iterationen: parameter.iterationen,
            parallelitaet: parameter.parallelitaet,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    ///
    /// Gibt `None` zurueck wenn die Datei nicht existiert, der Aufrufer
    /// entscheidet dann ueber Standardwerte und meldet das nach dem
    /// Logging-Start.
    pub fn laden(pfad: &str) -> anyhow::Result<Option<Self>> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(Some(config))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Prueft die Werte auf inhaltliche Konsistenz
    pub fn validieren(&self) -> Result<(), KonfigurationsFehler> {
        let v = &self.verbindung;
        if v.send_queue_groesse == 0 {
            return Err(KonfigurationsFehler::QueueGroesseNull);
        }
        if v.max_nachricht_bytes == 0 {
            return Err(KonfigurationsFehler::NachrichtGroesseNull);
        }
        if v.keepalive_sek == 0 {
            return Err(KonfigurationsFehler::KeepaliveNull);
        }
        if v.verbindungs_timeout_sek <= v.keepalive_sek {
            return Err(KonfigurationsFehler::TimeoutZuKurz {
                timeout: v.verbindungs_timeout_sek,
                keepalive: v.keepalive_sek,
            });
        }
        pfad_pruefen(&self.netzwerk.ws_pfad)?;
        self.bind_adresse()?;
        if !log_level_gueltig(&self.logging.level) {
            return Err(KonfigurationsFehler::UngueltigesLogLevel(
                self.logging.level.clone(),
            ));
        }
        if !log_format_gueltig(&self.logging.format) {
            return Err(KonfigurationsFehler::UngueltigesLogFormat(
                self.logging.format.clone(),
            ));
        }
        CodeHasher::neu(self.hash_parameter())
            .map_err(|e| KonfigurationsFehler::UngueltigeHashParameter(e.to_string()))?;
        Ok(())
    }

    /// Gibt die vollstaendige Bind-Adresse fuer HTTP und WebSocket zurueck
    pub fn bind_adresse(&self) -> Result<SocketAddr, KonfigurationsFehler> {
        let adresse = format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.port);
        adresse
            .parse()
            .map_err(|_| KonfigurationsFehler::UngueltigeAdresse(adresse))
    }

    /// Konfiguration fuer den Signaling-Service
    pub fn signaling_config(&self) -> SignalingConfig {
        SignalingConfig {
            ws_pfad: self.netzwerk.ws_pfad.clone(),
            send_queue_groesse: self.verbindung.send_queue_groesse,
            keepalive_sek: self.verbindung.keepalive_sek,
            verbindungs_timeout_sek: self.verbindung.verbindungs_timeout_sek,
            max_nachricht_bytes: self.verbindung.max_nachricht_bytes,
        }
    }

    /// Argon2id-Parameter fuer den Code-Hasher
    pub fn hash_parameter(&self) -> HashParameter {
        HashParameter {
            speicher_kib: self.hashing.speicher_kib,
            iterationen: self.hashing.iterationen,
            parallelitaet: self.hashing.parallelitaet,
        }
    }
}

/// Pfade, die der Router selbst belegt
const RESERVIERTE_PFADE: &[&str] = &["/health"];

/// Prueft den WebSocket-Pfad auf Routen-Syntax und Kollisionen
fn pfad_pruefen(pfad: &str) -> Result<(), KonfigurationsFehler> {
    let platzhalter = pfad
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'));
    if !pfad.starts_with('/') || platzhalter || pfad.contains(['{', '}']) {
        return Err(KonfigurationsFehler::UngueltigerPfad(pfad.to_string()));
    }
    if RESERVIERTE_PFADE.contains(&pfad.trim_end_matches('/')) {
        return Err(KonfigurationsFehler::ReservierterPfad(pfad.to_string()));
    }
    Ok(())
}
