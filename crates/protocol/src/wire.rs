//! Wire-Format fuer WebSocket-Verbindungen
//!
//! Jedes Event ist genau ein WebSocket-Textframe mit einem JSON-Objekt.
//! Binaerframes gehoeren nicht zum Protokoll. Die maximale Frame-Groesse ist
//! konfigurierbar (Standard: 1 MB).

use crate::error::{ProtocolError, ProtocolResult};
use crate::events::{ClientEvent, ServerEvent};

/// Standard-maximale Frame-Groesse (1 MB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Kodiert und dekodiert Events als JSON-Textframes
#[derive(Debug, Clone)]
pub struct FrameCodec {
    /// Maximale erlaubte Frame-Groesse in Bytes
    max_frame_size: usize,
}

impl FrameCodec {
    /// Erstellt einen neuen `FrameCodec` mit Standard-Limits
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Erstellt einen `FrameCodec` mit benutzerdefinierter maximaler Frame-Groesse
    pub fn with_max_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Gibt die konfigurierte maximale Frame-Groesse zurueck
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Dekodiert einen eingehenden Textframe
    pub fn dekodieren(&self, frame: &str) -> ProtocolResult<ClientEvent> {
        self.groesse_pruefen(frame.len())?;
        Ok(serde_json::from_str(frame)?)
    }

    /// Kodiert ein ausgehendes Event als Textframe
    pub fn kodieren(&self, event: &ServerEvent) -> ProtocolResult<String> {
        let json = serde_json::to_string(event)?;
        self.groesse_pruefen(json.len())?;
        Ok(json)
    }

    fn groesse_pruefen(&self, groesse: usize) -> ProtocolResult<()> {
        if groesse > self.max_frame_size {
            return Err(ProtocolError::FrameZuGross {
                groesse,
                max: self.max_frame_size,
            });
        }
        Ok(())
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}
