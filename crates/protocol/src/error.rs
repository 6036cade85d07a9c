//! Fehlertypen fuer das Wire-Format

use thiserror::Error;

/// Fehler beim Kodieren oder Dekodieren eines Frames
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame ist groesser als erlaubt
    #[error("Frame zu gross: {groesse} Bytes (max {max})")]
    FrameZuGross { groesse: usize, max: usize },

    /// Kein gueltiges JSON oder unbekanntes Event
    #[error("Ungueltiges Event: {0}")]
    UngueltigesEvent(#[from] serde_json::Error),
}

/// Result-Alias fuer das Wire-Format
pub type ProtocolResult<T> = Result<T, ProtocolError>;
