//! Fehlertypen fuer Fluester-Core
//!
//! Untermodule der anderen Crates definieren eigene Fehler und konvertieren
//! via `#[from]`.

use thiserror::Error;

/// Fehler beim Parsen und Validieren der Grundtypen
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Ungueltige Verbindungs-ID: {0}")]
    UngueltigeConnectionId(String),

    #[error("Ungueltiger Channel-Name")]
    UngueltigerChannelName,
}
