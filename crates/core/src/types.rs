//! Identifikationstypen fuer Fluester
//!
//! Verbindungs-IDs verwenden das Newtype-Pattern, damit sie nicht mit
//! beliebigen Strings verwechselt werden koennen. Auf dem Draht werden sie
//! als nackter UUID-String uebertragen (`sid` / `target_sid`).

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

/// Eindeutige ID einer Transport-Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Erstellt eine neue zufaellige ConnectionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConnectionId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| CoreError::UngueltigeConnectionId(s.to_string()))
    }
}
