//! Channel-Namen – Validierung und Kanonisierung
//!
//! Host und Empfaenger muessen sich auch dann finden, wenn sie den Namen
//! unterschiedlich gross schreiben oder Leerzeichen mitschicken. Ein
//! `ChannelName` existiert daher nur in kanonischer Form: getrimmt und in
//! Kleinbuchstaben.

use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

use crate::error::CoreError;

/// Kanonischer Channel-Name (getrimmt, kleingeschrieben, nie leer)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChannelName(String);

impl ChannelName {
    /// Kanonisiert einen Roh-String
    ///
    /// Gibt `None` zurueck wenn nach dem Trimmen nichts uebrig bleibt.
    pub fn normalisieren(roh: &str) -> Option<Self> {
        let getrimmt = roh.trim();
        if getrimmt.is_empty() {
            return None;
        }
        Some(Self(getrimmt.to_lowercase()))
    }

    /// Kanonisiert einen Wert aus einem untypisierten Payload
    ///
    /// Strings und Zahlen werden akzeptiert, alles andere ist ungueltig.
    pub fn aus_wert(wert: Option<&Value>) -> Option<Self> {
        match wert? {
            Value::String(s) => Self::normalisieren(s),
            Value::Number(n) => Self::normalisieren(&n.to_string()),
            _ => None,
        }
    }

    /// Gibt den kanonischen Namen als `&str` zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChannelName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalisieren(s).ok_or(CoreError::UngueltigerChannelName)
    }
}

impl std::fmt::Display for ChannelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
