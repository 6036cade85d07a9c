//! Signaling-Events (WebSocket, JSON)
//!
//! Jedes Event wird als Umschlag `{"event": "<name>", "data": {...}}`
//! uebertragen. Events ohne Nutzdaten lassen `data` weg.
//!
//! ## Design
//! - Eingehende Events tragen ein untypisiertes [`Payload`]. Der Server liest
//!   daraus nur die Routing-Felder (`channel`, `code`, `target_sid`) und
//!   reicht den Rest unveraendert weiter.
//! - Ausgehende Events sind typisiert, ausser den drei Relay-Events, die das
//!   eingehende Payload 1:1 zurueckgeben.

use fluester_core::ConnectionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opakes Nutzdaten-Objekt eines Events
pub type Payload = serde_json::Map<String, Value>;

/// Routing-Feld: Channel-Name
pub const FELD_CHANNEL: &str = "channel";
/// Routing-Feld: Join-Code
pub const FELD_CODE: &str = "code";
/// Routing-Feld: Ziel-Verbindung eines `sender_offer`
pub const FELD_TARGET_SID: &str = "target_sid";

// ---------------------------------------------------------------------------
// Meldungstexte
// ---------------------------------------------------------------------------

/// `host_error`: Channel-Name ist bereits belegt
pub const MELDUNG_CHANNEL_BELEGT: &str = "This channel name is already in use.";
/// `auth_failed`: Channel existiert nicht (mehr)
pub const MELDUNG_NICHT_GEFUNDEN: &str = "Session not found. It may have expired.";
/// `auth_failed`: Code passt nicht
pub const MELDUNG_FALSCHER_CODE: &str = "Incorrect code.";
/// `session_ended`: Host hat die Verbindung getrennt
pub const MELDUNG_HOST_GETRENNT: &str = "Host has disconnected.";

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// Events die ein Client an den Server sendet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Host eroeffnet einen Channel (`channel`, `code`)
    HostSession(Payload),
    /// Empfaenger versucht beizutreten (`channel`, `code`)
    JoinAttempt(Payload),
    /// Empfaenger schickt seinen oeffentlichen Schluessel an den Host
    ReceiverHello(Payload),
    /// Host schickt verschluesseltes Schluesselmaterial an `target_sid`
    SenderOffer(Payload),
    /// Verschluesselter Text fuer alle anderen im Channel
    UpdateText(Payload),
}

impl ClientEvent {
    /// Name des Events auf dem Draht (fuer Logging)
    pub fn name(&self) -> &'static str {
        match self {
            Self::HostSession(_) => "host_session",
            Self::JoinAttempt(_) => "join_attempt",
            Self::ReceiverHello(_) => "receiver_hello",
            Self::SenderOffer(_) => "sender_offer",
            Self::UpdateText(_) => "update_text",
        }
    }
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

/// Events die der Server an Clients sendet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Channel wurde erfolgreich eroeffnet
    HostSuccess,
    /// Channel konnte nicht eroeffnet werden
    HostError { message: String },
    /// Join-Code war korrekt
    AuthSuccess,
    /// Join fehlgeschlagen (unbekannter Channel oder falscher Code)
    AuthFailed { message: String },
    /// An den Host: neuer authentifizierter Empfaenger
    NewReceiverJoined { sid: ConnectionId },
    /// An den Host: Echo eines `receiver_hello`
    ServerAnnounceReceiver(Payload),
    /// An den Empfaenger: Echo eines `sender_offer`
    ServerDeliverKey(Payload),
    /// An alle ausser dem Absender: Echo eines `update_text`
    TextUpdated(Payload),
    /// An alle im Channel: Host ist weg, Channel geschlossen
    SessionEnded { message: String },
}

impl ServerEvent {
    pub fn host_error(message: impl Into<String>) -> Self {
        Self::HostError {
            message: message.into(),
        }
    }

    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::AuthFailed {
            message: message.into(),
        }
    }

    pub fn session_ended(message: impl Into<String>) -> Self {
        Self::SessionEnded {
            message: message.into(),
        }
    }

    /// Name des Events auf dem Draht (fuer Logging)
    pub fn name(&self) -> &'static str {
        match self {
            Self::HostSuccess => "host_success",
            Self::HostError { .. } => "host_error",
            Self::AuthSuccess => "auth_success",
            Self::AuthFailed { .. } => "auth_failed",
            Self::NewReceiverJoined { .. } => "new_receiver_joined",
            Self::ServerAnnounceReceiver(_) => "server_announce_receiver",
            Self::ServerDeliverKey(_) => "server_deliver_key",
            Self::TextUpdated(_) => "text_updated",
            Self::SessionEnded { .. } => "session_ended",
        }
    }
}

// ---------------------------------------------------------------------------
// Payload-Zugriff
// ---------------------------------------------------------------------------

/// Liest ein String-Feld aus einem Payload
///
/// Gibt `None` zurueck wenn das Feld fehlt oder kein String ist.
pub fn string_feld<'a>(payload: &'a Payload, feld: &str) -> Option<&'a str> {
    payload.get(feld).and_then(Value::as_str)
}
