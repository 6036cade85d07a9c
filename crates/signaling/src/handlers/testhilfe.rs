//! Gemeinsame Helfer fuer Handler-Tests

use fluester_auth::{CodeHasher, HashParameter};
use fluester_core::ConnectionId;
use fluester_protocol::{Payload, ServerEvent};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::broadcast::EventBroadcaster;
use crate::server_state::{SignalingConfig, SignalingState};

pub(crate) type TestState = Arc<SignalingState<EventBroadcaster>>;

/// Zustand mit billigem Hasher
pub(crate) fn test_state() -> TestState {
    let hasher = CodeHasher::neu(HashParameter::MINIMAL).expect("Parameter gueltig");
    SignalingState::neu(SignalingConfig::default(), EventBroadcaster::neu(), hasher)
}

/// Registriert eine neue Verbindung im Broadcaster
pub(crate) fn verbinden(state: &TestState) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
    let id = ConnectionId::new();
    let rx = state.transport.client_registrieren(id);
    (id, rx)
}

pub(crate) fn payload(wert: Value) -> Payload {
    match wert {
        Value::Object(map) => map,
        anders => panic!("Test-Payload muss ein Objekt sein: {anders}"),
    }
}

/// Leert die Queue und gibt alle bisher eingereihten Events zurueck
pub(crate) fn empfangen(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
