//! Relay-Handler – Opake Nutzdaten zwischen Host und Empfaengern weiterleiten
//!
//! Die Payloads werden nie interpretiert. Gelesen werden nur die
//! Routing-Felder `channel` und `target_sid`, alles andere geht unveraendert
//! an den Empfaenger. Routing-Fehler werden still verworfen, Relay-Events
//! erwarten keine Bestaetigung.

use fluester_core::{ChannelName, ConnectionId};
use fluester_protocol::events::{string_feld, FELD_CHANNEL, FELD_TARGET_SID};
use fluester_protocol::{Payload, ServerEvent};
use std::sync::Arc;

use crate::server_state::SignalingState;
use crate::transport::Transport;

/// Verarbeitet `receiver_hello` (Empfaenger -> Host)
///
/// Kommt das Event vom Host selbst oder ist der Channel unbekannt, wird es
/// verworfen.
pub fn handle_receiver_hello<T: Transport>(
    payload: Payload,
    absender: ConnectionId,
    state: &Arc<SignalingState<T>>,
) {
    let Some(channel) = ChannelName::aus_wert(payload.get(FELD_CHANNEL)) else {
        tracing::debug!(verbindung = %absender, "receiver_hello ohne Channel verworfen");
        return;
    };
    let Some(eintrag) = state.registry.nachschlagen(&channel) else {
        tracing::trace!(
            verbindung = %absender,
            channel = %channel,
            "receiver_hello fuer unbekannten Channel"
        );
        return;
    };
    if eintrag.host == absender {
        return;
    }

    tracing::debug!(verbindung = %absender, channel = %channel, "Oeffentlicher Schluessel an Host");
    state
        .transport
        .senden(&eintrag.host, ServerEvent::ServerAnnounceReceiver(payload));
}

/// Verarbeitet `sender_offer` (Host -> eine Verbindung)
///
/// Der Absender wird nicht geprueft: jede Verbindung kann jede andere
/// adressieren, sofern sie deren ID kennt.
pub fn handle_sender_offer<T: Transport>(
    payload: Payload,
    absender: ConnectionId,
    state: &Arc<SignalingState<T>>,
) {
    let Some(ziel) =
        string_feld(&payload, FELD_TARGET_SID).and_then(|sid| sid.parse::<ConnectionId>().ok())
    else {
        tracing::debug!(verbindung = %absender, "sender_offer ohne gueltige target_sid verworfen");
        return;
    };

    tracing::debug!(
        verbindung = %absender,
        ziel = %ziel,
        "Verschluesselter Schluessel an Empfaenger"
    );
    state
        .transport
        .senden(&ziel, ServerEvent::ServerDeliverKey(payload));
}

/// Verarbeitet `update_text` (an alle im Raum ausser dem Absender)
pub fn handle_update_text<T: Transport>(
    payload: Payload,
    absender: ConnectionId,
    state: &Arc<SignalingState<T>>,
) {
    let Some(channel) = ChannelName::aus_wert(payload.get(FELD_CHANNEL)) else {
        return;
    };
    if state.registry.nachschlagen(&channel).is_none() {
        tracing::trace!(
            verbindung = %absender,
            channel = %channel,
            "update_text fuer unbekannten Channel"
        );
        return;
    }

    let event = ServerEvent::TextUpdated(payload);
    let zugestellt = state
        .transport
        .an_raum_ausser_senden(&channel, &absender, event);
    tracing::trace!(verbindung = %absender, channel = %channel, zugestellt, "Text weitergeleitet");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
