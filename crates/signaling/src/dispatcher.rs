//! Message-Dispatcher – Routet Client-Events an die richtigen Handler
//!
//! Der Dispatcher empfaengt dekodierte Events einer Verbindung und ruft den
//! passenden Handler auf. Antworten laufen ausschliesslich ueber den
//! Transport, der Dispatcher selbst gibt nichts zurueck.
//!
//! Pro Verbindung wird immer nur ein Event gleichzeitig verarbeitet
//! (Aufruf inline aus der Lese-Schleife). Damit ist die Reihenfolge pro
//! Absender garantiert und der Verbindungsabbau laeuft erst, wenn das
//! letzte Event fertig ist.

use fluester_core::ConnectionId;
use fluester_protocol::ClientEvent;
use std::sync::Arc;

use crate::handlers::{lifecycle_handler, relay_handler, session_handler};
use crate::server_state::SignalingState;
use crate::transport::Transport;

/// Zentraler Message-Dispatcher
pub struct MessageDispatcher<T: Transport> {
    state: Arc<SignalingState<T>>,
}

impl<T: Transport> MessageDispatcher<T> {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<SignalingState<T>>) -> Self {
        Self { state }
    }

    /// Verarbeitet ein eingehendes Event
    pub async fn dispatch(&self, event: ClientEvent, absender: ConnectionId) {
        tracing::trace!(verbindung = %absender, event = event.name(), "Event empfangen");

        match event {
            // -------------------------------------------------------------------
            // Authentifizierung
            // -------------------------------------------------------------------
            ClientEvent::HostSession(payload) => {
                session_handler::handle_host_session(payload, absender, &self.state).await
            }

            ClientEvent::JoinAttempt(payload) => {
                session_handler::handle_join_attempt(payload, absender, &self.state).await
            }

            // -------------------------------------------------------------------
            // Relay
            // -------------------------------------------------------------------
            ClientEvent::ReceiverHello(payload) => {
                relay_handler::handle_receiver_hello(payload, absender, &self.state)
            }

            ClientEvent::SenderOffer(payload) => {
                relay_handler::handle_sender_offer(payload, absender, &self.state)
            }

            ClientEvent::UpdateText(payload) => {
                relay_handler::handle_update_text(payload, absender, &self.state)
            }
        }
    }

    /// Bereinigt den Kern-Zustand einer getrennten Verbindung
    ///
    /// Muss vom Transport genau einmal pro Verbindung aufgerufen werden,
    /// bevor er die Verbindung selbst vergisst.
    pub fn verbindung_getrennt(&self, verbindung: ConnectionId) {
        let geschlossen = lifecycle_handler::handle_disconnect(verbindung, &self.state);
        tracing::debug!(verbindung = %verbindung, geschlossen, "Verbindung bereinigt");
    }
}
