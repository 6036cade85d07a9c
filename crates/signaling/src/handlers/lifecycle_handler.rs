//! Lifecycle-Handler – Abbau eines Channels wenn sein Host geht
//!
//! Empfaenger werden vom Kern nicht einzeln verfolgt. Trennt sich ein
//! Empfaenger, raeumt der Transport seine Raum-Mitgliedschaften auf und die
//! Registry bleibt unveraendert.

use fluester_core::ConnectionId;
use fluester_protocol::events::MELDUNG_HOST_GETRENNT;
use fluester_protocol::ServerEvent;
use std::sync::Arc;

use crate::server_state::SignalingState;
use crate::transport::Transport;

/// Verarbeitet das Ende einer Verbindung
///
/// War die Verbindung Host, wird jeder ihrer Channels entfernt, alle
/// Mitglieder erhalten `session_ended` und der Raum wird aufgeloest.
/// Gibt die Anzahl der geschlossenen Channels zurueck.
pub fn handle_disconnect<T: Transport>(
    verbindung: ConnectionId,
    state: &Arc<SignalingState<T>>,
) -> usize {
    let mut geschlossen = 0;

    loop {
        let mut benachrichtigt = 0;
        // Benachrichtigen und Raum aufloesen, solange der Eintrag noch
        // gesperrt ist. Ein laufender Beitritt ist dann entweder fertig oder
        // sieht den Channel nicht mehr.
        let entfernt = state.registry.entfernen_nach_host(&verbindung, |channel| {
            benachrichtigt = state.transport.an_raum_senden(
                &channel.name,
                ServerEvent::session_ended(MELDUNG_HOST_GETRENNT),
            );
            state.transport.raum_schliessen(&channel.name);
        });
        let Some(channel) = entfernt else {
            break;
        };

        tracing::info!(
            verbindung = %verbindung,
            channel = %channel,
            benachrichtigt,
            "Host getrennt – Channel geschlossen"
        );
        geschlossen += 1;
    }

    geschlossen
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
