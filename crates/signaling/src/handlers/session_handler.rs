//! Session-Handler – Channel eroeffnen und beitreten
//!
//! ## Zustandsfolge pro Channel
//! ```text
//! Frei --host_session--> Gehostet --join_attempt(ok)--> Authentifiziert
//!                            |                               |
//!                            +------- Host getrennt ---------+--> Geschlossen
//! ```
//!
//! Unvollstaendige Anfragen (fehlender Channel oder Code) werden ohne Antwort
//! verworfen. Ein nicht authentifizierter Absender erfaehrt so nichts ueber
//! die Validierungsregeln.

use fluester_core::{ChannelName, ConnectionId};
use fluester_protocol::events::{
    string_feld, FELD_CHANNEL, FELD_CODE, MELDUNG_CHANNEL_BELEGT, MELDUNG_FALSCHER_CODE,
    MELDUNG_NICHT_GEFUNDEN,
};
use fluester_protocol::{Payload, ServerEvent};
use std::sync::Arc;

use crate::error::SignalingResult;
use crate::registry::ErstellErgebnis;
use crate::server_state::SignalingState;
use crate::transport::Transport;

/// Liest Channel und Code aus einer Anfrage
///
/// Gibt `None` zurueck wenn eines davon fehlt oder leer ist.
fn anfrage_lesen(payload: &Payload) -> Option<(ChannelName, String)> {
    let channel = ChannelName::aus_wert(payload.get(FELD_CHANNEL))?;
    let code = string_feld(payload, FELD_CODE).filter(|c| !c.is_empty())?;
    Some((channel, code.to_string()))
}

/// Hasht den Code auf dem Blocking-Pool
async fn code_hashen<T: Transport>(
    state: &Arc<SignalingState<T>>,
    code: String,
) -> SignalingResult<String> {
    let hasher = state.code_hasher.clone();
    let hash = tokio::task::spawn_blocking(move || hasher.hashen(&code)).await??;
    Ok(hash)
}

/// Prueft den Code auf dem Blocking-Pool
async fn code_pruefen<T: Transport>(
    state: &Arc<SignalingState<T>>,
    code: String,
    hash: String,
) -> SignalingResult<bool> {
    let hasher = state.code_hasher.clone();
    let korrekt = tokio::task::spawn_blocking(move || hasher.verifizieren(&code, &hash)).await?;
    Ok(korrekt)
}

/// Verarbeitet `host_session`
///
/// Bei Erfolg wird der Absender Host des Channels und Mitglied des Raums.
/// Ist der Name belegt, erhaelt nur der Absender `host_error`.
pub async fn handle_host_session<T: Transport>(
    payload: Payload,
    absender: ConnectionId,
    state: &Arc<SignalingState<T>>,
) {
    let Some((channel, code)) = anfrage_lesen(&payload) else {
        tracing::debug!(verbindung = %absender, "Ungueltige host_session verworfen");
        return;
    };

    // Belegte Namen vor dem teuren Hashing abweisen
    if state.registry.nachschlagen(&channel).is_some() {
        tracing::info!(
            verbindung = %absender,
            channel = %channel,
            "Channel-Name bereits belegt"
        );
        state
            .transport
            .senden(&absender, ServerEvent::host_error(MELDUNG_CHANNEL_BELEGT));
        return;
    }

    let code_hash = match code_hashen(state, code).await {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(
                verbindung = %absender,
                fehler = %e,
                "Code konnte nicht gehasht werden"
            );
            return;
        }
    };

    let ergebnis = state
        .registry
        .erstellen_falls_frei(channel.clone(), code_hash, absender, |_| {
            // Ein neuer Channel erbt niemals Mitglieder eines alten Raums
            state.transport.raum_schliessen(&channel);
            state.transport.raum_beitreten(&channel, absender);
            state.transport.senden(&absender, ServerEvent::HostSuccess);
        });

    match ergebnis {
        ErstellErgebnis::Erstellt => {
            tracing::info!(verbindung = %absender, channel = %channel, "Channel eroeffnet");
        }
        ErstellErgebnis::BereitsVorhanden => {
            // Ein paralleler Host war waehrend des Hashings schneller
            tracing::info!(
                verbindung = %absender,
                channel = %channel,
                "Channel-Name bereits belegt"
            );
            state
                .transport
                .senden(&absender, ServerEvent::host_error(MELDUNG_CHANNEL_BELEGT));
        }
    }
}

/// Verarbeitet `join_attempt`
///
/// Bei korrektem Code tritt der Absender dem Raum bei und der Host erfaehrt
/// dessen Verbindungs-ID. Ein falscher Code schliesst den Channel nicht.
pub async fn handle_join_attempt<T: Transport>(
    payload: Payload,
    absender: ConnectionId,
    state: &Arc<SignalingState<T>>,
) {
    let Some((channel, code)) = anfrage_lesen(&payload) else {
        tracing::debug!(verbindung = %absender, "Ungueltiger join_attempt verworfen");
        return;
    };

    let Some(eintrag) = state.registry.nachschlagen(&channel) else {
        tracing::debug!(verbindung = %absender, channel = %channel, "Join auf unbekannten Channel");
        state
            .transport
            .senden(&absender, ServerEvent::auth_failed(MELDUNG_NICHT_GEFUNDEN));
        return;
    };

    let korrekt = match code_pruefen(state, code, eintrag.code_hash.clone()).await {
        Ok(korrekt) => korrekt,
        Err(e) => {
            tracing::error!(verbindung = %absender, fehler = %e, "Code-Pruefung abgebrochen");
            false
        }
    };

    if !korrekt {
        tracing::info!(verbindung = %absender, channel = %channel, "Join mit falschem Code");
        state
            .transport
            .senden(&absender, ServerEvent::auth_failed(MELDUNG_FALSCHER_CODE));
        return;
    }

    // Der Host kann sich waehrend der Pruefung getrennt haben. Beitritt und
    // Benachrichtigung laufen unter dem Registry-Guard, ein gleichzeitiger
    // Abbau des Channels wartet darauf.
    let beigetreten = state.registry.mit_channel(&channel, &eintrag.host, |aktuell| {
        state.transport.raum_beitreten(&channel, absender);
        state.transport.senden(&absender, ServerEvent::AuthSuccess);
        state
            .transport
            .senden(&aktuell.host, ServerEvent::NewReceiverJoined { sid: absender });
    });

    if beigetreten.is_none() {
        tracing::debug!(
            verbindung = %absender,
            channel = %channel,
            "Channel waehrend Pruefung geschlossen"
        );
        state
            .transport
            .senden(&absender, ServerEvent::auth_failed(MELDUNG_NICHT_GEFUNDEN));
        return;
    }

    tracing::info!(verbindung = %absender, channel = %channel, "Empfaenger authentifiziert");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
