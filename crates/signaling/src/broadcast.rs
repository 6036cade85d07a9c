//! Event-Broadcaster – Send-Queues und Raeume aller Verbindungen
//!
//! Der EventBroadcaster ist die In-Memory-Implementierung von [`Transport`].
//! Jede Verbindung registriert beim Aufbau eine begrenzte Send-Queue, die
//! ihre `ClientConnection` in den WebSocket leert.
//!
//! ## Selektives Broadcasting
//! - An eine Verbindung: `senden`
//! - An einen Raum: `an_raum_senden`
//! - An einen Raum ausser einer Verbindung: `an_raum_ausser_senden`

use dashmap::DashMap;
use fluester_core::{ChannelName, ConnectionId};
use fluester_protocol::ServerEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::transport::Transport;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Standard-Groesse der Send-Queue pro Verbindung
pub const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer Verbindung
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub verbindung: ConnectionId,
    pub tx: mpsc::Sender<ServerEvent>,
}

impl ClientSender {
    /// Reiht ein Event nicht-blockierend ein
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, event: ServerEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(
                    verbindung = %self.verbindung,
                    event = event.name(),
                    "Send-Queue voll – Event verworfen"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(
                    verbindung = %self.verbindung,
                    "Send-Queue geschlossen (Verbindung getrennt)"
                );
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Zentraler Event-Broadcaster fuer alle Verbindungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct EventBroadcaster {
    inner: Arc<EventBroadcasterInner>,
}

struct EventBroadcasterInner {
    /// Send-Queues, indiziert nach ConnectionId
    clients: DashMap<ConnectionId, ClientSender>,
    /// Raum-Mitgliedschaft: channel -> Vec<ConnectionId> in Beitrittsreihenfolge
    raeume: DashMap<ChannelName, Vec<ConnectionId>>,
    /// Kapazitaet neuer Send-Queues
    queue_groesse: usize,
}

impl EventBroadcaster {
    /// Erstellt einen neuen EventBroadcaster mit der Standard-Queue-Groesse
    pub fn neu() -> Self {
        Self::mit_queue_groesse(SEND_QUEUE_GROESSE)
    }

    /// Erstellt einen EventBroadcaster mit eigener Queue-Groesse (min. 1)
    pub fn mit_queue_groesse(queue_groesse: usize) -> Self {
        Self {
            inner: Arc::new(EventBroadcasterInner {
                clients: DashMap::new(),
                raeume: DashMap::new(),
                queue_groesse: queue_groesse.max(1),
            }),
        }
    }

    /// Registriert eine neue Verbindung und gibt ihre Empfangs-Queue zurueck
    ///
    /// Die `ClientConnection` liest aus dieser Queue und sendet via WebSocket.
    pub fn client_registrieren(&self, verbindung: ConnectionId) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(self.inner.queue_groesse);
        let sender = ClientSender { verbindung, tx };
        self.inner.clients.insert(verbindung, sender);
        tracing::debug!(verbindung = %verbindung, "Verbindung im Broadcaster registriert");
        rx
    }

    /// Entfernt eine Verbindung samt aller Raum-Mitgliedschaften
    pub fn client_entfernen(&self, verbindung: &ConnectionId) {
        self.inner.clients.remove(verbindung);
        self.inner.raeume.iter_mut().for_each(|mut eintrag| {
            eintrag.value_mut().retain(|id| id != verbindung);
        });
        // Leere Raeume aufraeumen
        self.inner.raeume.retain(|_, mitglieder| !mitglieder.is_empty());
        tracing::debug!(verbindung = %verbindung, "Verbindung aus Broadcaster entfernt");
    }

    /// Gibt die Anzahl der registrierten Verbindungen zurueck
    pub fn client_anzahl(&self) -> usize {
        self.inner.clients.len()
    }

    /// Prueft ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, verbindung: &ConnectionId) -> bool {
        self.inner.clients.contains_key(verbindung)
    }

    /// Gibt alle Mitglieder eines Raums zurueck
    pub fn mitglieder(&self, raum: &ChannelName) -> Vec<ConnectionId> {
        self.inner
            .raeume
            .get(raum)
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    fn an_mitglieder_senden<'a>(
        &self,
        mitglieder: impl Iterator<Item = &'a ConnectionId>,
        event: &ServerEvent,
    ) -> usize {
        let mut gesendet = 0;
        for verbindung in mitglieder {
            if let Some(sender) = self.inner.clients.get(verbindung) {
                if sender.senden(event.clone()) {
                    gesendet += 1;
                }
            }
        }
        gesendet
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::neu()
    }
}

impl Transport for EventBroadcaster {
    fn senden(&self, ziel: &ConnectionId, event: ServerEvent) -> bool {
        match self.inner.clients.get(ziel) {
            Some(sender) => sender.senden(event),
            None => {
                tracing::debug!(verbindung = %ziel, "Senden an unbekannte Verbindung");
                false
            }
        }
    }

    fn raum_beitreten(&self, raum: &ChannelName, verbindung: ConnectionId) {
        let mut mitglieder = self.inner.raeume.entry(raum.clone()).or_default();
        if !mitglieder.contains(&verbindung) {
            mitglieder.push(verbindung);
        }
    }

    fn an_raum_senden(&self, raum: &ChannelName, event: ServerEvent) -> usize {
        // Kopie der Mitglieder, damit beim Senden kein Raum-Lock gehalten wird
        let mitglieder = self.mitglieder(raum);
        self.an_mitglieder_senden(mitglieder.iter(), &event)
    }

    fn an_raum_ausser_senden(
        &self,
        raum: &ChannelName,
        ausgeschlossen: &ConnectionId,
        event: ServerEvent,
    ) -> usize {
        let mitglieder = self.mitglieder(raum);
        self.an_mitglieder_senden(
            mitglieder.iter().filter(|id| *id != ausgeschlossen),
            &event,
        )
    }

    fn raum_schliessen(&self, raum: &ChannelName) {
        if let Some((_, mitglieder)) = self.inner.raeume.remove(raum) {
            tracing::debug!(channel = %raum, mitglieder = mitglieder.len(), "Raum geschlossen");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn raum(s: &str) -> ChannelName {
        ChannelName::normalisieren(s).unwrap()
    }

    #[tokio::test]
    async fn client_registrieren_und_senden() {
        let broadcaster = EventBroadcaster::neu();
        let id = ConnectionId::new();

        let mut rx = broadcaster.client_registrieren(id);
        assert!(broadcaster.ist_registriert(&id));

        assert!(broadcaster.senden(&id, ServerEvent::HostSuccess));
        let empfangen = rx.try_recv().expect("Event muss vorhanden sein");
        assert_eq!(empfangen, ServerEvent::HostSuccess);
    }

    #[tokio::test]
    async fn senden_an_unbekannte_verbindung() {
        let broadcaster = EventBroadcaster::neu();
        assert!(!broadcaster.senden(&ConnectionId::new(), ServerEvent::AuthSuccess));
    }

    #[tokio::test]
    async fn an_raum_senden() {
        let broadcaster = EventBroadcaster::neu();
        let kanal = raum("demo");

        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        let id3 = ConnectionId::new(); // nicht im Raum

        let mut rx1 = broadcaster.client_registrieren(id1);
        let mut rx2 = broadcaster.client_registrieren(id2);
        let mut rx3 = broadcaster.client_registrieren(id3);

        broadcaster.raum_beitreten(&kanal, id1);
        broadcaster.raum_beitreten(&kanal, id2);

        let gesendet = broadcaster.an_raum_senden(&kanal, ServerEvent::session_ended("x"));
        assert_eq!(gesendet, 2);

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
        assert!(rx3.try_recv().is_err(), "id3 darf nichts empfangen");
    }

    #[tokio::test]
    async fn an_raum_ausser_senden() {
        let broadcaster = EventBroadcaster::neu();
        let kanal = raum("demo");

        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();

        let mut rx1 = broadcaster.client_registrieren(id1);
        let mut rx2 = broadcaster.client_registrieren(id2);

        broadcaster.raum_beitreten(&kanal, id1);
        broadcaster.raum_beitreten(&kanal, id2);

        let gesendet = broadcaster.an_raum_ausser_senden(&kanal, &id1, ServerEvent::HostSuccess);
        assert_eq!(gesendet, 1);

        assert!(rx1.try_recv().is_err(), "Absender darf nichts empfangen");
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn doppelter_beitritt_zaehlt_einmal() {
        let broadcaster = EventBroadcaster::neu();
        let kanal = raum("demo");
        let id = ConnectionId::new();
        let _rx = broadcaster.client_registrieren(id);

        broadcaster.raum_beitreten(&kanal, id);
        broadcaster.raum_beitreten(&kanal, id);

        assert_eq!(broadcaster.mitglieder(&kanal), vec![id]);
    }

    #[tokio::test]
    async fn raum_schliessen_entfernt_mitgliedschaft() {
        let broadcaster = EventBroadcaster::neu();
        let kanal = raum("demo");
        let id = ConnectionId::new();
        let mut rx = broadcaster.client_registrieren(id);

        broadcaster.raum_beitreten(&kanal, id);
        broadcaster.raum_schliessen(&kanal);

        assert!(broadcaster.mitglieder(&kanal).is_empty());
        assert_eq!(broadcaster.an_raum_senden(&kanal, ServerEvent::HostSuccess), 0);
        assert!(rx.try_recv().is_err());
        // Verbindung selbst bleibt bestehen
        assert!(broadcaster.ist_registriert(&id));
    }

    #[tokio::test]
    async fn volle_queue_verwirft_events() {
        let broadcaster = EventBroadcaster::mit_queue_groesse(1);
        let id = ConnectionId::new();
        let mut rx = broadcaster.client_registrieren(id);

        assert!(broadcaster.senden(&id, ServerEvent::HostSuccess));
        assert!(!broadcaster.senden(&id, ServerEvent::AuthSuccess));

        assert_eq!(rx.try_recv().unwrap(), ServerEvent::HostSuccess);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reihenfolge_bleibt_erhalten() {
        let broadcaster = EventBroadcaster::neu();
        let id = ConnectionId::new();
        let mut rx = broadcaster.client_registrieren(id);

        for i in 0..10 {
            broadcaster.senden(&id, ServerEvent::auth_failed(i.to_string()));
        }
        for i in 0..10 {
            assert_eq!(rx.try_recv().unwrap(), ServerEvent::auth_failed(i.to_string()));
        }
    }

    #[test]
    fn client_entfernen_bereinigt_raum_zugehoerigkeit() {
        let broadcaster = EventBroadcaster::neu();
        let kanal = raum("demo");
        let id = ConnectionId::new();

        let _rx = broadcaster.client_registrieren(id);
        broadcaster.raum_beitreten(&kanal, id);
        assert_eq!(broadcaster.mitglieder(&kanal).len(), 1);

        broadcaster.client_entfernen(&id);
        assert!(!broadcaster.ist_registriert(&id));
        assert_eq!(broadcaster.mitglieder(&kanal).len(), 0);
        assert_eq!(broadcaster.client_anzahl(), 0);
    }
}
