//! Transport-Schnittstelle des Signaling-Kerns
//!
//! Der Kern kennt keine Sockets. Er adressiert Verbindungen und Raeume nur
//! ueber diese Schnittstelle. Ein Raum entspricht genau einem Channel.
//! Verbindungsauf- und -abbau gehoeren dem Transport, der Kern wird ueber
//! `MessageDispatcher::verbindung_getrennt` informiert.

use fluester_core::{ChannelName, ConnectionId};
use fluester_protocol::ServerEvent;

/// Faehigkeiten, die der Kern vom Transport benoetigt
///
/// Alle Methoden muessen nicht-blockierend sein. Die Rueckgabewerte dienen
/// nur dem Logging und Tests, der Kern reagiert nicht auf Zustellfehler.
pub trait Transport: Send + Sync + 'static {
    /// Sendet ein Event an genau eine Verbindung
    ///
    /// Gibt `true` zurueck wenn die Verbindung bekannt war und das Event
    /// eingereiht wurde.
    fn senden(&self, ziel: &ConnectionId, event: ServerEvent) -> bool;

    /// Fuegt eine Verbindung einem Raum hinzu
    fn raum_beitreten(&self, raum: &ChannelName, verbindung: ConnectionId);

    /// Sendet ein Event an alle Mitglieder eines Raums
    ///
    /// Gibt die Anzahl der erfolgreichen Zustellungen zurueck.
    fn an_raum_senden(&self, raum: &ChannelName, event: ServerEvent) -> usize;

    /// Sendet ein Event an alle Mitglieder eines Raums ausser einer Verbindung
    fn an_raum_ausser_senden(
        &self,
        raum: &ChannelName,
        ausgeschlossen: &ConnectionId,
        event: ServerEvent,
    ) -> usize;

    /// Loest einen Raum auf, alle Mitglieder verlieren die Zugehoerigkeit
    fn raum_schliessen(&self, raum: &ChannelName);
}
