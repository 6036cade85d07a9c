//! Session-Registry – Welche Channels leben, wer ist ihr Host
//!
//! Die Registry ist der einzige geteilte, veraenderliche Zustand des
//! Signaling-Kerns. Channels werden genau einmal angelegt und genau einmal
//! entfernt, dazwischen aendert sich nichts an ihnen.
//!
//! ## Atomaritaet
//! `erstellen_falls_frei` nutzt die Entry-API der DashMap: Pruefen und
//! Einfuegen passieren unter demselben Shard-Lock. Von mehreren
//! gleichzeitigen Anfragen fuer denselben Namen gewinnt genau eine.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use fluester_core::{ChannelName, ConnectionId};

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Ein lebender Channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Kanonischer Name
    pub name: ChannelName,
    /// PHC-String des Join-Codes
    pub code_hash: String,
    /// Verbindung, die den Channel eroeffnet hat
    pub host: ConnectionId,
}

/// Ergebnis von `erstellen_falls_frei`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErstellErgebnis {
    /// Channel wurde angelegt
    Erstellt,
    /// Name ist bereits vergeben, nichts wurde veraendert
    BereitsVorhanden,
}

// ---------------------------------------------------------------------------
// SessionRegistry
// ---------------------------------------------------------------------------

/// Zuordnung Channel-Name -> Channel
#[derive(Debug, Default)]
pub struct SessionRegistry {
    channels: DashMap<ChannelName, Channel>,
}

impl SessionRegistry {
    /// Erstellt eine leere Registry
    pub fn neu() -> Self {
        Self::default()
    }

    /// Legt einen Channel an, sofern der Name noch frei ist
    ///
    /// `beim_erstellen` laeuft noch unter dem Shard-Lock. Kein Join und kein
    /// Abbau desselben Namens kann dazwischenkommen.
    pub fn erstellen_falls_frei(
        &self,
        name: ChannelName,
        code_hash: String,
        host: ConnectionId,
        beim_erstellen: impl FnOnce(&Channel),
    ) -> ErstellErgebnis {
        match self.channels.entry(name) {
            Entry::Occupied(_) => ErstellErgebnis::BereitsVorhanden,
            Entry::Vacant(frei) => {
                let name = frei.key().clone();
                let eintrag = frei.insert(Channel {
                    name,
                    code_hash,
                    host,
                });
                beim_erstellen(eintrag.value());
                ErstellErgebnis::Erstellt
            }
        }
    }

    /// Gibt eine Kopie des Channels zurueck, falls er existiert
    pub fn nachschlagen(&self, name: &ChannelName) -> Option<Channel> {
        self.channels.get(name).map(|eintrag| eintrag.value().clone())
    }

    /// Fuehrt `f` aus, solange der Channel mit genau diesem Host lebt
    ///
    /// Der Lese-Guard wird waehrend `f` gehalten, ein gleichzeitiger Abbau
    /// wartet also. `f` darf nicht auf die Registry zugreifen.
    pub fn mit_channel<R>(
        &self,
        name: &ChannelName,
        host: &ConnectionId,
        f: impl FnOnce(&Channel) -> R,
    ) -> Option<R> {
        let eintrag = self.channels.get(name)?;
        if eintrag.host != *host {
            return None;
        }
        Some(f(eintrag.value()))
    }

    /// Entfernt den Channel, dessen Host `host` ist
    ///
    /// Bei mehreren Treffern wird der lexikographisch kleinste Name entfernt,
    /// damit das Ergebnis unabhaengig von der Shard-Reihenfolge ist. Aufrufer
    /// die alle Channels eines Hosts abbauen wollen, rufen in einer Schleife
    /// auf, bis `None` zurueckkommt.
    ///
    /// `beim_entfernen` laeuft unter dem Schreib-Lock, bevor der Eintrag
    /// verschwindet. `f` darf nicht auf die Registry zugreifen.
    pub fn entfernen_nach_host(
        &self,
        host: &ConnectionId,
        beim_entfernen: impl FnOnce(&Channel),
    ) -> Option<ChannelName> {
        // Lese-Guards muessen vor dem Entfernen freigegeben sein
        let kandidat = self
            .channels
            .iter()
            .filter(|eintrag| eintrag.value().host == *host)
            .map(|eintrag| eintrag.key().clone())
            .min()?;

        match self.channels.entry(kandidat) {
            Entry::Occupied(eintrag) if eintrag.get().host == *host => {
                beim_entfernen(eintrag.get());
                let (name, _) = eintrag.remove_entry();
                Some(name)
            }
            _ => None,
        }
    }

    /// Entfernt einen Channel anhand seines Namens
    pub fn entfernen(&self, name: &ChannelName) -> Option<Channel> {
        self.channels.remove(name).map(|(_, channel)| channel)
    }

    /// Anzahl der lebenden Channels
    pub fn anzahl(&self) -> usize {
        self.channels.len()
    }

    /// Prueft ob keine Channels existieren
    pub fn ist_leer(&self) -> bool {
        self.channels.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
