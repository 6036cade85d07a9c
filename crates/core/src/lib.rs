//! fluester-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Fluester-Crates gemeinsam genutzt werden: Verbindungs-IDs,
//! normalisierte Channel-Namen und der zentrale Fehlertyp.

pub mod channel;
pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use channel::ChannelName;
pub use error::CoreError;
pub use types::ConnectionId;
