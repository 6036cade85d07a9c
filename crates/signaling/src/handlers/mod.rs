//! Handler fuer alle Client-Events
//!
//! Jeder Handler ist fuer eine Gruppe von Events zustaendig und hat Zugriff
//! auf den gemeinsamen SignalingState. Handler antworten nie direkt, sondern
//! immer ueber den Transport.

pub mod lifecycle_handler;
pub mod relay_handler;
pub mod session_handler;

#[cfg(test)]
pub(crate) mod testhilfe;
