//! Fehlertypen fuer den Signaling-Service

use fluester_auth::AuthError;
use thiserror::Error;

/// Fehlertyp fuer den Signaling-Service
///
/// Keiner dieser Fehler beendet den Prozess. Sie betreffen immer nur eine
/// einzelne Anfrage oder eine einzelne Verbindung.
#[derive(Debug, Error)]
pub enum SignalingError {
    /// IO-Fehler (Listener, Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Code-Hashing fehlgeschlagen
    #[error("Hashing-Fehler: {0}")]
    Auth(#[from] AuthError),

    /// Hintergrund-Task (spawn_blocking) abgebrochen
    #[error("Hintergrund-Task fehlgeschlagen: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_fehler_wird_umgewandelt() {
        let fehler: SignalingError =
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "belegt").into();
        assert!(matches!(fehler, SignalingError::Io(_)));
        assert!(fehler.to_string().contains("belegt"));
    }

    #[test]
    fn auth_fehler_wird_umgewandelt() {
        let fehler: SignalingError = AuthError::CodeHashing("kaputt".into()).into();
        assert_eq!(fehler.to_string(), "Hashing-Fehler: Code-Hashing fehlgeschlagen: kaputt");
    }
}
