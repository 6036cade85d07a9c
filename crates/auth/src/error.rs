//! Fehlertypen fuer das Code-Hashing

use thiserror::Error;

/// Alle moeglichen Fehler beim Hashen von Join-Codes
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Argon2-Parameter ungueltig: {0}")]
    UngueltigeParameter(String),

    #[error("Code-Hashing fehlgeschlagen: {0}")]
    CodeHashing(String),
}

/// Result-Alias fuer das Code-Hashing
pub type AuthResult<T> = Result<T, AuthError>;
