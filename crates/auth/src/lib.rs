//! fluester-auth – Join-Code-Hashing
//!
//! Der Join-Code eines Channels wird nie im Klartext gehalten. Dieses Crate
//! hasht ihn beim Eroeffnen mit Argon2id (frisches Salt pro Aufruf) und
//! prueft spaetere Join-Versuche gegen den gespeicherten PHC-String.

pub mod code;
pub mod error;

// Bequeme Re-Exporte
pub use code::{CodeHasher, HashParameter};
pub use error::{AuthError, AuthResult};
