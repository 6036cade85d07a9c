//! Code-Hashing mit Argon2id
//!
//! Join-Codes sind kurz (typisch 6 Ziffern), deshalb wird ein teurer,
//! gesalzener Hash verwendet. Laenge und Zeichensatz des Codes prueft
//! dieses Modul nicht, das ist Sache des Clients.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{AuthError, AuthResult};

/// Argon2id-Parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParameter {
    /// Speicherbedarf in KiB
    pub speicher_kib: u32,
    /// Anzahl Iterationen
    pub iterationen: u32,
    /// Parallelismus (Lanes)
    pub parallelitaet: u32,
}

impl HashParameter {
    /// Kleinstmoegliche Parameter, nur fuer Tests gedacht
    pub const MINIMAL: Self = Self {
        speicher_kib: 8,
        iterationen: 1,
        parallelitaet: 1,
    };
}

impl Default for HashParameter {
    /// Werte gemaess OWASP-Empfehlungen (Stand 2024):
    /// - Speicher: 64 MiB
    /// - Iterationen: 3
    /// - Parallelismus: 1
    fn default() -> Self {
        Self {
            speicher_kib: 64 * 1024,
            iterationen: 3,
            parallelitaet: 1,
        }
    }
}

/// Hasht und verifiziert Join-Codes
///
/// Clone ist billig (nur die Parameter werden kopiert).
#[derive(Clone)]
pub struct CodeHasher {
    argon2: Argon2<'static>,
}

impl CodeHasher {
    /// Erstellt einen neuen CodeHasher
    ///
    /// Schlaegt fehl wenn argon2 die Parameter ablehnt (z.B. zu wenig Speicher
    /// fuer die gewuenschte Parallelitaet).
    pub fn neu(parameter: HashParameter) -> AuthResult<Self> {
        let params = Params::new(
            parameter.speicher_kib,
            parameter.iterationen,
            parameter.parallelitaet,
            None, // output_len: Standard (32 Bytes)
        )
        .map_err(|e| AuthError::UngueltigeParameter(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hasht einen Code mit einem frischen zufaelligen Salt
    ///
    /// Gibt den PHC-String zurueck (inkl. Algorithmus, Parameter und Salt).
    pub fn hashen(&self, code: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(code.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::CodeHashing(e.to_string()))
    }

    /// Prueft einen Code gegen einen gespeicherten PHC-Hash
    ///
    /// Ein kaputter oder unlesbarer Hash ergibt `false`, nie einen Fehler.
    pub fn verifizieren(&self, code: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(fehler = %e, "Gespeicherter Code-Hash nicht lesbar");
                return false;
            }
        };

        match self.argon2.verify_password(code.as_bytes(), &parsed_hash) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                tracing::warn!(fehler = %e, "Code-Verifikation fehlgeschlagen");
                false
            }
        }
    }
}

impl std::fmt::Debug for CodeHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CodeHasher {
        CodeHasher::neu(HashParameter::MINIMAL).expect("Parameter muessen gueltig sein")
    }

    #[test]
    fn code_hashen_und_verifizieren() {
        let hasher = hasher();
        let hash = hasher.hashen("123456").expect("Hashing fehlgeschlagen");

        assert!(
            hash.starts_with("$argon2id$"),
            "Hash muss mit $argon2id$ beginnen"
        );
        assert!(!hash.contains("123456"), "Klartext darf nicht im Hash stehen");
        assert!(hasher.verifizieren("123456", &hash));
    }

    #[test]
    fn falscher_code_wird_abgelehnt() {
        let hasher = hasher();
        let hash = hasher.hashen("123456").expect("Hashing fehlgeschlagen");

        assert!(!hasher.verifizieren("000000", &hash));
        assert!(!hasher.verifizieren("", &hash));
        assert!(!hasher.verifizieren("1234567", &hash));
    }

    #[test]
    fn gleiche_codes_unterschiedliche_hashes() {
        let hasher = hasher();
        let hash1 = hasher.hashen("123456").expect("Hashing 1 fehlgeschlagen");
        let hash2 = hasher.hashen("123456").expect("Hashing 2 fehlgeschlagen");

        assert_ne!(hash1, hash2, "Frisches Salt pro Aufruf erwartet");
        assert!(hasher.verifizieren("123456", &hash1));
        assert!(hasher.verifizieren("123456", &hash2));
    }

    #[test]
    fn kaputter_hash_ergibt_false() {
        let hasher = hasher();
        assert!(!hasher.verifizieren("123456", "kein_gueltiger_hash"));
        assert!(!hasher.verifizieren("123456", ""));
        assert!(!hasher.verifizieren("123456", "$argon2id$v=19$m=8,t=1,p=1$kaputt"));
    }

    #[test]
    fn hash_mit_anderen_parametern_bleibt_pruefbar() {
        let hash = hasher().hashen("geheim").unwrap();
        let anderer = CodeHasher::neu(HashParameter {
            speicher_kib: 16,
            iterationen: 2,
            parallelitaet: 1,
        })
        .unwrap();
        assert!(anderer.verifizieren("geheim", &hash));
    }

    #[test]
    fn code_wird_als_beliebige_bytes_behandelt() {
        let hasher = hasher();
        let hash = hasher.hashen("  äöü 🔑  ").unwrap();
        assert!(hasher.verifizieren("  äöü 🔑  ", &hash));
        assert!(!hasher.verifizieren("äöü 🔑", &hash));
    }

    #[test]
    fn ungueltige_parameter_geben_fehler() {
        let ergebnis = CodeHasher::neu(HashParameter {
            speicher_kib: 1,
            iterationen: 0,
            parallelitaet: 1,
        });
        assert!(matches!(ergebnis, Err(AuthError::UngueltigeParameter(_))));
    }

    #[test]
    fn standard_parameter_sind_gueltig() {
        assert!(CodeHasher::neu(HashParameter::default()).is_ok());
    }
}
