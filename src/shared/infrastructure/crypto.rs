/// Credentials-at-rest encryption
///
/// Thin typed facade over fernet: symmetric, authenticated tokens in base64
/// string form. Tampered or truncated tokens are rejected with a distinguishable
/// decryption error instead of yielding corrupted plaintext.
use crate::shared::errors::{AppError, AppResult};
use fernet::Fernet;

#[derive(Clone)]
pub struct CredentialCipher {
    fernet: Fernet,
}

impl CredentialCipher {
    /// Build a cipher from a URL-safe base64 key (32 bytes before encoding)
    pub fn new(key: &str) -> AppResult<Self> {
        let fernet = Fernet::new(key).ok_or_else(|| {
            AppError::ConfigError(
                "Invalid credentials encryption key: expected 32 url-safe base64-encoded bytes"
                    .to_string(),
            )
        })?;
        Ok(Self { fernet })
    }

    /// Generate a fresh key, for provisioning and key rotation
    pub fn generate_key() -> String {
        Fernet::generate_key()
    }

    pub fn encrypt(&self, plaintext: &str) -> String {
        self.fernet.encrypt(plaintext.as_bytes())
    }

    pub fn decrypt(&self, token: &str) -> AppResult<String> {
        let plaintext = self
            .fernet
            .decrypt(token)
            .map_err(|_| AppError::DecryptionError("Invalid credentials token".to_string()))?;
        String::from_utf8(plaintext).map_err(|e| {
            AppError::DecryptionError(format!("Decrypted credentials are not valid UTF-8: {}", e))
        })
    }
}
