//! Random credential generation.

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::SecretError;

/// Length of the stable cluster identifier.
pub const IDENTIFIER_LENGTH: usize = 8;
/// Length of the generated admin password.
pub const ADMIN_PASSWORD_LENGTH: usize = 20;
/// Length of the shared key members use to authenticate to each other.
pub const AUTH_KEY_LENGTH: usize = 512;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of random alphanumeric strings.
pub trait SecretGenerator {
    fn generate(&self, length: usize) -> Result<String, SecretError>;
}

/// Generates secrets from the operating system's entropy source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSecretGenerator;

impl SecretGenerator for OsSecretGenerator {
    fn generate(&self, length: usize) -> Result<String, SecretError> {
        // Bytes at or above this bound are rejected so every character is equally likely.
        let bound = (u8::MAX as usize + 1) / CHARSET.len() * CHARSET.len();

        let mut out = String::with_capacity(length);
        let mut buf = [0u8; 64];
        while out.len() < length {
            OsRng
                .try_fill_bytes(&mut buf)
                .map_err(|e| SecretError(e.to_string()))?;
            for &b in &buf {
                if out.len() == length {
                    break;
                }
                if (b as usize) < bound {
                    out.push(CHARSET[b as usize % CHARSET.len()] as char);
                }
            }
        }
        Ok(out)
    }
}
