//! Authenticated cookie codec
//!
//! Encrypts a small string map for transport in a browser cookie using
//! XChaCha20-Poly1305. The encryption key is derived from the configured
//! long-term secret and a per-process block key, so tokens issued before a
//! restart no longer decode. The cookie name is bound as associated data;
//! a token moved under another name fails authentication.

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

/// Name of the session cookie
pub const SESSION_COOKIE_NAME: &str = "session_cookie";

/// XChaCha20-Poly1305 nonce length in bytes
const NONCE_LENGTH: usize = 24;

/// Cookie codec errors
#[derive(Error, Debug)]
pub enum CodecError {
    /// Configured secret is too short to key the codec
    #[error("cookie secret too short: got {actual} bytes, need at least {minimum}")]
    SecretTooShort { actual: usize, minimum: usize },

    /// Token is malformed, tampered with, or keyed differently.
    ///
    /// One opaque variant on purpose: a decoder must not learn which check
    /// failed.
    #[error("cookie token rejected")]
    Invalid,
}

/// Authenticated encryption codec for the session cookie
pub struct CookieCodec {
    cipher: XChaCha20Poly1305,
}

impl CookieCodec {
    /// Minimum allowed secret length in bytes (256 bits)
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create a codec from the long-term secret and a block key.
    ///
    /// The effective key is HMAC-SHA256 of the block key under the secret,
    /// so both inputs must match for a token to decode.
    ///
    /// # Errors
    /// Returns an error if the secret is shorter than 32 bytes.
    pub fn new(secret: impl AsRef<[u8]>, block_key: &[u8; 32]) -> Result<Self, CodecError> {
        let secret = secret.as_ref();
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(CodecError::SecretTooShort {
                actual: secret.len(),
                minimum: Self::MIN_SECRET_LENGTH,
            });
        }

        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret)
            .expect("HMAC accepts keys of any length");
        mac.update(block_key);
        let key_bytes = mac.finalize().into_bytes();

        Ok(Self {
            cipher: XChaCha20Poly1305::new(Key::from_slice(key_bytes.as_slice())),
        })
    }

    /// Generate a fresh random block key.
    ///
    /// Called once at process start; a restart therefore invalidates every
    /// outstanding token.
    pub fn generate_block_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Encrypt a payload into a cookie-safe token
    pub fn encode(&self, payload: &HashMap<String, String>) -> Result<String, CodecError> {
        let plaintext = serde_json::to_vec(payload).map_err(|_| CodecError::Invalid)?;

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(
                XNonce::from_slice(&nonce_bytes),
                Payload {
                    msg: &plaintext,
                    aad: SESSION_COOKIE_NAME.as_bytes(),
                },
            )
            .map_err(|_| CodecError::Invalid)?;

        let mut token = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(token))
    }

    /// Decrypt a token back into its payload.
    ///
    /// Never returns a partially-trusted payload: any failure along the way
    /// yields [`CodecError::Invalid`].
    pub fn decode(&self, token: &str) -> Result<HashMap<String, String>, CodecError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| CodecError::Invalid)?;
        if raw.len() <= NONCE_LENGTH {
            return Err(CodecError::Invalid);
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LENGTH);
        let plaintext = self
            .cipher
            .decrypt(
                XNonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad: SESSION_COOKIE_NAME.as_bytes(),
                },
            )
            .map_err(|_| CodecError::Invalid)?;

        serde_json::from_slice(&plaintext).map_err(|_| CodecError::Invalid)
    }
}

impl std::fmt::Debug for CookieCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieCodec").finish_non_exhaustive()
    }
}
