//! One-shot AES-256-GCM cipher engine.
//!
//! Stateless across calls except for the held key; never generates IVs
//! itself (that's the framing layer's job, since IV freshness is a
//! per-frame wire concern, not a cipher concern).

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};
use crate::kdf::KEY_LEN;

pub const IV_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
pub const MAX_FRAME: usize = 8192;

pub struct CipherEngine {
    cipher: Aes256Gcm,
    // Kept alongside the cipher purely so `destroy` has bytes to zero;
    // `Aes256Gcm` itself is treated as opaque.
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl CipherEngine {
    pub fn new(key: Zeroizing<[u8; KEY_LEN]>) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_ref()));
        Self { cipher, key }
    }

    /// Accepts a key of any length: zero-padded if short, truncated if
    /// long. Preserved for backwards-compatible callers but not exposed
    /// outside this crate — the supported entry point for real sessions is
    /// [`crate::kdf::derive_session_key`], which always yields 32 bytes.
    pub(crate) fn from_raw_key_bytes(bytes: &[u8]) -> Self {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        let n = bytes.len().min(KEY_LEN);
        key[..n].copy_from_slice(&bytes[..n]);
        Self::new(key)
    }

    /// Encrypts `plaintext`, returning `(ciphertext, tag)` with the tag
    /// split out as its own 16-byte array, matching the wire frame's
    /// separate `tag` field.
    pub fn encrypt(&self, plaintext: &[u8], iv: &[u8; IV_LEN]) -> Result<(Vec<u8>, [u8; TAG_LEN])> {
        if plaintext.is_empty() || plaintext.len() > MAX_FRAME {
            return Err(CryptoError::InvalidInput("plaintext length must be in 1..=8192"));
        }

        let nonce = Nonce::from_slice(iv);
        let mut sealed = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::CryptoFailure)?;

        let tag_bytes = sealed.split_off(sealed.len() - TAG_LEN);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&tag_bytes);
        Ok((sealed, tag))
    }

    /// Decrypts `ciphertext` under `iv`, verifying `tag`. A tag mismatch
    /// surfaces as `AuthenticationFailed`; no partial plaintext is ever
    /// returned on failure.
    pub fn decrypt(&self, ciphertext: &[u8], iv: &[u8; IV_LEN], tag: &[u8; TAG_LEN]) -> Result<Vec<u8>> {
        if ciphertext.is_empty() || ciphertext.len() > MAX_FRAME {
            return Err(CryptoError::InvalidInput("ciphertext length must be in 1..=8192"));
        }

        let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(ciphertext);
        sealed.extend_from_slice(tag);

        let nonce = Nonce::from_slice(iv);
        self.cipher
            .decrypt(nonce, sealed.as_slice())
            .map_err(|_| CryptoError::AuthenticationFailed)
    }

    /// Explicit teardown: zero the key now rather than waiting for drop.
    /// `Drop` also zeroes via `Zeroizing`, so this mainly documents intent
    /// at call sites that want to be explicit about session end.
    pub fn destroy(self) {
        drop(self);
    }
}
