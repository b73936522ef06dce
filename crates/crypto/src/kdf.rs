//! Password-based session key derivation.
//!
//! PBKDF2-HMAC-SHA256, 100k iterations, a fixed 16-byte salt. The salt is
//! hard-coded so two peers given the same password derive the same key
//! without any prior exchange — see the module-level note in `lib.rs` for
//! why that's a deliberate, documented limitation rather than a bug.

use hmac::Hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

pub const KEY_LEN: usize = 32;
const PBKDF2_ITERATIONS: u32 = 100_000;

/// ASCII bytes of "CLAWSEC2025AESGC" — the wire-compatible fixed salt.
const SALT: &[u8; 16] = b"CLAWSEC2025AESGC";

/// Derives the 32-byte AES-256 session key from a password.
///
/// Warns (via `tracing::warn!`) but does not reject passwords shorter than
/// 8 characters — short passwords are a user risk, not a protocol error.
pub fn derive_session_key(password: &str) -> Zeroizing<[u8; KEY_LEN]> {
    if password.len() < 8 {
        tracing::warn!("password shorter than 8 characters; session key is weak");
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    // PBKDF2 with HMAC-SHA256 never fails for this output length, so the
    // `pbkdf2` crate's function signature (which returns `()`) is honored
    // directly rather than papered over with an error we can't produce.
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password.as_bytes(), SALT, PBKDF2_ITERATIONS, &mut *key)
        .expect("HMAC-SHA256 output length is always valid for PBKDF2");
    key
}
