use thiserror::Error;

/// Error taxonomy for the cipher engine and the crypto framing layer.
///
/// Framing-level errors are treated as fatal to the session by the relay —
/// the only internally-retried condition is `EINTR`, which callers never see
/// surfaced as an error at all because the I/O loop retries it transparently.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("framing used before key derivation")]
    NotInitialized,

    #[error("random number generator failed")]
    RngFailure,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame magic mismatch (wrong peer or wrong protocol)")]
    ProtocolError,

    #[error("unsupported protocol version")]
    UnsupportedVersion,

    #[error("frame length exceeds the 8192-byte cap")]
    FrameTooLarge,

    #[error("AEAD authentication failed (tampering, desync, or wrong key)")]
    AuthenticationFailed,

    #[error("AEAD operation failed")]
    CryptoFailure,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
