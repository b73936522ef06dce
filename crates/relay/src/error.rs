use thiserror::Error;

/// Error taxonomy for connect/listen helpers and the relay event loop.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Crypto(#[from] clawsec_crypto::CryptoError),

    #[error("connect timed out")]
    ConnectTimeout,
}

pub type Result<T> = std::result::Result<T, RelayError>;
