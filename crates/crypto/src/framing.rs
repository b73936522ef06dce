//! Converts a duplex byte stream into a duplex encrypted-frame stream.
//!
//! Wire layout per frame, in order: `magic(4) | version(2) | flags(2) |
//! length(4) | iv(12) | tag(16) | ciphertext(length)`. There is no session
//! preamble or trailer — a conformant peer produces/consumes frames
//! back-to-back.

use rand::RngCore;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use zeroize::Zeroizing;

use crate::cipher::{CipherEngine, IV_LEN, MAX_FRAME, TAG_LEN};
use crate::error::{CryptoError, Result};
use crate::kdf::derive_session_key;

pub const MAGIC: u32 = 0x434C_4157; // "CLAW"
pub const VERSION: u16 = 0x0001;
const HEADER_LEN: usize = 4 + 2 + 2 + 4;

/// Holds the session's single shared cipher state and turns a raw socket
/// (or any `AsyncRead + AsyncWrite`) into a frame channel.
///
/// There is intentionally one of these per session, owned by the relay and
/// passed by reference into I/O calls — no hidden process-wide statics.
pub struct FramingSession {
    cipher: Option<CipherEngine>,
}

impl Default for FramingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FramingSession {
    pub fn new() -> Self {
        Self { cipher: None }
    }

    /// Derives the session key from `password` and activates the session.
    /// Idempotent: calling again replaces (and zeroes) prior key material.
    pub fn init_from_password(&mut self, password: &str) {
        let key = derive_session_key(password);
        self.cipher = Some(CipherEngine::new(key));
    }

    pub fn is_initialized(&self) -> bool {
        self.cipher.is_some()
    }

    /// Zeroes the key and marks the session uninitialized.
    pub fn teardown(&mut self) {
        self.cipher = None;
    }

    /// Encrypts `plaintext` into one frame and writes it to `socket`.
    /// Returns the plaintext length on success — by construction the only
    /// way to observe `Ok` is for every ciphertext byte to have been
    /// written, so a partial send can never masquerade as success.
    pub async fn write_frame<W>(&self, socket: &mut W, plaintext: &[u8]) -> Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        let cipher = self.cipher.as_ref().ok_or(CryptoError::NotInitialized)?;
        if plaintext.is_empty() || plaintext.len() > MAX_FRAME {
            return Err(CryptoError::InvalidInput("n must be in 1..=8192"));
        }

        let mut iv = [0u8; IV_LEN];
        rand::rngs::OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|_| CryptoError::RngFailure)?;

        let (ciphertext, tag) = cipher.encrypt(plaintext, &iv)?;

        let mut header = [0u8; HEADER_LEN];
        header[0..4].copy_from_slice(&MAGIC.to_be_bytes());
        header[4..6].copy_from_slice(&VERSION.to_be_bytes());
        header[6..8].copy_from_slice(&0u16.to_be_bytes());
        header[8..12].copy_from_slice(&(ciphertext.len() as u32).to_be_bytes());

        socket.write_all(&header).await?;
        socket.write_all(&iv).await?;
        socket.write_all(&tag).await?;
        socket.write_all(&ciphertext).await?;
        socket.flush().await?;

        tracing::trace!(plaintext_len = plaintext.len(), ciphertext_len = ciphertext.len(), "wrote frame");
        Ok(plaintext.len())
    }

    /// Reads and decrypts one frame from `socket`. `cap` bounds the
    /// plaintext the caller is willing to receive (at most 8192).
    ///
    /// Returns `Ok(None)` on clean peer EOF (no bytes of a new frame ever
    /// arrived), `Ok(Some(plaintext))` on success, or `Err` for anything
    /// fatal — callers can never confuse "EOF" with "zero-length success"
    /// because there is no all-integer return value left to overload.
    pub async fn read_frame<R>(&self, socket: &mut R, cap: usize) -> Result<Option<Vec<u8>>>
    where
        R: AsyncRead + Unpin,
    {
        let cipher = self.cipher.as_ref().ok_or(CryptoError::NotInitialized)?;
        if cap == 0 || cap > MAX_FRAME {
            return Err(CryptoError::InvalidInput("cap must be in 1..=8192"));
        }

        let mut header = [0u8; HEADER_LEN];
        if read_to_full_or_clean_eof(socket, &mut header).await? == 0 {
            return Ok(None);
        }

        let magic = u32::from_be_bytes(header[0..4].try_into().unwrap());
        if magic != MAGIC {
            return Err(CryptoError::ProtocolError);
        }

        let version = u16::from_be_bytes(header[4..6].try_into().unwrap());
        if version != VERSION {
            return Err(CryptoError::UnsupportedVersion);
        }

        let length = u32::from_be_bytes(header[8..12].try_into().unwrap()) as usize;
        if length == 0 || length > MAX_FRAME || length > cap {
            return Err(CryptoError::FrameTooLarge);
        }

        let mut iv = [0u8; IV_LEN];
        socket.read_exact(&mut iv).await?;
        let mut tag = [0u8; TAG_LEN];
        socket.read_exact(&mut tag).await?;
        let mut ciphertext = vec![0u8; length];
        socket.read_exact(&mut ciphertext).await?;

        let plaintext = cipher.decrypt(&ciphertext, &iv, &tag)?;
        tracing::trace!(plaintext_len = plaintext.len(), "read frame");
        Ok(Some(plaintext))
    }
}

/// Fills `buf` completely, or returns `Ok(0)` if the peer closed the
/// connection before a single byte arrived. A close partway through is an
/// `IoError`, never a silent short read.
async fn read_to_full_or_clean_eof<R>(socket: &mut R, buf: &mut [u8]) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = socket.read(&mut buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(0);
            }
            return Err(CryptoError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "peer closed mid-header",
            )));
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn session(password: &str) -> FramingSession {
        let mut s = FramingSession::new();
        s.init_from_password(password);
        s
    }

    #[tokio::test]
    async fn round_trip_over_duplex() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let tx = session("s3cretword");
        let rx = session("s3cretword");

        let written = tx.write_frame(&mut a, b"hello\n").await.unwrap();
        assert_eq!(written, 6);

        let plaintext = rx.read_frame(&mut b, 8192).await.unwrap().unwrap();
        assert_eq!(plaintext, b"hello\n");
    }

    #[tokio::test]
    async fn framing_atomicity() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let tx = session("s3cretword");

        tx.write_frame(&mut a, b"abc").await.unwrap();
        drop(a);

        let mut on_wire = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut b, &mut on_wire).await.unwrap();

        assert_eq!(on_wire.len(), HEADER_LEN + IV_LEN + TAG_LEN + 3);
        assert_eq!(&on_wire[0..4], &MAGIC.to_be_bytes());
        assert_eq!(&on_wire[4..6], &VERSION.to_be_bytes());
        assert_eq!(&on_wire[6..8], &[0, 0]);
        assert_eq!(u32::from_be_bytes(on_wire[8..12].try_into().unwrap()), 3);
    }

    #[tokio::test]
    async fn clean_eof_before_any_frame() {
        let (a, mut b) = tokio::io::duplex(4096);
        drop(a);
        let rx = session("s3cretword");
        let result = rx.read_frame(&mut b, 8192).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn wrong_password_fails_authentication() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let tx = session("goodpass1");
        let rx = session("badpass12");

        tx.write_frame(&mut a, b"ping").await.unwrap();
        let result = rx.read_frame(&mut b, 8192).await;
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn bit_flip_in_ciphertext_is_detected() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let tx = session("s3cretword");
        let rx = session("s3cretword");

        tx.write_frame(&mut a, b"abc").await.unwrap();
        drop(a);

        let mut on_wire = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut b, &mut on_wire).await.unwrap();

        let ciphertext_offset = HEADER_LEN + IV_LEN + TAG_LEN;
        on_wire[ciphertext_offset] ^= 0x01;

        let (mut c, mut d) = tokio::io::duplex(4096);
        tokio::io::AsyncWriteExt::write_all(&mut c, &on_wire).await.unwrap();
        drop(c);

        let result = rx.read_frame(&mut d, 8192).await;
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn mismatched_magic_is_protocol_error() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let mut bad_header = [0u8; HEADER_LEN];
        bad_header[0..4].copy_from_slice(&0xDEADBEEFu32.to_be_bytes());
        tokio::io::AsyncWriteExt::write_all(&mut a, &bad_header).await.unwrap();
        drop(a);

        let rx = session("s3cretword");
        let result = rx.read_frame(&mut b, 8192).await;
        assert!(matches!(result, Err(CryptoError::ProtocolError)));
    }

    #[tokio::test]
    async fn write_frame_rejects_oversized_chunk() {
        let (mut a, _b) = tokio::io::duplex(4096);
        let tx = session("s3cretword");
        let big = vec![0x41u8; MAX_FRAME + 1];
        let result = tx.write_frame(&mut a, &big).await;
        assert!(matches!(result, Err(CryptoError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn uninitialized_session_rejects_io() {
        let (mut a, _b) = tokio::io::duplex(4096);
        let s = FramingSession::new();
        assert!(!s.is_initialized());
        let result = s.write_frame(&mut a, b"x").await;
        assert!(matches!(result, Err(CryptoError::NotInitialized)));
    }

    #[tokio::test]
    async fn teardown_zeroes_and_requires_reinit() {
        let mut s = session("s3cretword");
        s.teardown();
        assert!(!s.is_initialized());
        let (mut a, _b) = tokio::io::duplex(4096);
        assert!(matches!(
            s.write_frame(&mut a, b"x").await,
            Err(CryptoError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn ten_thousand_frames_have_unique_ivs() {
        const FRAME_LEN: usize = HEADER_LEN + IV_LEN + TAG_LEN + 1; // 1-byte plaintext "x"

        let (mut a, mut b) = tokio::io::duplex(1 << 16);
        let tx = session("s3cretword");

        let producer = async {
            for _ in 0..10_000u32 {
                tx.write_frame(&mut a, b"x").await.unwrap();
            }
        };

        let consumer = async {
            let mut seen = HashSet::new();
            let mut frame = [0u8; FRAME_LEN];
            for _ in 0..10_000u32 {
                b.read_exact(&mut frame).await.unwrap();
                let iv: [u8; IV_LEN] = frame[HEADER_LEN..HEADER_LEN + IV_LEN].try_into().unwrap();
                assert!(seen.insert(iv), "IV reuse detected");
            }
        };

        tokio::join!(producer, consumer);
    }

    #[test]
    fn zeroizing_key_material_is_wiped_on_drop() {
        // CipherEngine's key field is Zeroizing<[u8; 32]>; dropping it
        // zeroes the backing buffer. This test just documents the
        // invariant at the type level via compile-time assertion.
        fn assert_zeroize<T: zeroize::Zeroize>() {}
        assert_zeroize::<Zeroizing<[u8; 32]>>();
    }
}
