//! The event loop: a single current-thread task multiplexing the socket
//! and the local endpoint via `tokio::select!`. There are no background
//! threads and no timers beyond the optional connect deadline handled
//! upstream in [`crate::net`].

use clawsec_crypto::{FramingSession, MAX_FRAME};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::chat::ChatRenderer;
use crate::endpoint::LocalEndpoint;
use crate::error::Result;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// What ended the session: ordinary completion, or an interrupt signal.
#[derive(Debug)]
pub enum RelayOutcome {
    Completed(RelayStats),
    Cancelled,
}

pub struct RelayOptions {
    /// Whether this side of the session is the listener (`-l`) or the
    /// connector. Only affects chat-mode role labeling in the banner.
    pub is_server: bool,
    /// Whether the caller requested chat-mode presentation; only takes
    /// effect if the local endpoint is an interactive terminal.
    pub chat: bool,
}

/// Drives one session to completion: reads frames off `socket` and writes
/// their plaintext to `local`'s sink; reads chunks off `local`'s source and
/// writes them as frames to `socket`. Returns as soon as the peer closes
/// (after shutting down `local`'s write half) or local input drains with
/// the peer still open, or immediately on a fatal error or interrupt.
pub async fn run<S>(
    mut socket: S,
    framing: FramingSession,
    mut local: LocalEndpoint,
    opts: RelayOptions,
) -> Result<RelayOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let chat_mode = opts.chat && local.is_chat_capable();

    if chat_mode {
        local
            .write_all(ChatRenderer::established_banner(opts.is_server).as_bytes())
            .await?;
    }

    let mut local_buf = vec![0u8; MAX_FRAME];
    let mut local_open = true;
    let mut stats = RelayStats::default();

    let outcome = loop {
        tokio::select! {
            biased;

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, closing session");
                break RelayOutcome::Cancelled;
            }

            frame = framing.read_frame(&mut socket, MAX_FRAME) => {
                match frame? {
                    None => {
                        tracing::info!("peer closed");
                        local.shutdown_write().await?;
                        break RelayOutcome::Completed(stats);
                    }
                    Some(plaintext) => {
                        stats.bytes_received += plaintext.len() as u64;
                        if chat_mode {
                            let rendered = ChatRenderer::render(
                                crate::chat::REMOTE_LABEL,
                                crate::chat::COLOR_CYAN,
                                &plaintext,
                            );
                            local.write_all(&rendered).await?;
                        } else {
                            local.write_all(&plaintext).await?;
                        }
                    }
                }
            }

            read = local.read(&mut local_buf), if local_open => {
                let n = read?;
                if n == 0 {
                    tracing::debug!("local input closed, shutting down write half");
                    socket.shutdown().await?;
                    local_open = false;
                } else {
                    let chunk = &local_buf[..n];
                    if chat_mode {
                        let rendered = ChatRenderer::render(crate::chat::LOCAL_LABEL, crate::chat::COLOR_GREEN, chunk);
                        local.write_all(&rendered).await?;
                    }
                    let written = framing.write_frame(&mut socket, chunk).await?;
                    stats.bytes_sent += written as u64;
                }
            }
        }
    };

    local.reap().await?;

    if !chat_mode {
        if let RelayOutcome::Completed(s) = &outcome {
            tracing::info!(bytes_sent = s.bytes_sent, bytes_received = s.bytes_received, "transfer complete");
        }
    }

    Ok(outcome)
}
