//! End-to-end echo scenario: a listener-side session and a connector-side
//! session, wired together over an in-process duplex pipe standing in for
//! the TCP socket, each driven by the real event loop.

use clawsec_crypto::FramingSession;
use clawsec_relay::{LocalEndpoint, RelayOptions};

fn framing(password: &str) -> FramingSession {
    let mut f = FramingSession::new();
    f.init_from_password(password);
    f
}

#[tokio::test]
async fn client_stdin_reaches_server_stdout() {
    let (server_sock, client_sock) = tokio::io::duplex(1 << 16);
    let (server_local, mut server_local_peer) = tokio::io::duplex(1 << 16);
    let (client_local, mut client_local_peer) = tokio::io::duplex(1 << 16);

    let server = tokio::spawn(async move {
        clawsec_relay::run(
            server_sock,
            framing("s3cretword"),
            LocalEndpoint::mem(server_local),
            RelayOptions { is_server: true, chat: false },
        )
        .await
    });

    let client = tokio::spawn(async move {
        clawsec_relay::run(
            client_sock,
            framing("s3cretword"),
            LocalEndpoint::mem(client_local),
            RelayOptions { is_server: false, chat: false },
        )
        .await
    });

    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    client_local_peer.write_all(b"hello\n").await.unwrap();
    client_local_peer.shutdown().await.unwrap();

    let mut received = Vec::new();
    server_local_peer.read_to_end(&mut received).await.unwrap();
    assert_eq!(received, b"hello\n");

    let server_outcome = server.await.unwrap().unwrap();
    let client_outcome = client.await.unwrap().unwrap();

    match server_outcome {
        clawsec_relay::RelayOutcome::Completed(stats) => assert_eq!(stats.bytes_received, 6),
        other => panic!("unexpected server outcome: {other:?}"),
    }
    match client_outcome {
        clawsec_relay::RelayOutcome::Completed(stats) => assert_eq!(stats.bytes_sent, 6),
        other => panic!("unexpected client outcome: {other:?}"),
    }
}

#[tokio::test]
async fn wrong_password_aborts_without_emitting_plaintext() {
    let (server_sock, client_sock) = tokio::io::duplex(1 << 16);
    let (server_local, mut server_local_peer) = tokio::io::duplex(1 << 16);
    let (client_local, mut client_local_peer) = tokio::io::duplex(1 << 16);

    let server = tokio::spawn(async move {
        clawsec_relay::run(
            server_sock,
            framing("goodpass1"),
            LocalEndpoint::mem(server_local),
            RelayOptions { is_server: true, chat: false },
        )
        .await
    });

    let client = tokio::spawn(async move {
        clawsec_relay::run(
            client_sock,
            framing("badpass12"),
            LocalEndpoint::mem(client_local),
            RelayOptions { is_server: false, chat: false },
        )
        .await
    });

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    client_local_peer.write_all(b"ping").await.unwrap();

    let server_result = server.await.unwrap();
    assert!(server_result.is_err());

    let mut buf = [0u8; 8];
    let n = tokio::time::timeout(std::time::Duration::from_millis(200), server_local_peer.read(&mut buf))
        .await
        .unwrap_or(Ok(0))
        .unwrap_or(0);
    assert_eq!(n, 0, "no plaintext should ever reach the server's local sink");

    client_local_peer.shutdown().await.ok();
    let _ = client.await;
}
