//! The relay's local half: either this process's own stdio, or the piped
//! stdio of a child process spawned for exec mode. Both variants expose
//! the same read/write/shutdown surface so the event loop never branches
//! on which one it is driving.

use std::io;
use std::io::IsTerminal;
use std::process::Stdio as StdStdio;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

pub enum LocalEndpoint {
    Stdio {
        stdin: tokio::io::Stdin,
        stdout: tokio::io::Stdout,
    },
    Subprocess {
        child: Child,
        stdin: ChildStdin,
        stdout: ChildStdout,
    },
    /// An in-process duplex pipe standing in for a local terminal, so the
    /// relay loop can be exercised end-to-end without a real tty or child
    /// process. Not reachable outside integration tests.
    #[cfg(feature = "test-util")]
    Mem(tokio::io::DuplexStream),
}

impl LocalEndpoint {
    pub fn stdio() -> Self {
        Self::Stdio {
            stdin: tokio::io::stdin(),
            stdout: tokio::io::stdout(),
        }
    }

    /// Spawns `program` with its stdin/stdout piped to the relay. Stderr is
    /// inherited so the child's own diagnostics still reach the terminal;
    /// there is no in-process alternative to this — exec mode always means
    /// a real subprocess boundary.
    pub fn spawn(program: &str) -> io::Result<Self> {
        let mut child = Command::new(program)
            .stdin(StdStdio::piped())
            .stdout(StdStdio::piped())
            .stderr(StdStdio::inherit())
            .spawn()?;
        let stdin = child.stdin.take().expect("stdin was piped at spawn");
        let stdout = child.stdout.take().expect("stdout was piped at spawn");
        Ok(Self::Subprocess { child, stdin, stdout })
    }

    #[cfg(feature = "test-util")]
    pub fn mem(stream: tokio::io::DuplexStream) -> Self {
        Self::Mem(stream)
    }

    /// Chat mode only ever applies to the real terminal, never a subprocess.
    pub fn is_chat_capable(&self) -> bool {
        matches!(self, Self::Stdio { .. }) && io::stdin().is_terminal() && io::stdout().is_terminal()
    }

    /// Reads from the local source: this process's stdin, or the child's
    /// stdout.
    pub async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Stdio { stdin, .. } => stdin.read(buf).await,
            Self::Subprocess { stdout, .. } => stdout.read(buf).await,
            #[cfg(feature = "test-util")]
            Self::Mem(stream) => stream.read(buf).await,
        }
    }

    /// Writes to the local sink: this process's stdout, or the child's
    /// stdin.
    pub async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Self::Stdio { stdout, .. } => stdout.write_all(buf).await,
            Self::Subprocess { stdin, .. } => stdin.write_all(buf).await,
            #[cfg(feature = "test-util")]
            Self::Mem(stream) => stream.write_all(buf).await,
        }
    }

    /// Shuts down the local sink's write half, mirroring the socket-side
    /// half-close the relay issues on its own local-input EOF.
    pub async fn shutdown_write(&mut self) -> io::Result<()> {
        match self {
            Self::Stdio { stdout, .. } => stdout.shutdown().await,
            Self::Subprocess { stdin, .. } => stdin.shutdown().await,
            #[cfg(feature = "test-util")]
            Self::Mem(stream) => stream.shutdown().await,
        }
    }

    /// Waits for the child to exit. A no-op for every other variant.
    pub async fn reap(&mut self) -> io::Result<()> {
        if let Self::Subprocess { child, .. } = self {
            child.wait().await?;
        }
        Ok(())
    }
}
