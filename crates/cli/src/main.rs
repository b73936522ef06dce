use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use clawsec_crypto::FramingSession;
use clawsec_relay::{self as relay, LocalEndpoint, RelayOptions, RelayOutcome};

/// Encrypted netcat-style relay: connects to, or listens for, a single TCP
/// peer and shuttles AES-256-GCM-protected bytes between the socket and
/// local stdio (or, with `-e`, a subprocess's pipes).
#[derive(Parser, Debug)]
#[command(name = "clawsec", version, about, long_about = None)]
struct Args {
    /// Encryption password (required; both peers must use the same one)
    #[arg(short = 'k', long = "key", value_name = "PASSWORD")]
    key: String,

    /// Listen mode (server): accept one inbound connection instead of connecting out
    #[arg(short = 'l', long = "listen")]
    listen: bool,

    /// Local port to bind in listen mode
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    listen_port: Option<u16>,

    /// Chat-mode presentation: timestamped, role-labeled lines (only takes
    /// effect when stdin and stdout are both terminals)
    #[arg(short = 'c', long = "chat")]
    chat: bool,

    /// Connect timeout in seconds; 0 disables the deadline
    #[arg(short = 'w', long = "wait", default_value_t = 0, value_name = "SECONDS")]
    connect_timeout: u64,

    /// Verbose output; repeat for more detail (-v info, -vv per-frame tracing)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Execute PROGRAM through the encrypted channel instead of local stdio
    #[arg(short = 'e', long = "exec", value_name = "PROGRAM")]
    exec: Option<String>,

    /// Remote host to connect to (connect mode only)
    #[arg(value_name = "HOST")]
    host: Option<String>,

    /// Remote port to connect to (connect mode only)
    #[arg(value_name = "PORT")]
    connect_port: Option<u16>,
}

fn init_tracing(verbosity: u8) {
    let directive = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    if args.key.is_empty() {
        bail!("-k requires a non-empty password");
    }

    let mut framing = FramingSession::new();
    framing.init_from_password(&args.key);

    let socket = if args.listen {
        let port = args.listen_port.context("-l requires -p <port>")?;
        relay::listen_and_accept_one(port).await?
    } else {
        let host = args.host.context("connect mode requires a host argument")?;
        let port = args
            .connect_port
            .context("connect mode requires a port argument")?;
        relay::connect_with_timeout(&host, port, args.connect_timeout).await?
    };

    let local = match &args.exec {
        Some(program) => LocalEndpoint::spawn(program).context("failed to spawn -e program")?,
        None => LocalEndpoint::stdio(),
    };

    let opts = RelayOptions {
        is_server: args.listen,
        chat: args.chat,
    };

    let outcome = relay::run(socket, framing, local, opts).await?;

    Ok(match outcome {
        RelayOutcome::Completed(stats) => {
            tracing::info!(
                bytes_sent = stats.bytes_sent,
                bytes_received = stats.bytes_received,
                "session closed"
            );
            ExitCode::SUCCESS
        }
        RelayOutcome::Cancelled => ExitCode::FAILURE,
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    // A current-thread runtime keeps the relay's readiness-multiplexed
    // event loop cooperative and single-threaded, matching the original
    // select()-based relay rather than spreading work across a pool.
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("ERROR: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}
