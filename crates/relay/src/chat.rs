//! Chat-mode terminal presentation: `[HH:MM:SS RoleLabel]`-prefixed lines,
//! re-emitted on every embedded newline.

use chrono::Local;

pub const COLOR_RESET: &str = "\x1b[0m";
pub const COLOR_GREEN: &str = "\x1b[32m";
pub const COLOR_CYAN: &str = "\x1b[36m";

pub const LOCAL_LABEL: &str = "You";
pub const REMOTE_LABEL: &str = "Remote";

pub struct ChatRenderer;

impl ChatRenderer {
    /// Announces the session, echoing the original tool's established
    /// banner with the listener/connector roles it actually used.
    pub fn established_banner(is_server: bool) -> String {
        let (local_role, remote_role) = if is_server {
            ("Server", "Client")
        } else {
            ("Client", "Server")
        };
        format!(
            "{COLOR_CYAN}[Secure chat established] local={local_role} remote={remote_role}{COLOR_RESET}\n"
        )
    }

    /// Decorates one plaintext chunk with a timestamped role prefix,
    /// re-inserting the prefix after every newline that isn't the chunk's
    /// final byte, and appending a trailing newline if the chunk lacks one.
    pub fn render(role_label: &str, color: &str, payload: &[u8]) -> Vec<u8> {
        let timestamp = Local::now().format("%H:%M:%S");
        let prefix = format!("{color}[{timestamp} {role_label}]{COLOR_RESET} ");
        let prefix_bytes = prefix.as_bytes();

        let mut out = Vec::with_capacity(payload.len() + prefix_bytes.len() * 2);
        out.extend_from_slice(prefix_bytes);
        for (i, &byte) in payload.iter().enumerate() {
            out.push(byte);
            if byte == b'\n' && i + 1 < payload.len() {
                out.extend_from_slice(prefix_bytes);
            }
        }
        if payload.last() != Some(&b'\n') {
            out.push(b'\n');
        }
        out
    }
}
