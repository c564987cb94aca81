// src/constants.rs

use std::time::Duration;

/// Longest command text a control frame can carry (one-byte length prefix).
pub const MAX_COMMAND_LEN: usize = 255;

/// Bound on every data-channel accept (client side) and connect (server side).
pub const DATA_CHANNEL_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on waiting for a control-channel status byte that may never arrive
/// (the quit acknowledgement, or the reply drained after a failed transfer).
pub const CONTROL_ACK_TIMEOUT: Duration = Duration::from_secs(5);

pub const PROMPT: &str = "ftp> ";
