use thiserror::Error;

/// Protocol-level errors for both ends of the connection.
///
/// The wire only ever carries a one-byte `S`/`F` status; everything richer in
/// here exists for local logging and for the client's printed diagnostics.
#[derive(Error, Debug)]
pub enum FtpError {
    #[error("malformed frame: {0}")]
    Framing(String),

    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("operation rejected: {0}")]
    Rejected(String),

    #[error("data channel failure: {0}")]
    Transfer(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FtpError {
    /// Maps a failed socket read: a clean EOF mid-frame is a peer departure,
    /// anything else stays an I/O error.
    pub fn from_read_error(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            FtpError::ConnectionClosed
        } else {
            FtpError::Io(err)
        }
    }
}
