use crate::core_protocol::frame::{self, Status};
use crate::error::FtpError;
use log::info;
use tokio::net::TcpStream;

/// Handles the `quit` command: acknowledges with `S` so the client's
/// bookkeeping stays consistent, then lets the session tear down.
pub async fn handle_quit_command(control: &mut TcpStream, client_id: u64) -> Result<(), FtpError> {
    info!("Client #{}: quit", client_id);
    frame::write_status(control, Status::Success).await
}
