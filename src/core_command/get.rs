use crate::core_network::data;
use crate::core_protocol::frame::{self, Status};
use crate::error::FtpError;
use crate::helpers::{filename_is_safe, resolve_in_root};
use log::{info, warn};
use std::path::Path;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// Handles the `get` command: streams a server-side file to the client as
/// one data frame, then reports the outcome on the control channel.
///
/// Hidden names, path escapes, and missing files are rejected identically: a
/// zero-length data frame followed by `F`. The file is read into memory
/// under the shared lock; the transfer itself happens off the lock.
///
/// # Arguments
///
/// * `control` - The session's control stream, for the status byte.
/// * `data_stream` - The already-dialed data connection.
/// * `root` - The server's fixed directory.
/// * `file_lock` - Shared lock serializing filesystem access across sessions.
/// * `name` - The requested filename.
/// * `client_id` - Session id for log correlation.
pub async fn handle_get_command(
    control: &mut TcpStream,
    mut data_stream: TcpStream,
    root: &Path,
    file_lock: &Mutex<()>,
    name: &str,
    client_id: u64,
) -> Result<(), FtpError> {
    if !filename_is_safe(name) {
        warn!("Client #{}: get rejected, unsafe name {:?}", client_id, name);
        return fail(control, data_stream).await;
    }

    let path = resolve_in_root(root, name);
    let contents = {
        let _guard = file_lock.lock().await;
        if !path.exists() {
            None
        } else {
            Some(tokio::fs::read(&path).await)
        }
    };

    let contents = match contents {
        Some(Ok(bytes)) => bytes,
        Some(Err(e)) => {
            warn!("Client #{}: get failed to read {:?}: {}", client_id, path, e);
            return fail(control, data_stream).await;
        }
        None => {
            warn!(
                "Client #{}: get rejected, no such file {:?}",
                client_id, name
            );
            return fail(control, data_stream).await;
        }
    };

    if let Err(e) = frame::write_data_frame(&mut data_stream, &contents).await {
        warn!("Client #{}: get transfer failed: {}", client_id, e);
        data::shutdown_data_channel(data_stream).await;
        return frame::write_status(control, Status::Failure).await;
    }
    data::shutdown_data_channel(data_stream).await;
    info!(
        "Client #{}: get {} SUCCESS ({} bytes)",
        client_id,
        name,
        contents.len()
    );
    frame::write_status(control, Status::Success).await
}

/// Rejection path: zero-length data frame so the client's unconditional
/// data read terminates, then `F`.
async fn fail(control: &mut TcpStream, mut data_stream: TcpStream) -> Result<(), FtpError> {
    let _ = frame::write_data_frame(&mut data_stream, &[]).await;
    data::shutdown_data_channel(data_stream).await;
    frame::write_status(control, Status::Failure).await
}
