use crate::core_network::data;
use crate::core_protocol::frame::{self, Status};
use crate::error::FtpError;
use crate::helpers::{filename_is_safe, resolve_in_root};
use log::{info, warn};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// Handles the `put` command: validates, answers `S`/`F` on the control
/// channel before any data moves, then (on `S`) receives one data frame and
/// stores it, reporting the write outcome as a second status.
///
/// Validation and the file write each hold the shared lock; the upload
/// itself does not. `create_new` closes the gap between the existence check
/// and the write, so two sessions racing on the same name cannot both win.
///
/// # Arguments
///
/// * `control` - The session's control stream, for both status bytes.
/// * `data_stream` - The already-dialed data connection.
/// * `root` - The server's fixed directory.
/// * `file_lock` - Shared lock serializing filesystem access across sessions.
/// * `name` - The filename the client wants to create.
/// * `client_id` - Session id for log correlation.
pub async fn handle_put_command(
    control: &mut TcpStream,
    mut data_stream: TcpStream,
    root: &Path,
    file_lock: &Mutex<()>,
    name: &str,
    client_id: u64,
) -> Result<(), FtpError> {
    let rejected = if !filename_is_safe(name) {
        warn!("Client #{}: put rejected, unsafe name {:?}", client_id, name);
        true
    } else {
        let _guard = file_lock.lock().await;
        let exists = resolve_in_root(root, name).exists();
        if exists {
            warn!(
                "Client #{}: put rejected, {:?} already exists",
                client_id, name
            );
        }
        exists
    };

    if rejected {
        // The client closes the data channel without sending anything.
        data::shutdown_data_channel(data_stream).await;
        return frame::write_status(control, Status::Failure).await;
    }
    frame::write_status(control, Status::Success).await?;

    let payload = match frame::read_data_frame(&mut data_stream).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Client #{}: put upload failed: {}", client_id, e);
            data::shutdown_data_channel(data_stream).await;
            return frame::write_status(control, Status::Failure).await;
        }
    };
    data::shutdown_data_channel(data_stream).await;

    let written = {
        let _guard = file_lock.lock().await;
        store_new_file(&resolve_in_root(root, name), &payload).await
    };
    match written {
        Ok(()) => {
            info!(
                "Client #{}: put {} SUCCESS ({} bytes)",
                client_id,
                name,
                payload.len()
            );
            frame::write_status(control, Status::Success).await
        }
        Err(e) => {
            warn!("Client #{}: put failed to write {:?}: {}", client_id, name, e);
            frame::write_status(control, Status::Failure).await
        }
    }
}

/// Creates and fills the target file, refusing to clobber one that appeared
/// since the pre-transfer check.
async fn store_new_file(path: &Path, payload: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(payload).await?;
    file.flush().await?;
    Ok(())
}
