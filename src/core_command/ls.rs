use crate::core_network::data;
use crate::core_protocol::frame::{self, Status};
use crate::error::FtpError;
use crate::helpers::directory_listing;
use log::{error, info};
use std::path::Path;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// Handles the `ls` command: sends the flat listing of non-hidden entries as
/// one data frame, then the status on the control channel.
///
/// The directory is read under the shared lock; the listing bytes go out on
/// the data channel after the lock is released.
pub async fn handle_ls_command(
    control: &mut TcpStream,
    mut data_stream: TcpStream,
    root: &Path,
    file_lock: &Mutex<()>,
    client_id: u64,
) -> Result<(), FtpError> {
    let listing = {
        let _guard = file_lock.lock().await;
        directory_listing(root).await
    };

    match listing {
        Ok(listing) => {
            if let Err(e) = frame::write_data_frame(&mut data_stream, listing.as_bytes()).await {
                error!("Client #{}: ls transfer failed: {}", client_id, e);
                data::shutdown_data_channel(data_stream).await;
                return frame::write_status(control, Status::Failure).await;
            }
            data::shutdown_data_channel(data_stream).await;
            info!("Client #{}: ls SUCCESS", client_id);
            frame::write_status(control, Status::Success).await
        }
        Err(e) => {
            error!("Client #{}: ls failed to read directory: {}", client_id, e);
            // Zero-length frame keeps the client's pending data read alive.
            let _ = frame::write_data_frame(&mut data_stream, &[]).await;
            data::shutdown_data_channel(data_stream).await;
            frame::write_status(control, Status::Failure).await
        }
    }
}
