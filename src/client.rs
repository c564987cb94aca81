use crate::constants::CONTROL_ACK_TIMEOUT;
use crate::core_network::data;
use crate::core_protocol::frame::{self, Status};
use crate::error::FtpError;
use log::{debug, warn};
use std::net::IpAddr;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Client-side controller: owns the control channel and issues one command
/// at a time, completing each full exchange (data channel setup, command
/// frame, transfer, status) before the next.
pub struct Client {
    control: TcpStream,
    local_ip: IpAddr,
    local_dir: PathBuf,
}

impl Client {
    /// Connects the control channel. Downloaded and uploaded files are
    /// resolved against the current directory unless [`Client::with_local_dir`]
    /// overrides it.
    pub async fn connect(host: &str, port: u16) -> Result<Self, FtpError> {
        let control = TcpStream::connect((host, port)).await?;
        let local_ip = control.local_addr()?.ip();
        Ok(Self {
            control,
            local_ip,
            local_dir: PathBuf::from("."),
        })
    }

    /// Overrides the directory local files are read from and written to.
    pub fn with_local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dir = dir.into();
        self
    }

    /// Requests the server's directory listing.
    pub async fn ls(&mut self) -> Result<String, FtpError> {
        let mut data_stream = self.exchange("ls").await?;
        let payload = match frame::read_data_frame(&mut data_stream).await {
            Ok(payload) => payload,
            Err(e) => {
                data::shutdown_data_channel(data_stream).await;
                self.drain_status().await;
                return Err(e);
            }
        };
        data::shutdown_data_channel(data_stream).await;

        match frame::read_status(&mut self.control).await? {
            Status::Success => Ok(String::from_utf8_lossy(&payload).into_owned()),
            Status::Failure => Err(FtpError::Rejected(
                "server could not produce a listing".to_string(),
            )),
        }
    }

    /// Downloads `name` into the local directory, returning the byte count.
    ///
    /// Refuses before touching the network when a local file of that name
    /// already exists; writes the received bytes only after observing `S`.
    pub async fn get(&mut self, name: &str) -> Result<u64, FtpError> {
        let local_path = self.local_dir.join(name);
        if local_path.exists() {
            return Err(FtpError::Rejected(format!(
                "cannot overwrite local file {}",
                name
            )));
        }

        let mut data_stream = self.exchange(&format!("get {}", name)).await?;
        let payload = match frame::read_data_frame(&mut data_stream).await {
            Ok(payload) => payload,
            Err(e) => {
                data::shutdown_data_channel(data_stream).await;
                self.drain_status().await;
                return Err(e);
            }
        };
        data::shutdown_data_channel(data_stream).await;

        match frame::read_status(&mut self.control).await? {
            Status::Success => {
                tokio::fs::write(&local_path, &payload).await?;
                Ok(payload.len() as u64)
            }
            Status::Failure => Err(FtpError::Rejected(format!(
                "server refused to send {}",
                name
            ))),
        }
    }

    /// Uploads the local file `name`, returning the byte count.
    ///
    /// The server answers before any data moves; on `F` nothing is sent and
    /// the already-open data connection is simply closed.
    pub async fn put(&mut self, name: &str) -> Result<u64, FtpError> {
        let local_path = self.local_dir.join(name);
        if !local_path.exists() {
            return Err(FtpError::Rejected(format!("no local file {}", name)));
        }

        let mut data_stream = self.exchange(&format!("put {}", name)).await?;

        if !frame::read_status(&mut self.control).await?.is_success() {
            data::shutdown_data_channel(data_stream).await;
            return Err(FtpError::Rejected(format!(
                "server refused {} (cannot overwrite)",
                name
            )));
        }

        // From here the server is committed to a second status; any local
        // failure must still consume it to keep the channel in lockstep.
        let contents = match tokio::fs::read(&local_path).await {
            Ok(contents) => contents,
            Err(e) => {
                data::shutdown_data_channel(data_stream).await;
                self.drain_status().await;
                return Err(FtpError::Io(e));
            }
        };
        if let Err(e) = frame::write_data_frame(&mut data_stream, &contents).await {
            data::shutdown_data_channel(data_stream).await;
            self.drain_status().await;
            return Err(e);
        }
        data::shutdown_data_channel(data_stream).await;

        match frame::read_status(&mut self.control).await? {
            Status::Success => Ok(contents.len() as u64),
            Status::Failure => Err(FtpError::Transfer(format!(
                "server failed to store {}",
                name
            ))),
        }
    }

    /// Sends `quit` (data port 0, no data channel) and waits briefly for the
    /// acknowledgement. Best effort: the session is over either way, so
    /// every failure is swallowed. Returns the ack if one arrived.
    pub async fn quit(mut self) -> Option<Status> {
        if let Err(e) = frame::write_command(&mut self.control, 0, "quit").await {
            warn!("failed to send quit: {}", e);
            return None;
        }
        let ack = match timeout(CONTROL_ACK_TIMEOUT, frame::read_status(&mut self.control)).await
        {
            Ok(Ok(status)) => Some(status),
            _ => None,
        };
        let _ = self.control.shutdown().await;
        debug!("session closed, quit ack: {:?}", ack);
        ack
    }

    /// One command's front half: open the ephemeral data listener, send the
    /// command frame carrying its port, and accept the server's dial-back.
    /// Once the frame is out the server owes a status, so a failed accept
    /// still drains it before surfacing the error.
    async fn exchange(&mut self, wire: &str) -> Result<TcpStream, FtpError> {
        let (listener, port) = data::open_data_listener(self.local_ip).await?;
        frame::write_command(&mut self.control, port, wire).await?;
        match data::accept_data_connection(listener).await {
            Ok(stream) => Ok(stream),
            Err(e) => {
                self.drain_status().await;
                Err(e)
            }
        }
    }

    /// Consumes the one status the server sends for the command in flight
    /// when the data-channel leg failed locally. Best effort and bounded:
    /// without this, the unread byte would answer the *next* command.
    async fn drain_status(&mut self) {
        let _ = timeout(CONTROL_ACK_TIMEOUT, frame::read_status(&mut self.control)).await;
    }
}
