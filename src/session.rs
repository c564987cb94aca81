use crate::core_command::{get, ls, put, quit};
use crate::core_network::data;
use crate::core_protocol::frame::{self, Status};
use crate::core_protocol::Command;
use crate::error::FtpError;
use log::{info, warn};
use std::io;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// Server-side state for one client's control connection, from accept to
/// quit/disconnect. Owned exclusively by its spawned task.
pub struct Session {
    id: u64,
    control: TcpStream,
    peer_ip: IpAddr,
    root: PathBuf,
    file_lock: Arc<Mutex<()>>,
}

impl Session {
    pub fn new(
        id: u64,
        control: TcpStream,
        root: PathBuf,
        file_lock: Arc<Mutex<()>>,
    ) -> io::Result<Self> {
        let peer_ip = control.peer_addr()?.ip();
        Ok(Self {
            id,
            control,
            peer_ip,
            root,
            file_lock,
        })
    }

    /// Command loop: read a frame, dispatch, answer, repeat. Per-command
    /// failures reply `F` and stay in the loop; only `quit` and
    /// control-channel I/O errors end the session.
    pub async fn run(mut self) -> Result<(), FtpError> {
        info!("Client #{}: session started", self.id);
        loop {
            let (data_port, text) = match frame::read_command(&mut self.control).await {
                Ok(frame) => frame,
                Err(FtpError::ConnectionClosed) => {
                    info!("Client #{}: disconnected", self.id);
                    break;
                }
                Err(e) => {
                    warn!("Client #{}: control channel failed: {}", self.id, e);
                    return Err(e);
                }
            };

            let command = match Command::parse(&text) {
                Ok(command) => command,
                Err(e) => {
                    warn!("Client #{}: rejecting command {:?}: {}", self.id, text, e);
                    self.reject(data_port).await?;
                    continue;
                }
            };

            match command {
                Command::Quit => {
                    quit::handle_quit_command(&mut self.control, self.id).await?;
                    break;
                }
                command => self.dispatch(command, data_port).await?,
            }
        }
        info!("Client #{}: session closed", self.id);
        Ok(())
    }

    /// Dials the data channel and runs the verb handler. Handlers own their
    /// status writes; an `Err` from them means the control channel is gone.
    async fn dispatch(&mut self, command: Command, data_port: u16) -> Result<(), FtpError> {
        let data_stream = match data::connect_data_channel(self.peer_ip, data_port).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Client #{}: {}", self.id, e);
                frame::write_status(&mut self.control, Status::Failure).await?;
                return Ok(());
            }
        };

        match command {
            Command::Ls => {
                ls::handle_ls_command(
                    &mut self.control,
                    data_stream,
                    &self.root,
                    &self.file_lock,
                    self.id,
                )
                .await
            }
            Command::Get(name) => {
                get::handle_get_command(
                    &mut self.control,
                    data_stream,
                    &self.root,
                    &self.file_lock,
                    &name,
                    self.id,
                )
                .await
            }
            Command::Put(name) => {
                put::handle_put_command(
                    &mut self.control,
                    data_stream,
                    &self.root,
                    &self.file_lock,
                    &name,
                    self.id,
                )
                .await
            }
            Command::Quit => unreachable!("quit is handled before dispatch"),
        }
    }

    /// Failure path for unparseable command text: honor the always-dial rule
    /// for a nonzero port so the client's accept returns, then reply `F`.
    async fn reject(&mut self, data_port: u16) -> Result<(), FtpError> {
        if data_port != 0 {
            if let Ok(stream) = data::connect_data_channel(self.peer_ip, data_port).await {
                data::shutdown_data_channel(stream).await;
            }
        }
        frame::write_status(&mut self.control, Status::Failure).await
    }
}
