use crate::constants::DATA_CHANNEL_TIMEOUT;
use crate::error::FtpError;
use log::{debug, trace};
use std::net::IpAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// Binds an ephemeral data listener on the given local IP and returns it
/// with the OS-assigned port, which the client embeds in its next command
/// frame.
pub async fn open_data_listener(local_ip: IpAddr) -> Result<(TcpListener, u16), FtpError> {
    let listener = TcpListener::bind((local_ip, 0)).await?;
    let port = listener.local_addr()?.port();
    debug!("data listener bound on {}:{}", local_ip, port);
    Ok((listener, port))
}

/// Accepts the single planned inbound data connection, bounded so a server
/// that never dials back cannot hang the client.
pub async fn accept_data_connection(listener: TcpListener) -> Result<TcpStream, FtpError> {
    match timeout(DATA_CHANNEL_TIMEOUT, listener.accept()).await {
        Ok(Ok((stream, addr))) => {
            trace!("data connection accepted from {}", addr);
            Ok(stream)
        }
        Ok(Err(e)) => Err(FtpError::Transfer(format!("data accept failed: {}", e))),
        Err(_) => Err(FtpError::Transfer(format!(
            "no data connection within {:?}",
            DATA_CHANNEL_TIMEOUT
        ))),
    }
}

/// Dials the client's advertised data port, bounded by the same timeout.
///
/// The server calls this for every command carrying a nonzero port, even
/// when the command is about to fail; the client's accept relies on the
/// dial always happening.
pub async fn connect_data_channel(peer_ip: IpAddr, port: u16) -> Result<TcpStream, FtpError> {
    match timeout(DATA_CHANNEL_TIMEOUT, TcpStream::connect((peer_ip, port))).await {
        Ok(Ok(stream)) => {
            trace!("data channel connected to {}:{}", peer_ip, port);
            Ok(stream)
        }
        Ok(Err(e)) => Err(FtpError::Transfer(format!(
            "data connect to {}:{} failed: {}",
            peer_ip, port, e
        ))),
        Err(_) => Err(FtpError::Transfer(format!(
            "data connect to {}:{} timed out",
            peer_ip, port
        ))),
    }
}

/// Shuts a data connection down after its one planned transfer. Errors are
/// ignored; the peer may already be gone.
pub async fn shutdown_data_channel(mut stream: TcpStream) {
    let _ = stream.shutdown().await;
}
