use crate::constants::MAX_COMMAND_LEN;
use crate::error::FtpError;
use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// One-byte outcome marker carried on the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    pub fn as_byte(self) -> u8 {
        match self {
            Status::Success => b'S',
            Status::Failure => b'F',
        }
    }

    pub fn from_byte(byte: u8) -> Result<Self, FtpError> {
        match byte {
            b'S' => Ok(Status::Success),
            b'F' => Ok(Status::Failure),
            other => Err(FtpError::Framing(format!(
                "invalid status byte: 0x{:02x}",
                other
            ))),
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}

/// Writes a control-command frame: `[u8 length][u16 data port][text]`.
///
/// The port is big-endian; a port of 0 means no data channel accompanies the
/// command (only `quit` does that). Fails without writing anything when the
/// text would not fit the one-byte length prefix.
pub async fn write_command<W>(writer: &mut W, data_port: u16, text: &str) -> Result<(), FtpError>
where
    W: AsyncWrite + Unpin,
{
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return Err(FtpError::Framing("empty command text".to_string()));
    }
    if bytes.len() > MAX_COMMAND_LEN {
        return Err(FtpError::Framing(format!(
            "command text too long: {} bytes",
            bytes.len()
        )));
    }

    let mut frame = Vec::with_capacity(3 + bytes.len());
    frame.push(bytes.len() as u8);
    frame.extend_from_slice(&data_port.to_be_bytes());
    frame.extend_from_slice(bytes);

    writer.write_all(&frame).await?;
    writer.flush().await?;
    trace!("sent command frame: port={}, text={:?}", data_port, text);
    Ok(())
}

/// Reads one control-command frame, returning `(data_port, text)`.
///
/// Loops until the exact byte count arrives; EOF mid-frame yields
/// [`FtpError::ConnectionClosed`]. The text is decoded lossily and never
/// rejected here: garbage text must still reach the session's reject path
/// with the advertised port, so the dial-back the client is waiting on
/// always happens.
pub async fn read_command<R>(reader: &mut R) -> Result<(u16, String), FtpError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 3];
    reader
        .read_exact(&mut header)
        .await
        .map_err(FtpError::from_read_error)?;

    let len = header[0] as usize;
    let data_port = u16::from_be_bytes([header[1], header[2]]);

    let mut text = vec![0u8; len];
    reader
        .read_exact(&mut text)
        .await
        .map_err(FtpError::from_read_error)?;

    let text = String::from_utf8_lossy(&text).into_owned();
    trace!("received command frame: port={}, text={:?}", data_port, text);
    Ok((data_port, text))
}

/// Writes a one-byte status frame.
pub async fn write_status<W>(writer: &mut W, status: Status) -> Result<(), FtpError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&[status.as_byte()]).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads a one-byte status frame.
pub async fn read_status<R>(reader: &mut R) -> Result<Status, FtpError>
where
    R: AsyncRead + Unpin,
{
    let mut byte = [0u8; 1];
    reader
        .read_exact(&mut byte)
        .await
        .map_err(FtpError::from_read_error)?;
    Status::from_byte(byte[0])
}

/// Writes a data frame: `[u32 length][payload]`.
///
/// A zero-length payload is a valid frame; the server sends one on a failed
/// `ls`/`get` so the client's pending read always terminates.
pub async fn write_data_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), FtpError>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(payload.len())
        .map_err(|_| FtpError::Framing(format!("payload too large: {} bytes", payload.len())))?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one data frame, returning the payload.
pub async fn read_data_frame<R>(reader: &mut R) -> Result<Vec<u8>, FtpError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    reader
        .read_exact(&mut header)
        .await
        .map_err(FtpError::from_read_error)?;
    let len = u32::from_be_bytes(header) as usize;

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(FtpError::from_read_error)?;
    Ok(payload)
}
