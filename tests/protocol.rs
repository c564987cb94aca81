//! End-to-end exchanges against a live server on an ephemeral port.

use ferroftp::core_network::{data, network};
use ferroftp::core_protocol::frame::{self, Status};
use ferroftp::{Client, FtpError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

/// Binds port 0, spawns the accept loop, and returns the port to dial.
async fn spawn_server(root: PathBuf) -> u16 {
    let listener = network::bind(0).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let _ = network::start_server(listener, root).await;
    });
    port
}

fn write_file(dir: &Path, name: &str, contents: &[u8]) {
    std::fs::write(dir.join(name), contents).unwrap();
}

async fn connect(port: u16, local_dir: &Path) -> Client {
    Client::connect("127.0.0.1", port)
        .await
        .unwrap()
        .with_local_dir(local_dir)
}

#[tokio::test]
async fn ls_lists_non_hidden_entries() {
    let server_dir = TempDir::new().unwrap();
    write_file(server_dir.path(), "sample.txt", b"hello");
    write_file(server_dir.path(), ".hidden", b"no");
    let port = spawn_server(server_dir.path().to_path_buf()).await;

    let local_dir = TempDir::new().unwrap();
    let mut client = connect(port, local_dir.path()).await;
    let listing = client.ls().await.unwrap();
    assert_eq!(listing, "sample.txt\n");
    client.quit().await;
}

#[tokio::test]
async fn get_downloads_file_contents() {
    let server_dir = TempDir::new().unwrap();
    let contents = b"line one\nline two\n".to_vec();
    write_file(server_dir.path(), "notes.txt", &contents);
    let port = spawn_server(server_dir.path().to_path_buf()).await;

    let local_dir = TempDir::new().unwrap();
    let mut client = connect(port, local_dir.path()).await;
    let bytes = client.get("notes.txt").await.unwrap();
    assert_eq!(bytes, contents.len() as u64);
    assert_eq!(
        std::fs::read(local_dir.path().join("notes.txt")).unwrap(),
        contents
    );
    client.quit().await;
}

#[tokio::test]
async fn get_hidden_or_missing_is_rejected() {
    let server_dir = TempDir::new().unwrap();
    write_file(server_dir.path(), ".secret", b"top");
    let port = spawn_server(server_dir.path().to_path_buf()).await;

    let local_dir = TempDir::new().unwrap();
    let mut client = connect(port, local_dir.path()).await;

    let err = client.get(".secret").await.unwrap_err();
    assert!(matches!(err, FtpError::Rejected(_)));
    assert!(!local_dir.path().join(".secret").exists());

    let err = client.get("nope.txt").await.unwrap_err();
    assert!(matches!(err, FtpError::Rejected(_)));
    assert!(!local_dir.path().join("nope.txt").exists());
    client.quit().await;
}

#[tokio::test]
async fn get_never_overwrites_local_file() {
    let server_dir = TempDir::new().unwrap();
    write_file(server_dir.path(), "notes.txt", b"server copy");
    let port = spawn_server(server_dir.path().to_path_buf()).await;

    let local_dir = TempDir::new().unwrap();
    write_file(local_dir.path(), "notes.txt", b"local copy");
    let mut client = connect(port, local_dir.path()).await;

    let err = client.get("notes.txt").await.unwrap_err();
    assert!(matches!(err, FtpError::Rejected(_)));
    assert_eq!(
        std::fs::read(local_dir.path().join("notes.txt")).unwrap(),
        b"local copy"
    );
    client.quit().await;
}

#[tokio::test]
async fn put_uploads_new_file() {
    let server_dir = TempDir::new().unwrap();
    let port = spawn_server(server_dir.path().to_path_buf()).await;

    let local_dir = TempDir::new().unwrap();
    let contents = b"uploaded payload".to_vec();
    write_file(local_dir.path(), "report.txt", &contents);
    let mut client = connect(port, local_dir.path()).await;

    let bytes = client.put("report.txt").await.unwrap();
    assert_eq!(bytes, contents.len() as u64);
    assert_eq!(
        std::fs::read(server_dir.path().join("report.txt")).unwrap(),
        contents
    );
    client.quit().await;
}

#[tokio::test]
async fn put_existing_server_file_is_rejected_before_data() {
    let server_dir = TempDir::new().unwrap();
    write_file(server_dir.path(), "notes.txt", b"original");
    let port = spawn_server(server_dir.path().to_path_buf()).await;

    let local_dir = TempDir::new().unwrap();
    write_file(local_dir.path(), "notes.txt", b"replacement");
    let mut client = connect(port, local_dir.path()).await;

    let err = client.put("notes.txt").await.unwrap_err();
    assert!(matches!(err, FtpError::Rejected(_)));
    assert_eq!(
        std::fs::read(server_dir.path().join("notes.txt")).unwrap(),
        b"original"
    );
    client.quit().await;
}

#[tokio::test]
async fn put_missing_local_file_is_rejected_locally() {
    let server_dir = TempDir::new().unwrap();
    let port = spawn_server(server_dir.path().to_path_buf()).await;

    let local_dir = TempDir::new().unwrap();
    let mut client = connect(port, local_dir.path()).await;
    let err = client.put("missing.txt").await.unwrap_err();
    assert!(matches!(err, FtpError::Rejected(_)));
    client.quit().await;
}

#[tokio::test]
async fn quit_elicits_one_success() {
    let server_dir = TempDir::new().unwrap();
    let port = spawn_server(server_dir.path().to_path_buf()).await;

    let local_dir = TempDir::new().unwrap();
    let client = connect(port, local_dir.path()).await;
    assert_eq!(client.quit().await, Some(Status::Success));
}

#[tokio::test]
async fn session_returns_to_idle_after_failure() {
    let server_dir = TempDir::new().unwrap();
    write_file(server_dir.path(), "sample.txt", b"data");
    let port = spawn_server(server_dir.path().to_path_buf()).await;

    let local_dir = TempDir::new().unwrap();
    let mut client = connect(port, local_dir.path()).await;

    assert!(client.get("missing.txt").await.is_err());
    // Same control connection must still serve the next command.
    let listing = client.ls().await.unwrap();
    assert_eq!(listing, "sample.txt\n");
    client.quit().await;
}

#[tokio::test]
async fn server_always_dials_back_even_for_invalid_commands() {
    let server_dir = TempDir::new().unwrap();
    let port = spawn_server(server_dir.path().to_path_buf()).await;

    let mut control = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let local_ip = control.local_addr().unwrap().ip();
    let (listener, data_port) = data::open_data_listener(local_ip).await.unwrap();

    frame::write_command(&mut control, data_port, "delete x")
        .await
        .unwrap();

    // The dial-back arrives regardless of the command being nonsense.
    let data_stream = data::accept_data_connection(listener).await.unwrap();
    data::shutdown_data_channel(data_stream).await;

    let status = frame::read_status(&mut control).await.unwrap();
    assert_eq!(status, Status::Failure);
}

#[tokio::test]
async fn server_dials_back_for_garbage_frames() {
    let server_dir = TempDir::new().unwrap();
    let port = spawn_server(server_dir.path().to_path_buf()).await;

    let mut control = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let local_ip = control.local_addr().unwrap().ip();

    // Non-UTF-8 command text: the port must still get its dial-back.
    let (listener, data_port) = data::open_data_listener(local_ip).await.unwrap();
    let mut raw = vec![2u8];
    raw.extend_from_slice(&data_port.to_be_bytes());
    raw.extend_from_slice(&[0xC3, 0x28]);
    control.write_all(&raw).await.unwrap();

    let data_stream = data::accept_data_connection(listener).await.unwrap();
    data::shutdown_data_channel(data_stream).await;
    assert_eq!(
        frame::read_status(&mut control).await.unwrap(),
        Status::Failure
    );

    // Zero-length command text, same contract.
    let (listener, data_port) = data::open_data_listener(local_ip).await.unwrap();
    let mut raw = vec![0u8];
    raw.extend_from_slice(&data_port.to_be_bytes());
    control.write_all(&raw).await.unwrap();

    let data_stream = data::accept_data_connection(listener).await.unwrap();
    data::shutdown_data_channel(data_stream).await;
    assert_eq!(
        frame::read_status(&mut control).await.unwrap(),
        Status::Failure
    );
}

#[tokio::test]
async fn client_stays_in_sync_after_truncated_data_frame() {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    // A misbehaving server: the first listing is cut short mid-frame, the
    // second is served correctly on the same control connection.
    let server = tokio::spawn(async move {
        let (mut control, peer) = listener.accept().await.unwrap();

        let (data_port, text) = frame::read_command(&mut control).await.unwrap();
        assert_eq!(text, "ls");
        let mut data = TcpStream::connect((peer.ip(), data_port)).await.unwrap();
        // Header promises 10 payload bytes; only 3 arrive before the close.
        data.write_all(&[0, 0, 0, 10, b'a', b'b', b'c']).await.unwrap();
        drop(data);
        frame::write_status(&mut control, Status::Failure)
            .await
            .unwrap();

        let (data_port, text) = frame::read_command(&mut control).await.unwrap();
        assert_eq!(text, "ls");
        let mut data = TcpStream::connect((peer.ip(), data_port)).await.unwrap();
        frame::write_data_frame(&mut data, b"sample.txt\n")
            .await
            .unwrap();
        data.shutdown().await.unwrap();
        frame::write_status(&mut control, Status::Success)
            .await
            .unwrap();
    });

    let local_dir = TempDir::new().unwrap();
    let mut client = connect(port, local_dir.path()).await;

    let err = client.ls().await.unwrap_err();
    assert!(matches!(err, FtpError::ConnectionClosed));

    // The failed exchange must not leave its status byte behind: the next
    // command on the same session has to see its own reply.
    let listing = client.ls().await.unwrap();
    assert_eq!(listing, "sample.txt\n");

    server.await.unwrap();
    client.quit().await;
}

#[tokio::test]
async fn concurrent_puts_into_shared_directory() {
    let server_dir = TempDir::new().unwrap();
    let port = spawn_server(server_dir.path().to_path_buf()).await;

    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    let payload_a = vec![b'a'; 64 * 1024];
    let payload_b = vec![b'b'; 64 * 1024];
    write_file(dir_a.path(), "a.bin", &payload_a);
    write_file(dir_b.path(), "b.bin", &payload_b);

    let mut client_a = connect(port, dir_a.path()).await;
    let mut client_b = connect(port, dir_b.path()).await;

    let (a, b) = tokio::join!(client_a.put("a.bin"), client_b.put("b.bin"));
    assert_eq!(a.unwrap(), payload_a.len() as u64);
    assert_eq!(b.unwrap(), payload_b.len() as u64);

    assert_eq!(
        std::fs::read(server_dir.path().join("a.bin")).unwrap(),
        payload_a
    );
    assert_eq!(
        std::fs::read(server_dir.path().join("b.bin")).unwrap(),
        payload_b
    );
    client_a.quit().await;
    client_b.quit().await;
}
