use crate::session::Session;
use anyhow::Result;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Mutex;

/// Binds the control-channel listener. Split from [`start_server`] so tests
/// can bind port 0 and read back the assigned address.
pub async fn bind(listen_port: u16) -> Result<TcpListener> {
    let listener = TcpListener::bind(("0.0.0.0", listen_port)).await?;
    Ok(listener)
}

/// Accept loop: one spawned session task per control connection, all sharing
/// the single directory lock. Returns when interrupted (Ctrl-C).
pub async fn start_server(listener: TcpListener, root: PathBuf) -> Result<()> {
    let file_lock = Arc::new(Mutex::new(()));
    let mut next_id: u64 = 1;

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, addr) = accepted?;
                let id = next_id;
                next_id += 1;
                info!("Client #{}: connected from {}", id, addr);

                let session = match Session::new(id, socket, root.clone(), Arc::clone(&file_lock)) {
                    Ok(session) => session,
                    Err(e) => {
                        error!("Client #{}: failed to start session: {}", id, e);
                        continue;
                    }
                };
                tokio::spawn(async move {
                    if let Err(e) = session.run().await {
                        error!("Client #{}: session error: {}", id, e);
                    }
                });
            }
            _ = signal::ctrl_c() => {
                info!("Shutting down server...");
                break;
            }
        }
    }
    Ok(())
}
