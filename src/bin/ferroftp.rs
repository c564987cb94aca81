use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use ferroftp::constants::PROMPT;
use ferroftp::core_cli::ClientCli;
use ferroftp::core_protocol::Command;
use ferroftp::{Client, FtpError};
use std::io::Write;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = ClientCli::parse();

    // Initialize the logger with a custom format
    let default_filter = if args.verbose { "debug" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let mut client = Client::connect(&args.host, args.port)
        .await
        .with_context(|| format!("Unable to connect to {}:{}", args.host, args.port))?;

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;

        // An interrupt while waiting for input still quits cleanly, so the
        // server learns of the departure instead of seeing a bare drop.
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                println!();
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(_) => {
                println!("Invalid command. Use: ls | get <file> | put <file> | quit");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Ls => match client.ls().await {
                Ok(listing) => print!("{}", listing),
                Err(e) => report("Directory listing failed", &e),
            },
            Command::Get(name) => match client.get(&name).await {
                Ok(bytes) => println!("File: {} [{} bytes] downloaded.", name, bytes),
                Err(e) => report("File retrieval failed", &e),
            },
            Command::Put(name) => match client.put(&name).await {
                Ok(bytes) => println!("File: {} [{} bytes] uploaded.", name, bytes),
                Err(e) => report("File upload failed", &e),
            },
        }
    }

    client.quit().await;
    Ok(())
}

/// The wire only carries `S`/`F`; the distinction between failure classes
/// is printed locally.
fn report(action: &str, err: &FtpError) {
    match err {
        FtpError::Rejected(reason) => println!("{}: {}.", action, reason),
        FtpError::Transfer(reason) => println!("{}: {}.", action, reason),
        FtpError::Framing(reason) => println!("{}: protocol error ({}).", action, reason),
        FtpError::ConnectionClosed => println!("{}: server closed the connection.", action),
        FtpError::Io(e) => println!("{}: {}.", action, e),
    }
}
