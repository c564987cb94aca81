use clap::Parser;
use std::path::PathBuf;

/// Server command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ferroftpd", about = "A minimal file-transfer server.")]
pub struct ServerCli {
    /// Control-channel port to listen on
    pub port: u16,

    /// Path to the configuration file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Directory served to clients (overrides the configuration file)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

/// Client command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ferroftp", about = "A minimal file-transfer client.")]
pub struct ClientCli {
    /// Server host
    pub host: String,

    /// Server control-channel port
    pub port: u16,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}
