use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use ferroftp::config::{self, Config};
use ferroftp::core_cli::ServerCli;
use ferroftp::server;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = ServerCli::parse();

    // Initialize the logger with a custom format
    let default_filter = if args.verbose { "debug" } else { "info" };
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

    // Load configuration from the TOML file when one is given
    let mut config = if args.config.is_empty() {
        Config::default()
    } else {
        config::load_config(&args.config)?
    };

    // The positional port always wins, and --root overrides the file
    config.server.listen_port = args.port;
    if let Some(root) = args.root {
        config.server.root_dir = root;
    }

    server::run(config).await
}
