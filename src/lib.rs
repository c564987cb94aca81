pub mod client;
pub mod config;
pub mod constants;
pub mod core_cli;
pub mod core_command;
pub mod core_network;
pub mod core_protocol;
pub mod error;
pub mod helpers;
pub mod server;
pub mod session;

pub use client::Client;
pub use config::Config;
pub use error::FtpError;
