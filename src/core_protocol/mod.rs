pub mod command;
pub mod frame;

pub use command::Command;
pub use frame::Status;
