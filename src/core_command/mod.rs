// One handler module per protocol verb.
pub mod get;
pub mod ls;
pub mod put;
pub mod quit;
