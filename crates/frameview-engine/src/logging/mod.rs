//! Logging setup.
//!
//! Centralizes logger initialization behind the standard `log` facade.

mod init;

pub use init::{LoggingConfig, init_logging};
