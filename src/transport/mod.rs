//! Transport layer wrapping the external smbclient executable.
//!
//! This module owns process spawning, the forced invocation environment,
//! and the stdio plumbing into the channel layer.

pub mod config;
mod process;

pub use config::{Auth, SmbConfig};
pub use process::SmbProcess;
