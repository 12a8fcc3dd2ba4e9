//! # smbsession
//!
//! Async smbclient session driver for scripted SMB file operations.
//!
//! Smbsession spawns the interactive `smbclient` program, synchronizes
//! with its textual prompt, and exposes the usual file operations as a
//! structured request/response API — no wire-protocol implementation,
//! no screen scraping at the call site.
//!
//! ## Features
//!
//! - Prompt-pattern synchronization over the raw output stream
//! - Racing pattern/timeout watchers with explicit cancellation
//! - Per-operation success/failure classification of free-text replies
//! - Structured directory listings from free-text `ls` output
//! - Upload, download, create and recursive delete
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smbsession::ClientBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smbsession::Error> {
//!     let mut client = ClientBuilder::new("192.168.1.10")
//!         .share("public")
//!         .username("guest")
//!         .connect()
//!         .await?;
//!
//!     client.put_content(b"hello", "greeting.txt").await?;
//!     for (name, entry) in client.ls("*").await? {
//!         println!("{name}: {:?}", entry.kind);
//!     }
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod client;
pub mod error;
pub mod transport;

// Re-export main types for convenience
pub use client::{
    Client, ClientBuilder, EntryKind, Listing, ListingEntry, Modified, Response, parse_listing,
};
pub use error::Error;
pub use transport::{Auth, SmbConfig};
