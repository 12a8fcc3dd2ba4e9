//! Client layer: the file-operation surface over one smbclient session.

mod builder;
pub mod listing;
pub(crate) mod response;
mod smb;

pub use builder::ClientBuilder;
pub use listing::{EntryKind, Listing, ListingEntry, Modified, parse_listing};
pub use response::{CommandKind, Response};
pub use smb::Client;
