//! User directory and on-disk mail storage shared by both servers.

pub mod directory;
pub mod store;

pub use directory::{DirectoryError, UserDirectory};
pub use store::{MailItem, MailStore, Maildrop};
