//! Connection plumbing shared by both servers.

pub mod reader;
pub mod server;

pub use reader::{Line, LineReader, MAX_LINE_LENGTH};
pub use server::run_server;
