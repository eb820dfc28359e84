//! POP3 mailbox-retrieval server.

pub mod commands;
pub mod error;
pub mod response;
pub mod server;
pub mod session;

pub use commands::Pop3CommandHandler;
pub use error::Pop3Error;
pub use response::{Pop3Reply, ReplyBody};
pub use server::Pop3Server;
pub use session::{Pop3Session, Pop3State};
