//! SMTP mail-submission server.

pub mod commands;
pub mod error;
pub mod response;
pub mod server;
pub mod session;

pub use commands::SmtpCommandHandler;
pub use error::SmtpError;
pub use response::SmtpReply;
pub use server::SmtpServer;
pub use session::{SmtpSession, SmtpState};
