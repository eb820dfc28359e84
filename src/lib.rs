//! # deweymail
//!
//! deweymail is a pair of line-oriented mail transfer servers sharing one
//! connection-handling core:
//!
//! - `popd` serves mailbox retrieval (POP3 command set)
//! - `smtpd` serves mail submission (SMTP command set)
//!
//! Each connection gets its own worker thread and its own session state
//! machine. A session reads one CRLF-terminated command line at a time,
//! validates it against the current protocol state, performs its side effect
//! against the user directory or the on-disk mail store, and writes a
//! textual status reply.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::net::TcpListener;
//! use std::sync::Arc;
//! use deweymail::mailbox::{MailStore, UserDirectory};
//! use deweymail::pop3::Pop3Server;
//!
//! let directory = Arc::new(UserDirectory::from_pairs(&[("alice", "secret")]));
//! let store = Arc::new(MailStore::new("mail.store"));
//! let listener = TcpListener::bind("127.0.0.1:1100").unwrap();
//!
//! Pop3Server::new(directory, store).start(listener).unwrap();
//! ```
//!
//! ## Supported commands
//!
//! Retrieval: `USER`, `PASS`, `STAT`, `LIST`, `RETR`, `DELE`, `RSET`,
//! `NOOP`, `QUIT`. `APOP`, `TOP` and `UIDL` are answered with a
//! not-implemented reply.
//!
//! Submission: `HELO`, `MAIL FROM`, `RCPT TO`, `DATA`, `NOOP`, `QUIT`.
//! `EHLO`, `RSET`, `VRFY`, `EXPN` and `HELP` are answered with
//! `502 Command not implemented`.
//!
//! ## Notes
//!
//! - Messages live on disk, one file per message under one directory per
//!   user; deletion marks are committed only when a retrieval session ends
//!   with `QUIT`.
//! - SMTP authentication, TLS, and mail relay are not supported; recipients
//!   must be local users.
//! - Concurrent sessions for the same user are not serialized against each
//!   other.

pub mod logging;
pub mod mailbox;
pub mod net;
pub mod pop3;
pub mod proto;
pub mod smtp;

pub use mailbox::{MailStore, Maildrop, UserDirectory};
pub use pop3::Pop3Server;
pub use smtp::SmtpServer;
