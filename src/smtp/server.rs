//! SMTP server implementation.

use std::io::{self, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::mailbox::directory::UserDirectory;
use crate::mailbox::store::MailStore;
use crate::net::reader::{Line, LineReader};
use crate::net::server::run_server;
use crate::smtp::commands::SmtpCommandHandler;
use crate::smtp::response::SmtpReply;
use crate::smtp::session::SmtpSession;

/// Mail-submission server: accepts connections and drives one
/// [`SmtpSession`] per connection to completion. Accepted messages are
/// written into each recipient's maildrop.
pub struct SmtpServer {
    hostname: String,
    directory: Arc<UserDirectory>,
    store: Arc<MailStore>,
}

impl SmtpServer {
    pub fn new(hostname: &str, directory: Arc<UserDirectory>, store: Arc<MailStore>) -> Self {
        Self {
            hostname: hostname.to_owned(),
            directory,
            store,
        }
    }

    /// Accepts connections on `listener` until the process ends (blocking).
    pub fn start(self, listener: TcpListener) -> io::Result<()> {
        let server = Arc::new(self);
        run_server(listener, move |stream| server.handle_client(stream))
    }

    /// Runs one connection's command loop.
    ///
    /// During body capture, lines bypass command parsing entirely and are
    /// accumulated verbatim until the lone `.` terminator. Read failures
    /// and EOF end the session silently; a failed reply write is fatal and
    /// propagates out immediately.
    pub fn handle_client(&self, mut stream: TcpStream) -> io::Result<()> {
        let handler = SmtpCommandHandler::new(&self.hostname, Arc::clone(&self.directory));
        let mut session = SmtpSession::new();
        let mut reader = LineReader::new(stream.try_clone()?);

        send_reply(&mut stream, &SmtpReply::greeting(&self.hostname))?;

        loop {
            let line = match reader.read_line() {
                Ok(Line::Complete(line)) => line,
                Ok(Line::TooLong) => {
                    // Mid-capture the client is not reading replies, so the
                    // length error waits for the terminator.
                    if session.in_data() {
                        session.note_oversized_data_line();
                    } else {
                        send_reply(&mut stream, &SmtpReply::line_too_long())?;
                    }
                    continue;
                }
                Ok(Line::Eof) | Err(_) => break,
            };

            if session.in_data() {
                if line == "." {
                    let reply = if session.oversized_data {
                        session.finish_data();
                        SmtpReply::line_too_long()
                    } else {
                        let (body, recipients) = session.finish_data();
                        match self.store.deliver(&body, &recipients) {
                            Ok(()) => SmtpReply::ok(),
                            Err(e) => {
                                warn!(error = %e, "delivery failed");
                                SmtpReply::local_error()
                            }
                        }
                    };
                    send_reply(&mut stream, &reply)?;
                } else {
                    session.push_data_line(line);
                }
                continue;
            }
            debug!(command = %line, "smtp");

            let reply = match handler.process_command(&line, &mut session) {
                Ok(reply) => reply,
                Err(e) => e.to_reply(),
            };
            send_reply(&mut stream, &reply)?;

            if session.closed {
                break;
            }
        }
        Ok(())
    }
}

fn send_reply(stream: &mut TcpStream, reply: &SmtpReply) -> io::Result<()> {
    stream.write_all(reply.format().as_bytes())?;
    stream.flush()
}
