//! POP3 server implementation.

use std::io::{self, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use tracing::debug;

use crate::mailbox::directory::UserDirectory;
use crate::mailbox::store::MailStore;
use crate::net::reader::{Line, LineReader};
use crate::net::server::run_server;
use crate::pop3::commands::Pop3CommandHandler;
use crate::pop3::response::Pop3Reply;
use crate::pop3::session::Pop3Session;

/// Mailbox-retrieval server: accepts connections and drives one
/// [`Pop3Session`] per connection to completion.
pub struct Pop3Server {
    directory: Arc<UserDirectory>,
    store: Arc<MailStore>,
}

impl Pop3Server {
    pub fn new(directory: Arc<UserDirectory>, store: Arc<MailStore>) -> Self {
        Self { directory, store }
    }

    /// Accepts connections on `listener` until the process ends (blocking).
    pub fn start(self, listener: TcpListener) -> io::Result<()> {
        let server = Arc::new(self);
        run_server(listener, move |stream| server.handle_client(stream))
    }

    /// Runs one connection's command loop.
    ///
    /// Read failures and EOF end the session silently; a failed reply write
    /// is fatal and propagates out immediately.
    pub fn handle_client(&self, mut stream: TcpStream) -> io::Result<()> {
        let handler =
            Pop3CommandHandler::new(Arc::clone(&self.directory), Arc::clone(&self.store));
        let mut session = Pop3Session::new();
        let mut reader = LineReader::new(stream.try_clone()?);

        send_reply(&mut stream, &Pop3Reply::ok("POP3 server ready"))?;

        loop {
            let line = match reader.read_line() {
                Ok(Line::Complete(line)) => line,
                Ok(Line::TooLong) => {
                    send_reply(&mut stream, &Pop3Reply::err("command line too long"))?;
                    continue;
                }
                Ok(Line::Eof) | Err(_) => break,
            };
            debug!(command = %line, "pop3");

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

fn send_reply(stream: &mut TcpStream, reply: &Pop3Reply) -> io::Result<()> {
    stream.write_all(reply.format().as_bytes())?;
    stream.flush()
}
