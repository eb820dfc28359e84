//! Accept loop shared by both servers.

use std::io;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};

/// Accepts connections on `listener` and hands each one to `handler` on its
/// own thread.
///
/// Sessions are fully independent: the handler gets exclusive ownership of
/// its stream, and nothing is shared across connections beyond whatever the
/// handler itself captured behind an `Arc`. Accept errors are logged and the
/// loop continues; a handler error kills only its own connection.
pub fn run_server<F>(listener: TcpListener, handler: F) -> io::Result<()>
where
    F: Fn(TcpStream) -> io::Result<()> + Send + Sync + 'static,
{
    let handler = Arc::new(handler);

    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let handler = Arc::clone(&handler);
                let peer = stream.peer_addr().ok();
                thread::spawn(move || {
                    if let Err(e) = handler(stream) {
                        warn!(?peer, error = %e, "connection ended with error");
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "failed to accept connection");
            }
        }
    }

    Ok(())
}
