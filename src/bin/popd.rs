use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;

use deweymail::mailbox::{MailStore, UserDirectory};
use deweymail::pop3::Pop3Server;

/// POP3 mailbox-retrieval server.
#[derive(Parser, Debug)]
#[command(name = "popd", version, about)]
struct Args {
    /// TCP port to listen on
    port: u16,

    /// Users file with one "username password" pair per line
    #[arg(long, default_value = "users.txt")]
    users: PathBuf,

    /// Root directory of the mail store
    #[arg(long, default_value = "mail.store")]
    mail_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::try_parse().unwrap_or_else(|err| {
        if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
            err.exit();
        }
        // Usage errors go to stderr and exit with status 1.
        err.print().ok();
        std::process::exit(1);
    });

    deweymail::logging::init()?;

    let directory = UserDirectory::load(&args.users)
        .with_context(|| format!("loading users from {}", args.users.display()))?;
    let store = MailStore::new(args.mail_dir);
    let listener = TcpListener::bind(("0.0.0.0", args.port))
        .with_context(|| format!("binding port {}", args.port))?;

    let server = Pop3Server::new(Arc::new(directory), Arc::new(store));
    server.start(listener)?;
    Ok(())
}
