//! Socket-level tests driving both servers end to end.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use deweymail::mailbox::{MailStore, UserDirectory};
use deweymail::pop3::Pop3Server;
use deweymail::smtp::SmtpServer;

struct Fixture {
    _dir: TempDir,
    store: MailStore,
    pop3_addr: String,
    smtp_addr: String,
}

/// Starts one POP3 and one SMTP server over a shared temporary store.
fn start_servers() -> Fixture {
    let dir = TempDir::new().unwrap();
    let store = MailStore::new(dir.path());
    let directory = Arc::new(UserDirectory::from_pairs(&[
        ("alice", "wonder"),
        ("bob", "builder"),
    ]));

    let pop3_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let pop3_addr = pop3_listener.local_addr().unwrap().to_string();
    let pop3 = Pop3Server::new(Arc::clone(&directory), Arc::new(store.clone()));
    thread::spawn(move || {
        pop3.start(pop3_listener).unwrap();
    });

    let smtp_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let smtp_addr = smtp_listener.local_addr().unwrap().to_string();
    let smtp = SmtpServer::new("mx.test", directory, Arc::new(store.clone()));
    thread::spawn(move || {
        smtp.start(smtp_listener).unwrap();
    });

    Fixture {
        _dir: dir,
        store,
        pop3_addr,
        smtp_addr,
    }
}

struct Client {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Client {
    fn connect(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).unwrap();
        let reader = BufReader::new(stream.try_clone().unwrap());
        Self { stream, reader }
    }

    fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        line
    }

    /// Sends one command line and returns the first reply line.
    fn send(&mut self, command: &str) -> String {
        self.send_raw(command);
        self.read_line()
    }

    fn send_raw(&mut self, line: &str) {
        write!(self.stream, "{line}\r\n").unwrap();
        self.stream.flush().unwrap();
    }

    /// Reads multi-line body content up to (excluding) the lone `.` line.
    fn read_until_dot(&mut self) -> String {
        let mut body = String::new();
        loop {
            let line = self.read_line();
            if line == ".\r\n" {
                return body;
            }
            body.push_str(&line);
        }
    }
}

fn pop3_login(addr: &str, user: &str, pass: &str) -> Client {
    let mut client = Client::connect(addr);
    assert_eq!(client.read_line(), "+OK POP3 server ready\r\n");
    assert!(client.send(&format!("USER {user}")).starts_with("+OK"));
    assert!(client.send(&format!("PASS {pass}")).starts_with("+OK"));
    client
}

fn submit_message(addr: &str, from: &str, recipients: &[&str], body: &[&str]) {
    let mut client = Client::connect(addr);
    assert!(client.read_line().starts_with("220"));
    assert!(client.send("HELO test").starts_with("250"));
    assert!(client.send(&format!("MAIL FROM:<{from}>")).starts_with("250"));
    for recipient in recipients {
        client.send(&format!("RCPT TO:<{recipient}>"));
    }
    assert_eq!(
        client.send("DATA"),
        "354 Start mail input; end with <CRLF>.<CRLF>\r\n"
    );
    for line in body {
        client.send_raw(line);
    }
    assert_eq!(client.send("."), "250 OK\r\n");
    assert!(client.send("QUIT").starts_with("221"));
}

#[test]
fn test_pop3_pass_before_user() {
    let fixture = start_servers();
    let mut client = Client::connect(&fixture.pop3_addr);
    client.read_line();

    assert_eq!(client.send("PASS wonder"), "-ERR Must input USER first\r\n");
    // Still unauthenticated afterwards.
    assert_eq!(
        client.send("STAT"),
        "-ERR Need to complete AUTHORIZATION\r\n"
    );
    assert!(client.send("USER alice").starts_with("+OK"));
}

#[test]
fn test_pop3_unknown_user() {
    let fixture = start_servers();
    let mut client = Client::connect(&fixture.pop3_addr);
    client.read_line();

    assert_eq!(client.send("USER nobody"), "-ERR never heard of nobody\r\n");
    // State unchanged: a known USER is still accepted.
    assert_eq!(client.send("USER alice"), "+OK alice is a valid mailbox\r\n");
}

#[test]
fn test_pop3_login_and_stat_matches_list() {
    let fixture = start_servers();
    fixture
        .store
        .deliver("first message\r\n", &["alice".to_string()])
        .unwrap();
    fixture
        .store
        .deliver("the second message\r\n", &["alice".to_string()])
        .unwrap();

    let mut client = pop3_login(&fixture.pop3_addr, "alice", "wonder");

    let stat = client.send("STAT");
    let mut fields = stat.trim_end().strip_prefix("+OK ").unwrap().split(' ');
    let count: usize = fields.next().unwrap().parse().unwrap();
    let total: u64 = fields.next().unwrap().parse().unwrap();
    assert_eq!(count, 2);

    let summary = client.send("LIST");
    assert_eq!(
        summary,
        format!("+OK {count} message(s) ({total} octets)\r\n")
    );
    let listing = client.read_until_dot();
    let listed_total: u64 = listing
        .lines()
        .map(|line| line.split(' ').nth(1).unwrap().parse::<u64>().unwrap())
        .sum();
    assert_eq!(listed_total, total);
}

#[test]
fn test_pop3_dele_then_rset_restores() {
    let fixture = start_servers();
    fixture
        .store
        .deliver("only message\r\n", &["alice".to_string()])
        .unwrap();

    let mut client = pop3_login(&fixture.pop3_addr, "alice", "wonder");

    assert_eq!(client.send("DELE 1"), "+OK message 1 deleted\r\n");
    assert_eq!(client.send("DELE 1"), "-ERR message 1 already deleted\r\n");
    assert_eq!(client.send("RETR 1"), "-ERR No such message\r\n");
    assert_eq!(client.send("STAT"), "+OK 0 0\r\n");

    assert_eq!(client.send("RSET"), "+OK maildrop has 1 message(s)\r\n");
    assert!(client.send("RETR 1").starts_with("+OK"));
    assert_eq!(client.read_until_dot(), "only message\r\n");
}

#[test]
fn test_pop3_quit_commits_exactly_marked_messages() {
    let fixture = start_servers();
    fixture
        .store
        .deliver("message one\r\n", &["alice".to_string()])
        .unwrap();
    fixture
        .store
        .deliver("message two\r\n", &["alice".to_string()])
        .unwrap();
    fixture
        .store
        .deliver("message three\r\n", &["alice".to_string()])
        .unwrap();

    let mut client = pop3_login(&fixture.pop3_addr, "alice", "wonder");
    client.send("DELE 2");
    assert_eq!(
        client.send("QUIT"),
        "+OK deweymail POP3 server signing off (1 messages destroyed)\r\n"
    );

    // A fresh session sees a maildrop missing exactly the marked message.
    let mut client = pop3_login(&fixture.pop3_addr, "alice", "wonder");
    let stat = client.send("STAT");
    assert!(stat.starts_with("+OK 2 "));
    assert!(client.send("RETR 1").starts_with("+OK"));
    assert_eq!(client.read_until_dot(), "message one\r\n");
    assert!(client.send("RETR 2").starts_with("+OK"));
    assert_eq!(client.read_until_dot(), "message three\r\n");
    assert_eq!(
        client.send("QUIT"),
        "+OK deweymail POP3 server signing off (maildrop empty)\r\n"
    );
}

#[test]
fn test_pop3_oversized_line_is_recoverable() {
    let fixture = start_servers();
    let mut client = Client::connect(&fixture.pop3_addr);
    client.read_line();

    let long = "a".repeat(2000);
    assert_eq!(client.send(&long), "-ERR command line too long\r\n");
    // The session keeps going.
    assert_eq!(client.send("USER alice"), "+OK alice is a valid mailbox\r\n");
}

#[test]
fn test_smtp_submission_scenario() {
    let fixture = start_servers();
    let mut client = Client::connect(&fixture.smtp_addr);

    assert_eq!(
        client.read_line(),
        "220 mx.test Simple Mail Transfer Service Ready\r\n"
    );
    assert_eq!(
        client.send("HELO test"),
        "250 mx.test Hello test, pleased to meet you. I am mx.test\r\n"
    );
    assert_eq!(client.send("MAIL FROM:<a@b>"), "250 a@b ... Sender ok\r\n");
    assert_eq!(
        client.send("RCPT TO:<alice>"),
        "250 alice ... Recipient ok\r\n"
    );
    assert_eq!(
        client.send("DATA"),
        "354 Start mail input; end with <CRLF>.<CRLF>\r\n"
    );
    client.send_raw("Hello");
    assert_eq!(client.send("."), "250 OK\r\n");
    assert_eq!(
        client.send("QUIT"),
        "221 mx.test Service closing transmission channel\r\n"
    );
}

#[test]
fn test_smtp_sequencing_and_unknown_commands() {
    let fixture = start_servers();
    let mut client = Client::connect(&fixture.smtp_addr);
    client.read_line();

    assert_eq!(
        client.send("MAIL FROM:<a@b>"),
        "503 Bad sequence of commands\r\n"
    );
    assert_eq!(
        client.send("EHLO test"),
        "502 Command not implemented\r\n"
    );
    assert_eq!(
        client.send("FOOBAR"),
        "500 Syntax error, command unrecognized\r\n"
    );
    assert_eq!(
        client.send("HELO"),
        "500 Syntax error, command is valid but is not followed by space\r\n"
    );
    assert_eq!(
        client.send("QUIT now"),
        "455 Server unable to accommodate parameters\r\n"
    );
}

#[test]
fn test_smtp_unknown_recipient_only_fails_at_data() {
    let fixture = start_servers();
    let mut client = Client::connect(&fixture.smtp_addr);
    client.read_line();

    client.send("HELO test");
    client.send("MAIL FROM:<a@b>");
    assert_eq!(
        client.send("RCPT TO:<ghost>"),
        "550 No such user ghost\r\n"
    );
    assert_eq!(client.send("DATA"), "554 No Valid Recipients\r\n");

    // A later valid RCPT rescues the transaction.
    assert_eq!(
        client.send("RCPT TO:<alice>"),
        "250 alice ... Recipient ok\r\n"
    );
    assert!(client.send("DATA").starts_with("354"));
}

#[test]
fn test_smtp_oversized_body_line_fails_at_terminator() {
    let fixture = start_servers();
    let mut client = Client::connect(&fixture.smtp_addr);
    client.read_line();

    client.send("HELO test");
    client.send("MAIL FROM:<a@b>");
    client.send("RCPT TO:<alice>");
    assert!(client.send("DATA").starts_with("354"));

    client.send_raw("Hello");
    client.send_raw(&"a".repeat(2000));
    client.send_raw("World");
    // No reply until the terminator, and the message is not delivered.
    assert_eq!(
        client.send("."),
        "500 Syntax error, command line too long\r\n"
    );

    // The session accepts a fresh transaction afterwards.
    assert!(client.send("MAIL FROM:<a@b>").starts_with("250"));
    assert!(client.send("RCPT TO:<alice>").starts_with("250"));
    assert!(client.send("DATA").starts_with("354"));
    client.send_raw("clean");
    assert_eq!(client.send("."), "250 OK\r\n");

    let mut pop = pop3_login(&fixture.pop3_addr, "alice", "wonder");
    assert!(pop.send("STAT").starts_with("+OK 1 "));
}

#[test]
fn test_smtp_repeated_transactions_on_one_connection() {
    let fixture = start_servers();
    let mut client = Client::connect(&fixture.smtp_addr);
    client.read_line();

    client.send("HELO test");
    for round in 0..2 {
        assert!(client.send(&format!("MAIL FROM:<sender{round}@x>")).starts_with("250"));
        assert!(client.send("RCPT TO:<bob>").starts_with("250"));
        assert!(client.send("DATA").starts_with("354"));
        client.send_raw(&format!("round {round}"));
        assert_eq!(client.send("."), "250 OK\r\n");
    }
    client.send("QUIT");

    let mut client = pop3_login(&fixture.pop3_addr, "bob", "builder");
    assert!(client.send("STAT").starts_with("+OK 2 "));
}

#[test]
fn test_round_trip_copies_are_identical() {
    let fixture = start_servers();
    let body = ["Subject: greetings", "", "Hello there", "dot.line"];
    submit_message(&fixture.smtp_addr, "a@b", &["alice", "bob"], &body);

    let expected = "Subject: greetings\r\n\r\nHello there\r\ndot.line\r\n";
    let mut copies = Vec::new();
    for (user, pass) in [("alice", "wonder"), ("bob", "builder")] {
        let mut client = pop3_login(&fixture.pop3_addr, user, pass);
        let reply = client.send("RETR 1");
        assert_eq!(reply, format!("+OK {} octets\r\n", expected.len()));
        copies.push(client.read_until_dot());
    }

    assert_eq!(copies[0], expected);
    assert_eq!(copies[0], copies[1]);
}
