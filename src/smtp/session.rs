//! SMTP session state management.

/// Current stage of a submission session.
///
/// A completed DATA cycle returns the session to [`SmtpState::Greeted`],
/// permitting repeated MAIL/RCPT/DATA rounds on one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpState {
    /// Connection established, no HELO yet.
    Connected,
    /// HELO accepted.
    Greeted,
    /// MAIL FROM accepted; recipient list is empty.
    SenderSet,
    /// At least one RCPT processed (accepted or rejected).
    RecipientSet,
    /// Body capture in progress; lines are collected verbatim.
    InData,
}

/// Per-connection submission state, owned by the connection's worker.
#[derive(Debug)]
pub struct SmtpSession {
    pub state: SmtpState,
    /// Domain announced by HELO.
    pub client_domain: Option<String>,
    /// Sender address from MAIL FROM.
    pub sender: Option<String>,
    /// Validated recipients accumulated across RCPT commands.
    pub recipients: Vec<String>,
    /// Body lines collected during capture.
    pub data: Vec<String>,
    /// Set when a body line exceeded the length limit; the capture is
    /// answered with a length error at the terminator instead of delivering.
    pub oversized_data: bool,
    /// Set when the command loop should stop after the current reply.
    pub closed: bool,
}

impl SmtpSession {
    pub fn new() -> Self {
        Self {
            state: SmtpState::Connected,
            client_domain: None,
            sender: None,
            recipients: Vec::new(),
            data: Vec::new(),
            oversized_data: false,
            closed: false,
        }
    }

    /// Records the HELO domain and enters Greeted.
    pub fn greet(&mut self, domain: String) {
        self.client_domain = Some(domain);
        self.state = SmtpState::Greeted;
    }

    /// Starts a fresh transaction, discarding any stale recipient list.
    pub fn set_sender(&mut self, sender: String) {
        self.sender = Some(sender);
        self.recipients.clear();
        self.data.clear();
        self.state = SmtpState::SenderSet;
    }

    /// Appends a recipient the directory accepted.
    pub fn add_recipient(&mut self, address: String) {
        self.recipients.push(address);
        self.state = SmtpState::RecipientSet;
    }

    /// A rejected RCPT still advances the state, so a session with zero
    /// valid recipients is only caught at DATA time.
    pub fn note_rejected_recipient(&mut self) {
        self.state = SmtpState::RecipientSet;
    }

    /// Opens body capture.
    pub fn start_data(&mut self) {
        self.data.clear();
        self.oversized_data = false;
        self.state = SmtpState::InData;
    }

    pub fn in_data(&self) -> bool {
        self.state == SmtpState::InData
    }

    /// Appends one verbatim body line. No dot-unescaping is applied.
    pub fn push_data_line(&mut self, line: String) {
        self.data.push(line);
    }

    /// Records that a body line exceeded the length limit. A client
    /// streaming a body does not read replies until the terminator, so the
    /// error is deferred to the final capture reply.
    pub fn note_oversized_data_line(&mut self) {
        self.oversized_data = true;
    }

    /// Closes body capture: hands back the accumulated body and the
    /// recipient list, and returns the session to Greeted. The recipient
    /// list is discarded here regardless of delivery outcome.
    pub fn finish_data(&mut self) -> (String, Vec<String>) {
        let body = if self.data.is_empty() {
            String::new()
        } else {
            let mut body = self.data.join("\r\n");
            body.push_str("\r\n");
            body
        };
        self.data.clear();
        self.oversized_data = false;
        let recipients = std::mem::take(&mut self.recipients);
        self.state = SmtpState::Greeted;
        (body, recipients)
    }

    /// Ends the session after the current reply.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl Default for SmtpSession {
    fn default() -> Self {
        Self::new()
    }
}
