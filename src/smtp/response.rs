//! SMTP reply formatting.

/// A single-line SMTP reply: three-digit code plus text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: &'static str,
    pub text: String,
}

impl SmtpReply {
    pub fn new(code: &'static str, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    /// 250 OK
    pub fn ok() -> Self {
        Self::new("250", "OK")
    }

    /// 220 connection greeting
    pub fn greeting(hostname: &str) -> Self {
        Self::new(
            "220",
            format!("{hostname} Simple Mail Transfer Service Ready"),
        )
    }

    /// 250 HELO acknowledgement
    pub fn helo(hostname: &str, domain: &str) -> Self {
        Self::new(
            "250",
            format!("{hostname} Hello {domain}, pleased to meet you. I am {hostname}"),
        )
    }

    /// 250 MAIL acknowledgement
    pub fn sender_ok(address: &str) -> Self {
        Self::new("250", format!("{address} ... Sender ok"))
    }

    /// 250 RCPT acknowledgement
    pub fn recipient_ok(address: &str) -> Self {
        Self::new("250", format!("{address} ... Recipient ok"))
    }

    /// 550 RCPT rejection for an address the directory does not know
    pub fn no_such_user(address: &str) -> Self {
        Self::new("550", format!("No such user {address}"))
    }

    /// 354 intermediate reply opening body capture
    pub fn data_start() -> Self {
        Self::new("354", "Start mail input; end with <CRLF>.<CRLF>")
    }

    /// 451 delivery failed after body capture
    pub fn local_error() -> Self {
        Self::new("451", "Requested action aborted: local error in processing")
    }

    /// 221 QUIT farewell
    pub fn quit(hostname: &str) -> Self {
        Self::new(
            "221",
            format!("{hostname} Service closing transmission channel"),
        )
    }

    /// 500 oversized command line
    pub fn line_too_long() -> Self {
        Self::new("500", "Syntax error, command line too long")
    }

    /// Format the reply for the wire.
    pub fn format(&self) -> String {
        format!("{} {}\r\n", self.code, self.text)
    }

    /// Check if this is a success reply (2xx).
    pub fn is_success(&self) -> bool {
        self.code.starts_with('2')
    }
}
