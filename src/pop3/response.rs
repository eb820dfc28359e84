//! POP3 reply formatting.

/// Body of a multi-line reply, terminated on the wire by a lone `.` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    /// Pre-split lines, each sent with a CRLF terminator (LIST).
    Lines(Vec<String>),
    /// Verbatim content already carrying its own line endings (RETR).
    Raw(String),
}

/// A POP3 reply: status indicator, text, and an optional multi-line body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pop3Reply {
    pub success: bool,
    pub text: String,
    pub body: Option<ReplyBody>,
}

impl Pop3Reply {
    /// Create a positive reply.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
            body: None,
        }
    }

    /// Create a negative reply.
    pub fn err(text: impl Into<String>) -> Self {
        Self {
            success: false,
            text: text.into(),
            body: None,
        }
    }

    /// Create a positive reply followed by per-line body content.
    pub fn ok_with_lines(text: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
            body: Some(ReplyBody::Lines(lines)),
        }
    }

    /// Create a positive reply streaming `content` verbatim.
    pub fn ok_with_raw(text: impl Into<String>, content: String) -> Self {
        Self {
            success: true,
            text: text.into(),
            body: Some(ReplyBody::Raw(content)),
        }
    }

    /// Format the reply for the wire, CRLF line endings throughout.
    pub fn format(&self) -> String {
        let status = if self.success { "+OK" } else { "-ERR" };
        let mut out = if self.text.is_empty() {
            format!("{status}\r\n")
        } else {
            format!("{status} {}\r\n", self.text)
        };

        match &self.body {
            Some(ReplyBody::Lines(lines)) => {
                for line in lines {
                    out.push_str(line);
                    out.push_str("\r\n");
                }
                out.push_str(".\r\n");
            }
            Some(ReplyBody::Raw(content)) => {
                out.push_str(content);
                if !content.is_empty() && !content.ends_with('\n') {
                    out.push_str("\r\n");
                }
                out.push_str(".\r\n");
            }
            None => {}
        }
        out
    }
}
