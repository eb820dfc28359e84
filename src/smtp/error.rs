//! Recoverable SMTP command failures.

use thiserror::Error;

use crate::smtp::response::SmtpReply;

/// Every variant maps onto exactly one negative wire reply; the session
/// state is left unchanged and the command loop continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmtpError {
    #[error("bad sequence of commands")]
    BadSequence,

    #[error("syntax error in parameters or arguments")]
    BadParameters,

    #[error("command not followed by space")]
    MissingSpace,

    #[error("unexpected trailing parameters")]
    TrailingParameters,

    #[error("no valid recipients")]
    NoValidRecipients,

    #[error("command not implemented")]
    NotImplemented,

    #[error("unrecognized command")]
    Unrecognized,
}

impl SmtpError {
    /// The negative reply sent to the client for this failure.
    pub fn to_reply(&self) -> SmtpReply {
        match self {
            Self::BadSequence => SmtpReply::new("503", "Bad sequence of commands"),
            Self::BadParameters => {
                SmtpReply::new("501", "Syntax error in parameters or arguments")
            }
            Self::MissingSpace => SmtpReply::new(
                "500",
                "Syntax error, command is valid but is not followed by space",
            ),
            Self::TrailingParameters => {
                SmtpReply::new("455", "Server unable to accommodate parameters")
            }
            Self::NoValidRecipients => SmtpReply::new("554", "No Valid Recipients"),
            Self::NotImplemented => SmtpReply::new("502", "Command not implemented"),
            Self::Unrecognized => SmtpReply::new("500", "Syntax error, command unrecognized"),
        }
    }
}
