//! Recoverable POP3 command failures.

use thiserror::Error;

use crate::pop3::response::Pop3Reply;

/// Every variant maps onto exactly one negative wire reply; the session
/// state is left unchanged and the command loop continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Pop3Error {
    #[error("command requires a completed authorization")]
    AuthorizationIncomplete,

    #[error("bad sequence of commands")]
    BadSequence,

    #[error("PASS issued before a successful USER")]
    PassBeforeUser,

    #[error("missing parameter")]
    NoParameter,

    #[error("invalid parameter")]
    InvalidParameter,

    #[error("unexpected parameter")]
    UnexpectedParameter,

    #[error("unknown user {0}")]
    UnknownUser(String),

    #[error("invalid password")]
    InvalidPassword,

    #[error("no such message")]
    NoSuchMessage,

    #[error("message {0} already deleted")]
    AlreadyDeleted(usize),

    #[error("unable to read message file")]
    UnreadableMessage,

    #[error("failed to remove deleted messages")]
    CommitFailed,

    #[error("command not implemented")]
    NotImplemented,

    #[error("unrecognized command")]
    Unrecognized,
}

impl Pop3Error {
    /// The negative reply sent to the client for this failure.
    pub fn to_reply(&self) -> Pop3Reply {
        let text = match self {
            Self::AuthorizationIncomplete => "Need to complete AUTHORIZATION".to_string(),
            Self::BadSequence => "Bad sequence of commands".to_string(),
            Self::PassBeforeUser => "Must input USER first".to_string(),
            Self::NoParameter => "No parameter detected".to_string(),
            Self::InvalidParameter => "Invalid parameter specified".to_string(),
            Self::UnexpectedParameter => "Parameter specified".to_string(),
            Self::UnknownUser(name) => format!("never heard of {name}"),
            Self::InvalidPassword => "invalid password".to_string(),
            Self::NoSuchMessage => "No such message".to_string(),
            Self::AlreadyDeleted(index) => format!("message {index} already deleted"),
            Self::UnreadableMessage => "Unable to read message file".to_string(),
            Self::CommitFailed => "Unable to remove deleted messages".to_string(),
            Self::NotImplemented => "Command not implemented".to_string(),
            Self::Unrecognized => "Syntax error, command unrecognized".to_string(),
        };
        Pop3Reply::err(text)
    }
}
