//! POP3 session state management.

use crate::mailbox::store::Maildrop;
use crate::pop3::error::Pop3Error;

/// Current stage of a retrieval session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pop3State {
    /// No accepted USER yet.
    Unauthenticated,
    /// Valid USER seen, waiting for PASS.
    Authenticating,
    /// Credentials accepted, maildrop open.
    Transacting,
    /// Terminal: QUIT accepted from Transacting, deletions committed.
    Updated,
}

/// Last command the session accepted. PASS is only legal immediately after
/// an accepted USER.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastCommand {
    None,
    User,
    Pass,
}

/// Per-connection retrieval state, owned by the connection's worker.
#[derive(Debug)]
pub struct Pop3Session {
    pub state: Pop3State,
    pub last_command: LastCommand,
    pub username: Option<String>,
    /// Loaded at PASS time; its entry count is the stable index range for
    /// the rest of the session.
    pub maildrop: Option<Maildrop>,
    /// Set when the command loop should stop after the current reply.
    pub closed: bool,
}

impl Pop3Session {
    pub fn new() -> Self {
        Self {
            state: Pop3State::Unauthenticated,
            last_command: LastCommand::None,
            username: None,
            maildrop: None,
            closed: false,
        }
    }

    /// Guards commands that are only legal once authenticated.
    pub fn require_transacting(&self) -> Result<(), Pop3Error> {
        if self.state == Pop3State::Transacting {
            Ok(())
        } else {
            Err(Pop3Error::AuthorizationIncomplete)
        }
    }

    /// Records an accepted USER and moves to Authenticating.
    pub fn accept_user(&mut self, name: String) {
        self.username = Some(name);
        self.state = Pop3State::Authenticating;
        self.last_command = LastCommand::User;
    }

    /// True when PASS may be attempted. A failed PASS does not update
    /// `last_command`, so the client may retry.
    pub fn expects_pass(&self) -> bool {
        self.state == Pop3State::Authenticating && self.last_command == LastCommand::User
    }

    /// Opens the maildrop after a successful credential check.
    pub fn open_maildrop(&mut self, maildrop: Maildrop) {
        self.maildrop = Some(maildrop);
        self.state = Pop3State::Transacting;
        self.last_command = LastCommand::Pass;
    }

    /// The open maildrop; absent outside Transacting.
    pub fn maildrop(&self) -> Result<&Maildrop, Pop3Error> {
        self.maildrop
            .as_ref()
            .ok_or(Pop3Error::AuthorizationIncomplete)
    }

    pub fn maildrop_mut(&mut self) -> Result<&mut Maildrop, Pop3Error> {
        self.maildrop
            .as_mut()
            .ok_or(Pop3Error::AuthorizationIncomplete)
    }

    /// Enters the terminal state after a committed QUIT.
    pub fn finish(&mut self) {
        self.state = Pop3State::Updated;
        self.closed = true;
    }

    /// Ends the session without committing anything.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl Default for Pop3Session {
    fn default() -> Self {
        Self::new()
    }
}
