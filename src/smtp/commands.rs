//! Implementation of SMTP commands.

use std::sync::Arc;

use crate::mailbox::directory::UserDirectory;
use crate::proto;
use crate::smtp::error::SmtpError;
use crate::smtp::response::SmtpReply;
use crate::smtp::session::{SmtpSession, SmtpState};

/// Handles SMTP commands and returns appropriate replies. Body-capture
/// lines are not routed through here; the server loop feeds those straight
/// into the session.
#[derive(Debug)]
pub struct SmtpCommandHandler {
    hostname: String,
    directory: Arc<UserDirectory>,
}

impl SmtpCommandHandler {
    pub fn new(hostname: &str, directory: Arc<UserDirectory>) -> Self {
        Self {
            hostname: hostname.to_owned(),
            directory,
        }
    }

    /// Process one command line against the session.
    pub fn process_command(
        &self,
        line: &str,
        session: &mut SmtpSession,
    ) -> Result<SmtpReply, SmtpError> {
        let upper = line.to_ascii_uppercase();
        match upper.get(..4) {
            Some("QUIT") => self.handle_quit(line, session),
            Some("NOOP") => Ok(SmtpReply::ok()),
            Some("HELO") => self.handle_helo(line, session),
            Some("MAIL") => self.handle_mail(&upper, line, session),
            Some("RCPT") => self.handle_rcpt(&upper, line, session),
            Some("DATA") => self.handle_data(line, session),
            Some("EHLO") | Some("RSET") | Some("VRFY") | Some("EXPN") | Some("HELP") => {
                Err(SmtpError::NotImplemented)
            }
            _ => Err(SmtpError::Unrecognized),
        }
    }

    fn handle_quit(
        &self,
        line: &str,
        session: &mut SmtpSession,
    ) -> Result<SmtpReply, SmtpError> {
        if line.len() != 4 {
            return Err(SmtpError::TrailingParameters);
        }
        session.close();
        Ok(SmtpReply::quit(&self.hostname))
    }

    fn handle_helo(
        &self,
        line: &str,
        session: &mut SmtpSession,
    ) -> Result<SmtpReply, SmtpError> {
        if session.state != SmtpState::Connected {
            return Err(SmtpError::BadSequence);
        }
        if line.as_bytes().get(4) != Some(&b' ') {
            return Err(SmtpError::MissingSpace);
        }
        let domain = line[5..].to_owned();
        let reply = SmtpReply::helo(&self.hostname, &domain);
        session.greet(domain);
        Ok(reply)
    }

    fn handle_mail(
        &self,
        upper: &str,
        line: &str,
        session: &mut SmtpSession,
    ) -> Result<SmtpReply, SmtpError> {
        if session.state != SmtpState::Greeted {
            return Err(SmtpError::BadSequence);
        }
        if !upper.starts_with("MAIL FROM:<") || !line.ends_with('>') {
            return Err(SmtpError::BadParameters);
        }
        let address = proto::angle_address(line).ok_or(SmtpError::BadParameters)?;

        let reply = SmtpReply::sender_ok(address);
        session.set_sender(address.to_owned());
        Ok(reply)
    }

    fn handle_rcpt(
        &self,
        upper: &str,
        line: &str,
        session: &mut SmtpSession,
    ) -> Result<SmtpReply, SmtpError> {
        if session.state != SmtpState::SenderSet && session.state != SmtpState::RecipientSet {
            return Err(SmtpError::BadSequence);
        }
        if !upper.starts_with("RCPT TO:<") || !line.ends_with('>') {
            return Err(SmtpError::BadParameters);
        }
        let address = proto::angle_address(line).ok_or(SmtpError::BadParameters)?;

        if self.directory.contains(address) {
            let reply = SmtpReply::recipient_ok(address);
            session.add_recipient(address.to_owned());
            Ok(reply)
        } else {
            let reply = SmtpReply::no_such_user(address);
            session.note_rejected_recipient();
            Ok(reply)
        }
    }

    fn handle_data(
        &self,
        line: &str,
        session: &mut SmtpSession,
    ) -> Result<SmtpReply, SmtpError> {
        if session.state != SmtpState::RecipientSet {
            return Err(SmtpError::BadSequence);
        }
        if line.len() != 4 {
            return Err(SmtpError::TrailingParameters);
        }
        if session.recipients.is_empty() {
            return Err(SmtpError::NoValidRecipients);
        }
        session.start_data();
        Ok(SmtpReply::data_start())
    }
}
