//! Implementation of POP3 commands.

use std::sync::Arc;

use crate::mailbox::directory::UserDirectory;
use crate::mailbox::store::MailStore;
use crate::pop3::error::Pop3Error;
use crate::pop3::response::Pop3Reply;
use crate::pop3::session::{Pop3Session, Pop3State};
use crate::proto;

/// Name the server announces in its farewell replies.
pub const SERVER_NAME: &str = "deweymail";

/// Handles POP3 commands and returns appropriate replies.
#[derive(Debug)]
pub struct Pop3CommandHandler {
    directory: Arc<UserDirectory>,
    store: Arc<MailStore>,
}

impl Pop3CommandHandler {
    pub fn new(directory: Arc<UserDirectory>, store: Arc<MailStore>) -> Self {
        Self { directory, store }
    }

    /// Process one command line against the session.
    pub fn process_command(
        &self,
        line: &str,
        session: &mut Pop3Session,
    ) -> Result<Pop3Reply, Pop3Error> {
        let upper = line.to_ascii_uppercase();
        match upper.get(..4) {
            Some("NOOP") => self.handle_noop(session),
            Some("USER") => self.handle_user(line, session),
            Some("PASS") => self.handle_pass(line, session),
            Some("STAT") => self.handle_stat(line, session),
            Some("LIST") => self.handle_list(line, session),
            Some("DELE") => self.handle_dele(line, session),
            Some("RSET") => self.handle_rset(line, session),
            Some("RETR") => self.handle_retr(line, session),
            Some("QUIT") => self.handle_quit(session),
            Some("APOP") | Some("UIDL") => Err(Pop3Error::NotImplemented),
            _ if upper.starts_with("TOP") => Err(Pop3Error::NotImplemented),
            _ => Err(Pop3Error::Unrecognized),
        }
    }

    /// Everything after the keyword and its single separator; `None` when
    /// the line is the bare keyword.
    fn parameter(line: &str) -> Option<&str> {
        if line.len() > 4 {
            Some(line.get(5..).unwrap_or(""))
        } else {
            None
        }
    }

    fn handle_noop(&self, session: &Pop3Session) -> Result<Pop3Reply, Pop3Error> {
        session.require_transacting()?;
        Ok(Pop3Reply::ok(""))
    }

    fn handle_user(
        &self,
        line: &str,
        session: &mut Pop3Session,
    ) -> Result<Pop3Reply, Pop3Error> {
        if session.state != Pop3State::Unauthenticated {
            return Err(Pop3Error::BadSequence);
        }
        let name = Self::parameter(line).ok_or(Pop3Error::NoParameter)?;
        if !self.directory.contains(name) {
            return Err(Pop3Error::UnknownUser(name.to_owned()));
        }
        session.accept_user(name.to_owned());
        Ok(Pop3Reply::ok(format!("{name} is a valid mailbox")))
    }

    fn handle_pass(
        &self,
        line: &str,
        session: &mut Pop3Session,
    ) -> Result<Pop3Reply, Pop3Error> {
        if !session.expects_pass() {
            return Err(Pop3Error::PassBeforeUser);
        }
        let password = Self::parameter(line).ok_or(Pop3Error::NoParameter)?;
        let name = session.username.clone().ok_or(Pop3Error::PassBeforeUser)?;
        if !self.directory.verify(&name, password) {
            return Err(Pop3Error::InvalidPassword);
        }

        let maildrop = self
            .store
            .load_maildrop(&name)
            .map_err(|_| Pop3Error::UnreadableMessage)?;
        let count = maildrop.message_count();
        session.open_maildrop(maildrop);
        Ok(Pop3Reply::ok(format!(
            "{name}'s maildrop has {count} message(s)"
        )))
    }

    fn handle_stat(
        &self,
        line: &str,
        session: &mut Pop3Session,
    ) -> Result<Pop3Reply, Pop3Error> {
        session.require_transacting()?;
        if Self::parameter(line).is_some() {
            return Err(Pop3Error::UnexpectedParameter);
        }
        let maildrop = session.maildrop()?;
        Ok(Pop3Reply::ok(format!(
            "{} {}",
            maildrop.message_count(),
            maildrop.total_size()
        )))
    }

    fn handle_list(
        &self,
        line: &str,
        session: &mut Pop3Session,
    ) -> Result<Pop3Reply, Pop3Error> {
        session.require_transacting()?;
        let maildrop = session.maildrop()?;

        match Self::parameter(line) {
            None => {
                let summary = format!(
                    "{} message(s) ({} octets)",
                    maildrop.message_count(),
                    maildrop.total_size()
                );
                let lines = maildrop
                    .iter()
                    .map(|(index, item)| format!("{index} {}", item.size()))
                    .collect();
                Ok(Pop3Reply::ok_with_lines(summary, lines))
            }
            Some(_) => {
                let index = proto::numeric_parameter(line);
                if index == 0 {
                    return Err(Pop3Error::InvalidParameter);
                }
                let item = maildrop.get(index).ok_or(Pop3Error::NoSuchMessage)?;
                Ok(Pop3Reply::ok(format!("{index} {}", item.size())))
            }
        }
    }

    fn handle_dele(
        &self,
        line: &str,
        session: &mut Pop3Session,
    ) -> Result<Pop3Reply, Pop3Error> {
        session.require_transacting()?;
        Self::parameter(line).ok_or(Pop3Error::NoParameter)?;
        let index = proto::numeric_parameter(line);
        if index == 0 {
            return Err(Pop3Error::InvalidParameter);
        }

        let maildrop = session.maildrop_mut()?;
        if !maildrop.in_range(index) {
            return Err(Pop3Error::NoSuchMessage);
        }
        if maildrop.is_deleted(index) {
            return Err(Pop3Error::AlreadyDeleted(index));
        }
        maildrop.mark_deleted(index);
        Ok(Pop3Reply::ok(format!("message {index} deleted")))
    }

    fn handle_rset(
        &self,
        line: &str,
        session: &mut Pop3Session,
    ) -> Result<Pop3Reply, Pop3Error> {
        session.require_transacting()?;
        if Self::parameter(line).is_some() {
            return Err(Pop3Error::InvalidParameter);
        }
        let count = session.maildrop_mut()?.reset_deleted();
        Ok(Pop3Reply::ok(format!("maildrop has {count} message(s)")))
    }

    fn handle_retr(
        &self,
        line: &str,
        session: &mut Pop3Session,
    ) -> Result<Pop3Reply, Pop3Error> {
        session.require_transacting()?;
        Self::parameter(line).ok_or(Pop3Error::NoParameter)?;
        let index = proto::numeric_parameter(line);
        if index == 0 {
            return Err(Pop3Error::InvalidParameter);
        }

        let maildrop = session.maildrop()?;
        let item = maildrop.get(index).ok_or(Pop3Error::NoSuchMessage)?;
        let content = item.read().map_err(|_| Pop3Error::UnreadableMessage)?;
        Ok(Pop3Reply::ok_with_raw(
            format!("{} octets", item.size()),
            content,
        ))
    }

    fn handle_quit(&self, session: &mut Pop3Session) -> Result<Pop3Reply, Pop3Error> {
        if session.state != Pop3State::Transacting {
            session.close();
            return Ok(Pop3Reply::ok(format!(
                "{SERVER_NAME} POP3 server signing off"
            )));
        }

        let maildrop = session
            .maildrop
            .take()
            .ok_or(Pop3Error::AuthorizationIncomplete)?;
        let result = maildrop.commit();
        // The session is over whether or not the commit went through; the
        // connection must still terminate deterministically.
        session.finish();
        let destroyed = result.map_err(|_| Pop3Error::CommitFailed)?;

        let text = if destroyed != 0 {
            format!("{SERVER_NAME} POP3 server signing off ({destroyed} messages destroyed)")
        } else {
            format!("{SERVER_NAME} POP3 server signing off (maildrop empty)")
        };
        Ok(Pop3Reply::ok(text))
    }
}
