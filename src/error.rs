//! Unified error handling for mudlark.
//!
//! Login handlers report expected validation failures as [`Rejection`]s,
//! which the router turns into catalog messages and re-prompts. Only two
//! conditions are fatal to a connection: a blocked account and the
//! bad-password lockout.

use crate::state::ConnState;
use thiserror::Error;

/// A recoverable login failure.
///
/// Every variant maps to a message-catalog key via [`RejectKind::message_key`];
/// the router is responsible for delivering that message. A rejection never
/// terminates the connection unless [`Rejection::close`] is set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectKind {
    #[error("name cannot be blank")]
    NameBlank,

    #[error("name contains invalid characters")]
    NameInvalid,

    #[error("that name is not permitted")]
    NameBanned,

    #[error("that name is already taken")]
    NameTaken,

    /// Someone is already connected under this name (carries the name for
    /// message substitution).
    #[error("{0} is already connected")]
    NameOnline(String),

    #[error("no player by that name exists")]
    NameUnknown,

    #[error("surname cannot be blank")]
    SurnameBlank,

    #[error("surname contains reserved characters")]
    SurnameInvalid,

    #[error("password cannot be blank")]
    PasswordBlank,

    #[error("password incorrect")]
    PasswordIncorrect,

    #[error("password and confirmation do not agree")]
    PasswordMismatch,

    /// Correct password, but the account must re-enter its surname before
    /// it may play.
    #[error("surname must be re-entered")]
    SurnameCleared,

    #[error("account is blocked")]
    AccountBlocked,

    /// A collaborator (database, hashing) failed mid-attempt. The user is
    /// asked to retry; details go to the log, not the wire.
    #[error("internal error")]
    Internal,
}

impl RejectKind {
    /// Catalog key for the user-facing message.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::NameBlank => "error_name_blank",
            Self::NameInvalid => "error_name_invalid",
            Self::NameBanned => "error_name_banned",
            Self::NameTaken => "error_name_exist",
            Self::NameOnline(_) => "error_name_online",
            Self::NameUnknown => "error_name_unknown",
            Self::SurnameBlank => "error_surname_blank",
            Self::SurnameInvalid => "error_surname_invalid",
            Self::PasswordBlank => "error_password_blank",
            Self::PasswordIncorrect => "error_password_incorrect",
            Self::PasswordMismatch => "error_password_confirm_failed",
            Self::SurnameCleared => "error_surname_cleared",
            Self::AccountBlocked => "server_flag_blocked",
            Self::Internal => "error_internal",
        }
    }
}

/// Why a rejection closes the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The account carries the `blocked` flag.
    Blocked,
    /// Too many failed password attempts.
    Lockout,
}

/// A login failure as reported by a handler.
///
/// The router writes the message for `kind`, then either closes the
/// connection (`close` set), re-prompts at `redirect`, or re-prompts in
/// place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: RejectKind,
    pub redirect: Option<ConnState>,
    pub close: Option<CloseReason>,
}

impl Rejection {
    pub fn new(kind: RejectKind) -> Self {
        Self { kind, redirect: None, close: None }
    }

    /// Re-prompt at a different state after delivering the message.
    pub fn redirect(mut self, state: ConnState) -> Self {
        self.redirect = Some(state);
        self
    }

    /// Close the connection after delivering the message.
    pub fn close(mut self, reason: CloseReason) -> Self {
        self.close = Some(reason);
        self
    }
}

impl From<RejectKind> for Rejection {
    fn from(kind: RejectKind) -> Self {
        Self::new(kind)
    }
}

/// Why a connection's command loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The player quit from inside the game.
    Quit,
    /// Blocked account detected at password collection.
    Blocked,
    /// Bad-password lockout.
    Lockout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_keys_are_stable() {
        assert_eq!(RejectKind::NameBlank.message_key(), "error_name_blank");
        assert_eq!(
            RejectKind::NameOnline("Alice".into()).message_key(),
            "error_name_online"
        );
        assert_eq!(
            RejectKind::AccountBlocked.message_key(),
            "server_flag_blocked"
        );
    }

    #[test]
    fn rejection_builder() {
        let rej =
            Rejection::new(RejectKind::PasswordMismatch).redirect(ConnState::AwaitingNewPassword);
        assert_eq!(rej.redirect, Some(ConnState::AwaitingNewPassword));
        assert_eq!(rej.close, None);

        let rej = Rejection::new(RejectKind::AccountBlocked).close(CloseReason::Blocked);
        assert_eq!(rej.close, Some(CloseReason::Blocked));
    }
}
