//! Per-connection session state.
//!
//! A [`Session`] is owned exclusively by its connection task; handlers are
//! the only code that mutates it, one input line at a time. Everything that
//! must be visible across connections lives in the [`Roster`](super::Roster)
//! instead.

use crate::db::PlayerRecord;
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::debug;

/// Unique identifier for a connection, allocated by the roster.
pub type SessionId = u64;

/// Where a connection is in the onboarding state machine.
///
/// The login dispatch table must carry a handler for every variant; this is
/// checked at construction (see `LoginRegistry`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnState {
    /// Waiting for a player name, or the word `new`.
    AwaitingName,
    /// New account: waiting for the chosen name.
    AwaitingNewName,
    /// Existing account flagged `need_new_name`: re-collecting the surname.
    AwaitingSurname,
    /// New account: collecting the surname.
    AwaitingNewSurname,
    /// Existing account: waiting for the password.
    AwaitingPassword,
    /// New account: choosing a password.
    AwaitingNewPassword,
    /// New account: confirming the chosen password.
    ConfirmPassword,
    /// Onboarding complete; lines go to the command interpreter.
    Playing,
}

impl ConnState {
    /// Every state, for exhaustiveness checks over the dispatch table.
    pub const ALL: [ConnState; 8] = [
        ConnState::AwaitingName,
        ConnState::AwaitingNewName,
        ConnState::AwaitingSurname,
        ConnState::AwaitingNewSurname,
        ConnState::AwaitingPassword,
        ConnState::AwaitingNewPassword,
        ConnState::ConfirmPassword,
        ConnState::Playing,
    ];

    /// Catalog key for the prompt shown while in this state.
    pub fn prompt_key(self) -> &'static str {
        match self {
            ConnState::AwaitingName => "prompt_name",
            ConnState::AwaitingNewName => "prompt_new_name",
            ConnState::AwaitingSurname => "prompt_surname",
            ConnState::AwaitingNewSurname => "prompt_new_surname",
            ConnState::AwaitingPassword => "prompt_password",
            ConnState::AwaitingNewPassword => "prompt_new_password",
            ConnState::ConfirmPassword => "prompt_password_reenter",
            ConnState::Playing => "prompt_playing",
        }
    }
}

/// Account flag: the player may not connect.
pub const FLAG_BLOCKED: &str = "blocked";
/// Account flag: the surname was cleared and must be re-entered.
pub const FLAG_NEED_NEW_NAME: &str = "need_new_name";

/// Mutable per-connection record driven by the login router.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub state: ConnState,
    /// Display-cased name ("Alice"); empty until validated.
    pub name: String,
    /// Case-folded identity key ("alice"); empty until validated.
    pub folded: String,
    pub surname: String,
    /// Held between "choose password" and "confirm password"; never treated
    /// as canonical until confirmation succeeds.
    pub pending_password: Option<String>,
    /// Canonical password hash from the loaded record.
    pub password_hash: Option<String>,
    /// Flags loaded from the persisted record.
    pub flags: HashSet<String>,
    pub bad_password_count: u32,
    /// Shown before the next input line; updated on every transition.
    pub prompt: String,
    tx: mpsc::Sender<String>,
}

impl Session {
    pub fn new(id: SessionId, tx: mpsc::Sender<String>) -> Self {
        Self {
            id,
            state: ConnState::AwaitingName,
            name: String::new(),
            folded: String::new(),
            surname: String::new(),
            pending_password: None,
            password_hash: None,
            flags: HashSet::new(),
            bad_password_count: 0,
            prompt: String::new(),
            tx,
        }
    }

    /// Write one line to the connection's output sink.
    ///
    /// A closed sink means the connection is already going away; the line is
    /// dropped and the event loop will notice on its next turn.
    pub async fn send(&self, line: impl Into<String>) {
        if self.tx.send(line.into()).await.is_err() {
            debug!(id = self.id, "output sink closed, line dropped");
        }
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// "Name Surname", or just the name while no surname is set.
    pub fn full_name(&self) -> String {
        if self.surname.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.surname)
        }
    }

    /// Adopt the persisted record's identity and credentials.
    pub fn apply_record(&mut self, record: &PlayerRecord) {
        self.name = record.name.clone();
        self.folded = record.folded.clone();
        self.surname = record.surname.clone();
        self.password_hash = Some(record.password_hash.clone());
        self.flags = record.flags.iter().cloned().collect();
    }

    /// Forcibly return the session to its initial state (lockout path).
    /// The roster claim, if any, is released by the caller.
    pub fn reset(&mut self) {
        self.state = ConnState::AwaitingName;
        self.name.clear();
        self.folded.clear();
        self.surname.clear();
        self.pending_password = None;
        self.password_hash = None;
        self.flags.clear();
        self.bad_password_count = 0;
    }
}
