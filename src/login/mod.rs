//! The login state machine.
//!
//! This module contains the handler trait, the dispatch table over
//! [`ConnState`], and the router that feeds each input line to the right
//! handler and applies the uniform failure-recovery policy: deliver the
//! failure message, honor any redirect, close only for the two fatal
//! conditions, and always follow up with the session's prompt.

mod enter;
mod name;
mod password;
mod surname;
pub mod validate;

pub use enter::enter_game;
pub use name::{NameHandler, NewNameHandler};
pub use password::{ConfirmPasswordHandler, NewPasswordHandler, PasswordHandler};
pub use surname::{NewSurnameHandler, SurnameHandler};

use crate::commands::CommandInterpreter;
use crate::config::LimitsConfig;
use crate::db::Database;
use crate::error::{CloseReason, EndReason, RejectKind, Rejection};
use crate::messages::Catalog;
use crate::security::BannedNames;
use crate::state::{ConnState, Roster, Session};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info};

/// Everything a handler may touch: the session it owns plus read-only
/// collaborators.
pub struct Context<'a> {
    pub session: &'a mut Session,
    pub roster: &'a Roster,
    pub db: &'a Database,
    pub catalog: &'a Catalog,
    pub limits: &'a LimitsConfig,
    pub badnames: &'a BannedNames,
    pub interpreter: &'a dyn CommandInterpreter,
}

/// Which success path reached finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterKind {
    New,
    Returning,
}

/// Successful outcome of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No state change; re-prompt as is (Playing commands).
    Stay,
    /// Move to a state; the router derives the new prompt from it.
    To(ConnState),
    /// Shared finalize step into the game.
    Enter(EnterKind),
    /// Terminate the connection (in-game quit).
    End(EndReason),
}

/// What the connection's event loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    End(EndReason),
}

/// Trait implemented by all login state handlers.
#[async_trait]
pub trait LoginHandler: Send + Sync {
    /// Handle one trimmed input line for the session's current state.
    async fn handle(&self, ctx: &mut Context<'_>, line: &str) -> Result<Transition, Rejection>;
}

/// Immutable dispatch table from connection state to handler.
///
/// Built once at startup. Construction registers a handler for every
/// [`ConnState`] variant; an unmapped state is a construction-time defect,
/// not a runtime condition.
pub struct LoginRegistry {
    handlers: HashMap<ConnState, Box<dyn LoginHandler>>,
}

/// Dispatch slot for `Playing`: lines go straight to the command
/// interpreter.
struct PlayingHandler;

#[async_trait]
impl LoginHandler for PlayingHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &str) -> Result<Transition, Rejection> {
        Ok(ctx
            .interpreter
            .execute(ctx.session, ctx.roster, ctx.catalog, line)
            .await)
    }
}

impl LoginRegistry {
    /// Create the registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<ConnState, Box<dyn LoginHandler>> = HashMap::new();

        handlers.insert(ConnState::AwaitingName, Box::new(NameHandler));
        handlers.insert(ConnState::AwaitingPassword, Box::new(PasswordHandler));

        handlers.insert(ConnState::AwaitingNewName, Box::new(NewNameHandler));
        handlers.insert(ConnState::AwaitingNewSurname, Box::new(NewSurnameHandler));
        handlers.insert(ConnState::AwaitingNewPassword, Box::new(NewPasswordHandler));
        handlers.insert(ConnState::ConfirmPassword, Box::new(ConfirmPasswordHandler));

        handlers.insert(ConnState::AwaitingSurname, Box::new(SurnameHandler));
        handlers.insert(ConnState::Playing, Box::new(PlayingHandler));

        debug_assert!(
            ConnState::ALL.iter().all(|s| handlers.contains_key(s)),
            "dispatch table must cover every connection state"
        );

        Self { handlers }
    }

    #[cfg(test)]
    pub fn has_handler(&self, state: ConnState) -> bool {
        self.handlers.contains_key(&state)
    }

    /// Route one raw input line through the session's current handler.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, raw: &str) -> Flow {
        let line = raw.trim();
        let state = ctx.session.state;

        // Construction guarantees coverage of every state; a miss here is a
        // logic error in `new()`.
        let handler = self
            .handlers
            .get(&state)
            .expect("handler registered for every connection state");

        let flow = match handler.handle(ctx, line).await {
            Ok(transition) => self.apply(ctx, transition).await,
            Err(rejection) => self.recover(ctx, rejection).await,
        };

        if flow == Flow::Continue {
            let prompt = ctx.session.prompt.clone();
            ctx.session.send(prompt).await;
        }
        flow
    }

    async fn apply(&self, ctx: &mut Context<'_>, transition: Transition) -> Flow {
        match transition {
            Transition::Stay => Flow::Continue,
            Transition::To(state) => {
                set_state(ctx, state);
                Flow::Continue
            }
            Transition::Enter(kind) => {
                enter::enter_game(ctx, kind).await;
                Flow::Continue
            }
            Transition::End(reason) => Flow::End(reason),
        }
    }

    /// Uniform failure-recovery policy. The handler decides the failure;
    /// the router alone delivers it.
    async fn recover(&self, ctx: &mut Context<'_>, rejection: Rejection) -> Flow {
        let message = match &rejection.kind {
            RejectKind::NameOnline(name) => {
                ctx.catalog.render(rejection.kind.message_key(), &[("name", name)])
            }
            kind => ctx.catalog.get(kind.message_key()).to_string(),
        };
        ctx.session.send(message).await;
        debug!(id = ctx.session.id, kind = ?rejection.kind, "login attempt rejected");

        match rejection.close {
            Some(CloseReason::Blocked) => {
                let goodbye = ctx.catalog.get("prompt_flag_blocked").to_string();
                ctx.session.send(goodbye).await;
                info!(id = ctx.session.id, name = %ctx.session.name, "blocked account refused");
                Flow::End(EndReason::Blocked)
            }
            Some(CloseReason::Lockout) => {
                let notice = ctx.catalog.get("server_password_attempt_exceeded").to_string();
                ctx.session.send(notice).await;
                if !ctx.session.folded.is_empty() {
                    ctx.roster.release(&ctx.session.folded, ctx.session.id);
                }
                info!(id = ctx.session.id, "bad-password lockout");
                ctx.session.reset();
                Flow::End(EndReason::Lockout)
            }
            None => {
                if let Some(state) = rejection.redirect {
                    set_state(ctx, state);
                }
                Flow::Continue
            }
        }
    }
}

impl Default for LoginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Move the session to `state` and refresh its prompt from the catalog.
pub(crate) fn set_state(ctx: &mut Context<'_>, state: ConnState) {
    ctx.session.state = state;
    ctx.session.prompt = ctx.catalog.get(state.prompt_key()).to_string();
}
