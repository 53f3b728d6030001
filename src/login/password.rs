//! Password collection: choosing one for a new account, confirming it,
//! and verifying a returning player's credentials.

use super::{Context, EnterKind, LoginHandler, Transition};
use crate::error::{CloseReason, RejectKind, Rejection};
use crate::security::{hash_password, verify_password};
use crate::state::{ConnState, FLAG_BLOCKED, FLAG_NEED_NEW_NAME};
use async_trait::async_trait;
use tracing::warn;

/// New account: accept any non-blank password and ask for confirmation.
pub struct NewPasswordHandler;

#[async_trait]
impl LoginHandler for NewPasswordHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &str) -> Result<Transition, Rejection> {
        if line.is_empty() {
            return Err(RejectKind::PasswordBlank.into());
        }
        ctx.session.pending_password = Some(line.to_string());
        Ok(Transition::To(ConnState::ConfirmPassword))
    }
}

/// New account: confirm the pending password, then persist the record.
///
/// This is also the point where the chosen name is checked against the
/// store one last time; the UNIQUE constraint on the insert backs it up.
pub struct ConfirmPasswordHandler;

#[async_trait]
impl LoginHandler for ConfirmPasswordHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &str) -> Result<Transition, Rejection> {
        let pending = ctx.session.pending_password.take();
        let Some(password) = pending.filter(|p| p == line) else {
            return Err(Rejection::new(RejectKind::PasswordMismatch)
                .redirect(ConnState::AwaitingNewPassword));
        };

        match ctx.db.players().exists(&ctx.session.folded).await {
            Ok(false) => {}
            Ok(true) => return Err(name_gone(ctx)),
            Err(e) => {
                warn!(id = ctx.session.id, error = %e, "name availability re-check failed");
                return Err(Rejection::new(RejectKind::Internal)
                    .redirect(ConnState::AwaitingNewPassword));
            }
        }

        let hash = match hash_password(&password) {
            Ok(hash) => hash,
            Err(e) => {
                warn!(id = ctx.session.id, error = %e, "password hashing failed");
                return Err(Rejection::new(RejectKind::Internal)
                    .redirect(ConnState::AwaitingNewPassword));
            }
        };

        let created = ctx
            .db
            .players()
            .create(
                &ctx.session.name,
                &ctx.session.folded,
                &ctx.session.surname,
                &hash,
                &[],
            )
            .await;
        match created {
            Ok(_) => {
                ctx.session.password_hash = Some(hash);
                Ok(Transition::Enter(EnterKind::New))
            }
            Err(crate::db::DbError::PlayerExists(_)) => Err(name_gone(ctx)),
            Err(e) => {
                warn!(id = ctx.session.id, error = %e, "player create failed");
                Err(Rejection::new(RejectKind::Internal)
                    .redirect(ConnState::AwaitingNewPassword))
            }
        }
    }
}

/// The chosen name was persisted by someone else while this account was
/// being set up. Give the reservation back and start the naming over.
fn name_gone(ctx: &mut Context<'_>) -> Rejection {
    ctx.roster.release(&ctx.session.folded, ctx.session.id);
    ctx.session.name.clear();
    ctx.session.folded.clear();
    Rejection::new(RejectKind::NameTaken).redirect(ConnState::AwaitingNewName)
}

/// Returning player: verify the password and gate on account flags.
pub struct PasswordHandler;

/// A failed attempt. Counts toward the lockout limit; at the limit the
/// rejection closes the connection.
fn counted(ctx: &mut Context<'_>, kind: RejectKind) -> Rejection {
    ctx.session.bad_password_count += 1;
    let rejection = Rejection::new(kind);
    if ctx.session.bad_password_count >= ctx.limits.max_password_attempts {
        rejection.close(CloseReason::Lockout)
    } else {
        rejection
    }
}

#[async_trait]
impl LoginHandler for PasswordHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &str) -> Result<Transition, Rejection> {
        if line.is_empty() {
            return Err(counted(ctx, RejectKind::PasswordBlank));
        }

        let verified = match ctx.session.password_hash.as_deref() {
            Some(hash) => verify_password(line, hash),
            None => {
                warn!(id = ctx.session.id, "password state without a loaded hash");
                return Err(RejectKind::Internal.into());
            }
        };
        if !verified {
            return Err(counted(ctx, RejectKind::PasswordIncorrect));
        }

        // Flag gates apply only after the password proves ownership, and
        // neither counts as a failed attempt.
        if ctx.session.has_flag(FLAG_BLOCKED) {
            return Err(Rejection::new(RejectKind::AccountBlocked).close(CloseReason::Blocked));
        }
        if ctx.session.has_flag(FLAG_NEED_NEW_NAME) {
            ctx.session.surname.clear();
            return Err(Rejection::new(RejectKind::SurnameCleared)
                .redirect(ConnState::AwaitingSurname));
        }

        if let Err(e) = ctx.db.players().touch_last_login(&ctx.session.folded).await {
            warn!(id = ctx.session.id, error = %e, "last-login update failed");
        }

        Ok(Transition::Enter(EnterKind::Returning))
    }
}
