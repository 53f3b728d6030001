//! Surname collection.
//!
//! Two variants share the validation sequence: `NewSurnameHandler` runs
//! during account creation and continues to the password choice, while
//! `SurnameHandler` re-collects a cleared surname on an existing account
//! and goes straight into the game once the record is updated.

use super::{Context, EnterKind, LoginHandler, Transition, validate};
use crate::charset::transcode;
use crate::error::{RejectKind, Rejection};
use crate::state::{ConnState, FLAG_NEED_NEW_NAME};
use async_trait::async_trait;
use tracing::warn;

fn checked_surname(ctx: &Context<'_>, line: &str) -> Result<String, Rejection> {
    let text = transcode(line);
    validate::validate_non_blank(&text, RejectKind::SurnameBlank)?;
    validate::validate_surname_charset(&text, ctx.limits)?;
    if ctx.badnames.contains(&text) {
        return Err(RejectKind::NameBanned.into());
    }
    Ok(text)
}

/// New account: collect the surname, then choose a password.
pub struct NewSurnameHandler;

#[async_trait]
impl LoginHandler for NewSurnameHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &str) -> Result<Transition, Rejection> {
        let surname = checked_surname(ctx, line)?;
        ctx.session.surname = surname;
        ctx.session.bad_password_count = 0;
        Ok(Transition::To(ConnState::AwaitingNewPassword))
    }
}

/// Existing account whose surname was cleared: collect a replacement,
/// persist it, and enter the game.
pub struct SurnameHandler;

#[async_trait]
impl LoginHandler for SurnameHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &str) -> Result<Transition, Rejection> {
        let surname = checked_surname(ctx, line)?;
        ctx.session.surname = surname;
        ctx.session.flags.remove(FLAG_NEED_NEW_NAME);

        let flags: Vec<String> = ctx.session.flags.iter().cloned().collect();
        if let Err(e) = ctx
            .db
            .players()
            .update_profile(&ctx.session.folded, &ctx.session.surname, &flags)
            .await
        {
            warn!(id = ctx.session.id, error = %e, "surname update failed");
            return Err(RejectKind::Internal.into());
        }

        Ok(Transition::Enter(EnterKind::Returning))
    }
}
