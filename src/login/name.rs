//! Name collection, for both returning players and new accounts.

use super::{Context, LoginHandler, Transition, validate};
use crate::error::{RejectKind, Rejection};
use crate::state::ConnState;
use async_trait::async_trait;
use tracing::warn;

/// Entry state: the line is either an existing player's name or the word
/// `new`.
pub struct NameHandler;

#[async_trait]
impl LoginHandler for NameHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &str) -> Result<Transition, Rejection> {
        let token = line.split_whitespace().next().unwrap_or("");
        validate::validate_non_blank(token, RejectKind::NameBlank)?;
        validate::validate_name_charset(token, ctx.limits)?;

        let folded = validate::fold(token);
        if folded == "new" {
            return Ok(Transition::To(ConnState::AwaitingNewName));
        }

        // Claim before the lookup so a second connection typing the same
        // name cannot slip in between check and claim.
        if !ctx.roster.try_claim(&folded, ctx.session.id) {
            return Err(RejectKind::NameOnline(validate::capitalize(token)).into());
        }

        match ctx.db.players().find_by_folded(&folded).await {
            Ok(Some(record)) => {
                ctx.session.apply_record(&record);
                ctx.session.bad_password_count = 0;
                Ok(Transition::To(ConnState::AwaitingPassword))
            }
            Ok(None) => {
                ctx.roster.release(&folded, ctx.session.id);
                Err(RejectKind::NameUnknown.into())
            }
            Err(e) => {
                warn!(id = ctx.session.id, error = %e, "player lookup failed");
                ctx.roster.release(&folded, ctx.session.id);
                Err(RejectKind::Internal.into())
            }
        }
    }
}

/// New account: validate the chosen name, reserve it, and move on to the
/// surname.
pub struct NewNameHandler;

#[async_trait]
impl LoginHandler for NewNameHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &str) -> Result<Transition, Rejection> {
        let token = line.split_whitespace().next().unwrap_or("");
        validate::validate_non_blank(token, RejectKind::NameBlank)?;
        validate::validate_name_charset(token, ctx.limits)?;

        let folded = validate::fold(token);
        // `new` stays reserved as the create-account keyword.
        if folded == "new" || ctx.badnames.contains(&folded) {
            return Err(RejectKind::NameBanned.into());
        }

        // Re-entry after a failed confirm may arrive with a different name;
        // give the old reservation back first.
        if !ctx.session.folded.is_empty() && ctx.session.folded != folded {
            ctx.roster.release(&ctx.session.folded, ctx.session.id);
        }

        if !ctx.roster.try_claim(&folded, ctx.session.id) {
            return Err(RejectKind::NameTaken.into());
        }

        match ctx.db.players().exists(&folded).await {
            Ok(true) => {
                ctx.roster.release(&folded, ctx.session.id);
                Err(RejectKind::NameTaken.into())
            }
            Ok(false) => {
                ctx.session.name = validate::capitalize(token);
                ctx.session.folded = folded;
                Ok(Transition::To(ConnState::AwaitingNewSurname))
            }
            Err(e) => {
                warn!(id = ctx.session.id, error = %e, "name availability check failed");
                ctx.roster.release(&folded, ctx.session.id);
                Err(RejectKind::Internal.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::login::testutil::{Fixture, drain};
    use crate::login::Flow;
    use crate::state::ConnState;

    #[tokio::test]
    async fn new_keyword_starts_account_creation() {
        let fixture = Fixture::new().await;
        let (mut session, _rx) = fixture.session();

        assert_eq!(fixture.drive(&mut session, "NEW").await, Flow::Continue);
        assert_eq!(session.state, ConnState::AwaitingNewName);
    }

    #[tokio::test]
    async fn known_name_moves_to_password() {
        let fixture = Fixture::new().await;
        fixture.seed_player("Alice", "swordfish", &[]).await;
        let (mut session, _rx) = fixture.session();

        assert_eq!(fixture.drive(&mut session, "alice").await, Flow::Continue);
        assert_eq!(session.state, ConnState::AwaitingPassword);
        assert_eq!(session.name, "Alice");
        assert_eq!(session.folded, "alice");
        assert!(session.password_hash.is_some());
    }

    #[tokio::test]
    async fn entering_password_collection_resets_attempt_counter() {
        let fixture = Fixture::new().await;
        fixture.seed_player("Alice", "swordfish", &[]).await;
        let (mut session, _rx) = fixture.session();

        // Stale count from a previous attempt on this connection.
        session.bad_password_count = 2;
        assert_eq!(fixture.drive(&mut session, "alice").await, Flow::Continue);
        assert_eq!(session.state, ConnState::AwaitingPassword);
        assert_eq!(session.bad_password_count, 0);
    }

    #[tokio::test]
    async fn unknown_name_stays_and_releases_claim() {
        let fixture = Fixture::new().await;
        let (mut session, mut rx) = fixture.session();

        assert_eq!(fixture.drive(&mut session, "ghost").await, Flow::Continue);
        assert_eq!(session.state, ConnState::AwaitingName);
        assert_eq!(fixture.roster.find_by_name("ghost"), None);

        let lines = drain(&mut rx);
        assert_eq!(lines[0], fixture.catalog.get("error_name_unknown"));
    }

    #[tokio::test]
    async fn name_held_by_another_session_is_refused() {
        let fixture = Fixture::new().await;
        fixture.seed_player("Alice", "swordfish", &[]).await;

        let (mut first, _rx1) = fixture.session();
        assert_eq!(fixture.drive(&mut first, "alice").await, Flow::Continue);

        let (mut second, mut rx2) = fixture.session();
        assert_eq!(fixture.drive(&mut second, "alice").await, Flow::Continue);
        assert_eq!(second.state, ConnState::AwaitingName);

        let lines = drain(&mut rx2);
        assert_eq!(lines[0], "Alice is already connected.");
    }

    #[tokio::test]
    async fn banned_name_cannot_be_chosen() {
        let fixture = Fixture::new().await;
        let (mut session, mut rx) = fixture.session();

        assert_eq!(fixture.drive(&mut session, "new").await, Flow::Continue);
        assert_eq!(fixture.drive(&mut session, "Admin").await, Flow::Continue);
        assert_eq!(session.state, ConnState::AwaitingNewName);

        let lines = drain(&mut rx);
        assert_eq!(*lines.last().unwrap(), fixture.catalog.get("prompt_new_name"));
        assert!(lines.contains(&fixture.catalog.get("error_name_banned").to_string()));
    }

    #[tokio::test]
    async fn new_is_banned_as_a_chosen_name() {
        let fixture = Fixture::new().await;
        let (mut session, mut rx) = fixture.session();

        assert_eq!(fixture.drive(&mut session, "new").await, Flow::Continue);
        drain(&mut rx);
        assert_eq!(fixture.drive(&mut session, "new").await, Flow::Continue);
        assert_eq!(session.state, ConnState::AwaitingNewName);
        let lines = drain(&mut rx);
        assert_eq!(lines[0], fixture.catalog.get("error_name_banned"));
    }

    #[tokio::test]
    async fn persisted_name_cannot_be_rechosen() {
        let fixture = Fixture::new().await;
        fixture.seed_player("Alice", "swordfish", &[]).await;
        let (mut session, mut rx) = fixture.session();

        assert_eq!(fixture.drive(&mut session, "new").await, Flow::Continue);
        assert_eq!(fixture.drive(&mut session, "alice").await, Flow::Continue);
        assert_eq!(session.state, ConnState::AwaitingNewName);
        // The failed attempt must not leave the name reserved.
        assert_eq!(fixture.roster.find_by_name("alice"), None);

        let lines = drain(&mut rx);
        assert!(lines.contains(&fixture.catalog.get("error_name_exist").to_string()));
    }

    #[tokio::test]
    async fn rechoosing_releases_previous_reservation() {
        let fixture = Fixture::new().await;
        let (mut session, _rx) = fixture.session();

        assert_eq!(fixture.drive(&mut session, "new").await, Flow::Continue);
        assert_eq!(fixture.drive(&mut session, "alice").await, Flow::Continue);
        assert_eq!(fixture.roster.find_by_name("alice"), Some(session.id));

        // Back out to the name prompt and choose differently.
        session.state = ConnState::AwaitingNewName;
        assert_eq!(fixture.drive(&mut session, "beatrix").await, Flow::Continue);
        assert_eq!(fixture.roster.find_by_name("alice"), None);
        assert_eq!(fixture.roster.find_by_name("beatrix"), Some(session.id));
    }

    #[tokio::test]
    async fn name_with_digits_is_invalid() {
        let fixture = Fixture::new().await;
        let (mut session, mut rx) = fixture.session();

        assert_eq!(fixture.drive(&mut session, "al1ce").await, Flow::Continue);
        assert_eq!(session.state, ConnState::AwaitingName);
        let lines = drain(&mut rx);
        assert_eq!(lines[0], fixture.catalog.get("error_name_invalid"));
    }
}
