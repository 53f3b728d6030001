//! Shared finalize step: both the new-account and returning-player paths
//! funnel through here to enter the game.

use super::{Context, EnterKind, set_state};
use crate::state::ConnState;
use tracing::info;

/// Promote a fully authenticated session into the game.
pub async fn enter_game(ctx: &mut Context<'_>, kind: EnterKind) {
    ctx.session.bad_password_count = 0;
    set_state(ctx, ConnState::Playing);

    let full_name = ctx.session.full_name();
    ctx.session
        .send(ctx.catalog.render("welcome", &[("name", &full_name)]))
        .await;
    let greeting_key = match kind {
        EnterKind::New => "new_player",
        EnterKind::Returning => "existing_player",
    };
    ctx.session.send(ctx.catalog.get(greeting_key)).await;
    ctx.session.send(ctx.catalog.get("motd")).await;

    // First room view, through the same path a typed "look" takes.
    ctx.interpreter
        .execute(ctx.session, ctx.roster, ctx.catalog, "look")
        .await;

    ctx.roster.set_playing(ctx.session.id, &full_name);
    let joined = ctx.catalog.render("server_player_joined", &[("name", &full_name)]);
    ctx.roster.broadcast_except(&joined, ctx.session.id).await;

    info!(
        id = ctx.session.id,
        name = %full_name,
        new = matches!(kind, EnterKind::New),
        "player entered the game"
    );
}
