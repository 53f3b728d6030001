//! The in-game command interpreter.
//!
//! Onboarding hands finished sessions to this seam. The built-in [`World`]
//! covers just enough verbs to exercise the hand-off; a richer game loop
//! replaces it behind the same trait.

use crate::error::EndReason;
use crate::login::Transition;
use crate::messages::Catalog;
use crate::state::{Roster, Session};
use async_trait::async_trait;

/// Command loop the login flow hands finished sessions to.
#[async_trait]
pub trait CommandInterpreter: Send + Sync {
    /// Execute one trimmed command line for a playing session.
    async fn execute(
        &self,
        session: &mut Session,
        roster: &Roster,
        catalog: &Catalog,
        line: &str,
    ) -> Transition;
}

/// Minimal built-in world: look, say, who, quit.
pub struct World;

#[async_trait]
impl CommandInterpreter for World {
    async fn execute(
        &self,
        session: &mut Session,
        roster: &Roster,
        catalog: &Catalog,
        line: &str,
    ) -> Transition {
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_lowercase().as_str() {
            "" => {}
            "look" | "l" => {
                session.send(catalog.get("room_description")).await;
            }
            "say" => {
                if rest.is_empty() {
                    session.send(catalog.get("error_say_blank")).await;
                } else {
                    session
                        .send(catalog.render("say_you", &[("text", rest)]))
                        .await;
                    let heard = catalog.render(
                        "say_other",
                        &[("name", &session.full_name()), ("text", rest)],
                    );
                    roster.broadcast_except(&heard, session.id).await;
                }
            }
            "who" => {
                let names = roster.playing_names().join(", ");
                session
                    .send(catalog.render("who_online", &[("names", &names)]))
                    .await;
            }
            "quit" => {
                session.send(catalog.get("goodbye")).await;
                return Transition::End(EndReason::Quit);
            }
            _ => {
                session.send(catalog.get("error_unknown_command")).await;
            }
        }
        Transition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EndReason;
    use crate::login::Flow;
    use crate::login::testutil::{Fixture, drain};

    #[tokio::test]
    async fn look_describes_the_room() {
        let fixture = Fixture::new().await;
        let (mut session, mut rx) = fixture.session();
        fixture.create_player(&mut session, "alice", "Stone", "pw").await;
        drain(&mut rx);

        assert_eq!(fixture.drive(&mut session, "look").await, Flow::Continue);
        let lines = drain(&mut rx);
        assert_eq!(lines[0], fixture.catalog.get("room_description"));
    }

    #[tokio::test]
    async fn say_echoes_and_broadcasts() {
        let fixture = Fixture::new().await;
        let (mut alice, mut rx_a) = fixture.session();
        fixture.create_player(&mut alice, "alice", "Stone", "pw").await;
        let (mut bob, mut rx_b) = fixture.session();
        fixture.create_player(&mut bob, "bob", "Mudd", "pw").await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        assert_eq!(fixture.drive(&mut alice, "say hello there").await, Flow::Continue);

        let a = drain(&mut rx_a);
        assert_eq!(a[0], "You say, \"hello there\"");
        let b = drain(&mut rx_b);
        assert_eq!(b, vec!["Alice Stone says, \"hello there\""]);
    }

    #[tokio::test]
    async fn who_lists_playing_sessions() {
        let fixture = Fixture::new().await;
        let (mut session, mut rx) = fixture.session();
        fixture.create_player(&mut session, "alice", "Stone", "pw").await;
        drain(&mut rx);

        assert_eq!(fixture.drive(&mut session, "who").await, Flow::Continue);
        let lines = drain(&mut rx);
        assert!(lines[0].contains("Alice Stone"));
    }

    #[tokio::test]
    async fn quit_ends_the_connection() {
        let fixture = Fixture::new().await;
        let (mut session, mut rx) = fixture.session();
        fixture.create_player(&mut session, "alice", "Stone", "pw").await;
        drain(&mut rx);

        let flow = fixture.drive(&mut session, "quit").await;
        assert_eq!(flow, Flow::End(EndReason::Quit));
        let lines = drain(&mut rx);
        assert_eq!(lines[0], fixture.catalog.get("goodbye"));
    }

    #[tokio::test]
    async fn unknown_verb_is_reported() {
        let fixture = Fixture::new().await;
        let (mut session, mut rx) = fixture.session();
        fixture.create_player(&mut session, "alice", "Stone", "pw").await;
        drain(&mut rx);

        assert_eq!(fixture.drive(&mut session, "dance").await, Flow::Continue);
        let lines = drain(&mut rx);
        assert_eq!(lines[0], fixture.catalog.get("error_unknown_command"));
    }
}
