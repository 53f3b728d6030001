//! Connection - handles an individual client connection.
//!
//! Each connection runs in its own Tokio task: a `tokio::select!` loop
//! over incoming lines and the outgoing queue. Handlers never touch the
//! socket; they queue lines on the session's sender and this loop writes
//! them, so broadcasts from other tasks interleave safely with replies.

use crate::error::EndReason;
use crate::login::{self, Context, Flow};
use crate::network::Shared;
use crate::state::{ConnState, Session};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{info, instrument, warn};

/// Outgoing queue depth per connection.
const OUTGOING_QUEUE: usize = 256;

/// Longest accepted input line; anything longer is a protocol error.
const MAX_LINE_LEN: usize = 512;

/// A client connection handler.
pub struct Connection {
    shared: Arc<Shared>,
    stream: TcpStream,
    addr: SocketAddr,
}

impl Connection {
    pub fn new(shared: Arc<Shared>, stream: TcpStream, addr: SocketAddr) -> Self {
        Self { shared, stream, addr }
    }

    /// Run the connection event loop until the client leaves or is closed.
    #[instrument(skip(self), fields(addr = %self.addr), name = "connection")]
    pub async fn run(self) {
        let Self { shared, stream, addr: _ } = self;

        let framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_LINE_LEN));
        let (mut writer, mut reader) = framed.split();

        let (tx, mut outgoing_rx) = mpsc::channel::<String>(OUTGOING_QUEUE);
        let id = shared.roster.insert_peer(tx.clone());
        let mut session = Session::new(id, tx);
        info!(id, "Client connected");

        session
            .send(
                shared
                    .catalog
                    .render("greeting", &[("server", &shared.config.server.name)]),
            )
            .await;
        {
            let mut ctx = context(&shared, &mut session);
            login::set_state(&mut ctx, ConnState::AwaitingName);
        }
        let prompt = session.prompt.clone();
        session.send(prompt).await;

        let mut end: Option<EndReason> = None;
        loop {
            tokio::select! {
                result = reader.next() => match result {
                    Some(Ok(raw)) => {
                        let mut ctx = context(&shared, &mut session);
                        match shared.registry.dispatch(&mut ctx, &raw).await {
                            Flow::Continue => {}
                            Flow::End(reason) => {
                                end = Some(reason);
                                break;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        warn!(id, error = %e, "Read error");
                        break;
                    }
                    None => break,
                },
                maybe = outgoing_rx.recv() => match maybe {
                    Some(line) => {
                        if writer.send(line).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }

        // Deliver whatever the final exchange queued before tearing down.
        while let Ok(line) = outgoing_rx.try_recv() {
            if writer.send(line).await.is_err() {
                break;
            }
        }

        if session.state == ConnState::Playing {
            let left = shared
                .catalog
                .render("server_player_left", &[("name", &session.full_name())]);
            shared.roster.broadcast_except(&left, id).await;
        }
        shared.roster.remove(id);

        info!(id, reason = ?end, "Client disconnected");
    }
}

fn context<'a>(shared: &'a Shared, session: &'a mut Session) -> Context<'a> {
    Context {
        session,
        roster: &shared.roster,
        db: &shared.db,
        catalog: &shared.catalog,
        limits: &shared.config.limits,
        badnames: &shared.badnames,
        interpreter: &shared.interpreter,
    }
}
