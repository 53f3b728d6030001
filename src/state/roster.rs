//! The Roster - shared cross-session state.
//!
//! Holds every live connection in concurrent maps accessible from any task.
//! The name index doubles as the reservation mechanism: claiming a folded
//! name through the map's entry API is the single atomic check-and-claim
//! point, so two connections racing for the same name cannot both succeed.

use super::SessionId;
use dashmap::{DashMap, mapref::entry::Entry};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Cross-session view of one connection.
///
/// The mutable onboarding state stays in the connection task's `Session`;
/// a peer only carries what other sessions need: the output sender for
/// broadcasts and the display name once one is claimed.
pub struct Peer {
    pub id: SessionId,
    tx: mpsc::Sender<String>,
    /// Full display identity, set when the session enters the game.
    name: RwLock<Option<String>>,
    playing: AtomicBool,
}

impl Peer {
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    pub fn display_name(&self) -> Option<String> {
        self.name.read().clone()
    }
}

/// Shared registry of live connections and claimed names.
#[derive(Default)]
pub struct Roster {
    peers: DashMap<SessionId, Arc<Peer>>,
    /// Folded name -> owning session. Presence here is the Reservation:
    /// it covers sessions still onboarding as well as playing ones.
    names: DashMap<String, SessionId>,
    next_id: AtomicU64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection, returning its session id.
    pub fn insert_peer(&self, tx: mpsc::Sender<String>) -> SessionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let peer = Arc::new(Peer {
            id,
            tx,
            name: RwLock::new(None),
            playing: AtomicBool::new(false),
        });
        self.peers.insert(id, peer);
        id
    }

    /// Atomically claim a folded name for `id`.
    ///
    /// Returns `true` if the claim succeeded or `id` already holds it.
    /// This is the only way a name enters the index, which makes
    /// check-and-claim race-free across connections.
    pub fn try_claim(&self, folded: &str, id: SessionId) -> bool {
        match self.names.entry(folded.to_string()) {
            Entry::Occupied(e) => *e.get() == id,
            Entry::Vacant(v) => {
                v.insert(id);
                true
            }
        }
    }

    /// Release a claim, but only if `id` actually holds it.
    pub fn release(&self, folded: &str, id: SessionId) {
        self.names.remove_if(folded, |_, owner| *owner == id);
    }

    /// Look up the session currently holding a folded name.
    pub fn find_by_name(&self, folded: &str) -> Option<SessionId> {
        self.names.get(folded).map(|r| *r.value())
    }

    /// Mark a session as playing and record its display identity.
    pub fn set_playing(&self, id: SessionId, display_name: &str) {
        if let Some(peer) = self.peers.get(&id) {
            *peer.name.write() = Some(display_name.to_string());
            peer.playing.store(true, Ordering::Release);
        }
    }

    /// Send a line to every playing session except `excluded`.
    pub async fn broadcast_except(&self, line: &str, excluded: SessionId) {
        // Snapshot the senders first so no map guard is held across await.
        let targets: Vec<mpsc::Sender<String>> = self
            .peers
            .iter()
            .filter(|p| p.id != excluded && p.is_playing())
            .map(|p| p.tx.clone())
            .collect();
        for tx in targets {
            let _ = tx.send(line.to_string()).await;
        }
    }

    /// Display names of everyone currently playing.
    pub fn playing_names(&self) -> Vec<String> {
        self.peers
            .iter()
            .filter(|p| p.is_playing())
            .filter_map(|p| p.display_name())
            .collect()
    }

    /// Remove a connection and release every claim it holds.
    pub fn remove(&self, id: SessionId) {
        self.peers.remove(&id);
        self.names.retain(|_, owner| *owner != id);
    }

    #[cfg(test)]
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }
}
