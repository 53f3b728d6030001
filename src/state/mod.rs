//! State management module.
//!
//! Per-connection session state and the shared roster of live connections.

mod roster;
mod session;

pub use roster::{Peer, Roster};
pub use session::{ConnState, FLAG_BLOCKED, FLAG_NEED_NEW_NAME, Session, SessionId};
