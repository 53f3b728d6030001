//! Network layer: the TCP gateway and per-connection tasks.

mod connection;
mod gateway;

pub use connection::Connection;
pub use gateway::Gateway;

use crate::commands::World;
use crate::config::Config;
use crate::db::Database;
use crate::login::LoginRegistry;
use crate::messages::Catalog;
use crate::security::BannedNames;
use crate::state::Roster;

/// Immutable collaborators shared by every connection task.
pub struct Shared {
    pub config: Config,
    pub roster: Roster,
    pub db: Database,
    pub catalog: Catalog,
    pub badnames: BannedNames,
    pub registry: LoginRegistry,
    pub interpreter: World,
}

impl Shared {
    pub fn new(config: Config, db: Database) -> Self {
        let catalog = Catalog::new(config.messages.clone());
        let badnames = BannedNames::new(&config.badnames);
        Self {
            config,
            roster: Roster::new(),
            db,
            catalog,
            badnames,
            registry: LoginRegistry::new(),
            interpreter: World,
        }
    }
}
