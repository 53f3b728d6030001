//! Anti-abuse and credential handling.

mod badnames;
mod password;

pub use badnames::BannedNames;
pub use password::{hash_password, verify_password};
