//! Banned-name list.
//!
//! Case-folded exact membership, loaded from the `badnames` config list.
//! Applies to chosen names and surnames during account creation.

use std::collections::HashSet;

/// Set of names that may never be chosen.
#[derive(Debug, Default)]
pub struct BannedNames {
    set: HashSet<String>,
}

impl BannedNames {
    pub fn new(names: &[String]) -> Self {
        Self {
            set: names.iter().map(|n| n.to_lowercase()).collect(),
        }
    }

    /// Membership test; `candidate` is folded before lookup.
    pub fn contains(&self, candidate: &str) -> bool {
        self.set.contains(&candidate.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_is_case_insensitive() {
        let banned = BannedNames::new(&["Admin".to_string(), "root".to_string()]);
        assert!(banned.contains("admin"));
        assert!(banned.contains("ADMIN"));
        assert!(banned.contains("Root"));
        assert!(!banned.contains("alice"));
    }

    #[test]
    fn empty_list_bans_nothing() {
        let banned = BannedNames::new(&[]);
        assert!(!banned.contains("anything"));
    }
}
