//! Moderation lists (blocked and muted authors)

use std::collections::HashSet;

/// The two exclusion lists that suppress content from specific authors
///
/// Each set is replaced wholesale from a fresh server fetch; nothing in this
/// crate patches them incrementally.
#[derive(Debug, Clone, Default)]
pub struct ModerationState {
    blocked: HashSet<i64>,
    muted: HashSet<i64>,
}

impl ModerationState {
    /// Build from already-fetched sets
    pub const fn new(blocked: HashSet<i64>, muted: HashSet<i64>) -> Self {
        Self { blocked, muted }
    }

    /// Whether content from this author may be shown
    ///
    /// Records without an author are never hidden: moderation only
    /// suppresses known offending authors.
    pub fn is_visible(&self, user_id: Option<i64>) -> bool {
        user_id.is_none_or(|id| !self.blocked.contains(&id) && !self.muted.contains(&id))
    }

    /// Whether this author is on the blocked list
    pub fn is_blocked(&self, user_id: i64) -> bool {
        self.blocked.contains(&user_id)
    }

    /// Whether this author is on the muted list
    pub fn is_muted(&self, user_id: i64) -> bool {
        self.muted.contains(&user_id)
    }

    /// Replace the blocked list wholesale
    pub fn replace_blocked(&mut self, blocked: HashSet<i64>) {
        self.blocked = blocked;
    }

    /// Replace the muted list wholesale
    pub fn replace_muted(&mut self, muted: HashSet<i64>) {
        self.muted = muted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(blocked: &[i64], muted: &[i64]) -> ModerationState {
        ModerationState::new(blocked.iter().copied().collect(), muted.iter().copied().collect())
    }

    #[test]
    fn test_blocked_and_muted_hidden() {
        let moderation = state(&[7], &[9]);
        assert!(!moderation.is_visible(Some(7)));
        assert!(!moderation.is_visible(Some(9)));
        assert!(moderation.is_visible(Some(8)));
    }

    #[test]
    fn test_unattributed_records_visible() {
        let moderation = state(&[7], &[9]);
        assert!(moderation.is_visible(None));
    }

    #[test]
    fn test_wholesale_replacement() {
        let mut moderation = state(&[7], &[]);
        assert!(!moderation.is_visible(Some(7)));

        moderation.replace_blocked([11].into_iter().collect());
        assert!(moderation.is_visible(Some(7)));
        assert!(!moderation.is_visible(Some(11)));
    }
}
