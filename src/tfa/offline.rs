//! Offline allow-list evaluation.

/// True iff `username` exactly equals a trimmed entry of the comma-separated
/// `allow_list`. Empty inputs never match.
///
/// Only consulted after a transport failure, never after an explicit deny
/// from the decision service, so a rejected second factor cannot be turned
/// into a grant through this path.
#[must_use]
pub fn evaluate(username: &str, allow_list: &str) -> bool {
    if username.is_empty() || allow_list.is_empty() {
        return false;
    }
    allow_list.split(',').any(|entry| entry.trim() == username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_entry() {
        assert!(evaluate("alice", "alice,bob"));
        assert!(evaluate("bob", "alice,bob"));
    }

    #[test]
    fn trims_entries_but_not_the_username() {
        assert!(evaluate("carol", "bob, carol"));
        assert!(!evaluate("alice", "bob, carol"));
        assert!(!evaluate(" ", "a"));
    }

    #[test]
    fn empty_inputs_never_match() {
        assert!(!evaluate("alice", ""));
        assert!(!evaluate("", "alice"));
        assert!(!evaluate("", ""));
    }

    #[test]
    fn no_substring_matches() {
        assert!(!evaluate("ali", "alice"));
        assert!(!evaluate("alice", "ali"));
    }
}
