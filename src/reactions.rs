use std::collections::HashMap;
use std::sync::Arc;

/// Per-paper view flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemFlags {
    pub liked: bool,
    pub bookmarked: bool,
}

/// Like and bookmark state for the session, keyed by paper id.
///
/// Lives only in memory and is cleared on a full reload.
#[derive(Debug, Default)]
pub struct Reactions {
    flags: HashMap<Arc<str>, ItemFlags>,
}

impl Reactions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> ItemFlags {
        self.flags.get(id).copied().unwrap_or_default()
    }

    /// Flips the like flag and returns the new value.
    pub fn toggle_like(&mut self, id: &Arc<str>) -> bool {
        let entry = self.flags.entry(Arc::clone(id)).or_default();
        entry.liked = !entry.liked;
        let liked = entry.liked;
        self.prune(id);
        liked
    }

    /// Flips the bookmark flag and returns the new value.
    pub fn toggle_bookmark(&mut self, id: &Arc<str>) -> bool {
        let entry = self.flags.entry(Arc::clone(id)).or_default();
        entry.bookmarked = !entry.bookmarked;
        let bookmarked = entry.bookmarked;
        self.prune(id);
        bookmarked
    }

    pub fn liked_count(&self) -> usize {
        self.flags.values().filter(|f| f.liked).count()
    }

    pub fn bookmarked_count(&self) -> usize {
        self.flags.values().filter(|f| f.bookmarked).count()
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }

    // Entries with both flags off carry no information
    fn prune(&mut self, id: &str) {
        if self.flags.get(id) == Some(&ItemFlags::default()) {
            self.flags.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_id_has_no_flags() {
        let reactions = Reactions::new();
        assert_eq!(reactions.get("x"), ItemFlags::default());
    }

    #[test]
    fn test_like_and_bookmark_are_independent() {
        let mut reactions = Reactions::new();
        let id: Arc<str> = Arc::from("http://arxiv.org/abs/1");

        assert!(reactions.toggle_like(&id));
        assert!(reactions.toggle_bookmark(&id));
        assert!(!reactions.toggle_like(&id));

        let flags = reactions.get(&id);
        assert!(!flags.liked);
        assert!(flags.bookmarked);
        assert_eq!(reactions.liked_count(), 0);
        assert_eq!(reactions.bookmarked_count(), 1);
    }

    #[test]
    fn test_clearing_both_flags_removes_entry() {
        let mut reactions = Reactions::new();
        let id: Arc<str> = Arc::from("a");
        reactions.toggle_like(&id);
        reactions.toggle_like(&id);
        assert!(reactions.flags.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut reactions = Reactions::new();
        reactions.toggle_like(&Arc::from("a"));
        reactions.toggle_bookmark(&Arc::from("b"));
        reactions.clear();
        assert_eq!(reactions.liked_count() + reactions.bookmarked_count(), 0);
    }
}
