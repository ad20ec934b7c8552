use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::dialogue::ItemName;

/// The items the player carries, in pickup order. Holds at most one of each.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: Vec<ItemName>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item unless it is already held. Returns true if it was new.
    pub fn add(&mut self, item: &str) -> bool {
        if self.contains(item) {
            return false;
        }
        self.items.push(item.to_string());
        true
    }

    /// Remove an exact-match item. Returns true if something was removed.
    pub fn remove(&mut self, item: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i != item);
        self.items.len() != before
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    pub fn items(&self) -> &[ItemName] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Unordered copy used for choice gating.
    pub fn snapshot(&self) -> FxHashSet<ItemName> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut inv = Inventory::new();
        assert!(inv.add("Party Hat"));
        assert!(!inv.add("Party Hat"));
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn keeps_pickup_order() {
        let mut inv = Inventory::new();
        inv.add("Proxy Card");
        inv.add("Small Key");
        inv.add("Post-it Notes");
        assert_eq!(inv.items(), ["Proxy Card", "Small Key", "Post-it Notes"]);
    }

    #[test]
    fn remove_is_exact_match() {
        let mut inv = Inventory::new();
        inv.add("Small Key");
        assert!(!inv.remove("Small"));
        assert!(!inv.remove("small key"));
        assert!(inv.remove("Small Key"));
        assert!(inv.is_empty());
        assert!(!inv.remove("Small Key"));
    }

    #[test]
    fn snapshot_matches_contents() {
        let mut inv = Inventory::new();
        inv.add("A");
        inv.add("B");
        let snap = inv.snapshot();
        assert_eq!(snap.len(), 2);
        assert!(snap.contains("A") && snap.contains("B"));
    }
}
