//! Tracking of the loadable asset set during startup.

use bevy::prelude::*;

#[derive(Debug, Clone)]
struct AssetItem {
    id: String,
    loaded: bool,
    failed: bool,
}

/// The set of assets being fetched: scenery model, per-surface media, and
/// ambient audio. Registered once from the manifest, flipped by the polling
/// systems, irrelevant after readiness is reached.
#[derive(Resource, Default)]
pub struct LoadableAssetSet {
    items: Vec<AssetItem>,
    completion_announced: bool,
}

impl LoadableAssetSet {
    pub fn register(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.items.iter().any(|item| item.id == id) {
            self.items.push(AssetItem {
                id,
                loaded: false,
                failed: false,
            });
        }
    }

    /// Returns true the first time this id flips to loaded.
    pub fn mark_loaded(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) if !item.loaded && !item.failed => {
                item.loaded = true;
                true
            }
            _ => false,
        }
    }

    /// Returns true the first time this id flips to failed.
    pub fn mark_failed(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) if !item.failed => {
                item.failed = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id && item.loaded)
    }

    pub fn loaded_count(&self) -> usize {
        self.items.iter().filter(|item| item.loaded).count()
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// True once, when every registered item has loaded. An empty set is
    /// trivially complete; the caller only polls after registration.
    pub fn take_completion(&mut self) -> bool {
        if self.completion_announced {
            return false;
        }
        if self.items.iter().all(|item| item.loaded) {
            self.completion_announced = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_flip_once() {
        let mut set = LoadableAssetSet::default();
        set.register("atrium-model");
        set.register("reel");

        assert!(set.mark_loaded("reel"));
        assert!(!set.mark_loaded("reel"));
        assert!(!set.mark_loaded("unknown"));
        assert_eq!(set.loaded_count(), 1);
        assert_eq!(set.total(), 2);
    }

    #[test]
    fn completion_fires_exactly_once() {
        let mut set = LoadableAssetSet::default();
        set.register("a");
        set.register("b");

        set.mark_loaded("a");
        assert!(!set.take_completion());
        set.mark_loaded("b");
        assert!(set.take_completion());
        assert!(!set.take_completion());
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut set = LoadableAssetSet::default();
        set.register("a");
        set.register("a");
        assert_eq!(set.total(), 1);
    }

    #[test]
    fn failed_items_never_count_as_loaded() {
        let mut set = LoadableAssetSet::default();
        set.register("a");
        assert!(set.mark_failed("a"));
        assert!(!set.mark_failed("a"));
        assert!(!set.mark_loaded("a"));
        assert!(!set.take_completion());
    }
}
