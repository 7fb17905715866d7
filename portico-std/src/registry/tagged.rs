//! Tag-indexed configuration snapshots for one direction.

use portico_core::Direction;
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// One indexed handler: its tag and the configuration it was built from.
///
/// The live handler itself is not held here; it is reached by tag through
/// the engine's handler manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerEntry<C> {
    tag: String,
    config: C,
}

impl<C> HandlerEntry<C> {
    /// The entry's tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The configuration snapshot.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Consume the entry, returning its configuration.
    pub fn into_config(self) -> C {
        self.config
    }
}

/// Outcome of [`TaggedRegistry::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion<C> {
    /// The tag was empty; nothing was indexed.
    Anonymous,
    /// A new entry was created.
    Inserted,
    /// An existing entry was overwritten; holds the previous configuration.
    Replaced(C),
}

/// The index of tagged handler configurations for one direction.
///
/// All reads and writes go through a single `RwLock`. Every mutation is one
/// map operation, so readers see an entry either fully present or absent.
/// A poisoned lock is recovered rather than propagated for the same reason.
///
/// # Example
///
/// ```rust,ignore
/// let index = TaggedRegistry::new(Direction::Inbound);
/// index.insert("web", config.clone());
/// assert_eq!(index.get("web"), Some(config));
/// assert_eq!(index.list("w").len(), 1);
/// ```
#[derive(Debug)]
pub struct TaggedRegistry<C> {
    direction: Direction,
    entries: RwLock<HashMap<String, HandlerEntry<C>>>,
}

impl<C> TaggedRegistry<C> {
    /// Create an empty index for `direction`.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The direction this index covers.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, HandlerEntry<C>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, HandlerEntry<C>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Index `config` under `tag`, replacing any previous entry.
    ///
    /// An empty tag marks an anonymous handler, which is never indexed.
    pub fn insert(&self, tag: &str, config: C) -> Insertion<C> {
        if tag.is_empty() {
            return Insertion::Anonymous;
        }

        let entry = HandlerEntry {
            tag: tag.to_owned(),
            config,
        };
        match self.write().insert(tag.to_owned(), entry) {
            Some(previous) => Insertion::Replaced(previous.config),
            None => Insertion::Inserted,
        }
    }

    /// Drop the entry for `tag`, returning its configuration.
    ///
    /// Removing an unknown or empty tag is a no-op.
    pub fn remove(&self, tag: &str) -> Option<C> {
        if tag.is_empty() {
            return None;
        }
        self.write().remove(tag).map(HandlerEntry::into_config)
    }

    /// Whether `tag` is indexed.
    pub fn contains(&self, tag: &str) -> bool {
        self.read().contains_key(tag)
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All indexed tags, in no particular order.
    pub fn tags(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }
}

impl<C: Clone> TaggedRegistry<C> {
    /// The configuration indexed under `tag`.
    pub fn get(&self, tag: &str) -> Option<C> {
        self.read().get(tag).map(|entry| entry.config.clone())
    }

    /// Configurations whose tag starts with `prefix`, in no particular order.
    ///
    /// An empty prefix matches every entry.
    pub fn list(&self, prefix: &str) -> Vec<C> {
        self.entries(prefix)
            .into_iter()
            .map(HandlerEntry::into_config)
            .collect()
    }

    /// Entries whose tag starts with `prefix`, in no particular order.
    pub fn entries(&self, prefix: &str) -> Vec<HandlerEntry<C>> {
        self.read()
            .values()
            .filter(|entry| entry.tag.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread};

    fn sorted(mut tags: Vec<String>) -> Vec<String> {
        tags.sort();
        tags
    }

    #[test]
    fn test_insert_get_remove() {
        let index = TaggedRegistry::new(Direction::Inbound);
        assert_eq!(index.insert("web", 1), Insertion::Inserted);
        assert_eq!(index.get("web"), Some(1));
        assert!(index.contains("web"));

        assert_eq!(index.remove("web"), Some(1));
        assert_eq!(index.get("web"), None);
        assert!(index.is_empty());
    }

    #[test]
    fn test_last_writer_wins() {
        let index = TaggedRegistry::new(Direction::Outbound);
        index.insert("direct", "c1");
        assert_eq!(index.insert("direct", "c2"), Insertion::Replaced("c1"));
        assert_eq!(index.get("direct"), Some("c2"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_anonymous_entries_are_not_indexed() {
        let index = TaggedRegistry::new(Direction::Inbound);
        assert_eq!(index.insert("", 1), Insertion::Anonymous);
        assert!(index.is_empty());
        assert_eq!(index.remove(""), None);
        assert_eq!(index.get(""), None);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let index: TaggedRegistry<u8> = TaggedRegistry::new(Direction::Inbound);
        assert_eq!(index.remove("ghost"), None);
    }

    #[test]
    fn test_prefix_listing() {
        let index = TaggedRegistry::new(Direction::Inbound);
        index.insert("web-1", "a");
        index.insert("web-2", "b");
        index.insert("api", "c");

        let mut web = index.list("web");
        web.sort();
        assert_eq!(web, vec!["a", "b"]);
        assert_eq!(index.list("").len(), 3);
        assert!(index.list("x").is_empty());
        assert_eq!(sorted(index.tags()), vec!["api", "web-1", "web-2"]);

        let entries = index.entries("api");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].tag(), "api");
        assert_eq!(*entries[0].config(), "c");
    }

    #[test]
    fn test_concurrent_writers_keep_index_consistent() {
        let index = Arc::new(TaggedRegistry::new(Direction::Outbound));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let index = index.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        let tag = format!("w{worker}-{i}");
                        index.insert(&tag, i);
                        if i % 2 == 0 {
                            index.remove(&tag);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(index.len(), 8 * 50);
        assert!(index.list("").iter().all(|value| value % 2 == 1));
    }

    #[test]
    fn test_list_during_replacement_sees_whole_entries() {
        let index = Arc::new(TaggedRegistry::new(Direction::Inbound));
        let writer = {
            let index = index.clone();
            thread::spawn(move || {
                for i in 0..2000u32 {
                    index.insert("a", (i, format!("marker-{i}")));
                    if i % 3 == 0 {
                        index.remove("a");
                    }
                }
            })
        };
        let reader = {
            let index = index.clone();
            thread::spawn(move || {
                while !writer.is_finished() {
                    let listing = index.list("a");
                    assert!(listing.len() <= 1);
                    for (i, marker) in listing {
                        assert_eq!(marker, format!("marker-{i}"));
                    }
                }
                writer.join().unwrap();
            })
        };

        reader.join().unwrap();
        let last = index.list("a");
        assert_eq!(last, vec![(1999, "marker-1999".to_string())]);
    }
}
