//! Per-node extension data.
//!
//! Passes attach derived data to nodes (summaries, binding results, ...)
//! without touching the node records. Entries are keyed by node name and the
//! Rust type of the data, so each kind of data exists at most once per node.

use std::any::{Any, TypeId};
use std::collections::HashMap;

type Slot = Box<dyn Any + Send + Sync>;

/// Extension data keyed by (node name, data type).
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: HashMap<(String, TypeId), Slot>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `data` to `node`, returning the value it replaced.
    pub fn insert<T: Any + Send + Sync>(&mut self, node: &str, data: T) -> Option<T> {
        self.entries
            .insert((node.to_string(), TypeId::of::<T>()), Box::new(data))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    pub fn get<T: Any + Send + Sync>(&self, node: &str) -> Option<&T> {
        self.entries
            .get(&(node.to_string(), TypeId::of::<T>()))
            .and_then(|slot| slot.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any + Send + Sync>(&mut self, node: &str) -> Option<&mut T> {
        self.entries
            .get_mut(&(node.to_string(), TypeId::of::<T>()))
            .and_then(|slot| slot.downcast_mut::<T>())
    }

    /// Find the `T` attached to `node`, creating it with `create` if absent.
    pub fn get_or_insert_with<T, F>(&mut self, node: &str, create: F) -> &mut T
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let slot = self
            .entries
            .entry((node.to_string(), TypeId::of::<T>()))
            .or_insert_with(|| Box::new(create()));

        match slot.downcast_mut::<T>() {
            Some(data) => data,
            // Keys carry the TypeId of their value, so the downcast always matches
            None => unreachable!("extension slot holds a different type than its key"),
        }
    }

    pub fn contains<T: Any + Send + Sync>(&self, node: &str) -> bool {
        self.entries
            .contains_key(&(node.to_string(), TypeId::of::<T>()))
    }

    pub fn remove<T: Any + Send + Sync>(&mut self, node: &str) -> Option<T> {
        self.entries
            .remove(&(node.to_string(), TypeId::of::<T>()))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Number of data kinds attached to `node`.
    pub fn kinds_for(&self, node: &str) -> usize {
        self.entries.keys().filter(|(name, _)| name == node).count()
    }

    /// Drop everything attached to `node`.
    pub fn clear_node(&mut self, node: &str) {
        self.entries.retain(|(name, _), _| name != node);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
