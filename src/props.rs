//! Chained Property Store
//!
//! Every context node owns one property bag. A bag resolves point lookups
//! locally first and delegates to its parent's bag on a miss, so child
//! contexts inherit ancestor properties while local writes shadow them.
//! Entries can be locked to pin a value for the owning node's lifetime.

use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Property values are arbitrary JSON-shaped data.
pub type PropertyValue = serde_json::Value;

/// Backing-store seam for a context's property bag.
///
/// Point lookups (`get`, `contains_key`) walk the parent chain; enumeration
/// (`local_keys`) never delegates unless the whole chain is requested via
/// `all_keys`. Implementations must be shareable across threads: parent bags
/// are read from worker threads while their owning context is still live on
/// the dispatching thread.
pub trait PropertyBag: Send + Sync {
    /// Local point lookup; no delegation. Key matching is case-insensitive.
    fn get_local(&self, key: &str) -> Option<PropertyValue>;

    /// Delegation target consulted on a local miss.
    fn parent(&self) -> Option<Arc<dyn PropertyBag>>;

    /// Store `value` under `key`, optionally locking the entry against later
    /// overwrite.
    ///
    /// An empty key or a `Null` value is silently ignored, and a write over a
    /// locally locked entry is refused with the old value retained; both
    /// return `false`. Locks are local to one store: a key locked in an
    /// ancestor never blocks a shadowing write here.
    fn put(&self, key: &str, value: PropertyValue, locked: bool) -> bool;

    /// Remove the local entry for `key`. Locked entries are retained.
    fn remove(&self, key: &str);

    /// Keys present in this store only.
    fn local_keys(&self) -> BTreeSet<String>;

    /// Point lookup walking the parent chain; local entries shadow ancestor
    /// entries of the same key.
    fn get(&self, key: &str) -> Option<PropertyValue> {
        if let Some(value) = self.get_local(key) {
            return Some(value);
        }
        let mut next = self.parent();
        while let Some(bag) = next {
            if let Some(value) = bag.get_local(key) {
                return Some(value);
            }
            next = bag.parent();
        }
        None
    }

    /// Whether `get(key)` would return a value from anywhere in the chain.
    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Union of local and all-ancestor keys, deduplicated.
    fn all_keys(&self) -> BTreeSet<String> {
        let mut keys = self.local_keys();
        let mut next = self.parent();
        while let Some(bag) = next {
            keys.extend(bag.local_keys());
            next = bag.parent();
        }
        keys
    }
}

/// Coerce a property value to a boolean.
///
/// `false`, numeric zero, and the strings `"false"`, `"0"`, `"no"` in any
/// case read as false; every other value reads as true.
pub fn truthy(value: &PropertyValue) -> bool {
    match value {
        PropertyValue::Bool(b) => *b,
        PropertyValue::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        PropertyValue::String(s) => {
            !(s.eq_ignore_ascii_case("false") || s == "0" || s.eq_ignore_ascii_case("no"))
        }
        _ => true,
    }
}

struct Entry {
    value: PropertyValue,
    locked: bool,
}

/// Hash-map property bag with per-entry locking and an optional parent.
///
/// Keys are stored upper-cased so lookup is case-insensitive. Enumeration is
/// copy-on-iterate: `local_keys` and the entry snapshot collect under the
/// read lock, so they stay safe against concurrent mutation of this store or
/// of ancestors.
pub struct LockableMap {
    entries: RwLock<HashMap<String, Entry>>,
    parent: Option<Arc<dyn PropertyBag>>,
}

impl Default for LockableMap {
    fn default() -> Self {
        Self::new()
    }
}

impl LockableMap {
    /// Create an unchained bag (used by the root context).
    pub fn new() -> Self {
        LockableMap {
            entries: RwLock::new(HashMap::new()),
            parent: None,
        }
    }

    /// Create a bag delegating to `parent` on local misses. The delegation
    /// target is fixed for the bag's lifetime; live bags are never
    /// re-parented.
    pub fn with_parent(parent: Arc<dyn PropertyBag>) -> Self {
        LockableMap {
            entries: RwLock::new(HashMap::new()),
            parent: Some(parent),
        }
    }

    /// Whether the local entry for `key` is locked. Does not consult parents.
    pub fn is_locked(&self, key: &str) -> bool {
        self.entries
            .read()
            .get(&normalize_key(key))
            .map(|e| e.locked)
            .unwrap_or(false)
    }

    /// Sorted snapshot of the local entries, for diagnostics.
    pub fn local_entries(&self) -> Vec<(String, PropertyValue)> {
        let mut entries: Vec<_> = self
            .entries
            .read()
            .iter()
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl PropertyBag for LockableMap {
    fn get_local(&self, key: &str) -> Option<PropertyValue> {
        self.entries
            .read()
            .get(&normalize_key(key))
            .map(|e| e.value.clone())
    }

    fn parent(&self) -> Option<Arc<dyn PropertyBag>> {
        self.parent.clone()
    }

    fn put(&self, key: &str, value: PropertyValue, locked: bool) -> bool {
        if key.is_empty() || value.is_null() {
            return false;
        }
        let key = normalize_key(key);
        let mut entries = self.entries.write();
        if entries.get(&key).map(|e| e.locked).unwrap_or(false) {
            debug!(key = %key, "Refusing write to locked property");
            return false;
        }
        entries.insert(key, Entry { value, locked });
        true
    }

    fn remove(&self, key: &str) {
        let key = normalize_key(key);
        let mut entries = self.entries.write();
        if entries.get(&key).map(|e| e.locked).unwrap_or(false) {
            debug!(key = %key, "Refusing removal of locked property");
            return;
        }
        entries.remove(&key);
    }

    fn local_keys(&self) -> BTreeSet<String> {
        self.entries.read().keys().cloned().collect()
    }
}

fn normalize_key(key: &str) -> String {
    key.to_uppercase()
}
