//! Context Tree Node
//!
//! One node per tracked invocation. A node carries an immutable request id,
//! an optional human label, a chained property bag, and its position in the
//! process-wide tree: a non-owning parent link plus an owned, ordered child
//! list. The child list mutex serializes sibling creation and detachment
//! when several threads extend the same parent concurrently.

use crate::props::{self, LockableMap, PropertyBag, PropertyValue};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::{Arc, Weak};
use tracing::debug;

/// A node in the context propagation tree.
pub struct Context {
    /// Human-assigned label; mutable, not unique.
    id: RwLock<Option<String>>,
    /// Correlation id stamped at construction; immutable for the lifetime.
    request_id: String,
    /// Dead only for the root.
    parent: Weak<Context>,
    /// Children in creation order; new children append at the tail.
    children: Mutex<Vec<Arc<Context>>>,
    /// Property bag, chained to the parent's bag.
    props: Arc<LockableMap>,
}

impl Context {
    /// Root constructor: no parent, unchained property bag.
    pub(crate) fn new_root(id: &str, request_id: String) -> Arc<Context> {
        Arc::new(Context {
            id: RwLock::new(Some(id.to_string())),
            request_id,
            parent: Weak::new(),
            children: Mutex::new(Vec::new()),
            props: Arc::new(LockableMap::new()),
        })
    }

    /// Child constructor: chains the property bag to the parent's and
    /// tail-appends the new node to the parent's child list.
    pub(crate) fn new_child(
        id: Option<&str>,
        request_id: String,
        parent: &Arc<Context>,
    ) -> Arc<Context> {
        let delegate: Arc<dyn PropertyBag> = parent.props.clone();
        let child = Arc::new(Context {
            id: RwLock::new(id.map(str::to_string)),
            request_id,
            parent: Arc::downgrade(parent),
            children: Mutex::new(Vec::new()),
            props: Arc::new(LockableMap::with_parent(delegate)),
        });
        parent.children.lock().push(child.clone());
        child
    }

    /// The human-assigned label, if any.
    pub fn id(&self) -> Option<String> {
        self.id.read().clone()
    }

    /// Set the human-assigned label.
    pub fn set_id(&self, id: impl Into<String>) {
        *self.id.write() = Some(id.into());
    }

    /// The immutable correlation id stamped at construction.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The parent node; `None` for the root.
    pub fn parent(&self) -> Option<Arc<Context>> {
        self.parent.upgrade()
    }

    /// Head of this node's child list.
    pub fn first_child(&self) -> Option<Arc<Context>> {
        self.children.lock().first().cloned()
    }

    /// The sibling created right after this one under the same parent.
    pub fn next_sibling(&self) -> Option<Arc<Context>> {
        let parent = self.parent.upgrade()?;
        let children = parent.children.lock();
        let pos = children
            .iter()
            .position(|c| std::ptr::eq(Arc::as_ptr(c), self))?;
        children.get(pos + 1).cloned()
    }

    /// Snapshot of the children in creation order.
    pub fn children(&self) -> Vec<Arc<Context>> {
        self.children.lock().clone()
    }

    /// The property bag owned by this node.
    pub fn properties(&self) -> &Arc<LockableMap> {
        &self.props
    }

    /// Detach this node from its parent's child list.
    ///
    /// Descendants are not cascaded: clearing a mid-tree node orphans its
    /// subtree from root traversal while the subtree nodes stay individually
    /// usable until their last reference drops. Clearing the root is a no-op.
    pub fn clear(&self) {
        let Some(parent) = self.parent.upgrade() else {
            return;
        };
        let mut children = parent.children.lock();
        let before = children.len();
        children.retain(|c| !std::ptr::eq(Arc::as_ptr(c), self));
        debug_assert_eq!(
            children.len() + 1,
            before,
            "cleared context not found in its parent's child list"
        );
        drop(children);
        debug!(request_id = %self.request_id, "Detached context from tree");
    }

    /// Point lookup cascading through ancestor bags on a local miss.
    pub fn get_property(&self, name: &str) -> Option<PropertyValue> {
        self.props.get(name)
    }

    /// String view of a property; `None` when absent or not a string.
    pub fn string_property(&self, name: &str) -> Option<String> {
        self.get_property(name)
            .and_then(|v| v.as_str().map(str::to_string))
    }

    /// Store a property on this node only. Returns false when the write was
    /// ignored (empty key, null value) or refused by a local lock.
    pub fn set_property(&self, name: &str, value: impl Into<PropertyValue>) -> bool {
        self.props.put(name, value.into(), false)
    }

    /// Store a property and lock it against later overwrite on this node.
    pub fn set_property_locked(&self, name: &str, value: impl Into<PropertyValue>) -> bool {
        self.props.put(name, value.into(), true)
    }

    /// Remove a property from this node only; ancestor values show through
    /// again afterwards.
    pub fn del_property(&self, name: &str) {
        self.props.remove(name);
    }

    /// Whether `name` resolves anywhere in this node's chain.
    pub fn contains_property(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    /// Two-part key lookup: `scope` and `name` joined with a dot.
    pub fn get_scoped_property(&self, scope: &str, name: &str) -> Option<PropertyValue> {
        self.get_property(&scoped_key(scope, name))
    }

    /// Two-part key store: `scope` and `name` joined with a dot.
    pub fn set_scoped_property(
        &self,
        scope: &str,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> bool {
        self.set_property(&scoped_key(scope, name), value)
    }

    /// Truth coercion with an explicit default for absent properties.
    pub fn is_property_true_or(&self, name: &str, default: bool) -> bool {
        match self.get_property(name) {
            Some(value) => props::truthy(&value),
            None => default,
        }
    }

    /// Truth coercion; absent properties read as false.
    pub fn is_property_true(&self, name: &str) -> bool {
        self.is_property_true_or(name, false)
    }

    /// Keys stored on this node only.
    pub fn local_property_names(&self) -> BTreeSet<String> {
        self.props.local_keys()
    }

    /// Keys visible through the whole ancestor chain, deduplicated.
    pub fn all_property_names(&self) -> BTreeSet<String> {
        self.props.all_keys()
    }

    /// Render id, local properties, and neighbor ids. Diagnostics only,
    /// never parsed back.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "id={};", self.id.read().as_deref().unwrap_or(""));
        for (key, value) in self.props.local_entries() {
            let _ = write!(out, "{}={};", key, value);
        }
        if let Some(parent) = self.parent() {
            let _ = write!(out, "parent={};", parent.id().unwrap_or_default());
        }
        if let Some(child) = self.first_child() {
            let _ = write!(out, "firstChild={};", child.id().unwrap_or_default());
        }
        if let Some(sibling) = self.next_sibling() {
            let _ = write!(out, "nextSibling={};", sibling.id().unwrap_or_default());
        }
        out
    }
}

fn scoped_key(scope: &str, name: &str) -> String {
    format!("{}.{}", scope, name)
}
