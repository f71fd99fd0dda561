//! Context Registry
//!
//! Owns the root of the context tree and provides the entry points callers
//! use to create and activate contexts. One process-wide instance is exposed
//! through `ContextRegistry::global()`; independent registries remain
//! constructible so tests can work against a private tree.

use crate::config::WeftConfig;
use crate::context::node::Context;
use crate::context::stack;
use crate::idgen::IdGenerator;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::trace;

static GLOBAL: Lazy<ContextRegistry> =
    Lazy::new(|| ContextRegistry::new(WeftConfig::load_or_default()));

/// Process-wide ownership of the context tree.
pub struct ContextRegistry {
    root: Arc<Context>,
    idgen: IdGenerator,
}

impl ContextRegistry {
    /// Build a registry with its own root context, stamped like any other
    /// node so `request_id()` is total across the tree.
    pub fn new(config: WeftConfig) -> Self {
        let idgen = IdGenerator::new(&config.instance);
        let root = Context::new_root("RootContext", idgen.next_message_id());
        ContextRegistry { root, idgen }
    }

    /// The process-wide registry, configured from default sources on first
    /// use.
    pub fn global() -> &'static ContextRegistry {
        &GLOBAL
    }

    /// The root context; never cleared, implicit parent of last resort.
    pub fn root(&self) -> &Arc<Context> {
        &self.root
    }

    /// The generator stamping this registry's contexts; also usable for
    /// standalone correlation ids not tied to a context node.
    pub fn id_generator(&self) -> &IdGenerator {
        &self.idgen
    }

    /// Create a context under `parent`, defaulting to the root. Always
    /// succeeds; the new node is tail-appended to the parent's child list
    /// and its property bag is chained to the parent's.
    pub fn create_context(
        &self,
        id: Option<&str>,
        parent: Option<&Arc<Context>>,
    ) -> Arc<Context> {
        let parent = parent.unwrap_or(&self.root);
        let ctx = Context::new_child(id, self.idgen.next_message_id(), parent);
        trace!(
            request_id = %ctx.request_id(),
            parent_request_id = %parent.request_id(),
            "Created context"
        );
        ctx
    }

    /// Create a child of this thread's active context (else the root) and
    /// push it onto this thread's activation stack.
    pub fn create_and_activate(&self) -> Arc<Context> {
        let parent = stack::current().unwrap_or_else(|| self.root.clone());
        let ctx = self.create_context(None, Some(&parent));
        stack::push_current(ctx.clone());
        ctx
    }

    /// This thread's active context, fabricating one when none was
    /// established: an empty stack yields a fresh context labeled
    /// `currentContext` under the root, pushed before returning. Total —
    /// callers that must not fabricate use `stack::current()` instead.
    pub fn active_or_fallback(&self) -> Arc<Context> {
        if let Some(ctx) = stack::current() {
            return ctx;
        }
        trace!("No active context on this thread; creating fallback");
        let ctx = self.create_context(Some("currentContext"), None);
        stack::push_current(ctx.clone());
        ctx
    }
}
