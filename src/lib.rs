//! Weft: Request-Scoped Context Propagation
//!
//! Tracks per-call metadata (correlation identifiers, arbitrary typed
//! properties) across chains of nested invocations. Every request gets a node
//! in a process-wide context tree; a per-thread activation stack exposes the
//! currently active context without explicit parameter threading, and an
//! identifier generator stamps every node with a collision-resistant request
//! id for correlating messages across a distributed deployment.

pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod idgen;
pub mod logging;
pub mod props;

pub use context::{Context, ContextRegistry, ContextStack};
pub use idgen::IdGenerator;
pub use props::{LockableMap, PropertyBag, PropertyValue};
