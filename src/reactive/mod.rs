//! Fine-grained reactivity: intercepted fields, dependency registries, and
//! subscription units.
//!
//! The dependency-discovery protocol is implicit: evaluating a watcher's
//! expression transparently records which fields it touched, without any
//! declared dependency list.
//!
//! - [`observer`]: converts a plain data tree into intercepted fields (one
//!   [`Dep`] per field, created once at conversion time).
//! - [`dep`]: the per-field subscriber registry.
//! - [`watcher`]: an expression bound to a sink callback; evaluation runs
//!   under the tracking context so reads register the watcher.
//! - [`runtime`]: the thread-local tracking context (an observer stack).
//!
//! Everything is single-threaded and synchronous: a field write cascades
//! through every interested watcher on the writer's own call stack, with no
//! batching, deferral, or coalescing.

pub mod dep;
pub mod observer;
pub(crate) mod runtime;
pub mod watcher;

pub use dep::Dep;
pub use observer::{FieldCell, Store, observe, observe_object, observe_root};
pub use watcher::{Watcher, WatcherCallback};
