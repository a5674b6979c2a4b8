//! Reactive data binding and template compilation.
//!
//! `grappelli` wires a plain data object to a node tree through declarative
//! bindings. Data fields become accessor cells whose reads register the
//! currently evaluating subscription and whose writes notify every
//! subscription registered so far. A single compilation pass walks the
//! mounted template, turning directive attributes (`v-model`, `v-text`,
//! `v-html`, `v-on:<event>`) and `{{ ... }}` text interpolations into live
//! bindings.
//!
//! ## Architecture
//!
//! - [`reactive`] holds the engine: accessor cells and stores
//!   ([`reactive::observer`]), per-field subscriber registries
//!   ([`reactive::dep`]), and the subscription unit ([`reactive::watcher`]).
//!   A thread-local tracking stack links reads to the watcher performing
//!   them.
//! - [`compiler`] performs the detach, walk, and reattach pass over the
//!   template, dispatching into the [`directives`] registry.
//! - [`vm`] exposes [`ViewModel`], the owning facade over store, template,
//!   computed accessors, and methods.
//! - [`dom`] is the in-memory node tree the bindings write into, with
//!   identity-preserving moves and synchronous event dispatch.
//!
//! Propagation is synchronous and single-threaded: an assignment returns
//! only after every affected sink has been rewritten.
//!
//! # Example
//!
//! ```
//! use grappelli::{Event, Node, ViewModel, ViewModelOptions};
//! use serde_json::json;
//!
//! let name = Node::element("input").attr("v-model", "user.name");
//! let greeting = Node::text("Hello {{ user.name }}!");
//! let root = Node::element("div").child(name.clone()).child(greeting.clone());
//!
//! let vm = ViewModel::new(ViewModelOptions::new(
//! 	root,
//! 	json!({ "user": { "name": "Ann" } }),
//! ))?;
//! assert_eq!(greeting.text_content().as_deref(), Some("Hello Ann!"));
//!
//! // Programmatic assignment propagates to every bound sink.
//! vm.set("user.name", json!("Bo"))?;
//! assert_eq!(name.value(), "Bo");
//! assert_eq!(greeting.text_content().as_deref(), Some("Hello Bo!"));
//!
//! // Simulated user input flows the other way.
//! name.dispatch(&Event::input("Cy"))?;
//! assert_eq!(vm.get("user.name")?.to_string(), "Cy");
//! # Ok::<(), grappelli::BindingError>(())
//! ```

#![warn(missing_docs)]

pub mod compiler;
pub mod directives;
pub mod dom;
pub mod error;
mod path;
pub mod reactive;
pub mod value;
pub mod vm;

pub use compiler::{compile, DIRECTIVE_PREFIX};
pub use directives::{DirectiveHandler, DirectiveRegistry};
pub use dom::{Event, EventListener, Node};
pub use error::{BindingError, Result};
pub use reactive::dep::Dep;
pub use reactive::observer::{observe, FieldCell, Store};
pub use reactive::watcher::Watcher;
pub use value::Value;
pub use vm::{ComputedFn, MethodFn, ViewModel, ViewModelOptions, WeakViewModel};
