//! View-model: the single entry point that wires data, template, and
//! directive handlers together.
//!
//! Construction observes the data object into a reactive store, then runs
//! the compiler over the mounted element's subtree. From that point on the
//! instance is live: field assignments propagate synchronously through each
//! field's dependency registry to the watchers the compiler created, and
//! event dispatches on bound nodes invoke the registered methods.
//!
//! # Example
//!
//! ```
//! use grappelli::{Node, ViewModel, ViewModelOptions};
//! use serde_json::json;
//!
//! let root = Node::element("div").child(Node::text("Hi {{ user.name }}"));
//! let vm = ViewModel::new(ViewModelOptions::new(
//! 	root,
//! 	json!({ "user": { "name": "Ann" } }),
//! ))?;
//!
//! vm.set("user.name", json!("Bo"))?;
//! assert_eq!(vm.root().children()[0].text_content().as_deref(), Some("Hi Bo"));
//! # Ok::<(), grappelli::BindingError>(())
//! ```
//!
//! ## Ownership
//!
//! The view-model owns its watchers for its whole lifetime; every other
//! reference into the instance (from watchers, listeners, and dependency
//! registries) is weak. Dropping the last [`ViewModel`] handle therefore
//! tears the whole graph down without leaking cycles.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::compiler;
use crate::directives::DirectiveRegistry;
use crate::dom::{Event, Node};
use crate::error::{BindingError, Result};
use crate::path;
use crate::reactive::observer::{self, Store};
use crate::reactive::watcher::Watcher;
use crate::value::Value;

/// A computed accessor: re-invoked on every read, never cached.
pub type ComputedFn = Rc<dyn Fn(&ViewModel) -> Value>;

/// A named method invokable from `v-on` bindings or directly.
pub type MethodFn = Rc<dyn Fn(&ViewModel, &Event) -> Result<()>>;

/// Everything a view-model needs at mount time.
pub struct ViewModelOptions {
	el: Node,
	data: serde_json::Value,
	computed: BTreeMap<String, ComputedFn>,
	methods: BTreeMap<String, MethodFn>,
	directives: DirectiveRegistry,
}

impl ViewModelOptions {
	/// Options mounting `el` over `data`, with the built-in directive set.
	pub fn new(el: Node, data: serde_json::Value) -> Self {
		Self {
			el,
			data,
			computed: BTreeMap::new(),
			methods: BTreeMap::new(),
			directives: DirectiveRegistry::with_builtins(),
		}
	}

	/// Adds a computed accessor under `name`. Computed entries shadow data
	/// fields of the same name on read and are rejected as write targets.
	pub fn computed(
		mut self,
		name: impl Into<String>,
		f: impl Fn(&ViewModel) -> Value + 'static,
	) -> Self {
		self.computed.insert(name.into(), Rc::new(f));
		self
	}

	/// Adds a method under `name`.
	pub fn method(
		mut self,
		name: impl Into<String>,
		f: impl Fn(&ViewModel, &Event) -> Result<()> + 'static,
	) -> Self {
		self.methods.insert(name.into(), Rc::new(f));
		self
	}

	/// Adds (or replaces) a directive handler under `name`.
	pub fn directive(
		mut self,
		name: impl Into<String>,
		f: impl Fn(&Node, &str, &ViewModel, Option<&str>) -> Result<()> + 'static,
	) -> Self {
		self.directives.register(name, f);
		self
	}
}

pub(crate) struct VmInner {
	root: Node,
	store: Store,
	computed: BTreeMap<String, ComputedFn>,
	methods: BTreeMap<String, MethodFn>,
	directives: DirectiveRegistry,
	watchers: RefCell<Vec<Rc<Watcher>>>,
}

/// A live, compiled view-model instance.
///
/// Cheap to clone; all clones share the same instance.
#[derive(Clone)]
pub struct ViewModel {
	inner: Rc<VmInner>,
}

impl ViewModel {
	/// Observes the data, compiles the template, and returns the live
	/// instance.
	///
	/// Fails with [`BindingError::InvalidTemplateRoot`] when the mounted
	/// node is not an element, and propagates the first binding error the
	/// compiler hits.
	pub fn new(options: ViewModelOptions) -> Result<Self> {
		if !options.el.is_element() {
			return Err(BindingError::InvalidTemplateRoot);
		}

		let vm = Self {
			inner: Rc::new(VmInner {
				root: options.el,
				store: observer::observe_root(options.data),
				computed: options.computed,
				methods: options.methods,
				directives: options.directives,
				watchers: RefCell::new(Vec::new()),
			}),
		};

		compiler::compile(&vm.inner.root, &vm)?;
		tracing::trace!(
			watchers = vm.watcher_count(),
			"view-model mounted"
		);
		Ok(vm)
	}

	/// Resolves a dotted path (or computed name) to its current value.
	pub fn get(&self, expr: &str) -> Result<Value> {
		path::resolve(self, expr)
	}

	/// Assigns `value` to a dotted path, converting it into reactive form
	/// and notifying the target field's subscribers synchronously.
	pub fn set(&self, expr: &str, value: serde_json::Value) -> Result<()> {
		path::assign(self, expr, observer::observe(value))
	}

	/// Invokes a registered method by name.
	pub fn call_method(&self, name: &str, event: &Event) -> Result<()> {
		let method = self
			.inner
			.methods
			.get(name)
			.cloned()
			.ok_or_else(|| BindingError::UnknownMethod(name.to_string()))?;
		method(self, event)
	}

	/// The mounted root element.
	pub fn root(&self) -> Node {
		self.inner.root.clone()
	}

	/// A plain-data snapshot of the current store contents.
	pub fn data(&self) -> serde_json::Value {
		self.inner.store.to_json()
	}

	/// The number of watchers compilation created.
	pub fn watcher_count(&self) -> usize {
		self.inner.watchers.borrow().len()
	}

	/// A weak handle for listeners and other long-lived captures.
	pub fn downgrade(&self) -> WeakViewModel {
		WeakViewModel(Rc::downgrade(&self.inner))
	}

	pub(crate) fn resolve(&self, expr: &str) -> Result<Value> {
		path::resolve(self, expr)
	}

	pub(crate) fn computed_fn(&self, name: &str) -> Option<ComputedFn> {
		self.inner.computed.get(name).cloned()
	}

	pub(crate) fn store(&self) -> &Store {
		&self.inner.store
	}

	pub(crate) fn directives(&self) -> &DirectiveRegistry {
		&self.inner.directives
	}

	pub(crate) fn downgrade_inner(&self) -> Weak<VmInner> {
		Rc::downgrade(&self.inner)
	}

	pub(crate) fn from_inner(inner: Rc<VmInner>) -> Self {
		Self { inner }
	}

	pub(crate) fn retain_watcher(&self, watcher: Rc<Watcher>) {
		self.inner.watchers.borrow_mut().push(watcher);
	}
}

impl std::fmt::Debug for ViewModel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ViewModel")
			.field("fields", &self.inner.store.field_names())
			.field("watchers", &self.watcher_count())
			.finish()
	}
}

/// Non-owning handle captured by event listeners.
///
/// Upgrading after the instance is dropped yields `None`; listeners treat
/// that as a no-op rather than an error.
#[derive(Clone)]
pub struct WeakViewModel(Weak<VmInner>);

impl WeakViewModel {
	/// Recovers the owning handle if the instance is still alive.
	pub fn upgrade(&self) -> Option<ViewModel> {
		self.0.upgrade().map(|inner| ViewModel { inner })
	}
}
