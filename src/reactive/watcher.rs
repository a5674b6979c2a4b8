//! Subscription unit binding one path expression to one sink callback.
//!
//! A [`Watcher`] is created once per directive binding (or once per
//! interpolation group within a text node). Construction evaluates the
//! expression immediately under the tracking context, which simultaneously
//! performs the initial sink write and registers the watcher with the
//! dependency registry of every field the evaluation touched.
//!
//! There is no disposal: a watcher lives as long as the view-model that
//! compiled it. Registries only hold weak references, so ownership stays
//! with the view-model for the template's lifetime.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::runtime;
use crate::error::Result;
use crate::value::Value;
use crate::vm::{ViewModel, VmInner};

/// Sink callback invoked with the freshly resolved value.
pub type WatcherCallback = Box<dyn Fn(&Value) -> Result<()>>;

/// One expression bound to one callback.
pub struct Watcher {
	vm: Weak<VmInner>,
	expr: String,
	callback: WatcherCallback,
	/// Last observed value, used for change suppression in [`update`].
	///
	/// [`update`]: Watcher::update
	last: RefCell<Value>,
}

impl Watcher {
	/// Creates the watcher, runs its first evaluation, and performs the
	/// initial sink write.
	///
	/// The first evaluation runs under the tracking context, so every field
	/// it reads registers this watcher. The view-model retains the watcher
	/// for its own lifetime; the returned handle is a shared reference.
	pub fn create(
		vm: &ViewModel,
		expr: impl Into<String>,
		callback: impl Fn(&Value) -> Result<()> + 'static,
	) -> Result<Rc<Self>> {
		let watcher = Rc::new(Self {
			vm: vm.downgrade_inner(),
			expr: expr.into(),
			callback: Box::new(callback),
			last: RefCell::new(Value::Null),
		});

		let initial = watcher.evaluate_tracked(vm)?;
		tracing::trace!(expr = %watcher.expr, "watcher bound");
		*watcher.last.borrow_mut() = initial.clone();
		(watcher.callback)(&initial)?;

		vm.retain_watcher(Rc::clone(&watcher));
		Ok(watcher)
	}

	/// Evaluates the expression with this watcher as the active tracking
	/// context, registering it with every field read along the way.
	fn evaluate_tracked(self: &Rc<Self>, vm: &ViewModel) -> Result<Value> {
		runtime::with_observer(self, || vm.resolve(&self.expr))
	}

	/// Re-resolves the expression and fires the callback if the value
	/// changed.
	///
	/// Re-resolution runs with no tracking context: dependency registration
	/// happens only during the constructor-time evaluation. The comparison
	/// is strict identity against the last observed value; when the callback
	/// fires, the cache is reassigned to the new value, so a value that
	/// oscillates between two states fires once per genuine change.
	pub fn update(&self) -> Result<()> {
		let Some(inner) = self.vm.upgrade() else {
			return Ok(());
		};
		let vm = ViewModel::from_inner(inner);
		let new_value = vm.resolve(&self.expr)?;
		let changed = !new_value.same_identity(&self.last.borrow());
		if changed {
			tracing::trace!(expr = %self.expr, value = %new_value, "watcher fired");
			(self.callback)(&new_value)?;
			*self.last.borrow_mut() = new_value;
		}
		Ok(())
	}

	/// The bound path expression.
	pub fn expr(&self) -> &str {
		&self.expr
	}

	/// The last value observed by this watcher.
	pub fn last_value(&self) -> Value {
		self.last.borrow().clone()
	}
}

impl std::fmt::Debug for Watcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Watcher")
			.field("expr", &self.expr)
			.field("last", &self.last.borrow())
			.finish()
	}
}
