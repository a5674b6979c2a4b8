//! Per-field dependency registry.
//!
//! Every intercepted field owns exactly one [`Dep`], created when the field
//! is first converted. The registry records which watchers are interested in
//! the field's reads and replays a change to all of them.
//!
//! Registration is append-only and never deduplicated: an
//! expression that reads the same field twice during one evaluation is
//! registered twice and will be invoked twice on notify. Subscribers are
//! held as `Weak` references: the registry never owns a watcher's lifetime;
//! dead entries are dropped lazily during notification.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::runtime;
use super::watcher::Watcher;
use crate::error::Result;

/// Subscriber registry for one intercepted field.
#[derive(Default)]
pub struct Dep {
	subs: RefCell<Vec<Weak<Watcher>>>,
}

impl Dep {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers the watcher currently evaluating, if any.
	///
	/// Called from a field's read path. Reading with no active tracking
	/// context never mutates the registry.
	pub fn depend(&self) {
		if let Some(watcher) = runtime::current_observer() {
			self.add_sub(&watcher);
		}
	}

	/// Appends a watcher reference. No deduplication is performed.
	pub fn add_sub(&self, watcher: &Rc<Watcher>) {
		self.subs.borrow_mut().push(Rc::downgrade(watcher));
	}

	/// Invokes `update()` on every registered watcher, in registration
	/// order, synchronously on the current stack.
	///
	/// There is no batching and no deduplication across registries: a
	/// single assignment cascades into every interested watcher before
	/// control returns to the writer. The first evaluation error aborts the
	/// remaining notifications and propagates to the writer.
	pub fn notify(&self) -> Result<()> {
		// Snapshot first: a watcher's update may read this field again,
		// which would otherwise overlap the borrow.
		let subs: Vec<Weak<Watcher>> = self.subs.borrow().clone();
		for weak in &subs {
			if let Some(watcher) = weak.upgrade() {
				watcher.update()?;
			}
		}
		// Lazy cleanup of subscribers whose watcher has been dropped.
		self.subs.borrow_mut().retain(|weak| weak.strong_count() > 0);
		Ok(())
	}

	/// Number of live subscriber entries, duplicates included.
	pub fn subscriber_count(&self) -> usize {
		self.subs
			.borrow()
			.iter()
			.filter(|weak| weak.strong_count() > 0)
			.count()
	}
}

impl std::fmt::Debug for Dep {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Dep")
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::Node;
	use crate::vm::{ViewModel, ViewModelOptions};
	use serde_json::json;
	use serial_test::serial;
	use std::cell::RefCell;

	fn vm_with(data: serde_json::Value) -> ViewModel {
		ViewModel::new(ViewModelOptions::new(Node::element("div"), data)).unwrap()
	}

	#[test]
	#[serial]
	fn depend_without_context_registers_nothing() {
		let dep = Dep::new();
		dep.depend();
		assert_eq!(dep.subscriber_count(), 0);
	}

	#[test]
	#[serial]
	fn notify_replays_in_registration_order() {
		let vm = vm_with(json!({ "x": "a" }));
		let order = Rc::new(RefCell::new(Vec::new()));

		let first = order.clone();
		let _w1 = Watcher::create(&vm, "x", move |_| {
			first.borrow_mut().push(1);
			Ok(())
		})
		.unwrap();
		let second = order.clone();
		let _w2 = Watcher::create(&vm, "x", move |_| {
			second.borrow_mut().push(2);
			Ok(())
		})
		.unwrap();
		order.borrow_mut().clear();

		vm.set("x", json!("b")).unwrap();
		assert_eq!(*order.borrow(), vec![1, 2]);
	}

	#[test]
	#[serial]
	fn dead_subscribers_are_dropped_lazily() {
		let vm = vm_with(json!({ "x": "a" }));
		let dep = Dep::new();
		let watcher = Watcher::create(&vm, "x", |_| Ok(())).unwrap();
		dep.add_sub(&watcher);
		assert_eq!(dep.subscriber_count(), 1);

		// The view-model is the only other owner of the watcher.
		drop(watcher);
		drop(vm);
		assert_eq!(dep.subscriber_count(), 0);
		dep.notify().unwrap();
	}
}
