//! Tracking context for implicit dependency discovery.
//!
//! While a [`Watcher`](super::watcher::Watcher) evaluates its expression,
//! every intercepted field it reads must learn about it. The field side asks
//! [`current_observer`] for "the watcher currently evaluating"; the watcher
//! side brackets its evaluation with [`with_observer`].
//!
//! The context is an explicit thread-local *stack*, not a single slot: the
//! watcher is pushed before resolution begins and popped when it finishes,
//! so a nested evaluation (a computed accessor reading another bound field,
//! for instance) attributes dependencies to the innermost evaluating watcher
//! instead of corrupting the outer one.
//!
//! The pop is driven by a drop guard, so the stack unwinds correctly even
//! when expression resolution returns early with an error.

use std::cell::RefCell;
use std::rc::Rc;

use super::watcher::Watcher;

thread_local! {
	static OBSERVER_STACK: RefCell<Vec<Rc<Watcher>>> = const { RefCell::new(Vec::new()) };
}

/// Pops the observer stack when evaluation finishes, however it finishes.
struct ObserverGuard;

impl Drop for ObserverGuard {
	fn drop(&mut self) {
		OBSERVER_STACK.with(|stack| {
			stack.borrow_mut().pop();
		});
	}
}

/// Runs `f` with `watcher` as the active tracking context.
///
/// Every field read performed inside `f` registers `watcher` with that
/// field's dependency registry. The context is cleared as soon as `f`
/// returns, regardless of how many fields were read or whether resolution
/// failed.
pub(crate) fn with_observer<T>(watcher: &Rc<Watcher>, f: impl FnOnce() -> T) -> T {
	OBSERVER_STACK.with(|stack| stack.borrow_mut().push(Rc::clone(watcher)));
	let _guard = ObserverGuard;
	f()
}

/// Returns the watcher currently evaluating, if any.
pub(crate) fn current_observer() -> Option<Rc<Watcher>> {
	OBSERVER_STACK.with(|stack| stack.borrow().last().cloned())
}

/// Depth of the evaluation stack. Exposed for tests.
#[cfg(test)]
pub(crate) fn tracking_depth() -> usize {
	OBSERVER_STACK.with(|stack| stack.borrow().len())
}
