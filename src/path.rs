//! Dotted path resolution against a view-model.
//!
//! An expression like `user.name` is split on `.` and reduced across the
//! data store segment by segment. The first segment may also name a computed
//! entry, whose accessor is re-invoked on every resolution (computed values
//! are never cached).
//!
//! Descending *through* a non-container segment is a
//! [`BindingError::PathResolution`], raised on every evaluation attempt; a
//! missing *final* segment resolves to [`Value::Null`].

use crate::error::{BindingError, Result};
use crate::value::Value;
use crate::vm::ViewModel;

fn segments(expr: &str) -> impl Iterator<Item = &str> {
	expr.trim().split('.')
}

/// Resolves `expr` against the view-model.
///
/// Reads go through each field's cell, so resolution performed under a
/// tracking context registers the evaluating watcher with every field
/// touched, including the same field twice if the path repeats it.
pub(crate) fn resolve(vm: &ViewModel, expr: &str) -> Result<Value> {
	let mut parts = segments(expr);
	let first = parts.next().unwrap_or_default();
	if first.is_empty() {
		return Err(BindingError::PathResolution {
			expr: expr.to_string(),
			segment: String::new(),
		});
	}

	let mut current = match vm.computed_fn(first) {
		Some(accessor) => accessor(vm),
		None => vm.store().read(first),
	};

	for segment in parts {
		let Some(store) = current.as_object() else {
			return Err(BindingError::PathResolution {
				expr: expr.to_string(),
				segment: segment.to_string(),
			});
		};
		current = store.read(segment);
	}
	Ok(current)
}

/// Assigns `value` into the container addressed by all but the last segment
/// of `expr`.
///
/// The traversal mirrors [`resolve`]; the final segment is written through
/// its cell (creating a fresh intercepted field if absent). Assigning to a
/// computed field is a [`BindingError::ReadOnlyField`].
pub(crate) fn assign(vm: &ViewModel, expr: &str, value: Value) -> Result<()> {
	let parts: Vec<&str> = segments(expr).collect();
	let (&last, body) = parts.split_last().ok_or_else(|| BindingError::PathResolution {
		expr: expr.to_string(),
		segment: String::new(),
	})?;
	if last.is_empty() {
		return Err(BindingError::PathResolution {
			expr: expr.to_string(),
			segment: String::new(),
		});
	}

	if body.is_empty() {
		if vm.computed_fn(last).is_some() {
			return Err(BindingError::ReadOnlyField(last.to_string()));
		}
		return vm.store().write(last, value);
	}

	let first = body[0];
	let mut current = match vm.computed_fn(first) {
		Some(accessor) => accessor(vm),
		None => vm.store().read(first),
	};
	for segment in &body[1..] {
		let Some(store) = current.as_object() else {
			return Err(BindingError::PathResolution {
				expr: expr.to_string(),
				segment: segment.to_string(),
			});
		};
		current = store.read(segment);
	}

	let Some(store) = current.as_object() else {
		return Err(BindingError::PathResolution {
			expr: expr.to_string(),
			segment: last.to_string(),
		});
	};
	store.write(last, value)
}
