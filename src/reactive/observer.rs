//! Reactive cell conversion: making a data tree observable.
//!
//! [`observe`] walks a plain `serde_json::Value` tree and converts every
//! object field into an intercepted [`FieldCell`] with read/write side
//! effects. Conversion is eager and recursive: nested objects become
//! reactive [`Store`]s at conversion time, not lazily on first access.
//! Objects nested inside arrays are converted too, though the arrays
//! themselves stay inert (sequence mutation is not tracked).
//!
//! Each cell owns exactly one [`Dep`]. Reading a cell while a tracking
//! context is active registers the evaluating watcher with that dep; writing
//! a value that is identity-unequal to the stored one notifies every
//! registered watcher synchronously.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::dep::Dep;
use crate::error::Result;
use crate::value::Value;

/// An intercepted field: stored value plus its dependency registry.
#[derive(Debug)]
pub struct FieldCell {
	value: RefCell<Value>,
	dep: Dep,
}

impl FieldCell {
	fn new(value: Value) -> Self {
		Self {
			value: RefCell::new(value),
			dep: Dep::new(),
		}
	}

	/// Reads the field, registering the active watcher (if any) with this
	/// field's registry first.
	pub fn get(&self) -> Value {
		self.dep.depend();
		self.value.borrow().clone()
	}

	/// Reads the field without touching the registry.
	pub fn get_untracked(&self) -> Value {
		self.value.borrow().clone()
	}

	/// Writes the field and notifies subscribers.
	///
	/// The incoming value is compared to the stored one by strict identity;
	/// an identity-equal write is a no-op. Notification is full and
	/// synchronous whenever the values differ; a structurally equal but
	/// freshly built container still notifies.
	pub fn set(&self, new_value: Value) -> Result<()> {
		let changed = !new_value.same_identity(&self.value.borrow());
		if !changed {
			return Ok(());
		}
		*self.value.borrow_mut() = new_value;
		self.dep.notify()
	}

	/// This field's dependency registry.
	pub fn dep(&self) -> &Dep {
		&self.dep
	}
}

/// A reactive container: field name to intercepted cell.
///
/// `Store` is a shared handle; clones observe the same fields. Identity
/// comparison between stores is reference comparison on the shared interior.
#[derive(Clone, Default)]
pub struct Store {
	fields: Rc<RefCell<BTreeMap<String, Rc<FieldCell>>>>,
}

impl Store {
	/// Creates an empty container.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `true` if `other` is the same container.
	pub fn ptr_eq(&self, other: &Store) -> bool {
		Rc::ptr_eq(&self.fields, &other.fields)
	}

	/// The cell for `name`, if the field exists.
	pub fn cell(&self, name: &str) -> Option<Rc<FieldCell>> {
		self.fields.borrow().get(name).cloned()
	}

	/// Tracked read of `name`. A missing field resolves to [`Value::Null`]
	/// and registers nothing (there is no cell to read through).
	pub fn read(&self, name: &str) -> Value {
		match self.cell(name) {
			Some(cell) => cell.get(),
			None => Value::Null,
		}
	}

	/// Writes `name`, creating a fresh intercepted field if it does not
	/// exist yet. The value must already be in converted form.
	pub fn write(&self, name: &str, value: Value) -> Result<()> {
		let existing = self.cell(name);
		match existing {
			Some(cell) => cell.set(value),
			None => {
				self.fields
					.borrow_mut()
					.insert(name.to_string(), Rc::new(FieldCell::new(value)));
				Ok(())
			}
		}
	}

	/// Field names currently present, in sorted order.
	pub fn field_names(&self) -> Vec<String> {
		self.fields.borrow().keys().cloned().collect()
	}

	/// Untracked JSON snapshot of the whole container.
	pub fn to_json(&self) -> serde_json::Value {
		let mut map = serde_json::Map::new();
		for (name, cell) in self.fields.borrow().iter() {
			map.insert(name.clone(), cell.get_untracked().to_json());
		}
		serde_json::Value::Object(map)
	}
}

impl std::fmt::Debug for Store {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Store")
			.field("fields", &self.field_names())
			.finish()
	}
}

/// Converts a plain JSON tree into its reactive form.
///
/// Objects become [`Store`]s of intercepted fields, recursively; arrays stay
/// inert but their object elements are converted; primitives pass through.
/// The input is a plain tree (acyclic by construction), so the walk always
/// terminates.
pub fn observe(json: serde_json::Value) -> Value {
	match json {
		serde_json::Value::Null => Value::Null,
		serde_json::Value::Bool(b) => Value::Bool(b),
		serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
		serde_json::Value::String(s) => Value::String(s),
		serde_json::Value::Array(items) => {
			Value::Array(Rc::new(items.into_iter().map(observe).collect()))
		}
		serde_json::Value::Object(map) => Value::Object(observe_object(map)),
	}
}

/// Converts a JSON object into a reactive container.
pub fn observe_object(map: serde_json::Map<String, serde_json::Value>) -> Store {
	let store = Store::new();
	{
		let mut fields = store.fields.borrow_mut();
		for (name, value) in map {
			fields.insert(name, Rc::new(FieldCell::new(observe(value))));
		}
	}
	store
}

/// Converts the top-level data option into the view-model's store.
///
/// Anything other than a JSON object yields an empty store; the template can
/// still compile, it just has no fields to bind.
pub fn observe_root(json: serde_json::Value) -> Store {
	match json {
		serde_json::Value::Object(map) => observe_object(map),
		other => {
			tracing::warn!(data = %other, "view-model data is not an object; using an empty store");
			Store::new()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn conversion_is_eager_and_recursive() {
		let store = observe_root(json!({ "user": { "name": "Ann" }, "count": 1 }));
		assert_eq!(store.field_names(), vec!["count", "user"]);

		let user = store.read("user");
		let user_store = user.as_object().expect("nested object became a store");
		assert_eq!(user_store.read("name").to_string(), "Ann");
	}

	#[test]
	fn objects_inside_arrays_are_converted() {
		let store = observe_root(json!({ "items": [{ "label": "a" }] }));
		let Value::Array(items) = store.read("items") else {
			panic!("expected array");
		};
		assert!(items[0].is_object());
	}

	#[test]
	fn identity_equal_write_is_a_no_op() {
		let store = observe_root(json!({ "name": "Ann" }));
		let cell = store.cell("name").unwrap();
		cell.set(Value::from("Ann")).unwrap();
		assert_eq!(cell.get_untracked().to_string(), "Ann");
	}

	#[test]
	fn missing_field_reads_null() {
		let store = observe_root(json!({}));
		assert!(store.read("absent").same_identity(&Value::Null));
	}

	#[test]
	fn non_object_root_yields_empty_store() {
		let store = observe_root(json!([1, 2, 3]));
		assert!(store.field_names().is_empty());
	}

	#[test]
	fn write_creates_intercepted_field() {
		let store = observe_root(json!({}));
		store.write("fresh", Value::from("x")).unwrap();
		assert!(store.cell("fresh").is_some());
		assert_eq!(store.read("fresh").to_string(), "x");
	}
}
