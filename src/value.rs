//! Dynamic value tree for view-model data.
//!
//! [`Value`] is the runtime representation of everything stored in a
//! view-model's data store: JSON-like primitives, inert arrays, and reactive
//! containers ([`Store`]). Containers are shared handles, so cloning a
//! `Value` never deep-copies a data tree; all clones observe the same
//! underlying fields.
//!
//! ## Identity comparison
//!
//! Change detection throughout the reactive core uses
//! [`Value::same_identity`], which mirrors strict (in)equality in dynamic
//! languages: primitives compare by value, containers compare by reference.
//! Assigning a structurally equal but freshly built container to a field is
//! therefore a *change* and triggers notification.

use std::rc::Rc;

use crate::reactive::observer::Store;

/// A dynamically typed value held by an intercepted field.
#[derive(Debug, Clone)]
pub enum Value {
	/// Absent / null value. Resolving a missing final path segment yields
	/// `Null`.
	Null,
	/// Boolean.
	Bool(bool),
	/// Numeric value. All numbers are kept as `f64`; `NaN` is never
	/// identity-equal to itself, matching strict-inequality semantics.
	Number(f64),
	/// UTF-8 string.
	String(String),
	/// Sequence value. Arrays are shared but *inert*: element mutation is
	/// not tracked (only keyed fields are made observable). Objects nested
	/// inside an array are still converted and observable.
	Array(Rc<Vec<Value>>),
	/// A reactive container of intercepted fields.
	Object(Store),
}

impl Value {
	/// Strict-identity comparison: primitives by value, `Array` and
	/// `Object` by reference.
	pub fn same_identity(&self, other: &Value) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Number(a), Value::Number(b)) => a == b,
			(Value::String(a), Value::String(b)) => a == b,
			(Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
			(Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
			_ => false,
		}
	}

	/// Returns `true` if the value is a reactive container.
	pub fn is_object(&self) -> bool {
		matches!(self, Value::Object(_))
	}

	/// Returns the contained store, if this value is a container.
	pub fn as_object(&self) -> Option<&Store> {
		match self {
			Value::Object(store) => Some(store),
			_ => None,
		}
	}

	/// Returns the contained string slice, if this value is a string.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	/// Converts this value back into a plain `serde_json::Value` snapshot.
	///
	/// Reads are untracked: taking a snapshot never registers dependencies.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Value::Null => serde_json::Value::Null,
			Value::Bool(b) => serde_json::Value::Bool(*b),
			Value::Number(n) => serde_json::Number::from_f64(*n)
				.map(serde_json::Value::Number)
				.unwrap_or(serde_json::Value::Null),
			Value::String(s) => serde_json::Value::String(s.clone()),
			Value::Array(items) => {
				serde_json::Value::Array(items.iter().map(Value::to_json).collect())
			}
			Value::Object(store) => store.to_json(),
		}
	}
}

impl serde::Serialize for Value {
	/// Serializes through the untracked JSON snapshot, so a `Value` can be
	/// embedded in any serde-driven output.
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		self.to_json().serialize(serializer)
	}
}

impl std::fmt::Display for Value {
	/// Renders the value the way a text sink expects it: strings bare,
	/// integral numbers without a fractional part, `Null` as the empty
	/// string, containers as their JSON snapshot.
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Null => Ok(()),
			Value::Bool(b) => write!(f, "{}", b),
			Value::Number(n) => {
				if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
					write!(f, "{}", *n as i64)
				} else {
					write!(f, "{}", n)
				}
			}
			Value::String(s) => f.write_str(s),
			Value::Array(_) | Value::Object(_) => write!(f, "{}", self.to_json()),
		}
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::String(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::String(s)
	}
}

impl From<f64> for Value {
	fn from(n: f64) -> Self {
		Value::Number(n)
	}
}

impl From<i64> for Value {
	fn from(n: i64) -> Self {
		Value::Number(n as f64)
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::reactive::observer;
	use serde_json::json;

	#[test]
	fn primitives_compare_by_value() {
		assert!(Value::from("Ann").same_identity(&Value::from("Ann")));
		assert!(!Value::from("Ann").same_identity(&Value::from("Bo")));
		assert!(Value::from(2.0).same_identity(&Value::from(2.0)));
		assert!(Value::Null.same_identity(&Value::Null));
		assert!(!Value::Null.same_identity(&Value::from(false)));
	}

	#[test]
	fn nan_is_never_identity_equal() {
		let nan = Value::Number(f64::NAN);
		assert!(!nan.same_identity(&nan.clone()));
	}

	#[test]
	fn containers_compare_by_reference() {
		let a = observer::observe(json!({ "name": "Ann" }));
		let b = observer::observe(json!({ "name": "Ann" }));
		assert!(a.same_identity(&a.clone()), "clone shares the store");
		assert!(!a.same_identity(&b), "structural equality is not identity");
	}

	#[test]
	fn display_renders_sink_text() {
		assert_eq!(Value::from("Ann").to_string(), "Ann");
		assert_eq!(Value::from(3.0).to_string(), "3");
		assert_eq!(Value::from(2.5).to_string(), "2.5");
		assert_eq!(Value::Null.to_string(), "");
		assert_eq!(Value::from(true).to_string(), "true");
	}

	#[test]
	fn json_round_trip_snapshot() {
		let value = observer::observe(json!({ "user": { "name": "Ann", "age": 7 } }));
		assert_eq!(value.to_json(), json!({ "user": { "name": "Ann", "age": 7.0 } }));
	}
}
