//! Error types for template compilation and binding evaluation.
//!
//! There is deliberately no variant for unknown directives: an unmatched
//! directive attribute is skipped with a warning during compilation and never
//! aborts the pass. Everything that *is* an error here is a programming or
//! template-authoring mistake and is surfaced to the caller immediately.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BindingError>;

/// Errors raised while compiling a template or evaluating a binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
	/// An intermediate segment of a dotted path did not resolve to a
	/// container. Raised on every evaluation attempt, not just the first.
	#[error("cannot resolve segment `{segment}` in path `{expr}`")]
	PathResolution {
		/// The full path expression being evaluated.
		expr: String,
		/// The segment that failed to resolve.
		segment: String,
	},

	/// An `on:<event>` listener referenced a method name that is not
	/// registered on the view-model. Raised at dispatch time, since method
	/// lookup is deferred to invocation.
	#[error("unknown method `{0}` on view-model")]
	UnknownMethod(String),

	/// An assignment targeted a computed field. Computed entries are
	/// read-only accessors.
	#[error("computed field `{0}` is read-only")]
	ReadOnlyField(String),

	/// The template root passed to the view-model was not an element node.
	#[error("template root must be an element node")]
	InvalidTemplateRoot,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn path_resolution_message_names_expr_and_segment() {
		let err = BindingError::PathResolution {
			expr: "user.name".into(),
			segment: "name".into(),
		};
		assert_eq!(
			err.to_string(),
			"cannot resolve segment `name` in path `user.name`"
		);
	}

	#[test]
	fn unknown_method_message() {
		let err = BindingError::UnknownMethod("greet".into());
		assert_eq!(err.to_string(), "unknown method `greet` on view-model");
	}
}
