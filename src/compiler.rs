//! Single-pass template compiler.
//!
//! Compilation moves the template root's children into a detached fragment,
//! walks them depth-first in pre-order, wires every directive attribute and
//! interpolated text node into the reactive engine, and reattaches the
//! collection in a single operation. All initial sink writes happen while
//! the tree is detached, so the live view never shows intermediate state.
//!
//! Directive attributes use the fixed `v-` prefix: `v-<name>` or
//! `v-<name>:<event>`. An attribute whose directive name has no registered
//! handler is skipped with a warning; one unmatched attribute never
//! prevents the rest of the template from becoming interactive.

use std::sync::OnceLock;

use regex::Regex;

use crate::dom::Node;
use crate::error::{BindingError, Result};
use crate::vm::ViewModel;

/// Attribute prefix marking a directive.
pub const DIRECTIVE_PREFIX: &str = "v-";

/// The double-brace interpolation pattern, compiled once.
pub(crate) fn interpolation_regex() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"\{\{(.+?)\}\}").expect("interpolation pattern is valid"))
}

/// Compiles `root`'s subtree against `vm`.
///
/// The root itself must be an element; its children are detached, compiled,
/// and reattached with their identities intact (moved, never cloned).
pub fn compile(root: &Node, vm: &ViewModel) -> Result<()> {
	if !root.is_element() {
		return Err(BindingError::InvalidTemplateRoot);
	}

	let fragment = Node::fragment();
	fragment.append_children(root.take_children());
	// Reattach on the error path too, so a failed mount never leaves the
	// caller's root childless.
	let compiled = compile_children(&fragment, vm);
	root.append_children(fragment.take_children());
	compiled
}

fn compile_children(node: &Node, vm: &ViewModel) -> Result<()> {
	for child in node.children() {
		if child.is_element() {
			compile_element(&child, vm)?;
			compile_children(&child, vm)?;
		} else if child.is_text() {
			compile_text(&child, vm)?;
		}
	}
	Ok(())
}

/// Scans an element's attributes for the directive prefix and dispatches
/// each match to its handler.
fn compile_element(node: &Node, vm: &ViewModel) -> Result<()> {
	for (name, expr) in node.attributes() {
		let Some(rest) = name.strip_prefix(DIRECTIVE_PREFIX) else {
			continue;
		};
		let (directive, event) = match rest.split_once(':') {
			Some((directive, event)) => (directive, Some(event)),
			None => (rest, None),
		};
		match vm.directives().get(directive) {
			Some(handler) => handler(node, &expr, vm, event)?,
			None => {
				tracing::warn!(attribute = %name, "unknown directive; skipping");
			}
		}
	}
	Ok(())
}

/// Dispatches a text node to the `text` handler when its content carries at
/// least one interpolation group. The full literal (with all markers) is
/// passed as the expression.
fn compile_text(node: &Node, vm: &ViewModel) -> Result<()> {
	let Some(content) = node.text_content() else {
		return Ok(());
	};
	if !interpolation_regex().is_match(&content) {
		return Ok(());
	}
	match vm.directives().get("text") {
		Some(handler) => handler(node, &content, vm, None),
		None => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::vm::ViewModelOptions;
	use serde_json::json;
	use serial_test::serial;

	#[test]
	#[serial]
	fn non_element_root_is_rejected() {
		let options = ViewModelOptions::new(Node::text("nope"), json!({}));
		assert_eq!(
			ViewModel::new(options).unwrap_err(),
			BindingError::InvalidTemplateRoot
		);
	}

	#[test]
	#[serial]
	fn node_identities_survive_compilation() {
		let text = Node::text("{{ title }}");
		let inner = Node::element("span").child(text.clone());
		let root = Node::element("div").child(inner.clone());

		let options = ViewModelOptions::new(root.clone(), json!({ "title": "t" }));
		ViewModel::new(options).unwrap();

		let children = root.children();
		assert_eq!(children.len(), 1);
		assert!(children[0].ptr_eq(&inner));
		assert!(children[0].children()[0].ptr_eq(&text));
	}

	#[test]
	#[serial]
	fn children_are_reattached_when_a_binding_fails() {
		let broken = Node::element("input").attr("v-model", "user.name");
		let sibling = Node::text("plain");
		let root = Node::element("div").child(broken.clone()).child(sibling.clone());

		let options = ViewModelOptions::new(root.clone(), json!({ "user": 1 }));
		assert!(ViewModel::new(options).is_err());

		let children = root.children();
		assert_eq!(children.len(), 2);
		assert!(children[0].ptr_eq(&broken));
		assert!(children[1].ptr_eq(&sibling));
	}

	#[test]
	#[serial]
	fn unknown_directive_is_skipped_not_fatal() {
		let bound = Node::text("{{ title }}");
		let root = Node::element("div")
			.child(Node::element("span").attr("v-show", "title"))
			.child(bound.clone());

		let options = ViewModelOptions::new(root, json!({ "title": "still works" }));
		ViewModel::new(options).unwrap();
		assert_eq!(bound.text_content().as_deref(), Some("still works"));
	}

	#[test]
	#[serial]
	fn plain_text_nodes_are_left_alone() {
		let plain = Node::text("no markers here");
		let root = Node::element("div").child(plain.clone());
		ViewModel::new(ViewModelOptions::new(root, json!({}))).unwrap();
		assert_eq!(plain.text_content().as_deref(), Some("no markers here"));
	}

	#[test]
	fn interpolation_pattern_is_non_greedy() {
		let re = interpolation_regex();
		let caps: Vec<&str> = re
			.captures_iter("{{ a }} and {{ b.c }}")
			.filter_map(|c| c.get(1).map(|m| m.as_str()))
			.collect();
		assert_eq!(caps, vec![" a ", " b.c "]);
	}
}
