//! Directive registry: the binding recipes the compiler dispatches into.
//!
//! A handler receives the node, the attribute's value (the expression), the
//! view-model, and (for event directives) the event name. The built-in set:
//!
//! | directive | binding | behavior |
//! |---|---|---|
//! | `model` | two-way | watcher writes the resolved value into the node's value sink; an `input` listener writes the entered value back through path assignment |
//! | `text` | one-way | one watcher per interpolation group, each re-resolving *all* groups and writing the recombined literal into the text sink; a marker-less expression (attribute form) binds as a single path |
//! | `html` | one-way | watcher writes the resolved value into the raw-markup sink, verbatim; no escaping or sanitization is performed |
//! | `on:<event>` | none | listener invoking the named view-model method with the native event; lookup is deferred to dispatch time |
//!
//! The registry is string-keyed and open: custom handlers can be registered
//! through [`ViewModelOptions::directive`](crate::vm::ViewModelOptions::directive).

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::compiler::interpolation_regex;
use crate::dom::Node;
use crate::error::Result;
use crate::reactive::watcher::Watcher;
use crate::vm::ViewModel;

/// A directive binding recipe.
pub type DirectiveHandler = Rc<dyn Fn(&Node, &str, &ViewModel, Option<&str>) -> Result<()>>;

/// String-keyed mapping from directive name to handler.
#[derive(Clone)]
pub struct DirectiveRegistry {
	handlers: BTreeMap<String, DirectiveHandler>,
}

impl DirectiveRegistry {
	/// An empty registry.
	pub fn empty() -> Self {
		Self {
			handlers: BTreeMap::new(),
		}
	}

	/// The fixed built-in set: `model`, `text`, `html`, `on`.
	pub fn with_builtins() -> Self {
		let mut registry = Self::empty();
		registry.register("model", model);
		registry.register("text", text);
		registry.register("html", html);
		registry.register("on", on);
		registry
	}

	/// Registers (or replaces) a handler under `name`.
	pub fn register(
		&mut self,
		name: impl Into<String>,
		handler: impl Fn(&Node, &str, &ViewModel, Option<&str>) -> Result<()> + 'static,
	) {
		self.handlers.insert(name.into(), Rc::new(handler));
	}

	/// Looks up a handler.
	pub fn get(&self, name: &str) -> Option<DirectiveHandler> {
		self.handlers.get(name).cloned()
	}

	/// Registered directive names, sorted.
	pub fn names(&self) -> Vec<String> {
		self.handlers.keys().cloned().collect()
	}
}

impl std::fmt::Debug for DirectiveRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DirectiveRegistry")
			.field("names", &self.names())
			.finish()
	}
}

/// Two-way binding between a field path and the node's value sink.
fn model(node: &Node, expr: &str, vm: &ViewModel, _event: Option<&str>) -> Result<()> {
	let value_node = node.clone();
	Watcher::create(vm, expr.trim(), move |value| {
		value_node.set_value(value.to_string());
		Ok(())
	})?;

	let weak = vm.downgrade();
	let path = expr.trim().to_string();
	node.add_event_listener("input", move |event| {
		let Some(vm) = weak.upgrade() else {
			return Ok(());
		};
		vm.set(&path, serde_json::Value::String(event.value.clone()))
	});
	Ok(())
}

/// One-way binding of an interpolated literal into the text sink.
///
/// One watcher is created per `{{ ... }}` group; any group's change
/// re-resolves the whole literal so sibling groups stay current. The
/// attribute form (`v-text="path"`) carries no markers and binds the whole
/// expression as a single path.
fn text(node: &Node, literal: &str, vm: &ViewModel, _event: Option<&str>) -> Result<()> {
	let groups: Vec<String> = interpolation_regex()
		.captures_iter(literal)
		.filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
		.collect();

	if groups.is_empty() {
		let target = node.clone();
		Watcher::create(vm, literal.trim(), move |value| {
			target.set_text_content(value.to_string());
			Ok(())
		})?;
		return Ok(());
	}

	for group in groups {
		let text_node = node.clone();
		let literal = literal.to_string();
		let weak = vm.downgrade();
		Watcher::create(vm, group, move |_new_value| {
			let Some(vm) = weak.upgrade() else {
				return Ok(());
			};
			text_node.set_text_content(render_literal(&literal, &vm)?);
			Ok(())
		})?;
	}
	Ok(())
}

/// One-way binding into the raw-markup sink. Values are injected verbatim;
/// the caller owns the trust boundary.
fn html(node: &Node, expr: &str, vm: &ViewModel, _event: Option<&str>) -> Result<()> {
	let target = node.clone();
	Watcher::create(vm, expr.trim(), move |value| {
		target.set_inner_html(value.to_string());
		Ok(())
	})?;
	Ok(())
}

/// Event binding: `v-on:<event>="methodName"`. Not reactive; no watcher is
/// created. Method lookup happens at dispatch time, so an unknown name is
/// only an error once the event actually fires.
fn on(node: &Node, expr: &str, vm: &ViewModel, event: Option<&str>) -> Result<()> {
	let Some(event_name) = event else {
		tracing::warn!(method = %expr, "v-on without an event name; skipping");
		return Ok(());
	};
	let weak = vm.downgrade();
	let method = expr.trim().to_string();
	node.add_event_listener(event_name, move |native_event| {
		let Some(vm) = weak.upgrade() else {
			return Ok(());
		};
		vm.call_method(&method, native_event)
	});
	Ok(())
}

/// Renders an interpolated literal by replacing every group with its
/// resolved value's display form.
pub(crate) fn render_literal(literal: &str, vm: &ViewModel) -> Result<String> {
	let re = interpolation_regex();
	let mut rendered = String::with_capacity(literal.len());
	let mut last = 0;
	for caps in re.captures_iter(literal) {
		let (Some(whole), Some(group)) = (caps.get(0), caps.get(1)) else {
			continue;
		};
		rendered.push_str(&literal[last..whole.start()]);
		let value = vm.resolve(group.as_str().trim())?;
		rendered.push_str(&value.to_string());
		last = whole.end();
	}
	rendered.push_str(&literal[last..]);
	Ok(rendered)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::Event;
	use crate::vm::ViewModelOptions;
	use serde_json::json;
	use serial_test::serial;

	fn mount(root: Node, data: serde_json::Value) -> ViewModel {
		ViewModel::new(ViewModelOptions::new(root, data)).unwrap()
	}

	#[test]
	#[serial]
	fn model_writes_initial_value_into_sink() {
		let input = Node::element("input").attr("v-model", "user.name");
		let root = Node::element("div").child(input.clone());
		mount(root, json!({ "user": { "name": "Ann" } }));
		assert_eq!(input.value(), "Ann");
	}

	#[test]
	#[serial]
	fn model_round_trips_user_input() {
		let input = Node::element("input").attr("v-model", "user.name");
		let root = Node::element("div").child(input.clone());
		let vm = mount(root, json!({ "user": { "name": "Ann" } }));

		input.dispatch(&Event::input("Cy")).unwrap();
		assert_eq!(vm.get("user.name").unwrap().to_string(), "Cy");
		assert_eq!(input.value(), "Cy");
	}

	#[test]
	#[serial]
	fn text_recombines_multiple_groups() {
		let line = Node::text("{{ a }} + {{ b }}");
		let root = Node::element("div").child(line.clone());
		let vm = mount(root, json!({ "a": "x", "b": "y" }));
		assert_eq!(line.text_content().as_deref(), Some("x + y"));

		vm.set("b", json!("z")).unwrap();
		assert_eq!(line.text_content().as_deref(), Some("x + z"));
	}

	#[test]
	#[serial]
	fn text_attribute_form_binds_a_bare_path() {
		let label = Node::element("span").attr("v-text", "user.name");
		let root = Node::element("div").child(label.clone());
		let vm = mount(root, json!({ "user": { "name": "Ann" } }));
		assert_eq!(label.text_content().as_deref(), Some("Ann"));

		vm.set("user.name", json!("Bo")).unwrap();
		assert_eq!(label.text_content().as_deref(), Some("Bo"));
	}

	#[test]
	#[serial]
	fn html_injects_markup_verbatim() {
		let pane = Node::element("div").attr("v-html", "snippet");
		let root = Node::element("div").child(pane.clone());
		let vm = mount(root, json!({ "snippet": "<b>hi</b>" }));
		assert_eq!(pane.inner_html().as_deref(), Some("<b>hi</b>"));

		vm.set("snippet", json!("<i>&amp;</i>")).unwrap();
		assert_eq!(pane.inner_html().as_deref(), Some("<i>&amp;</i>"));
	}

	#[test]
	#[serial]
	fn on_invokes_named_method_with_event() {
		let button = Node::element("button").attr("v-on:click", "greet");
		let root = Node::element("div").child(button.clone());

		let options = ViewModelOptions::new(root, json!({ "greeted": false }))
			.method("greet", |vm, event| {
				assert_eq!(event.event_type, "click");
				vm.set("greeted", json!(true))
			});
		let vm = ViewModel::new(options).unwrap();

		button.dispatch(&Event::new("click")).unwrap();
		assert!(matches!(
			vm.get("greeted").unwrap(),
			crate::value::Value::Bool(true)
		));
	}

	#[test]
	#[serial]
	fn on_with_unknown_method_errors_at_dispatch_time() {
		let button = Node::element("button").attr("v-on:click", "missing");
		let root = Node::element("div").child(button.clone());
		// Binding succeeds: lookup is deferred until the event fires.
		let _vm = mount(root, json!({}));

		let err = button.dispatch(&Event::new("click")).unwrap_err();
		assert_eq!(
			err,
			crate::error::BindingError::UnknownMethod("missing".into())
		);
	}

	#[test]
	#[serial]
	fn custom_directive_is_dispatched() {
		let node = Node::element("span").attr("v-upper", "title");
		let root = Node::element("div").child(node.clone());

		let options = ViewModelOptions::new(root, json!({ "title": "quiet" })).directive(
			"upper",
			|node, expr, vm, _event| {
				let shouting = vm.get(expr)?.to_string().to_uppercase();
				node.set_value(shouting);
				Ok(())
			},
		);
		ViewModel::new(options).unwrap();
		assert_eq!(node.value(), "QUIET");
	}
}
