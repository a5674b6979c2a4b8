//! In-memory host tree: the sink the compiled bindings write into.
//!
//! The core never diffs trees; directive callbacks perform direct, targeted
//! writes against these nodes. The surface is the minimal set of primitive
//! host operations the compiler and directives need: a detached fragment
//! container, child move/append, attribute enumeration, text content, an
//! input-like value, raw markup, and native-event subscription/dispatch.
//!
//! [`Node`] is a shared handle (`Rc` interior): clones refer to the same
//! node, so moving children out of a root and back preserves node identity.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;

/// A host event delivered to listeners.
///
/// Input events carry the value the user entered; other events leave it
/// empty.
#[derive(Debug, Clone)]
pub struct Event {
	/// Event name, e.g. `"input"` or `"click"`.
	pub event_type: String,
	/// Current value of the target, for input-like events.
	pub value: String,
}

impl Event {
	/// A named event with no payload.
	pub fn new(event_type: impl Into<String>) -> Self {
		Self {
			event_type: event_type.into(),
			value: String::new(),
		}
	}

	/// An `input` event carrying the entered value.
	pub fn input(value: impl Into<String>) -> Self {
		Self {
			event_type: "input".into(),
			value: value.into(),
		}
	}
}

/// Listener callbacks registered on a node.
pub type EventListener = Rc<dyn Fn(&Event) -> Result<()>>;

enum NodeKind {
	Element {
		tag: String,
		attributes: Vec<(String, String)>,
		value: String,
		inner_html: Option<String>,
		listeners: Vec<(String, EventListener)>,
	},
	Text {
		content: String,
	},
	/// Detached container used while compiling: children are moved in,
	/// mutated invisibly, and moved back in one operation.
	Fragment,
}

struct NodeData {
	kind: NodeKind,
	children: Vec<Node>,
}

/// A shared handle to one host node.
#[derive(Clone)]
pub struct Node {
	inner: Rc<RefCell<NodeData>>,
}

impl Node {
	fn from_kind(kind: NodeKind) -> Self {
		Self {
			inner: Rc::new(RefCell::new(NodeData {
				kind,
				children: Vec::new(),
			})),
		}
	}

	/// Creates an element node.
	pub fn element(tag: impl Into<String>) -> Self {
		Self::from_kind(NodeKind::Element {
			tag: tag.into(),
			attributes: Vec::new(),
			value: String::new(),
			inner_html: None,
			listeners: Vec::new(),
		})
	}

	/// Creates a text node.
	pub fn text(content: impl Into<String>) -> Self {
		Self::from_kind(NodeKind::Text {
			content: content.into(),
		})
	}

	/// Creates a detached fragment container.
	pub fn fragment() -> Self {
		Self::from_kind(NodeKind::Fragment)
	}

	/// Returns `true` if `other` is the same node.
	pub fn ptr_eq(&self, other: &Node) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	/// Whether this node is an element.
	pub fn is_element(&self) -> bool {
		matches!(self.inner.borrow().kind, NodeKind::Element { .. })
	}

	/// Whether this node is a text node.
	pub fn is_text(&self) -> bool {
		matches!(self.inner.borrow().kind, NodeKind::Text { .. })
	}

	/// The element's tag name, or `None` for non-elements.
	pub fn tag(&self) -> Option<String> {
		match &self.inner.borrow().kind {
			NodeKind::Element { tag, .. } => Some(tag.clone()),
			_ => None,
		}
	}

	// -- builder surface -----------------------------------------------------

	/// Builder-style attribute setter.
	pub fn attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.set_attribute(name, value);
		self
	}

	/// Builder-style child append.
	pub fn child(self, node: Node) -> Self {
		self.append_child(node);
		self
	}

	// -- attributes ----------------------------------------------------------

	/// Sets an attribute, replacing any existing value for `name`.
	pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		if let NodeKind::Element { attributes, .. } = &mut self.inner.borrow_mut().kind {
			if let Some(entry) = attributes.iter_mut().find(|(n, _)| *n == name) {
				entry.1 = value;
			} else {
				attributes.push((name, value));
			}
		}
	}

	/// Enumerates the element's attributes as name/value pairs, in
	/// insertion order. Empty for non-elements.
	pub fn attributes(&self) -> Vec<(String, String)> {
		match &self.inner.borrow().kind {
			NodeKind::Element { attributes, .. } => attributes.clone(),
			_ => Vec::new(),
		}
	}

	/// Reads one attribute.
	pub fn attribute(&self, name: &str) -> Option<String> {
		self.attributes()
			.into_iter()
			.find(|(n, _)| n == name)
			.map(|(_, v)| v)
	}

	// -- children ------------------------------------------------------------

	/// Appends a child node.
	pub fn append_child(&self, node: Node) {
		self.inner.borrow_mut().children.push(node);
	}

	/// Moves all children out of this node, leaving it empty.
	pub fn take_children(&self) -> Vec<Node> {
		self.inner.borrow_mut().children.drain(..).collect()
	}

	/// Re-appends a detached collection in a single operation.
	pub fn append_children(&self, nodes: Vec<Node>) {
		self.inner.borrow_mut().children.extend(nodes);
	}

	/// Shared handles to the current children.
	pub fn children(&self) -> Vec<Node> {
		self.inner.borrow().children.clone()
	}

	// -- text sink -----------------------------------------------------------

	/// Text content of this node: a text node's own content, or an
	/// element's concatenated descendant text. `None` for fragments.
	pub fn text_content(&self) -> Option<String> {
		let data = self.inner.borrow();
		match &data.kind {
			NodeKind::Text { content } => Some(content.clone()),
			NodeKind::Element { .. } => Some(
				data.children
					.iter()
					.filter_map(|child| child.text_content())
					.collect(),
			),
			NodeKind::Fragment => None,
		}
	}

	/// Writes the text content. On a text node the content is replaced in
	/// place; on an element the children are replaced with a single fresh
	/// text node. No-op for fragments.
	pub fn set_text_content(&self, content: impl Into<String>) {
		let mut data = self.inner.borrow_mut();
		let data = &mut *data;
		match &mut data.kind {
			NodeKind::Text { content: slot } => *slot = content.into(),
			NodeKind::Element { .. } => {
				data.children.clear();
				data.children.push(Node::text(content));
			}
			NodeKind::Fragment => {}
		}
	}

	// -- value sink ----------------------------------------------------------

	/// The input-like value of an element. Empty for non-elements.
	pub fn value(&self) -> String {
		match &self.inner.borrow().kind {
			NodeKind::Element { value, .. } => value.clone(),
			_ => String::new(),
		}
	}

	/// Writes the input-like value of an element.
	pub fn set_value(&self, value: impl Into<String>) {
		if let NodeKind::Element { value: slot, .. } = &mut self.inner.borrow_mut().kind {
			*slot = value.into();
		}
	}

	// -- raw markup sink -----------------------------------------------------

	/// The raw markup last written into this element, if any.
	pub fn inner_html(&self) -> Option<String> {
		match &self.inner.borrow().kind {
			NodeKind::Element { inner_html, .. } => inner_html.clone(),
			_ => None,
		}
	}

	/// Writes raw markup into this element, verbatim. The value is not
	/// escaped or sanitized here or anywhere upstream.
	pub fn set_inner_html(&self, markup: impl Into<String>) {
		if let NodeKind::Element { inner_html, .. } = &mut self.inner.borrow_mut().kind {
			*inner_html = Some(markup.into());
		}
	}

	// -- events --------------------------------------------------------------

	/// Subscribes a listener for `event_type` on this node.
	pub fn add_event_listener(
		&self,
		event_type: impl Into<String>,
		listener: impl Fn(&Event) -> Result<()> + 'static,
	) {
		if let NodeKind::Element { listeners, .. } = &mut self.inner.borrow_mut().kind {
			listeners.push((event_type.into(), Rc::new(listener)));
		}
	}

	/// Dispatches an event to every listener registered for its type, in
	/// registration order. The first listener error aborts the remaining
	/// ones and propagates to the dispatcher.
	pub fn dispatch(&self, event: &Event) -> Result<()> {
		// Snapshot so listeners may mutate this node (e.g. a model binding
		// writing the value back) without overlapping the borrow.
		let listeners: Vec<EventListener> = match &self.inner.borrow().kind {
			NodeKind::Element { listeners, .. } => listeners
				.iter()
				.filter(|(name, _)| *name == event.event_type)
				.map(|(_, l)| Rc::clone(l))
				.collect(),
			_ => Vec::new(),
		};
		for listener in listeners {
			listener(event)?;
		}
		Ok(())
	}
}

impl std::fmt::Debug for Node {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let data = self.inner.borrow();
		match &data.kind {
			NodeKind::Element { tag, attributes, .. } => f
				.debug_struct("Element")
				.field("tag", tag)
				.field("attributes", attributes)
				.field("children", &data.children.len())
				.finish(),
			NodeKind::Text { content } => f.debug_tuple("Text").field(content).finish(),
			NodeKind::Fragment => f
				.debug_struct("Fragment")
				.field("children", &data.children.len())
				.finish(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn children_move_out_and_back_preserving_identity() {
		let root = Node::element("div").child(Node::text("a")).child(Node::text("b"));
		let before = root.children();

		let fragment = Node::fragment();
		fragment.append_children(root.take_children());
		assert!(root.children().is_empty());
		assert_eq!(fragment.children().len(), 2);

		root.append_children(fragment.take_children());
		let after = root.children();
		assert_eq!(after.len(), 2);
		for (a, b) in before.iter().zip(after.iter()) {
			assert!(a.ptr_eq(b), "nodes are moved, not cloned");
		}
	}

	#[test]
	fn set_attribute_replaces_existing() {
		let node = Node::element("input").attr("type", "text");
		node.set_attribute("type", "number");
		assert_eq!(node.attribute("type").as_deref(), Some("number"));
		assert_eq!(node.attributes().len(), 1);
	}

	#[test]
	fn dispatch_invokes_matching_listeners_in_order() {
		let node = Node::element("button");
		let order = Rc::new(RefCell::new(Vec::new()));

		for id in [1, 2] {
			let order = Rc::clone(&order);
			node.add_event_listener("click", move |_| {
				order.borrow_mut().push(id);
				Ok(())
			});
		}
		node.add_event_listener("input", |_| panic!("wrong event type"));

		node.dispatch(&Event::new("click")).unwrap();
		assert_eq!(*order.borrow(), vec![1, 2]);
	}

	#[test]
	fn listener_may_mutate_its_own_node() {
		let node = Node::element("input");
		let handle = node.clone();
		node.add_event_listener("input", move |event| {
			handle.set_value(&event.value);
			Ok(())
		});
		node.dispatch(&Event::input("Cy")).unwrap();
		assert_eq!(node.value(), "Cy");
	}

	#[test]
	fn element_text_content_replaces_children() {
		let node = Node::element("span")
			.child(Node::text("old"))
			.child(Node::element("b").child(Node::text("bold")));
		assert_eq!(node.text_content().as_deref(), Some("oldbold"));

		node.set_text_content("new");
		assert_eq!(node.children().len(), 1);
		assert!(node.children()[0].is_text());
		assert_eq!(node.text_content().as_deref(), Some("new"));
	}

	#[test]
	fn raw_markup_is_stored_verbatim() {
		let node = Node::element("div");
		node.set_inner_html("<b>hi</b>");
		assert_eq!(node.inner_html().as_deref(), Some("<b>hi</b>"));
	}
}
