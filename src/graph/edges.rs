//! Resolves relationship endpoints to what is currently visible on the canvas.

use std::collections::{HashMap, HashSet};

use super::model::{EdgeOrigin, FlowEdge, GraphNode, Relationship, Section};
use super::palette::{NEUTRAL_EDGE_STROKE, SECTION_EDGE_STROKE, SUBNODE_EDGE_STROKE};
use super::visual::VisualNode;

/// Bound on parent-chain walks; the containment tree is never this deep.
const MAX_DEPTH: usize = 50;

/// Which end of an edge a handle belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
	/// Outgoing end.
	Source,
	/// Incoming end.
	Target,
}

impl Side {
	/// Suffix used in handle ids.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Source => "source",
			Self::Target => "target",
		}
	}
}

/// Handle id for an element row: `{id}-source` or `{id}-target`.
pub fn handle_id(element_id: &str, side: Side) -> String {
	format!("{element_id}-{}", side.as_str())
}

/// Strips a trailing `-source`/`-target` from a handle id.
pub fn handle_base(handle: &str) -> &str {
	handle
		.strip_suffix("-source")
		.or_else(|| handle.strip_suffix("-target"))
		.unwrap_or(handle)
}

/// An id looked up in the current tree.
#[derive(Clone, Copy, Debug)]
pub enum Element<'a> {
	/// A node, and whether its row or card is currently drawn.
	Node {
		/// The node.
		node: &'a GraphNode,
		/// Drawn under the current expand state.
		visible: bool,
	},
	/// A section, and whether its row is currently drawn.
	Section {
		/// The section.
		section: &'a Section,
		/// Drawn under the current expand state.
		visible: bool,
	},
	/// Neither a node nor a section.
	Unknown,
}

/// What an endpoint ended up attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointKind {
	/// A top-level card.
	Node,
	/// A row for a nested node.
	Subnode,
	/// A row for a section.
	Section,
	/// An id that is in no card.
	Unknown,
}

/// A resolved endpoint: top-level card id plus optional row handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
	/// Id of the top-level card the edge attaches to.
	pub id: String,
	/// Row handle inside that card, if any.
	pub handle: Option<String>,
	/// What the endpoint resolved to.
	pub kind: EndpointKind,
}

/// Id indexes over every node and section held by the visual nodes, with
/// their visibility under the current expand/collapse state.
#[derive(Debug, Default)]
pub struct Lookups<'a> {
	nodes: HashMap<&'a str, (&'a GraphNode, bool)>,
	sections: HashMap<&'a str, (&'a Section, bool)>,
}

impl<'a> Lookups<'a> {
	/// Indexes every node and section reachable from `visual`.
	pub fn build(visual: &'a [VisualNode]) -> Self {
		let mut lookups = Self::default();
		for node in visual.iter().filter_map(VisualNode::graph_node) {
			lookups.walk(node, true);
		}
		lookups
	}

	fn walk(&mut self, node: &'a GraphNode, visible: bool) {
		self.nodes.insert(node.id.as_str(), (node, visible));
		let inner = visible && node.expanded;
		for section in &node.sections {
			self.sections.insert(section.id.as_str(), (section, inner));
			for sub in &section.subnodes {
				self.walk(sub, inner && section.expanded);
			}
		}
		for sub in &node.subnodes {
			self.walk(sub, inner);
		}
	}

	/// Tells whether `id` names a node, a section, or nothing known.
	pub fn classify(&self, id: &str) -> Element<'a> {
		if let Some(&(node, visible)) = self.nodes.get(id) {
			return Element::Node { node, visible };
		}
		if let Some(&(section, visible)) = self.sections.get(id) {
			return Element::Section { section, visible };
		}
		Element::Unknown
	}

	/// Node named `id`, visible or not.
	pub fn node(&self, id: &str) -> Option<&'a GraphNode> {
		self.nodes.get(id).map(|(node, _)| *node)
	}

	/// Nearest visible element at or above `id`.
	fn visible_element(&self, id: &str) -> Element<'a> {
		let mut current = self.classify(id);
		for _ in 0..MAX_DEPTH {
			let parent = match current {
				Element::Node { visible: true, .. }
				| Element::Section { visible: true, .. }
				| Element::Unknown => return current,
				Element::Node { node, .. } => node
					.parent_section_id
					.as_deref()
					.or(node.parent_node_id.as_deref()),
				Element::Section { section, .. } => section.parent_node_id.as_deref(),
			};
			match parent.map(|p| self.classify(p)) {
				Some(Element::Unknown) | None => return current,
				Some(next) => current = next,
			}
		}
		current
	}

	/// Outermost ancestor of `node` reachable through `parent_node_id`.
	fn host(&self, node: &'a GraphNode) -> &'a GraphNode {
		let mut current = node;
		for _ in 0..MAX_DEPTH {
			match current.parent_node_id.as_deref().and_then(|p| self.node(p)) {
				Some(parent) => current = parent,
				None => break,
			}
		}
		current
	}

	/// Resolves one relationship endpoint against the visible tree.
	pub fn resolve(&self, element_id: &str, side: Side) -> Endpoint {
		match self.visible_element(element_id) {
			Element::Node { node, .. } => {
				let host = self.host(node);
				let nested = node.is_nested();
				Endpoint {
					id: host.id.clone(),
					handle: nested.then(|| handle_id(&node.id, side)),
					kind: if nested {
						EndpointKind::Subnode
					} else {
						EndpointKind::Node
					},
				}
			}
			Element::Section { section, .. } => {
				let owner = section.parent_node_id.as_deref();
				let id = owner
					.and_then(|o| self.node(o))
					.map(|o| self.host(o).id.clone())
					.or_else(|| owner.map(str::to_string))
					.unwrap_or_else(|| section.id.clone());
				Endpoint {
					id,
					handle: Some(handle_id(&section.id, side)),
					kind: EndpointKind::Section,
				}
			}
			Element::Unknown => Endpoint {
				id: element_id.to_string(),
				handle: None,
				kind: EndpointKind::Unknown,
			},
		}
	}
}

/// Classifies a connection end given its card id and optional row handle.
pub fn classify_endpoint(lookups: &Lookups<'_>, node_id: &str, handle: Option<&str>) -> (String, EndpointKind) {
	let base = handle.map(handle_base).unwrap_or(node_id);
	let kind = match lookups.classify(base) {
		Element::Section { .. } => EndpointKind::Section,
		Element::Node { node, .. } if node.is_nested() => EndpointKind::Subnode,
		Element::Node { .. } => EndpointKind::Node,
		Element::Unknown => EndpointKind::Unknown,
	};
	(base.to_string(), kind)
}

fn derived_stroke(source: EndpointKind, target: EndpointKind) -> &'static str {
	let either = |kind| source == kind || target == kind;
	if either(EndpointKind::Section) {
		SECTION_EDGE_STROKE
	} else if either(EndpointKind::Subnode) {
		SUBNODE_EDGE_STROKE
	} else {
		NEUTRAL_EDGE_STROKE
	}
}

/// Resolves every relationship and drops later duplicates of the same
/// (source card, target card, relation).
pub fn compute_edges(visual: &[VisualNode], relationships: &[Relationship]) -> Vec<FlowEdge> {
	let lookups = Lookups::build(visual);
	let mut seen = HashSet::new();
	let mut edges = Vec::new();

	for rel in relationships {
		let source = lookups.resolve(&rel.source, Side::Source);
		let target = lookups.resolve(&rel.target, Side::Target);
		if !seen.insert((source.id.clone(), target.id.clone(), rel.relation.clone())) {
			continue;
		}
		let stroke = rel
			.style
			.stroke
			.clone()
			.unwrap_or_else(|| derived_stroke(source.kind, target.kind).to_string());
		edges.push(FlowEdge {
			id: rel.id.clone(),
			source: source.id,
			target: target.id,
			source_handle: source.handle,
			target_handle: target.handle,
			label: Some(rel.relation.clone()),
			stroke,
			stroke_width: rel.style.stroke_width,
			label_style: Some(rel.label_style.clone()),
			arrow: false,
			origin: EdgeOrigin::Relationship,
			source_kind: source.kind,
			target_kind: target.kind,
		});
	}
	edges
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::expansion::{toggle_node_by_id, toggle_section_by_id};
	use crate::graph::layout::{LayoutConfig, layout_roots};
	use crate::graph::palette::NodeType;
	use crate::graph::visual::VisualKind;
	use pretty_assertions::assert_eq;
	use std::sync::Arc;

	/// a { subnodes: [b { subnodes: [b2] }], sections: [sa: [s1]] }, c
	fn visual() -> Vec<VisualNode> {
		let b2 = GraphNode {
			parent_node_id: Some("b".into()),
			..GraphNode::new("b2", "b2", NodeType::Variable)
		};
		let b = GraphNode {
			parent_node_id: Some("a".into()),
			subnodes: vec![Arc::new(b2)],
			..GraphNode::new("b", "b", NodeType::Function)
		};
		let s1 = GraphNode {
			parent_node_id: Some("a".into()),
			parent_section_id: Some("sa".into()),
			..GraphNode::new("s1", "s1", NodeType::Method)
		};
		let a = GraphNode {
			subnodes: vec![Arc::new(b)],
			sections: vec![Arc::new(Section {
				id: "sa".into(),
				name: "Methods".into(),
				color: "#9c27b0",
				expanded: false,
				subnodes: vec![Arc::new(s1)],
				parent_node_id: Some("a".into()),
			})],
			..GraphNode::new("a", "a", NodeType::File)
		};
		let c = GraphNode::new("c", "c", NodeType::File);
		layout_roots(&[Arc::new(a), Arc::new(c)], &LayoutConfig::default())
	}

	fn update(nodes: &mut [VisualNode], f: impl Fn(&Arc<GraphNode>) -> (Arc<GraphNode>, bool)) {
		for node in nodes.iter_mut() {
			if let VisualKind::Expandable(graph) = &node.kind {
				let (next, _) = f(graph);
				node.kind = VisualKind::Expandable(next);
			}
		}
	}

	fn summary(edges: &[FlowEdge]) -> Vec<(&str, &str, Option<&str>, Option<&str>, &str)> {
		edges
			.iter()
			.map(|e| {
				(
					e.source.as_str(),
					e.target.as_str(),
					e.source_handle.as_deref(),
					e.target_handle.as_deref(),
					e.stroke.as_str(),
				)
			})
			.collect()
	}

	#[test]
	fn collapsed_source_routes_to_its_host_without_handles() {
		let edges = compute_edges(&visual(), &[Relationship::new("edge-0", "b", "zzz", "calls")]);
		assert_eq!(summary(&edges), vec![("a", "zzz", None, None, "#999")]);
		assert_eq!(edges[0].label.as_deref(), Some("calls"));
	}

	#[test]
	fn visible_subnode_gets_a_handle_and_orange_stroke() {
		let mut nodes = visual();
		update(&mut nodes, |n| toggle_node_by_id(n, "a"));
		let edges = compute_edges(&nodes, &[Relationship::new("edge-0", "b", "c", "calls")]);
		assert_eq!(
			summary(&edges),
			vec![("a", "c", Some("b-source"), None, "#ff9800")]
		);
	}

	#[test]
	fn hidden_grandchild_stops_at_nearest_visible_row() {
		let mut nodes = visual();
		update(&mut nodes, |n| toggle_node_by_id(n, "a"));
		let edges = compute_edges(&nodes, &[Relationship::new("edge-0", "c", "b2", "reads")]);
		assert_eq!(
			summary(&edges),
			vec![("c", "a", None, Some("b-target"), "#ff9800")]
		);

		update(&mut nodes, |n| toggle_node_by_id(n, "b"));
		let edges = compute_edges(&nodes, &[Relationship::new("edge-0", "c", "b2", "reads")]);
		assert_eq!(edges[0].target_handle.as_deref(), Some("b2-target"));
	}

	#[test]
	fn section_member_redirects_to_section_then_itself() {
		let mut nodes = visual();
		let rel = [Relationship::new("edge-0", "s1", "c", "calls")];

		update(&mut nodes, |n| toggle_node_by_id(n, "a"));
		let edges = compute_edges(&nodes, &rel);
		assert_eq!(
			summary(&edges),
			vec![("a", "c", Some("sa-source"), None, "#00c853")]
		);

		update(&mut nodes, |n| toggle_section_by_id(n, "sa"));
		let edges = compute_edges(&nodes, &rel);
		assert_eq!(
			summary(&edges),
			vec![("a", "c", Some("s1-source"), None, "#ff9800")]
		);
	}

	#[test]
	fn explicit_stroke_wins_over_derived() {
		let mut nodes = visual();
		update(&mut nodes, |n| toggle_node_by_id(n, "a"));
		let edges = compute_edges(&nodes, &[Relationship::new("edge-0", "b", "c", "imports")]);
		assert_eq!(edges[0].stroke, "blue");
	}

	#[test]
	fn duplicates_after_resolution_collapse_to_the_first() {
		let rels = [
			Relationship::new("edge-0", "b", "c", "calls"),
			Relationship::new("edge-1", "a", "c", "calls"),
			Relationship::new("edge-2", "b2", "c", "calls"),
			Relationship::new("edge-3", "a", "c", "reads"),
		];
		let edges = compute_edges(&visual(), &rels);
		let ids: Vec<&str> = edges.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, vec!["edge-0", "edge-3"]);
	}

	#[test]
	fn classify_endpoint_strips_handle_suffix() {
		let nodes = visual();
		let lookups = Lookups::build(&nodes);
		assert_eq!(
			classify_endpoint(&lookups, "a", Some("sa-source")),
			("sa".to_string(), EndpointKind::Section)
		);
		assert_eq!(
			classify_endpoint(&lookups, "a", Some("b-target")),
			("b".to_string(), EndpointKind::Subnode)
		);
		assert_eq!(classify_endpoint(&lookups, "c", None), ("c".to_string(), EndpointKind::Node));
		assert_eq!(
			classify_endpoint(&lookups, "ghost", None),
			("ghost".to_string(), EndpointKind::Unknown)
		);
	}
}
