//! Immutable containment tree and relationship records.

use std::sync::Arc;

use super::edges::EndpointKind;
use super::palette::{NEUTRAL_EDGE_STROKE, NodeType, RelationStyle};

/// A code element with its nested children.
///
/// Children are shared handles: a toggle rebuilds only the path to the changed
/// node, every other branch stays the same allocation.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Unique id from the document.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Parsed `type` field.
	pub node_type: NodeType,
	/// Ancestor ids, outermost first.
	pub scope: Vec<String>,
	/// Typed groups of children, in display order.
	pub sections: Vec<Arc<Section>>,
	/// Children outside any section, in display order.
	pub subnodes: Vec<Arc<GraphNode>>,
	/// Whether the children are drawn.
	pub expanded: bool,
	/// Header color for the node type.
	pub color: &'static str,
	/// Owning node, `None` for roots.
	pub parent_node_id: Option<String>,
	/// Owning section when the node is a section member.
	pub parent_section_id: Option<String>,
}

impl GraphNode {
	/// A childless, collapsed node colored by its type.
	pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
		let color = node_type.color();
		Self {
			id: id.into(),
			name: name.into(),
			node_type,
			scope: Vec::new(),
			sections: Vec::new(),
			subnodes: Vec::new(),
			expanded: false,
			color,
			parent_node_id: None,
			parent_section_id: None,
		}
	}

	/// True when the node sits inside another node.
	pub fn is_nested(&self) -> bool {
		self.parent_node_id.is_some()
	}

	/// Same node with `expanded` forced; returns `self` untouched when it already matches.
	pub fn with_expanded(self: &Arc<Self>, expanded: bool) -> Arc<Self> {
		if self.expanded == expanded {
			return Arc::clone(self);
		}
		Arc::new(Self {
			expanded,
			..(**self).clone()
		})
	}
}

/// A typed group of child nodes owned by one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
	/// Section id.
	pub id: String,
	/// Heading, e.g. `Methods`.
	pub name: String,
	/// Row accent color.
	pub color: &'static str,
	/// Independent of the owner's flag.
	pub expanded: bool,
	/// Member nodes, in display order.
	pub subnodes: Vec<Arc<GraphNode>>,
	/// Node that owns the section.
	pub parent_node_id: Option<String>,
}

/// Line styling of a rendered edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	/// Explicit stroke; `None` means "derive from endpoint kinds".
	pub stroke: Option<String>,
	/// Line width in canvas units.
	pub stroke_width: f64,
}

/// Styling of the relation label drawn on an edge.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelStyle {
	/// Text color.
	pub fill: String,
	/// Pill background.
	pub background: String,
	/// Pill border.
	pub border: String,
	/// Font size in px.
	pub font_size: f64,
}

impl LabelStyle {
	fn from_relation(style: &RelationStyle) -> Self {
		Self {
			fill: style.label_color.to_string(),
			background: style.label_bg.to_string(),
			border: style.label_border.to_string(),
			font_size: 11.0,
		}
	}
}

/// A labeled link between two node or section ids, outside the containment tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Relationship {
	/// `edge-{index}` in document edge order.
	pub id: String,
	/// Source node or section id.
	pub source: String,
	/// Target node or section id.
	pub target: String,
	/// Relation name, also the edge label.
	pub relation: String,
	/// Line styling.
	pub style: EdgeStyle,
	/// Label styling.
	pub label_style: LabelStyle,
}

impl Relationship {
	/// Builds a relationship styled from the relation table.
	pub fn new(
		id: impl Into<String>,
		source: impl Into<String>,
		target: impl Into<String>,
		relation: impl Into<String>,
	) -> Self {
		let relation = relation.into();
		let style = super::palette::relation_style(&relation);
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			style: EdgeStyle {
				stroke: style.stroke.map(str::to_string),
				stroke_width: 1.0,
			},
			label_style: LabelStyle::from_relation(&style),
			relation,
		}
	}
}

/// Where an edge was drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeOrigin {
	/// Resolved from a document relationship.
	Relationship,
	/// Drawn by the user on the canvas.
	User,
}

/// An edge ready to draw: endpoints resolved to visible elements.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowEdge {
	/// Relationship id or `user-edge-{n}`.
	pub id: String,
	/// Top-level visual node the edge leaves from.
	pub source: String,
	/// Top-level visual node the edge enters.
	pub target: String,
	/// Row inside the source card, `{element id}-source`.
	pub source_handle: Option<String>,
	/// Row inside the target card, `{element id}-target`.
	pub target_handle: Option<String>,
	/// Text drawn at the midpoint.
	pub label: Option<String>,
	/// Line color.
	pub stroke: String,
	/// Line width in canvas units.
	pub stroke_width: f64,
	/// Label styling, when labeled.
	pub label_style: Option<LabelStyle>,
	/// Draw an arrowhead at the target.
	pub arrow: bool,
	/// Relationship or user edge.
	pub origin: EdgeOrigin,
	/// What the source end is attached to.
	pub source_kind: EndpointKind,
	/// What the target end is attached to.
	pub target_kind: EndpointKind,
}

impl Default for FlowEdge {
	fn default() -> Self {
		Self {
			id: String::new(),
			source: String::new(),
			target: String::new(),
			source_handle: None,
			target_handle: None,
			label: None,
			stroke: NEUTRAL_EDGE_STROKE.to_string(),
			stroke_width: 1.0,
			label_style: None,
			arrow: false,
			origin: EdgeOrigin::Relationship,
			source_kind: EndpointKind::Node,
			target_kind: EndpointKind::Node,
		}
	}
}
