//! The live view state and the mutation entry points the canvas calls.

use std::collections::HashSet;

use log::{debug, info};

use super::document::GraphDocument;
use super::edges::{Lookups, classify_endpoint, compute_edges};
use super::error::GraphError;
use super::expansion::{toggle_folder, toggle_node_by_id, toggle_section_by_id};
use super::extraction::{dock, extract, snap_back};
use super::layout::{LayoutConfig, layout_roots};
use super::model::{EdgeOrigin, FlowEdge, Relationship};
use super::palette::USER_EDGE_STROKE;
use super::parser::parse;
use super::visual::{Position, VisualKind, VisualNode, find};

/// A connect gesture: card ids plus the row handles it started and ended on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Connection {
	/// Card the gesture started on.
	pub source: String,
	/// Card the gesture ended on.
	pub target: String,
	/// Row handle at the start, `{id}-source`.
	pub source_handle: Option<String>,
	/// Row handle at the end, `{id}-target`.
	pub target_handle: Option<String>,
}

/// Visual nodes, relationships, user edges and extraction state of one
/// loaded document.
///
/// Every entry point leaves `nodes` and `edges` fully recomputed.
#[derive(Clone, Debug)]
pub struct GraphSession {
	config: LayoutConfig,
	nodes: Vec<VisualNode>,
	relationships: Vec<Relationship>,
	user_edges: Vec<FlowEdge>,
	extracted: HashSet<String>,
	edges: Vec<FlowEdge>,
	next_user_edge: u64,
}

impl GraphSession {
	/// Parses, lays out and resolves `document`.
	pub fn load(document: &GraphDocument, config: LayoutConfig) -> Self {
		let parsed = parse(document);
		let nodes = layout_roots(&parsed.roots, &config);
		info!(
			"loaded graph: {} cards, {} relationships",
			nodes.len(),
			parsed.relationships.len()
		);
		let mut session = Self {
			config,
			nodes,
			relationships: parsed.relationships,
			user_edges: Vec::new(),
			extracted: HashSet::new(),
			edges: Vec::new(),
			next_user_edge: 0,
		};
		session.refresh();
		session
	}

	/// Decodes JSON and loads it with the default layout.
	pub fn from_json(text: &str) -> Result<Self, GraphError> {
		Ok(Self::load(&GraphDocument::from_json(text)?, LayoutConfig::default()))
	}

	/// Folders and cards in draw order.
	pub fn nodes(&self) -> &[VisualNode] {
		&self.nodes
	}

	/// Relationship edges followed by user edges.
	pub fn edges(&self) -> &[FlowEdge] {
		&self.edges
	}

	/// Layout settings the session was loaded with.
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	/// Whether card `id` is currently out of its folder.
	pub fn is_extracted(&self, id: &str) -> bool {
		self.extracted.contains(id)
	}

	fn refresh(&mut self) {
		snap_back(&mut self.nodes, &self.extracted);
		self.edges = compute_edges(&self.nodes, &self.relationships);
		self.edges.extend(self.user_edges.iter().cloned());
	}

	/// Expands or collapses the node `id`, at any depth.
	///
	/// Collapsing an extracted card docks it back into its folder.
	pub fn toggle_node(&mut self, id: &str) -> bool {
		if let Some(docked) = dock(&self.nodes, id, &self.extracted) {
			self.extracted.remove(id);
			self.nodes = docked;
			self.refresh();
			return true;
		}

		let mut changed = false;
		for node in self.nodes.iter_mut() {
			let VisualKind::Expandable(graph) = &node.kind else {
				continue;
			};
			let (next, hit) = toggle_node_by_id(graph, id);
			if hit {
				node.kind = VisualKind::Expandable(next);
				changed = true;
				break;
			}
		}
		if changed {
			debug!("toggled node {id}");
			self.refresh();
		}
		changed
	}

	/// Expands or collapses section `section_id` inside card `parent_node_id`.
	pub fn toggle_section(&mut self, parent_node_id: &str, section_id: &str) -> bool {
		let Some(node) = self.nodes.iter_mut().find(|n| n.id == parent_node_id) else {
			return false;
		};
		let VisualKind::Expandable(graph) = &node.kind else {
			return false;
		};
		let (next, changed) = toggle_section_by_id(graph, section_id);
		if changed {
			node.kind = VisualKind::Expandable(next);
			debug!("toggled section {section_id} in {parent_node_id}");
			self.refresh();
		}
		changed
	}

	/// Expands or collapses a folder, hiding or revealing its contents.
	pub fn toggle_folder(&mut self, folder_id: &str) -> bool {
		match toggle_folder(&self.nodes, folder_id, &self.extracted, &self.config) {
			Some(next) => {
				self.nodes = next;
				debug!("toggled folder {folder_id}");
				self.refresh();
				true
			}
			None => false,
		}
	}

	/// Pulls card `id` out of its folder onto free canvas.
	pub fn extract_node(&mut self, id: &str) -> bool {
		match extract(&self.nodes, id, &self.extracted) {
			Some(next) => {
				self.nodes = next;
				self.extracted.insert(id.to_string());
				self.refresh();
				true
			}
			None => false,
		}
	}

	/// Records a user-drawn edge and returns its id.
	pub fn add_user_edge(&mut self, connection: Connection) -> String {
		self.next_user_edge += 1;
		let id = format!("user-edge-{}", self.next_user_edge);
		let lookups = Lookups::build(&self.nodes);
		let (from, source_kind) = classify_endpoint(
			&lookups,
			&connection.source,
			connection.source_handle.as_deref(),
		);
		let (to, target_kind) = classify_endpoint(
			&lookups,
			&connection.target,
			connection.target_handle.as_deref(),
		);
		info!("user edge {id}: {from} ({source_kind:?}) -> {to} ({target_kind:?})");
		let edge = FlowEdge {
			id: id.clone(),
			source: connection.source,
			target: connection.target,
			source_handle: connection.source_handle,
			target_handle: connection.target_handle,
			stroke: USER_EDGE_STROKE.to_string(),
			stroke_width: 2.0,
			arrow: true,
			origin: EdgeOrigin::User,
			source_kind,
			target_kind,
			..FlowEdge::default()
		};
		self.user_edges.push(edge);
		self.refresh();
		id
	}

	/// Drags card `id` to `position`. Only free-floating cards move; anything
	/// still in a container snaps back.
	pub fn move_node(&mut self, id: &str, position: Position) -> bool {
		let moved = match self.nodes.iter_mut().find(|n| n.id == id) {
			Some(node) if node.draggable && node.parent_id.is_none() => {
				node.position = position;
				true
			}
			_ => false,
		};
		self.refresh();
		moved
	}

	/// Looks up a visual node by id.
	pub fn node(&self, id: &str) -> Option<&VisualNode> {
		find(&self.nodes, id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::edges::EndpointKind;
	use crate::graph::visual::ROOT_FOLDER_ID;
	use pretty_assertions::assert_eq;
	use std::sync::Arc;

	const DOC: &str = r#"{
		"nodes": [
			{"id": "a", "name": "app", "type": "file", "scope": []},
			{"id": "b", "name": "run", "type": "function", "scope": ["a"]},
			{"id": "c", "name": "util", "type": "file", "scope": []},
			{"id": "d", "name": "helper", "type": "function"}
		],
		"edges": [
			{"source": "c", "target": "d", "relation": "contains"},
			{"source": "b", "target": "d", "relation": "calls"},
			{"source": "a", "target": "c", "relation": "uses"}
		]
	}"#;

	fn session() -> GraphSession {
		GraphSession::from_json(DOC).unwrap()
	}

	fn edge_ends(session: &GraphSession) -> Vec<(&str, &str, Option<&str>, Option<&str>)> {
		session
			.edges()
			.iter()
			.map(|e| {
				(
					e.source.as_str(),
					e.target.as_str(),
					e.source_handle.as_deref(),
					e.target_handle.as_deref(),
				)
			})
			.collect()
	}

	#[test]
	fn load_builds_cards_and_collapsed_edges() {
		let s = session();
		let ids: Vec<&str> = s.nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec![ROOT_FOLDER_ID, "a", "c"]);
		assert_eq!(edge_ends(&s), vec![("a", "c", None, None)]);
	}

	#[test]
	fn toggling_nodes_reroutes_edges() {
		let mut s = session();
		assert!(s.toggle_node("a"));
		assert!(s.toggle_node("c"));
		assert_eq!(edge_ends(&s), vec![("a", "c", Some("b-source"), Some("d-target"))]);
		assert_eq!(s.edges()[0].stroke, "#ff9800");

		// Nested toggles reach into cards.
		assert!(s.toggle_node("b"));
		let a = s.node("a").unwrap().graph_node().unwrap();
		assert!(a.subnodes[0].expanded);
		assert!(!s.toggle_node("ghost"));
	}

	#[test]
	fn unaffected_cards_keep_their_tree() {
		let mut s = session();
		let before = Arc::clone(s.node("c").unwrap().graph_node().unwrap());
		s.toggle_node("b");
		let after = s.node("c").unwrap().graph_node().unwrap();
		assert!(Arc::ptr_eq(&before, after));
	}

	#[test]
	fn extract_and_collapse_docks_back() {
		let mut s = session();
		let home = s.node("c").unwrap().clone();
		assert!(s.extract_node("c"));
		assert!(s.is_extracted("c"));
		assert!(!s.extract_node("c"));

		assert!(s.move_node("c", Position::new(1500.0, 40.0)));
		assert_eq!(s.node("c").unwrap().position, Position::new(1500.0, 40.0));

		assert!(s.toggle_node("c"));
		assert!(!s.is_extracted("c"));
		assert_eq!(s.node("c").unwrap(), &home);
	}

	#[test]
	fn contained_cards_snap_back_after_drag() {
		let mut s = session();
		let home = s.node("a").unwrap().position;
		assert!(!s.move_node("a", Position::new(999.0, 999.0)));
		assert_eq!(s.node("a").unwrap().position, home);
	}

	#[test]
	fn folder_collapse_spares_extracted_cards() {
		let mut s = session();
		s.extract_node("c");
		assert!(s.toggle_folder(ROOT_FOLDER_ID));
		assert!(s.node("a").unwrap().hidden);
		assert!(!s.node("c").unwrap().hidden);
		assert!(s.toggle_folder(ROOT_FOLDER_ID));
		assert!(!s.node("a").unwrap().hidden);
		assert!(!s.toggle_folder("a"));
	}

	#[test]
	fn user_edges_are_appended_and_never_deduplicated() {
		let mut s = session();
		let connection = Connection {
			source: "a".into(),
			target: "c".into(),
			..Connection::default()
		};
		let first = s.add_user_edge(connection.clone());
		let second = s.add_user_edge(connection);
		assert_ne!(first, second);
		let user: Vec<&FlowEdge> = s
			.edges()
			.iter()
			.filter(|e| e.origin == EdgeOrigin::User)
			.collect();
		assert_eq!(user.len(), 2);
		assert_eq!(s.edges().len(), 3);
		assert_eq!(user[0].stroke, USER_EDGE_STROKE);
		assert!(user[0].arrow);
		assert_eq!((user[0].source_kind, user[0].target_kind), (EndpointKind::Node, EndpointKind::Node));

		// Survive a recompute.
		s.toggle_node("a");
		assert_eq!(s.edges().len(), 3);
		assert_eq!(s.edges()[2].id, second);
	}

	#[test]
	fn user_edge_records_row_endpoint_kinds() {
		let mut s = session();
		s.toggle_node("a");
		s.add_user_edge(Connection {
			source: "a".into(),
			target: "c".into(),
			source_handle: Some("b-source".into()),
			target_handle: None,
		});
		let edge = s.edges().iter().find(|e| e.origin == EdgeOrigin::User).unwrap();
		assert_eq!(edge.source_kind, EndpointKind::Subnode);
		assert_eq!(edge.target_kind, EndpointKind::Node);
		assert_eq!(edge.source_handle.as_deref(), Some("b-source"));
	}

	#[test]
	fn toggle_section_requires_the_owning_card() {
		let doc = r#"{"nodes": [{"id": "m", "name": "Net", "sections": [
			{"id": "in", "name": "Inputs", "subnodes": [{"id": "x"}]}
		]}], "edges": []}"#;
		let mut s = GraphSession::from_json(doc).unwrap();
		assert!(!s.toggle_section("ghost", "in"));
		assert!(!s.toggle_section("m", "out"));
		assert!(s.toggle_section("m", "in"));
		let m = s.node("m").unwrap().graph_node().unwrap();
		assert!(m.sections[0].expanded);
	}
}
