//! Turns the flat document into a containment forest.
//!
//! Nodes are first collected into a mutable draft arena keyed by id, attached
//! to parents (scope first, then "contains" edges), annotated, and only then
//! frozen into the shared [`GraphNode`] tree.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, warn};

use super::document::{CONTAINS, GraphDocument, RawEdge, RawNode, RawSection, USES};
use super::hierarchy::annotate_hierarchy;
use super::model::{GraphNode, Relationship, Section};
use super::palette::{DEFAULT_NODE_COLOR, NodeType, display_order, section_color};

/// A node while the forest is still being assembled.
#[derive(Clone, Debug)]
pub(crate) struct DraftNode {
	pub id: String,
	pub name: String,
	pub node_type: NodeType,
	pub scope: Vec<String>,
	pub subnodes: Vec<String>,
	pub sections: Vec<DraftSection>,
	pub parent_node_id: Option<String>,
	pub parent_section_id: Option<String>,
}

#[derive(Clone, Debug)]
pub(crate) struct DraftSection {
	pub id: String,
	pub name: String,
	pub members: Vec<String>,
	pub parent_node_id: Option<String>,
}

/// Arena of draft nodes plus registration order.
#[derive(Debug, Default)]
pub(crate) struct DraftForest {
	pub nodes: HashMap<String, DraftNode>,
	pub order: Vec<String>,
	pub section_ids: HashSet<String>,
}

impl DraftForest {
	fn register(&mut self, raw: &RawNode) -> bool {
		if self.nodes.contains_key(&raw.id) {
			warn!("duplicate node id {:?}, keeping the first record", raw.id);
			return false;
		}
		let mut draft = DraftNode {
			id: raw.id.clone(),
			name: raw.display_name().to_string(),
			node_type: NodeType::parse(raw.node_type.as_deref().unwrap_or_default()),
			scope: raw.scope.clone(),
			subnodes: Vec::new(),
			sections: Vec::new(),
			parent_node_id: None,
			parent_section_id: None,
		};
		self.order.push(raw.id.clone());
		self.nodes.insert(raw.id.clone(), draft.clone());

		for section in &raw.sections {
			if let Some(section) = self.register_section(&raw.id, section) {
				draft.sections.push(section);
			}
		}
		if let Some(node) = self.nodes.get_mut(&raw.id) {
			node.sections = draft.sections;
		}
		true
	}

	fn register_section(&mut self, owner: &str, raw: &RawSection) -> Option<DraftSection> {
		if !self.section_ids.insert(raw.id.clone()) {
			warn!("duplicate section id {:?} on {:?}, skipped", raw.id, owner);
			return None;
		}
		let mut members = Vec::new();
		for member in &raw.subnodes {
			if self.register(member) {
				members.push(member.id.clone());
			}
		}
		Some(DraftSection {
			id: raw.id.clone(),
			name: raw.name.clone().unwrap_or_else(|| raw.id.clone()),
			members,
			parent_node_id: Some(owner.to_string()),
		})
	}

	fn attach(&mut self, parent_id: &str, child_id: &str) {
		if let Some(child) = self.nodes.get_mut(child_id) {
			child.parent_node_id = Some(parent_id.to_string());
			child.parent_section_id = None;
		}
		if let Some(parent) = self.nodes.get_mut(parent_id) {
			parent.subnodes.push(child_id.to_string());
		}
	}

	fn is_known(&self, id: &str) -> bool {
		self.nodes.contains_key(id) || self.section_ids.contains(id)
	}
}

/// Result of parsing a document.
#[derive(Clone, Debug, Default)]
pub struct ParsedGraph {
	/// Nodes with no resolved parent, in input order.
	pub roots: Vec<Arc<GraphNode>>,
	/// Every node reachable from a root, by id.
	pub node_map: HashMap<String, Arc<GraphNode>>,
	/// Ids that were attached to a parent.
	pub has_parent: HashSet<String>,
	/// Non-structural edges with known endpoints, deduplicated.
	pub relationships: Vec<Relationship>,
}

/// Parses `document` into a forest and its relationship list.
pub fn parse(document: &GraphDocument) -> ParsedGraph {
	let mut forest = DraftForest::default();
	let mut has_parent = HashSet::new();
	let mut top_level = Vec::new();

	for raw in &document.nodes {
		if forest.register(raw) {
			top_level.push(raw.id.as_str());
		}
	}
	// Section members are owned by their section from the start.
	for node in forest.nodes.values() {
		for section in &node.sections {
			has_parent.extend(section.members.iter().cloned());
		}
	}

	attach_by_scope(&mut forest, &top_level, &mut has_parent);
	attach_by_contains(&mut forest, &document.edges, &mut has_parent);

	let root_ids: Vec<String> = forest
		.order
		.iter()
		.filter(|id| !has_parent.contains(*id))
		.cloned()
		.collect();
	annotate_hierarchy(&mut forest, &root_ids);

	let mut node_map = HashMap::new();
	let roots = root_ids
		.iter()
		.filter_map(|id| materialize(&forest, id, &mut node_map))
		.collect();

	let relationships = build_relationships(&forest, &document.edges);
	debug!(
		"parsed {} nodes into {} roots, {} relationships",
		forest.nodes.len(),
		root_ids.len(),
		relationships.len()
	);

	ParsedGraph {
		roots,
		node_map,
		has_parent,
		relationships,
	}
}

fn attach_by_scope(forest: &mut DraftForest, top_level: &[&str], has_parent: &mut HashSet<String>) {
	for &child_id in top_level {
		let Some(parent_id) = forest.nodes.get(child_id).and_then(|n| n.scope.last()).cloned()
		else {
			continue;
		};
		if parent_id == child_id || !forest.nodes.contains_key(&parent_id) {
			debug!("scope parent {parent_id:?} of {child_id:?} not usable, leaving it a root");
			continue;
		}
		forest.attach(&parent_id, child_id);
		has_parent.insert(child_id.to_string());
	}
}

fn attach_by_contains(forest: &mut DraftForest, edges: &[RawEdge], has_parent: &mut HashSet<String>) {
	for edge in edges.iter().filter(|e| e.relation == CONTAINS) {
		if edge.source == edge.target
			|| has_parent.contains(&edge.target)
			|| !forest.nodes.contains_key(&edge.source)
			|| !forest.nodes.contains_key(&edge.target)
		{
			continue;
		}
		forest.attach(&edge.source, &edge.target);
		has_parent.insert(edge.target.clone());
	}
}

fn materialize(
	forest: &DraftForest,
	id: &str,
	node_map: &mut HashMap<String, Arc<GraphNode>>,
) -> Option<Arc<GraphNode>> {
	let draft = forest.nodes.get(id)?;

	let mut subnodes: Vec<Arc<GraphNode>> = draft
		.subnodes
		.iter()
		.filter_map(|child| materialize(forest, child, node_map))
		.collect();
	sort_for_display(&mut subnodes);

	let sections = draft
		.sections
		.iter()
		.map(|section| {
			let mut members: Vec<Arc<GraphNode>> = section
				.members
				.iter()
				.filter_map(|child| materialize(forest, child, node_map))
				.collect();
			sort_for_display(&mut members);
			Arc::new(Section {
				id: section.id.clone(),
				name: section.name.clone(),
				color: section_color(&section.name).unwrap_or(DEFAULT_NODE_COLOR),
				expanded: false,
				subnodes: members,
				parent_node_id: section.parent_node_id.clone(),
			})
		})
		.collect();

	let node = Arc::new(GraphNode {
		id: draft.id.clone(),
		name: draft.name.clone(),
		color: draft.node_type.color(),
		node_type: draft.node_type.clone(),
		scope: draft.scope.clone(),
		sections,
		subnodes,
		expanded: false,
		parent_node_id: draft.parent_node_id.clone(),
		parent_section_id: draft.parent_section_id.clone(),
	});
	node_map.insert(node.id.clone(), Arc::clone(&node));
	Some(node)
}

fn sort_for_display(nodes: &mut [Arc<GraphNode>]) {
	nodes.sort_by(|a, b| display_order((&a.node_type, &a.name), (&b.node_type, &b.name)));
}

fn build_relationships(forest: &DraftForest, edges: &[RawEdge]) -> Vec<Relationship> {
	let mut seen = HashSet::new();
	edges
		.iter()
		.filter(|e| e.relation != CONTAINS && e.relation != USES)
		.enumerate()
		.filter_map(|(index, edge)| {
			if !forest.is_known(&edge.source) || !forest.is_known(&edge.target) {
				debug!("dropping edge {} -> {}: unknown endpoint", edge.source, edge.target);
				return None;
			}
			let key = (edge.source.as_str(), edge.target.as_str(), edge.relation.as_str());
			if !seen.insert(key) {
				return None;
			}
			Some(Relationship::new(
				format!("edge-{index}"),
				&edge.source,
				&edge.target,
				&edge.relation,
			))
		})
		.collect()
}
