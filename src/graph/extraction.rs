//! Pulling cards out of their folder onto free canvas, and docking them back.

use std::collections::HashSet;

use log::debug;

use super::expansion::{hidden_by_folders, toggle_node_by_id};
use super::visual::{Position, ROOT_FOLDER_ID, VisualKind, VisualNode, find};

/// Horizontal gap between the root folder's right edge and extracted cards.
pub const EXTRACT_GAP: f64 = 100.0;
/// Offset used when there is no root folder to measure from.
const FALLBACK_OFFSET: f64 = 400.0;

fn extract_position(nodes: &[VisualNode], node: &VisualNode) -> Position {
	match find(nodes, ROOT_FOLDER_ID).and_then(|root| Some((root, root.folder()?))) {
		Some((root, folder)) => {
			Position::new(root.position.x + folder.width + EXTRACT_GAP, node.position.y)
		}
		None => Position::new(node.position.x + FALLBACK_OFFSET, node.position.y),
	}
}

/// Moves card `id` out of its container, expanded and draggable.
///
/// The restore point is recorded only if none exists yet. Returns `None` when
/// the card is unknown, has no container, or is already extracted.
pub fn extract(
	nodes: &[VisualNode],
	id: &str,
	extracted: &HashSet<String>,
) -> Option<Vec<VisualNode>> {
	let node = find(nodes, id)?;
	let graph = node.graph_node()?;
	let parent_id = node.parent_id.clone()?;
	if extracted.contains(id) {
		return None;
	}

	let detached = VisualNode {
		kind: VisualKind::Expandable(graph.with_expanded(true)),
		position: extract_position(nodes, node),
		parent_id: None,
		original_position: Some(node.original_position.unwrap_or(node.position)),
		original_parent_id: Some(node.original_parent_id.clone().unwrap_or(parent_id)),
		draggable: true,
		hidden: false,
		..node.clone()
	};
	debug!("extracted {id} to ({}, {})", detached.position.x, detached.position.y);

	Some(
		nodes
			.iter()
			.map(|n| if n.id == id { detached.clone() } else { n.clone() })
			.collect(),
	)
}

/// Collapses extracted card `id` and returns it to where layout put it.
///
/// Only applies to an extracted, expanded card with a recorded restore point.
pub fn dock(
	nodes: &[VisualNode],
	id: &str,
	extracted: &HashSet<String>,
) -> Option<Vec<VisualNode>> {
	if !extracted.contains(id) {
		return None;
	}
	let node = find(nodes, id)?;
	let graph = node.graph_node()?;
	if !graph.expanded {
		return None;
	}
	let position = node.original_position?;
	let parent_id = node.original_parent_id.clone()?;

	let (collapsed, _) = toggle_node_by_id(graph, id);
	let mut docked = VisualNode {
		kind: VisualKind::Expandable(collapsed),
		position,
		parent_id: Some(parent_id),
		draggable: false,
		..node.clone()
	};
	docked.hidden = hidden_by_folders(nodes, &docked);
	debug!("docked {id} back into {:?}", docked.parent_id);

	Some(
		nodes
			.iter()
			.map(|n| if n.id == id { docked.clone() } else { n.clone() })
			.collect(),
	)
}

/// Puts every contained, non-extracted card back on its recorded position.
pub fn snap_back(nodes: &mut [VisualNode], extracted: &HashSet<String>) {
	for node in nodes.iter_mut() {
		if node.parent_id.is_none() || extracted.contains(&node.id) {
			continue;
		}
		if let Some(original) = node.original_position {
			node.position = original;
		}
	}
}
