//! Expand/collapse state of nodes, sections and folders.
//!
//! Node and section toggles are persistent updates: only the path from the
//! root to the toggled element is rebuilt, siblings keep their allocation.

use std::collections::HashSet;
use std::sync::Arc;

use super::layout::LayoutConfig;
use super::model::{GraphNode, Section};
use super::visual::{VisualKind, VisualNode, descendant_ids, find};

/// Applies `update` to items in order until one reports a change, returning
/// the new list with only that slot replaced.
fn replace_first<T>(
	items: &[Arc<T>],
	mut update: impl FnMut(&Arc<T>) -> (Arc<T>, bool),
) -> Option<Vec<Arc<T>>> {
	items.iter().enumerate().find_map(|(index, item)| {
		let (updated, changed) = update(item);
		changed.then(|| {
			let mut next = items.to_vec();
			next[index] = updated;
			next
		})
	})
}

fn rebuild(
	node: &Arc<GraphNode>,
	sections: Option<Vec<Arc<Section>>>,
	subnodes: Option<Vec<Arc<GraphNode>>>,
) -> (Arc<GraphNode>, bool) {
	if sections.is_none() && subnodes.is_none() {
		return (Arc::clone(node), false);
	}
	let updated = GraphNode {
		sections: sections.unwrap_or_else(|| node.sections.clone()),
		subnodes: subnodes.unwrap_or_else(|| node.subnodes.clone()),
		..(**node).clone()
	};
	(Arc::new(updated), true)
}

/// Flips `expanded` on the node with id `target_id`, wherever it sits.
///
/// Returns the original handle and `false` when no node matches.
pub fn toggle_node_by_id(node: &Arc<GraphNode>, target_id: &str) -> (Arc<GraphNode>, bool) {
	if node.id == target_id {
		return (node.with_expanded(!node.expanded), true);
	}
	let sections = replace_first(&node.sections, |section| {
		toggle_node_in_section(section, target_id)
	});
	let subnodes = if sections.is_none() {
		replace_first(&node.subnodes, |sub| toggle_node_by_id(sub, target_id))
	} else {
		None
	};
	rebuild(node, sections, subnodes)
}

fn toggle_node_in_section(section: &Arc<Section>, target_id: &str) -> (Arc<Section>, bool) {
	match replace_first(&section.subnodes, |sub| toggle_node_by_id(sub, target_id)) {
		Some(subnodes) => (
			Arc::new(Section {
				subnodes,
				..(**section).clone()
			}),
			true,
		),
		None => (Arc::clone(section), false),
	}
}

/// Flips `expanded` on the section with id `section_id` anywhere below `node`.
pub fn toggle_section_by_id(node: &Arc<GraphNode>, section_id: &str) -> (Arc<GraphNode>, bool) {
	let sections = replace_first(&node.sections, |section| {
		if section.id == section_id {
			return (
				Arc::new(Section {
					expanded: !section.expanded,
					..(**section).clone()
				}),
				true,
			);
		}
		match replace_first(&section.subnodes, |sub| toggle_section_by_id(sub, section_id)) {
			Some(subnodes) => (
				Arc::new(Section {
					subnodes,
					..(**section).clone()
				}),
				true,
			),
			None => (Arc::clone(section), false),
		}
	});
	let subnodes = if sections.is_none() {
		replace_first(&node.subnodes, |sub| toggle_section_by_id(sub, section_id))
	} else {
		None
	};
	rebuild(node, sections, subnodes)
}

/// True when some folder on the container chain of `node` is collapsed.
pub fn hidden_by_folders(nodes: &[VisualNode], node: &VisualNode) -> bool {
	let mut parent_id = node.parent_id.as_deref();
	let mut steps = 0;
	while let Some(parent) = parent_id.and_then(|id| find(nodes, id)) {
		if parent.folder().is_some_and(|f| !f.expanded) {
			return true;
		}
		parent_id = parent.parent_id.as_deref();
		steps += 1;
		if steps > nodes.len() {
			break;
		}
	}
	false
}

/// Expands or collapses a folder and hides or reveals what it contains.
///
/// Extracted nodes are left alone. A reopened folder gets back its laid-out
/// height. Returns `None` if `folder_id` is not a folder.
pub fn toggle_folder(
	nodes: &[VisualNode],
	folder_id: &str,
	extracted: &HashSet<String>,
	config: &LayoutConfig,
) -> Option<Vec<VisualNode>> {
	let folder = find(nodes, folder_id)?.folder()?;
	let expanding = !folder.expanded;

	let mut next: Vec<VisualNode> = nodes
		.iter()
		.map(|n| match &n.kind {
			VisualKind::Folder(data) if n.id == folder_id => {
				let mut data = data.clone();
				data.expanded = expanding;
				data.height = match (expanding, data.is_root) {
					(false, _) => config.header_height,
					(true, false) => config.header_height + data.total_content_height,
					(true, true) => config
						.root_min_height
						.max(config.header_height + data.total_content_height),
				};
				VisualNode {
					kind: VisualKind::Folder(data),
					..n.clone()
				}
			}
			_ => n.clone(),
		})
		.collect();

	let descendants: HashSet<String> = descendant_ids(&next, folder_id)
		.into_iter()
		.filter(|id| !extracted.contains(id))
		.collect();
	let hidden: Vec<bool> = next
		.iter()
		.map(|n| {
			if descendants.contains(&n.id) {
				hidden_by_folders(&next, n)
			} else {
				n.hidden
			}
		})
		.collect();
	for (node, hidden) in next.iter_mut().zip(hidden) {
		node.hidden = hidden;
	}
	Some(next)
}
