//! Grid layout of root nodes inside the root folder and its prefix subfolders.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use super::model::GraphNode;
use super::visual::{
	FolderData, Position, ROOT_FOLDER_ID, SUBFOLDER_PREFIX, VisualKind, VisualNode,
};

/// Sizes and spacings used by [`layout_roots`], in canvas units.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Cards per grid row.
	pub columns: usize,
	/// Width of one grid cell.
	pub cell_width: f64,
	/// Height of one grid cell.
	pub cell_height: f64,
	/// Gap between cells.
	pub spacing: f64,
	/// Vertical gap after each subfolder.
	pub folder_spacing: f64,
	/// Height of a folder header; also a collapsed folder's height.
	pub header_height: f64,
	/// Space between a folder header and its first row.
	pub padding_top: f64,
	/// Space below the last row of a folder.
	pub padding_bottom: f64,
	/// Left and right inset of folder content.
	pub padding_side: f64,
	/// Width of a prefix subfolder.
	pub subfolder_width: f64,
	/// Top-left corner of the root folder.
	pub root_origin: Position,
	/// Lower bound on the root folder's height.
	pub root_min_height: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			columns: 3,
			cell_width: 280.0,
			cell_height: 200.0,
			spacing: 24.0,
			folder_spacing: 32.0,
			header_height: 50.0,
			padding_top: 24.0,
			padding_bottom: 24.0,
			padding_side: 20.0,
			subfolder_width: 900.0,
			root_origin: Position::new(50.0, 50.0),
			root_min_height: 200.0,
		}
	}
}

impl LayoutConfig {
	/// Width of the root folder: full grid row plus gutters and side padding.
	pub fn root_width(&self) -> f64 {
		let columns = self.columns as f64;
		columns * self.cell_width + (columns + 1.0) * self.spacing + 2.0 * self.padding_side
	}

	fn rows(&self, count: usize) -> usize {
		count.div_ceil(self.columns.max(1))
	}

	fn cell(&self, index: usize) -> (f64, f64) {
		let columns = self.columns.max(1);
		let (row, col) = (index / columns, index % columns);
		(
			self.padding_side + col as f64 * (self.cell_width + self.spacing),
			row as f64 * (self.cell_height + self.spacing),
		)
	}
}

/// The first `/`-separated segment of a name, when there is more than one.
///
/// Only one level of grouping exists; `a/b/c` groups under `a`.
pub fn name_prefix(name: &str) -> Option<&str> {
	name.split_once('/')
		.map(|(prefix, _)| prefix)
		.filter(|prefix| !prefix.is_empty())
}

fn sort_key(node: &GraphNode) -> String {
	node.name.to_lowercase()
}

fn contained_card(node: &Arc<GraphNode>, position: Position, parent: &str) -> VisualNode {
	VisualNode {
		id: node.id.clone(),
		kind: VisualKind::Expandable(node.with_expanded(false)),
		position,
		parent_id: Some(parent.to_string()),
		original_position: Some(position),
		original_parent_id: Some(parent.to_string()),
		draggable: false,
		hidden: false,
	}
}

/// Lays out `roots` as cards inside one root folder.
///
/// Output order: root folder, then each subfolder followed by its cards
/// (prefixes sorted), then ungrouped cards.
pub fn layout_roots(roots: &[Arc<GraphNode>], config: &LayoutConfig) -> Vec<VisualNode> {
	let mut sorted: Vec<&Arc<GraphNode>> = roots.iter().collect();
	sorted.sort_by_cached_key(|node| sort_key(node));

	let mut groups: BTreeMap<&str, Vec<&Arc<GraphNode>>> = BTreeMap::new();
	let mut ungrouped = Vec::new();
	for node in sorted {
		match name_prefix(&node.name) {
			Some(prefix) => groups.entry(prefix).or_default().push(node),
			None => ungrouped.push(node),
		}
	}

	let mut placed = Vec::new();
	let mut current_y = config.header_height + config.padding_top;

	for (prefix, members) in &groups {
		let rows = config.rows(members.len()) as f64;
		let content_height = config.padding_top
			+ rows * config.cell_height
			+ (rows - 1.0) * config.spacing
			+ config.padding_bottom;
		let height = config.header_height + content_height;
		let folder_id = format!("{SUBFOLDER_PREFIX}{prefix}");

		placed.push(VisualNode {
			id: folder_id.clone(),
			kind: VisualKind::Folder(FolderData {
				label: prefix.to_string(),
				expanded: true,
				is_root: false,
				width: config.subfolder_width,
				height,
				total_content_height: content_height,
			}),
			position: Position::new(config.padding_side, current_y),
			parent_id: Some(ROOT_FOLDER_ID.to_string()),
			original_position: None,
			original_parent_id: None,
			draggable: false,
			hidden: false,
		});

		for (index, node) in members.iter().enumerate() {
			let (x, row_y) = config.cell(index);
			let y = config.header_height + config.padding_top + row_y;
			placed.push(contained_card(node, Position::new(x, y), &folder_id));
		}
		current_y += height + config.folder_spacing;
	}

	for (index, node) in ungrouped.iter().enumerate() {
		let (x, row_y) = config.cell(index);
		placed.push(contained_card(
			node,
			Position::new(x, current_y + row_y),
			ROOT_FOLDER_ID,
		));
	}
	if !ungrouped.is_empty() {
		current_y += config.rows(ungrouped.len()) as f64 * (config.cell_height + config.spacing);
	}
	current_y += config.padding_bottom;
	let total_content_height = current_y - config.header_height;

	let root = VisualNode {
		id: ROOT_FOLDER_ID.to_string(),
		kind: VisualKind::Folder(FolderData {
			label: "root".to_string(),
			expanded: true,
			is_root: true,
			width: config.root_width(),
			height: config
				.root_min_height
				.max(config.header_height + total_content_height),
			total_content_height,
		}),
		position: config.root_origin,
		parent_id: None,
		original_position: None,
		original_parent_id: None,
		draggable: false,
		hidden: false,
	};
	debug!(
		"laid out {} roots in {} subfolders, {} ungrouped",
		roots.len(),
		groups.len(),
		ungrouped.len()
	);

	let mut out = Vec::with_capacity(placed.len() + 1);
	out.push(root);
	out.extend(placed);
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::palette::NodeType;
	use crate::graph::visual::find;
	use pretty_assertions::assert_eq;

	fn roots(names: &[&str]) -> Vec<Arc<GraphNode>> {
		names
			.iter()
			.map(|name| Arc::new(GraphNode::new(*name, *name, NodeType::File)))
			.collect()
	}

	fn ids(nodes: &[VisualNode]) -> Vec<&str> {
		nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn prefix_needs_a_slash() {
		assert_eq!(name_prefix("src/main.rs"), Some("src"));
		assert_eq!(name_prefix("a/b/c"), Some("a"));
		assert_eq!(name_prefix("main.rs"), None);
		assert_eq!(name_prefix("/abs"), None);
	}

	#[test]
	fn groups_sort_and_ungrouped_follow() {
		let layout = layout_roots(
			&roots(&["zeta", "src/b.rs", "lib/x.rs", "Alpha", "src/A.rs"]),
			&LayoutConfig::default(),
		);
		assert_eq!(
			ids(&layout),
			vec![
				"root-folder",
				"subfolder-lib",
				"lib/x.rs",
				"subfolder-src",
				"src/A.rs",
				"src/b.rs",
				"Alpha",
				"zeta",
			]
		);
	}

	#[test]
	fn cards_tile_in_three_columns() {
		let layout = layout_roots(&roots(&["a", "b", "c", "d"]), &LayoutConfig::default());
		let d = find(&layout, "d").unwrap();
		let c = find(&layout, "c").unwrap();
		assert_eq!(c.position, Position::new(20.0 + 2.0 * 304.0, 74.0));
		assert_eq!(d.position, Position::new(20.0, 74.0 + 224.0));
		assert_eq!(d.parent_id.as_deref(), Some(ROOT_FOLDER_ID));
		assert_eq!(d.original_position, Some(d.position));
		assert_eq!(d.original_parent_id, d.parent_id);
		assert!(!d.draggable);
	}

	#[test]
	fn subfolder_height_covers_its_rows() {
		let layout = layout_roots(
			&roots(&["g/1", "g/2", "g/3", "g/4", "solo"]),
			&LayoutConfig::default(),
		);
		let folder = find(&layout, "subfolder-g").unwrap();
		let data = folder.folder().unwrap();
		// 24 + 2 * 200 + 24 + 24
		assert_eq!(data.total_content_height, 472.0);
		assert_eq!(data.height, 522.0);
		assert_eq!(folder.position, Position::new(20.0, 74.0));

		let fourth = find(&layout, "g/4").unwrap();
		assert_eq!(fourth.position, Position::new(20.0, 74.0 + 224.0));
		assert_eq!(fourth.parent_id.as_deref(), Some("subfolder-g"));

		let solo = find(&layout, "solo").unwrap();
		assert_eq!(solo.position.y, 74.0 + 522.0 + 32.0);
	}

	#[test]
	fn root_folder_encloses_content() {
		let config = LayoutConfig::default();
		let layout = layout_roots(&roots(&["a", "b"]), &config);
		let root = layout[0].folder().unwrap();
		assert_eq!(root.width, 976.0);
		// header 50 + top pad 24 + one row 224 + bottom pad 24
		assert_eq!(root.total_content_height, 272.0);
		assert_eq!(root.height, 322.0);

		let empty = layout_roots(&[], &config);
		assert_eq!(empty.len(), 1);
		assert_eq!(empty[0].folder().unwrap().height, 200.0);
	}

	#[test]
	fn nested_node_is_not_a_card_of_its_own() {
		let mut a = GraphNode::new("a", "a", NodeType::File);
		a.subnodes.push(Arc::new(GraphNode {
			parent_node_id: Some("a".into()),
			..GraphNode::new("b", "b", NodeType::Function)
		}));
		let layout = layout_roots(&[Arc::new(a)], &LayoutConfig::default());
		assert_eq!(ids(&layout), vec!["root-folder", "a"]);
		assert!(layout.iter().all(|n| !n.hidden));
	}
}
