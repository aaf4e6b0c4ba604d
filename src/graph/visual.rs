//! Renderable projection of the graph: folders and node cards with positions.

use std::sync::Arc;

use super::model::GraphNode;

/// Id of the folder that encloses every root node.
pub const ROOT_FOLDER_ID: &str = "root-folder";
/// Prefix of folder ids created for grouped names.
pub const SUBFOLDER_PREFIX: &str = "subfolder-";

/// A point in canvas units, relative to the parent container when there is one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	/// Horizontal offset.
	pub x: f64,
	/// Vertical offset.
	pub y: f64,
}

impl Position {
	/// Point at (`x`, `y`).
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

impl std::ops::Add for Position {
	type Output = Self;

	fn add(self, rhs: Self) -> Self {
		Self::new(self.x + rhs.x, self.y + rhs.y)
	}
}

/// State of a synthetic folder.
#[derive(Clone, Debug, PartialEq)]
pub struct FolderData {
	/// Header text: the prefix, or the root title.
	pub label: String,
	/// Whether contents are shown.
	pub expanded: bool,
	/// True for the enclosing root folder.
	pub is_root: bool,
	/// Rendered width.
	pub width: f64,
	/// Rendered height; shrinks to the header when collapsed.
	pub height: f64,
	/// Height below the header when expanded.
	pub total_content_height: f64,
}

/// What a visual node draws.
#[derive(Clone, Debug, PartialEq)]
pub enum VisualKind {
	/// A root folder or prefix subfolder.
	Folder(FolderData),
	/// A card for a root graph node.
	Expandable(Arc<GraphNode>),
}

/// One top-level element on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualNode {
	/// Folder id or graph node id.
	pub id: String,
	/// Folder or card payload.
	pub kind: VisualKind,
	/// Offset within the container, or canvas position when free.
	pub position: Position,
	/// Container folder; `None` for free-floating nodes.
	pub parent_id: Option<String>,
	/// Where layout put the node; snap-back and docking restore this.
	pub original_position: Option<Position>,
	/// Container layout put the node in.
	pub original_parent_id: Option<String>,
	/// Set while the node is extracted.
	pub draggable: bool,
	/// Inside a collapsed folder.
	pub hidden: bool,
}

impl VisualNode {
	/// The graph node behind a card, if this is one.
	pub fn graph_node(&self) -> Option<&Arc<GraphNode>> {
		match &self.kind {
			VisualKind::Expandable(node) => Some(node),
			VisualKind::Folder(_) => None,
		}
	}

	/// Folder state, if this is a folder.
	pub fn folder(&self) -> Option<&FolderData> {
		match &self.kind {
			VisualKind::Folder(folder) => Some(folder),
			VisualKind::Expandable(_) => None,
		}
	}

	/// True for folders.
	pub fn is_folder(&self) -> bool {
		matches!(self.kind, VisualKind::Folder(_))
	}

	/// Whether the node is placed inside the root folder or one of its subfolders.
	pub fn in_folder(&self) -> bool {
		self.parent_id
			.as_deref()
			.is_some_and(|p| p == ROOT_FOLDER_ID || p.starts_with(SUBFOLDER_PREFIX))
	}
}

/// Finds a visual node by id.
pub fn find<'a>(nodes: &'a [VisualNode], id: &str) -> Option<&'a VisualNode> {
	nodes.iter().find(|n| n.id == id)
}

/// Canvas position of `id`, summing offsets up the container chain.
pub fn absolute_position(nodes: &[VisualNode], id: &str) -> Option<Position> {
	let mut node = find(nodes, id)?;
	let mut position = node.position;
	let mut depth = 0;
	while let Some(parent) = node.parent_id.as_deref().and_then(|p| find(nodes, p)) {
		position = position + parent.position;
		node = parent;
		depth += 1;
		if depth > nodes.len() {
			break;
		}
	}
	Some(position)
}

/// Ids of every node contained, directly or through folders, in `folder_id`.
pub fn descendant_ids(nodes: &[VisualNode], folder_id: &str) -> Vec<String> {
	let mut out = Vec::new();
	let mut stack = vec![folder_id.to_string()];
	while let Some(parent) = stack.pop() {
		for child in nodes.iter().filter(|n| n.parent_id.as_deref() == Some(&parent)) {
			if out.contains(&child.id) {
				continue;
			}
			out.push(child.id.clone());
			if child.is_folder() {
				stack.push(child.id.clone());
			}
		}
	}
	out
}
