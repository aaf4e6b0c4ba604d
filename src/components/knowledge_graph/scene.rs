use crate::graph::edges::{Side, handle_base};
use crate::graph::visual::{VisualKind, VisualNode, absolute_position};
use crate::graph::{GraphNode, GraphSession};

pub const CARD_WIDTH: f64 = 280.0;
pub const CARD_HEADER: f64 = 36.0;
pub const ROW_HEIGHT: f64 = 24.0;
pub const ROW_INDENT: f64 = 14.0;
pub const CARD_PADDING: f64 = 8.0;
pub const TOGGLE_SIZE: f64 = 18.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub w: f64,
	pub h: f64,
}

impl Rect {
	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.x && x <= self.x + self.w && y >= self.y && y <= self.y + self.h
	}

	fn toggle_at_right(&self) -> Rect {
		Rect {
			x: self.x + self.w - TOGGLE_SIZE - 4.0,
			y: self.y + (self.h - TOGGLE_SIZE) / 2.0,
			w: TOGGLE_SIZE,
			h: TOGGLE_SIZE,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct FolderLayout {
	pub id: String,
	pub label: String,
	pub rect: Rect,
	pub header: Rect,
	pub expanded: bool,
	pub is_root: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RowKind {
	Section { expanded: bool },
	Node { expanded: bool, has_children: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub struct RowLayout {
	/// Node or section id the row stands for.
	pub element_id: String,
	pub kind: RowKind,
	pub label: String,
	pub color: &'static str,
	pub depth: usize,
	pub rect: Rect,
	pub toggle: Option<Rect>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CardLayout {
	pub id: String,
	pub title: String,
	pub type_label: String,
	pub color: &'static str,
	pub expanded: bool,
	pub draggable: bool,
	pub in_folder: bool,
	pub child_count: usize,
	pub rect: Rect,
	pub header: Rect,
	pub toggle: Rect,
	pub rows: Vec<RowLayout>,
}

/// What a pointer landed on.
#[derive(Clone, Debug, PartialEq)]
pub enum Hit {
	FolderHeader(String),
	CardToggle(String),
	CardBody(String),
	SectionToggle { card: String, section: String },
	NodeToggle { card: String, node: String },
	Row { card: String, element: String },
}

impl Hit {
	/// Card id and optional row element, for connect gestures.
	pub fn connect_end(&self) -> Option<(&str, Option<&str>)> {
		match self {
			Self::CardToggle(card) | Self::CardBody(card) => Some((card.as_str(), None)),
			Self::Row { card, element }
			| Self::SectionToggle { card, section: element }
			| Self::NodeToggle { card, node: element } => Some((card.as_str(), Some(element.as_str()))),
			Self::FolderHeader(_) => None,
		}
	}
}

/// Absolute geometry of everything currently drawn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub folders: Vec<FolderLayout>,
	pub cards: Vec<CardLayout>,
}

impl Scene {
	pub fn build(session: &GraphSession) -> Self {
		let nodes = session.nodes();
		let header_height = session.config().header_height;
		let mut scene = Scene::default();

		for node in nodes.iter().filter(|n| !n.hidden) {
			let Some(origin) = absolute_position(nodes, &node.id) else {
				continue;
			};
			match &node.kind {
				VisualKind::Folder(folder) => {
					let rect = Rect {
						x: origin.x,
						y: origin.y,
						w: folder.width,
						h: folder.height,
					};
					scene.folders.push(FolderLayout {
						id: node.id.clone(),
						label: folder.label.clone(),
						header: Rect {
							h: header_height,
							..rect
						},
						rect,
						expanded: folder.expanded,
						is_root: folder.is_root,
					});
				}
				VisualKind::Expandable(graph) => {
					scene.cards.push(card_layout(node, graph, origin.x, origin.y));
				}
			}
		}
		scene
	}

	/// Topmost thing under canvas point (`x`, `y`).
	pub fn hit(&self, x: f64, y: f64) -> Option<Hit> {
		for card in self.cards.iter().rev() {
			if !card.rect.contains(x, y) {
				continue;
			}
			if card.toggle.contains(x, y) {
				return Some(Hit::CardToggle(card.id.clone()));
			}
			for row in &card.rows {
				if !row.rect.contains(x, y) {
					continue;
				}
				let on_toggle = row.toggle.is_some_and(|t| t.contains(x, y));
				return Some(match (&row.kind, on_toggle) {
					(RowKind::Section { .. }, true) => Hit::SectionToggle {
						card: card.id.clone(),
						section: row.element_id.clone(),
					},
					(RowKind::Node { .. }, true) => Hit::NodeToggle {
						card: card.id.clone(),
						node: row.element_id.clone(),
					},
					_ => Hit::Row {
						card: card.id.clone(),
						element: row.element_id.clone(),
					},
				});
			}
			return Some(Hit::CardBody(card.id.clone()));
		}
		// Subfolders are drawn over the root folder.
		self.folders
			.iter()
			.rev()
			.find(|f| f.header.contains(x, y))
			.map(|f| Hit::FolderHeader(f.id.clone()))
	}

	pub fn card(&self, id: &str) -> Option<&CardLayout> {
		self.cards.iter().find(|c| c.id == id)
	}

	/// Where an edge attaches: a row side when the handle names a drawn row,
	/// otherwise the card header.
	pub fn anchor(&self, card_id: &str, handle: Option<&str>, side: Side) -> Option<(f64, f64)> {
		let card = self.card(card_id)?;
		let rect = handle
			.map(handle_base)
			.and_then(|element| card.rows.iter().find(|r| r.element_id == element))
			.map(|row| row.rect)
			.unwrap_or(card.header);
		let x = match side {
			Side::Source => card.rect.x + card.rect.w,
			Side::Target => card.rect.x,
		};
		Some((x, rect.y + rect.h / 2.0))
	}
}

fn card_layout(node: &VisualNode, graph: &GraphNode, x: f64, y: f64) -> CardLayout {
	let mut rows = Vec::new();
	if graph.expanded {
		push_children(&mut rows, graph, 0);
	}
	let mut cursor = y + CARD_HEADER + CARD_PADDING / 2.0;
	for row in rows.iter_mut() {
		let indent = row.depth as f64 * ROW_INDENT;
		row.rect = Rect {
			x: x + CARD_PADDING + indent,
			y: cursor,
			w: CARD_WIDTH - 2.0 * CARD_PADDING - indent,
			h: ROW_HEIGHT,
		};
		if row.toggle.is_some() {
			row.toggle = Some(row.rect.toggle_at_right());
		}
		cursor += ROW_HEIGHT;
	}
	let body = if graph.expanded {
		rows.len() as f64 * ROW_HEIGHT + CARD_PADDING
	} else {
		ROW_HEIGHT
	};
	let header = Rect {
		x,
		y,
		w: CARD_WIDTH,
		h: CARD_HEADER,
	};

	CardLayout {
		id: node.id.clone(),
		title: graph.name.clone(),
		type_label: graph.node_type.as_str().to_string(),
		color: graph.color,
		expanded: graph.expanded,
		draggable: node.draggable,
		in_folder: node.in_folder(),
		child_count: graph.subnodes.len()
			+ graph.sections.iter().map(|s| s.subnodes.len()).sum::<usize>(),
		rect: Rect {
			h: CARD_HEADER + body,
			..header
		},
		toggle: header.toggle_at_right(),
		header,
		rows,
	}
}

fn push_children(rows: &mut Vec<RowLayout>, node: &GraphNode, depth: usize) {
	for section in &node.sections {
		rows.push(RowLayout {
			element_id: section.id.clone(),
			kind: RowKind::Section {
				expanded: section.expanded,
			},
			label: format!("{} ({})", section.name, section.subnodes.len()),
			color: section.color,
			depth,
			rect: Rect::default(),
			toggle: Some(Rect::default()),
		});
		if section.expanded {
			for member in &section.subnodes {
				push_node(rows, member, depth + 1);
			}
		}
	}
	for sub in &node.subnodes {
		push_node(rows, sub, depth);
	}
}

fn push_node(rows: &mut Vec<RowLayout>, node: &GraphNode, depth: usize) {
	let has_children = !node.subnodes.is_empty() || !node.sections.is_empty();
	rows.push(RowLayout {
		element_id: node.id.clone(),
		kind: RowKind::Node {
			expanded: node.expanded,
			has_children,
		},
		label: node.name.clone(),
		color: node.color,
		depth,
		rect: Rect::default(),
		toggle: has_children.then(Rect::default),
	});
	if node.expanded {
		push_children(rows, node, depth + 1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn encloses(outer: &Rect, inner: &Rect) -> bool {
		outer.contains(inner.x, inner.y) && outer.contains(inner.x + inner.w, inner.y + inner.h)
	}

	fn session() -> GraphSession {
		GraphSession::from_json(
			r#"{"nodes": [
				{"id": "a", "name": "a", "type": "file", "scope": []},
				{"id": "b", "name": "b", "type": "function", "scope": ["a"]},
				{"id": "k", "name": "src/k", "type": "class"}
			], "edges": []}"#,
		)
		.unwrap()
	}

	#[test]
	fn nested_row_sits_inside_its_card() {
		let mut s = session();
		s.toggle_node("a");
		let scene = Scene::build(&s);
		let a = scene.card("a").unwrap();
		assert_eq!(a.rows.len(), 1);
		assert_eq!(a.rows[0].element_id, "b");
		assert!(encloses(&a.rect, &a.rows[0].rect));
		// Below the one-row "src" subfolder (height 298) and its spacing.
		assert_eq!((a.rect.x, a.rect.y), (50.0 + 20.0, 50.0 + 74.0 + 298.0 + 32.0));
	}

	#[test]
	fn hits_resolve_topmost_first() {
		let mut s = session();
		s.toggle_node("a");
		let scene = Scene::build(&s);
		let a = scene.card("a").unwrap().clone();
		let row = a.rows[0].rect;
		assert_eq!(
			scene.hit(row.x + 2.0, row.y + 2.0),
			Some(Hit::Row {
				card: "a".into(),
				element: "b".into()
			})
		);
		assert_eq!(
			scene.hit(a.toggle.x + 1.0, a.toggle.y + 1.0),
			Some(Hit::CardToggle("a".into()))
		);
		assert_eq!(scene.hit(60.0, 60.0), Some(Hit::FolderHeader("root-folder".into())));
		assert_eq!(scene.hit(-500.0, -500.0), None);
	}

	#[test]
	fn hidden_nodes_are_not_drawn() {
		let mut s = session();
		s.toggle_folder("subfolder-src");
		let scene = Scene::build(&s);
		assert!(scene.card("k").is_none());
		assert_eq!(scene.folders.len(), 2);
		assert_eq!(scene.folders[1].rect.h, 50.0);
	}

	#[test]
	fn anchors_fall_back_to_header() {
		let mut s = session();
		let scene = Scene::build(&s);
		let a = scene.card("a").unwrap().clone();
		assert_eq!(
			scene.anchor("a", Some("b-source"), Side::Source),
			Some((a.rect.x + CARD_WIDTH, a.rect.y + CARD_HEADER / 2.0))
		);

		s.toggle_node("a");
		let scene = Scene::build(&s);
		let row = scene.card("a").unwrap().rows[0].rect;
		assert_eq!(
			scene.anchor("a", Some("b-target"), Side::Target),
			Some((a.rect.x, row.y + ROW_HEIGHT / 2.0))
		);
	}
}
