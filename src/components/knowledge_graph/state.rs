use log::debug;

use super::scene::{Hit, Scene};
use crate::graph::{Connection, FlowEdge, GraphSession, Position};

/// Pointer travel (screen px) below which a press counts as a click.
const CLICK_SLOP: f64 = 4.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 4.0;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub card: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub card_start: Position,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub card: Option<String>,
	pub highlight_t: f64,
}

/// A shift-drag from one card or row towards another.
#[derive(Clone, Debug, Default)]
pub struct ConnectState {
	pub from: Option<(String, Option<String>)>,
	/// Pointer in graph coordinates.
	pub pointer: (f64, f64),
}

#[derive(Clone, Debug, Default)]
struct PressState {
	hit: Option<Hit>,
	x: f64,
	y: f64,
}

pub struct KnowledgeGraphState {
	pub session: GraphSession,
	pub scene: Scene,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub connect: ConnectState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	press: PressState,
}

impl KnowledgeGraphState {
	pub fn new(session: GraphSession, width: f64, height: f64) -> Self {
		let scene = Scene::build(&session);
		let content_width = session.config().root_width() + 2.0 * session.config().root_origin.x;
		let k = (width / content_width).clamp(MIN_ZOOM, 1.0);
		Self {
			session,
			scene,
			transform: ViewTransform { x: 0.0, y: 0.0, k },
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			connect: ConnectState::default(),
			width,
			height,
			flow_time: 0.0,
			press: PressState::default(),
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn hit_at(&self, sx: f64, sy: f64) -> Option<Hit> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.scene.hit(gx, gy)
	}

	fn rebuild(&mut self) {
		self.scene = Scene::build(&self.session);
	}

	pub fn set_hover(&mut self, card: Option<String>) {
		if self.hover.card == card {
			return;
		}
		self.hover.card = card;
	}

	/// Whether `edge` touches the hovered card.
	pub fn is_highlighted(&self, edge: &FlowEdge) -> bool {
		self.hover
			.card
			.as_deref()
			.is_some_and(|card| edge.source == card || edge.target == card)
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
		let target = if self.hover.card.is_some() { 1.0 } else { 0.0 };
		self.hover.highlight_t += (target - self.hover.highlight_t) * (6.0 * dt).min(1.0);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64, shift: bool) {
		let hit = self.hit_at(sx, sy);
		self.press = PressState {
			hit: hit.clone(),
			x: sx,
			y: sy,
		};

		if shift {
			if let Some((card, element)) = hit.as_ref().and_then(Hit::connect_end) {
				self.connect.from = Some((card.to_string(), element.map(str::to_string)));
				self.connect.pointer = self.screen_to_graph(sx, sy);
				return;
			}
		}

		match hit {
			Some(Hit::CardBody(card) | Hit::Row { card, .. }) => {
				let Some(node) = self.session.node(&card).filter(|n| n.draggable) else {
					return;
				};
				self.drag = DragState {
					active: true,
					card_start: node.position,
					card: Some(card),
					start_x: sx,
					start_y: sy,
				};
			}
			Some(_) => {}
			None => {
				self.pan = PanState {
					active: true,
					start_x: sx,
					start_y: sy,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.connect.from.is_some() {
			self.connect.pointer = self.screen_to_graph(sx, sy);
		} else if self.drag.active {
			if let Some(card) = self.drag.card.clone() {
				let (dx, dy) = (
					(sx - self.drag.start_x) / self.transform.k,
					(sy - self.drag.start_y) / self.transform.k,
				);
				let start = self.drag.card_start;
				if self
					.session
					.move_node(&card, Position::new(start.x + dx, start.y + dy))
				{
					self.rebuild();
				}
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}

		if !self.drag.active {
			let hovered = self.hit_at(sx, sy).and_then(|hit| {
				hit.connect_end().map(|(card, _)| card.to_string())
			});
			self.set_hover(hovered);
		}
	}

	pub fn pointer_up(&mut self, sx: f64, sy: f64) {
		let press = std::mem::take(&mut self.press);
		if let Some((source, source_handle)) = self.connect.from.take() {
			if let Some((target, target_handle)) = self
				.hit_at(sx, sy)
				.as_ref()
				.and_then(Hit::connect_end)
				.map(|(card, element)| (card.to_string(), element.map(str::to_string)))
			{
				if (target.as_str(), target_handle.as_deref()) != (source.as_str(), source_handle.as_deref())
				{
					self.session.add_user_edge(Connection {
						source,
						target,
						source_handle: source_handle.map(|e| format!("{e}-source")),
						target_handle: target_handle.map(|e| format!("{e}-target")),
					});
				}
			}
		} else if (sx - press.x).hypot(sy - press.y) < CLICK_SLOP {
			if let Some(hit) = press.hit {
				self.click(hit);
			}
		}
		self.drag = DragState::default();
		self.pan.active = false;
		self.rebuild();
	}

	pub fn pointer_leave(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
		self.connect.from = None;
		self.press = PressState::default();
		self.set_hover(None);
	}

	pub fn zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Dispatches a click to the matching session entry point.
	pub fn click(&mut self, hit: Hit) -> bool {
		debug!("click {hit:?}");
		let changed = match hit {
			Hit::FolderHeader(folder) => self.session.toggle_folder(&folder),
			Hit::CardToggle(card) => self.session.toggle_node(&card),
			Hit::NodeToggle { node, .. } => self.session.toggle_node(&node),
			Hit::SectionToggle { card, section } => self.session.toggle_section(&card, &section),
			Hit::CardBody(card) | Hit::Row { card, .. } => {
				let contained = self.session.node(&card).is_some_and(|n| n.in_folder());
				contained && self.session.extract_node(&card)
			}
		};
		if changed {
			self.rebuild();
		}
		changed
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::EdgeOrigin;
	use pretty_assertions::assert_eq;

	fn state() -> KnowledgeGraphState {
		let session = GraphSession::from_json(
			r#"{"nodes": [
				{"id": "a", "name": "a", "type": "file"},
				{"id": "b", "name": "b", "type": "function", "scope": ["a"]},
				{"id": "c", "name": "c", "type": "file"}
			], "edges": [{"source": "b", "target": "c", "relation": "calls"}]}"#,
		)
		.unwrap();
		let mut state = KnowledgeGraphState::new(session, 1200.0, 800.0);
		state.transform = ViewTransform { x: 0.0, y: 0.0, k: 1.0 };
		state
	}

	fn center(state: &KnowledgeGraphState, card: &str) -> (f64, f64) {
		let rect = state.scene.card(card).unwrap().rect;
		(rect.x + 40.0, rect.y + rect.h - 4.0)
	}

	#[test]
	fn click_on_toggle_expands_the_card() {
		let mut s = state();
		let toggle = s.scene.card("a").unwrap().toggle;
		s.pointer_down(toggle.x + 2.0, toggle.y + 2.0, false);
		s.pointer_up(toggle.x + 2.0, toggle.y + 2.0);
		let card = s.scene.card("a").unwrap();
		assert!(card.expanded);
		assert_eq!(card.rows.len(), 1);
		assert_eq!(s.session.edges()[0].source_handle.as_deref(), Some("b-source"));
	}

	#[test]
	fn click_on_contained_body_extracts_then_drag_moves() {
		let mut s = state();
		let (x, y) = center(&s, "c");
		s.pointer_down(x, y, false);
		s.pointer_up(x, y);
		assert!(s.session.is_extracted("c"));

		let before = s.session.node("c").unwrap().position;
		let (x, y) = center(&s, "c");
		s.pointer_down(x, y, false);
		s.pointer_move(x + 30.0, y + 10.0);
		s.pointer_up(x + 30.0, y + 10.0);
		let after = s.session.node("c").unwrap().position;
		assert_eq!((after.x - before.x, after.y - before.y), (30.0, 10.0));
	}

	#[test]
	fn shift_drag_between_cards_adds_user_edge() {
		let mut s = state();
		let (ax, ay) = center(&s, "a");
		let (cx, cy) = center(&s, "c");
		s.pointer_down(ax, ay, true);
		s.pointer_move(cx, cy);
		s.pointer_up(cx, cy);
		let user: Vec<&FlowEdge> = s
			.session
			.edges()
			.iter()
			.filter(|e| e.origin == EdgeOrigin::User)
			.collect();
		assert_eq!(user.len(), 1);
		assert_eq!((user[0].source.as_str(), user[0].target.as_str()), ("a", "c"));
		// Connecting is not a click.
		assert!(!s.session.is_extracted("a"));
	}

	#[test]
	fn background_drag_pans() {
		let mut s = state();
		s.pointer_down(5.0, 5.0, false);
		s.pointer_move(25.0, 45.0);
		s.pointer_up(25.0, 45.0);
		assert_eq!((s.transform.x, s.transform.y), (20.0, 40.0));
	}

	#[test]
	fn zoom_keeps_point_under_cursor() {
		let mut s = state();
		let before = s.screen_to_graph(300.0, 200.0);
		s.zoom(300.0, 200.0, -1.0);
		let after = s.screen_to_graph(300.0, 200.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
	}
}
