use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scene::{CardLayout, FolderLayout, Rect, RowKind, TOGGLE_SIZE};
use super::state::KnowledgeGraphState;
use crate::graph::{EdgeOrigin, FlowEdge, Side};

const BACKGROUND: &str = "#1a1a2e";
const CARD_FILL: &str = "#f5f5f5";
const CARD_BORDER: &str = "#b0bec5";
const TEXT: &str = "#333";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: Option<(f64, f64)>) {
	let pattern = match dash {
		Some((on, off)) => js_sys::Array::of2(&JsValue::from_f64(on), &JsValue::from_f64(off)),
		None => js_sys::Array::new(),
	};
	let _ = ctx.set_line_dash(&pattern);
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, r: &Rect, radius: f64) {
	let radius = radius.min(r.w / 2.0).min(r.h / 2.0);
	ctx.begin_path();
	ctx.move_to(r.x + radius, r.y);
	let _ = ctx.arc_to(r.x + r.w, r.y, r.x + r.w, r.y + r.h, radius);
	let _ = ctx.arc_to(r.x + r.w, r.y + r.h, r.x, r.y + r.h, radius);
	let _ = ctx.arc_to(r.x, r.y + r.h, r.x, r.y, radius);
	let _ = ctx.arc_to(r.x, r.y, r.x + r.w, r.y, radius);
	ctx.close_path();
}

fn draw_caret(ctx: &CanvasRenderingContext2d, toggle: &Rect, expanded: bool, color: &str) {
	ctx.set_fill_style_str(color);
	ctx.set_font("bold 14px sans-serif");
	let glyph = if expanded { "−" } else { "+" };
	let _ = ctx.fill_text(glyph, toggle.x + TOGGLE_SIZE / 3.0, toggle.y + TOGGLE_SIZE * 0.8);
}

pub fn render(state: &KnowledgeGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	for folder in &state.scene.folders {
		draw_folder(folder, ctx);
	}
	for card in &state.scene.cards {
		draw_card(card, ctx);
	}
	draw_edges(state, ctx);
	draw_pending_connection(state, ctx);
	ctx.restore();
}

fn draw_folder(folder: &FolderLayout, ctx: &CanvasRenderingContext2d) {
	let fill = if folder.is_root { "#f8f8f8" } else { "#eeeeee" };
	rounded_rect(ctx, &folder.rect, 8.0);
	ctx.set_fill_style_str(fill);
	ctx.fill();
	ctx.set_stroke_style_str("#999");
	ctx.set_line_width(2.0);
	set_dash(ctx, Some((6.0, 4.0)));
	ctx.stroke();
	set_dash(ctx, None);

	ctx.set_fill_style_str(TEXT);
	ctx.set_font("bold 16px sans-serif");
	let caret = if folder.expanded { "▾" } else { "▸" };
	let _ = ctx.fill_text(
		&format!("{caret} 📁 {}", folder.label),
		folder.header.x + 12.0,
		folder.header.y + folder.header.h / 2.0 + 6.0,
	);
}

fn draw_card(card: &CardLayout, ctx: &CanvasRenderingContext2d) {
	rounded_rect(ctx, &card.rect, 10.0);
	ctx.set_fill_style_str(CARD_FILL);
	ctx.fill();
	ctx.set_stroke_style_str(if card.draggable { "#5c3cb3" } else { CARD_BORDER });
	ctx.set_line_width(1.0);
	ctx.stroke();

	rounded_rect(ctx, &card.header, 10.0);
	ctx.set_fill_style_str(card.color);
	ctx.fill();

	ctx.set_fill_style_str(TEXT);
	ctx.set_font("600 13px sans-serif");
	let _ = ctx.fill_text(&card.title, card.header.x + 10.0, card.header.y + 16.0);
	ctx.set_font("10px sans-serif");
	let _ = ctx.fill_text(&card.type_label, card.header.x + 10.0, card.header.y + 30.0);
	draw_caret(ctx, &card.toggle, card.expanded, TEXT);

	if !card.expanded {
		ctx.set_fill_style_str("#777");
		ctx.set_font("11px sans-serif");
		let hint = match (card.child_count, card.in_folder) {
			(0, true) => "click to extract".to_string(),
			(0, false) => "no children".to_string(),
			(n, _) => format!("{n} children"),
		};
		let _ = ctx.fill_text(&hint, card.rect.x + 10.0, card.header.y + card.header.h + 16.0);
		return;
	}

	for row in &card.rows {
		let (expanded, outlined) = match row.kind {
			RowKind::Section { expanded } => (expanded, true),
			RowKind::Node { expanded, .. } => (expanded, false),
		};
		if outlined {
			ctx.set_stroke_style_str(row.color);
			ctx.stroke_rect(row.rect.x, row.rect.y + 1.0, row.rect.w, row.rect.h - 2.0);
		} else {
			ctx.set_fill_style_str(row.color);
			ctx.fill_rect(row.rect.x, row.rect.y + 6.0, 4.0, row.rect.h - 12.0);
		}
		ctx.set_fill_style_str(TEXT);
		ctx.set_font(if outlined { "bold 12px sans-serif" } else { "12px sans-serif" });
		let _ = ctx.fill_text(&row.label, row.rect.x + 10.0, row.rect.y + row.rect.h / 2.0 + 4.0);
		if let Some(toggle) = &row.toggle {
			draw_caret(ctx, toggle, expanded, TEXT);
		}
	}
}

fn draw_edges(state: &KnowledgeGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let t = ease_out_cubic(state.hover.highlight_t);
	let dash_offset = -(state.flow_time * 30.0) % 12.0;
	let hovering = state.hover.card.is_some();

	for edge in state.session.edges() {
		let scene = &state.scene;
		let (Some(from), Some(to)) = (
			scene.anchor(&edge.source, edge.source_handle.as_deref(), Side::Source),
			scene.anchor(&edge.target, edge.target_handle.as_deref(), Side::Target),
		) else {
			continue;
		};

		let highlighted = state.is_highlighted(edge);
		let alpha = match (hovering, highlighted) {
			(false, _) => 0.85,
			(true, true) => 0.85 + 0.15 * t,
			(true, false) => 0.85 - 0.6 * t,
		};
		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(&edge.stroke);
		let boost = if highlighted { 1.0 + t } else { 1.0 };
		ctx.set_line_width(edge.stroke_width * boost / k.max(0.5));
		if edge.origin == EdgeOrigin::User {
			set_dash(ctx, Some((8.0, 4.0)));
			ctx.set_line_dash_offset(dash_offset);
		}

		let bend = ((to.0 - from.0).abs() / 2.0).max(40.0);
		ctx.begin_path();
		ctx.move_to(from.0, from.1);
		ctx.bezier_curve_to(from.0 + bend, from.1, to.0 - bend, to.1, to.0, to.1);
		ctx.stroke();
		set_dash(ctx, None);

		if edge.arrow {
			draw_arrow(ctx, to, &edge.stroke);
		}
		draw_label(ctx, edge, ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0));
		ctx.set_global_alpha(1.0);
	}
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, tip: (f64, f64), color: &str) {
	let size = 10.0;
	ctx.set_fill_style_str(color);
	ctx.begin_path();
	ctx.move_to(tip.0, tip.1);
	ctx.line_to(tip.0 - size, tip.1 - size * 0.5);
	ctx.line_to(tip.0 - size, tip.1 + size * 0.5);
	ctx.close_path();
	ctx.fill();
}

fn draw_label(ctx: &CanvasRenderingContext2d, edge: &FlowEdge, at: (f64, f64)) {
	let (Some(label), Some(style)) = (&edge.label, &edge.label_style) else {
		return;
	};
	ctx.set_font(&format!("600 {}px sans-serif", style.font_size));
	// Rough width; avoids a text-metrics round trip per edge per frame.
	let width = label.chars().count() as f64 * style.font_size * 0.6 + 20.0;
	let pill = Rect {
		x: at.0 - width / 2.0,
		y: at.1 - 11.0,
		w: width,
		h: 22.0,
	};
	rounded_rect(ctx, &pill, 12.0);
	ctx.set_fill_style_str(&style.background);
	ctx.fill();
	ctx.set_stroke_style_str(&style.border);
	ctx.set_line_width(1.0);
	ctx.stroke();
	ctx.set_fill_style_str(&style.fill);
	let _ = ctx.fill_text(label, pill.x + 10.0, at.1 + 4.0);
}

fn draw_pending_connection(state: &KnowledgeGraphState, ctx: &CanvasRenderingContext2d) {
	let Some((card, element)) = &state.connect.from else {
		return;
	};
	let handle = element.as_ref().map(|e| format!("{e}-source"));
	let Some(from) = state.scene.anchor(card, handle.as_deref(), Side::Source) else {
		return;
	};
	let to = state.connect.pointer;
	ctx.set_stroke_style_str("#5c3cb3");
	ctx.set_line_width(2.0);
	set_dash(ctx, Some((4.0, 4.0)));
	ctx.begin_path();
	ctx.move_to(from.0, from.1);
	ctx.line_to(to.0, to.1);
	ctx.stroke();
	set_dash(ctx, None);
}
