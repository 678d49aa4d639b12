use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::labels::{ApproxMeasure, HAlign, MeasureText, VAlign};
use super::model::{Link, Node};
use super::state::Graph;

const LABEL_FILL: &str = "#333";

/// Label measurement backed by the canvas font metrics.
pub struct CanvasMeasure {
	pub ctx: CanvasRenderingContext2d,
}

impl MeasureText for CanvasMeasure {
	fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
		self.ctx.set_font(&font(font_size));
		match self.ctx.measure_text(text) {
			Ok(metrics) => (metrics.width(), font_size),
			Err(_) => ApproxMeasure::default().measure(text, font_size),
		}
	}
}

fn font(size: f64) -> String {
	format!("{size}px sans-serif")
}

pub fn render(graph: &Graph, ctx: &CanvasRenderingContext2d) {
	let camera = graph.camera();
	ctx.set_fill_style_str(&graph.styles().background_fill);
	ctx.fill_rect(0.0, 0.0, camera.width, camera.height);
	if !graph.is_drawn() {
		return;
	}

	let view = graph.view();
	let masked_alpha = graph.masked_alpha();
	ctx.save();
	let _ = ctx.translate(view.x, view.y);
	let _ = ctx.scale(view.k, view.k);
	for link in graph.links().iter().filter(|l| graph.link_visible(l)) {
		let alpha = if link.emphasis.masked { masked_alpha } else { 1.0 };
		draw_link(graph.nodes(), link, alpha, ctx);
	}
	for node in graph.nodes().iter().filter(|n| n.shown) {
		let alpha = if node.emphasis.masked { masked_alpha } else { 1.0 };
		draw_node(node, alpha, ctx);
	}
	ctx.restore();
}

fn draw_link(nodes: &[Node], link: &Link, alpha: f64, ctx: &CanvasRenderingContext2d) {
	let (s, t) = (&nodes[link.source], &nodes[link.target]);
	ctx.set_global_alpha(alpha);
	ctx.set_stroke_style_str(&link.appearance.stroke);
	ctx.set_line_width(link.appearance.stroke_width);
	if !link.style.line_stroke_dasharray.is_empty() {
		let dash: js_sys::Array = link
			.style
			.line_stroke_dasharray
			.iter()
			.map(|&d| JsValue::from_f64(d))
			.collect();
		let _ = ctx.set_line_dash(&dash);
	}
	ctx.begin_path();
	ctx.move_to(s.x, s.y);
	ctx.line_to(t.x, t.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_global_alpha(1.0);
}

fn draw_node(node: &Node, alpha: f64, ctx: &CanvasRenderingContext2d) {
	let look = &node.appearance;
	let radius = node.style.circle_r * look.scale;
	ctx.set_global_alpha(alpha);
	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&look.fill);
	ctx.fill();
	if look.stroke_width > 0.0 {
		ctx.set_stroke_style_str(&look.stroke);
		ctx.set_line_width(look.stroke_width);
		ctx.stroke();
	}

	let label = &node.label;
	ctx.set_fill_style_str(LABEL_FILL);
	ctx.set_font(&font(node.style.label_font_size));
	ctx.set_text_align(match label.h_align {
		HAlign::Start => "start",
		HAlign::Middle => "center",
		HAlign::End => "end",
	});
	ctx.set_text_baseline(match label.v_align {
		VAlign::Top => "top",
		VAlign::Middle => "middle",
		VAlign::Bottom => "bottom",
	});
	let _ = ctx.fill_text(node.display_title(), node.x + label.dx, node.y + label.dy);
	ctx.set_global_alpha(1.0);
}
