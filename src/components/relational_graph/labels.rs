//! Label placement.
//!
//! Each label starts to the right of its circle and rotates around it in fixed steps until it
//! clears the circles and labels of every node within [`SEARCH_RADIUS`]. Neighbors come from two
//! coarse 1-D bins (one per axis) so the search stays local on large graphs.

use std::collections::{BTreeSet, HashMap};
use std::f64::consts::TAU;

use log::debug;

use super::model::Node;

pub const BUCKET_SIZE: f64 = 20.0;
pub const SEARCH_RADIUS: f64 = 200.0;
/// Gap between the circle edge and the label anchor.
pub const LABEL_OFFSET: f64 = 3.0;
pub const BOX_PADDING: f64 = 2.0;
pub const ANGLE_STEP: f64 = TAU / 12.0;
const STEPS_PER_TURN: usize = 12;
const ALIGN_EPSILON: f64 = 0.01;

/// Axis-aligned rectangle in graph coordinates; `top < bottom`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BBox {
	pub left: f64,
	pub top: f64,
	pub right: f64,
	pub bottom: f64,
}

impl BBox {
	pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
		Self {
			left,
			top,
			right,
			bottom,
		}
	}

	pub fn padded(self, pad: f64) -> Self {
		Self::new(
			self.left - pad,
			self.top - pad,
			self.right + pad,
			self.bottom + pad,
		)
	}

	/// Two boxes intersect unless one lies entirely on one side of the other.
	pub fn intersects(&self, other: &BBox) -> bool {
		!(self.right < other.left
			|| self.left > other.right
			|| self.bottom < other.top
			|| self.top > other.bottom)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HAlign {
	#[default]
	Start,
	Middle,
	End,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VAlign {
	Top,
	#[default]
	Middle,
	Bottom,
}

/// Where a node's label sits relative to the node center.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LabelPlacement {
	/// Radians, clockwise from the positive x axis (screen y points down).
	pub angle: f64,
	pub dx: f64,
	pub dy: f64,
	pub h_align: HAlign,
	pub v_align: VAlign,
	/// Padded, in graph coordinates.
	pub bbox: BBox,
	/// No angle cleared every neighbor; the last one tried was kept.
	pub exhausted: bool,
}

impl LabelPlacement {
	fn compute(node: &Node, angle: f64, width: f64, height: f64) -> Self {
		let r = node.style.circle_r + LABEL_OFFSET;
		let (cos, sin) = (angle.cos(), angle.sin());
		let (dx, dy) = (r * cos, r * sin);
		let (ax, ay) = (node.x + dx, node.y + dy);

		let (h_align, left) = if cos > ALIGN_EPSILON {
			(HAlign::Start, ax)
		} else if cos < -ALIGN_EPSILON {
			(HAlign::End, ax - width)
		} else {
			(HAlign::Middle, ax - width / 2.0)
		};
		let (v_align, top) = if sin > ALIGN_EPSILON && h_align == HAlign::Middle {
			(VAlign::Top, ay)
		} else if sin < -ALIGN_EPSILON && h_align == HAlign::Middle {
			(VAlign::Bottom, ay - height)
		} else {
			(VAlign::Middle, ay - height / 2.0)
		};

		Self {
			angle,
			dx,
			dy,
			h_align,
			v_align,
			bbox: BBox::new(left, top, left + width, top + height).padded(BOX_PADDING),
			exhausted: false,
		}
	}
}

/// Measures rendered label text.
pub trait MeasureText {
	/// `(width, height)` of `text` at `font_size`.
	fn measure(&self, text: &str, font_size: f64) -> (f64, f64);
}

/// Fixed-advance estimate, good enough where no font metrics are available.
#[derive(Clone, Copy, Debug)]
pub struct ApproxMeasure {
	pub advance: f64,
}

impl Default for ApproxMeasure {
	fn default() -> Self {
		Self { advance: 0.6 }
	}
}

impl MeasureText for ApproxMeasure {
	fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
		(text.chars().count() as f64 * font_size * self.advance, font_size)
	}
}

pub fn circle_box(node: &Node) -> BBox {
	let r = node.style.circle_r;
	BBox::new(node.x - r, node.y - r, node.x + r, node.y + r).padded(BOX_PADDING)
}

fn bucket(v: f64) -> i64 {
	(v / BUCKET_SIZE).floor() as i64
}

/// One bin per axis, keyed by `floor(coord / BUCKET_SIZE)`.
struct SpatialBins {
	by_x: HashMap<i64, Vec<usize>>,
	by_y: HashMap<i64, Vec<usize>>,
}

impl SpatialBins {
	fn build(nodes: &[Node]) -> Self {
		let mut by_x: HashMap<i64, Vec<usize>> = HashMap::new();
		let mut by_y: HashMap<i64, Vec<usize>> = HashMap::new();
		for (i, node) in nodes.iter().enumerate() {
			by_x.entry(bucket(node.x)).or_default().push(i);
			by_y.entry(bucket(node.y)).or_default().push(i);
		}
		Self { by_x, by_y }
	}

	fn collect(bins: &HashMap<i64, Vec<usize>>, center: f64, radius: f64) -> BTreeSet<usize> {
		(bucket(center - radius)..=bucket(center + radius))
			.filter_map(|key| bins.get(&key))
			.flatten()
			.copied()
			.collect()
	}

	/// Nodes within `radius` of node `i`, excluding `i`, in index order.
	fn neighbors(&self, nodes: &[Node], i: usize, radius: f64) -> Vec<usize> {
		let (x, y) = (nodes[i].x, nodes[i].y);
		let xs = Self::collect(&self.by_x, x, radius);
		let ys = Self::collect(&self.by_y, y, radius);
		xs.intersection(&ys)
			.copied()
			.filter(|&j| j != i && (nodes[j].x - x).hypot(nodes[j].y - y) <= radius)
			.collect()
	}
}

fn conflicts(bbox: &BBox, nodes: &[Node], neighbors: &[usize]) -> bool {
	neighbors.iter().any(|&j| {
		let other = &nodes[j];
		bbox.intersects(&other.label.bbox) || bbox.intersects(&other.circle_box)
	})
}

/// Place every label. Deterministic for identical positions.
pub fn place_labels<M: MeasureText + ?Sized>(nodes: &mut [Node], measure: &M) {
	let sizes: Vec<(f64, f64)> = nodes
		.iter()
		.map(|n| measure.measure(&n.short_title, n.style.label_font_size))
		.collect();
	for (node, &(w, h)) in nodes.iter_mut().zip(&sizes) {
		node.circle_box = circle_box(node);
		node.label = LabelPlacement::compute(node, 0.0, w, h);
	}

	let bins = SpatialBins::build(nodes);
	let mut exhausted = 0;
	for i in 0..nodes.len() {
		let neighbors = bins.neighbors(nodes, i, SEARCH_RADIUS);
		let (w, h) = sizes[i];
		let mut placement = LabelPlacement::compute(&nodes[i], 0.0, w, h);
		let mut step = 0;
		while conflicts(&placement.bbox, nodes, &neighbors) {
			step += 1;
			if step == STEPS_PER_TURN {
				placement.exhausted = true;
				exhausted += 1;
				break;
			}
			placement = LabelPlacement::compute(&nodes[i], step as f64 * ANGLE_STEP, w, h);
		}
		nodes[i].label = placement;
	}
	if exhausted > 0 {
		debug!("{exhausted} labels found no free angle");
	}
}
