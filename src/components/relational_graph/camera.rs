//! Zoom, pan and centering.
//!
//! A graph point `p` lands on screen at `p * scale + nodes_center(scale) + translate`, where
//! `nodes_center` moves the middle of the node bounds to the origin. With the initial
//! translate of half the viewport, the graph starts centered.

use super::error::OutOfRangeError;
use super::model::Node;

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// The transform applied to the node layer: translate `(x, y)`, then scale `k`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	fn lerp(&self, to: &ViewTransform, t: f64) -> ViewTransform {
		ViewTransform {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

/// Extent of the laid-out nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub width: f64,
	pub height: f64,
}

impl Bounds {
	pub fn of(nodes: &[Node]) -> Self {
		let mut iter = nodes.iter();
		let Some(first) = iter.next() else {
			return Self::default();
		};
		let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
		for node in iter {
			min_x = min_x.min(node.x);
			min_y = min_y.min(node.y);
			max_x = max_x.max(node.x);
			max_y = max_y.max(node.y);
		}
		Self {
			min_x,
			min_y,
			width: (max_x - min_x).round(),
			height: (max_y - min_y).round(),
		}
	}

	/// Offset that moves the middle of the bounds to the origin at `scale`.
	pub fn center_offset(&self, scale: f64) -> (f64, f64) {
		(
			(-self.min_x - self.width / 2.0) * scale,
			(-self.min_y - self.height / 2.0) * scale,
		)
	}
}

#[derive(Clone, Copy, Debug)]
struct CenteringAnimation {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub translate_start_x: f64,
	pub translate_start_y: f64,
}

#[derive(Clone, Debug)]
pub struct Camera {
	scale: f64,
	translate: (f64, f64),
	min_scale: f64,
	max_scale: f64,
	pub width: f64,
	pub height: f64,
	bounds: Bounds,
	/// Translate recorded at gesture start or centering end; a different translate at
	/// pointer-up means the gesture was a drag.
	baseline: Option<(f64, f64)>,
	animation: Option<CenteringAnimation>,
	pub pan: PanState,
}

impl Camera {
	pub fn new(min_scale: f64, max_scale: f64, initial_scale: f64, width: f64, height: f64) -> Self {
		Self {
			scale: initial_scale.clamp(min_scale, max_scale),
			translate: (width / 2.0, height / 2.0),
			min_scale,
			max_scale,
			width,
			height,
			bounds: Bounds::default(),
			baseline: None,
			animation: None,
			pan: PanState::default(),
		}
	}

	/// Adopt the node bounds and center them in the viewport.
	pub fn fit(&mut self, bounds: Bounds) {
		self.bounds = bounds;
		self.translate = (self.width / 2.0, self.height / 2.0);
	}

	pub fn scale(&self) -> f64 {
		self.scale
	}

	pub fn translate(&self) -> (f64, f64) {
		self.translate
	}

	pub fn in_range(&self, scale: f64) -> bool {
		scale >= self.min_scale && scale <= self.max_scale
	}

	/// Change the scale, keeping the translate.
	pub fn set_scale(&mut self, scale: f64) -> Result<(), OutOfRangeError> {
		if !self.in_range(scale) {
			return Err(OutOfRangeError {
				requested: scale,
				min: self.min_scale,
				max: self.max_scale,
			});
		}
		self.finish_animation();
		self.scale = scale;
		Ok(())
	}

	/// Multiply the scale by `factor` (clamped), keeping the graph point under `(sx, sy)` fixed.
	/// Returns the new scale, or `None` if it did not change.
	pub fn zoom_at(&mut self, factor: f64, sx: f64, sy: f64) -> Option<f64> {
		let new_k = (self.scale * factor).clamp(self.min_scale, self.max_scale);
		if new_k == self.scale {
			return None;
		}
		self.finish_animation();
		let (gx, gy) = self.steady_view().screen_to_graph(sx, sy);
		let (cx, cy) = self.bounds.center_offset(new_k);
		self.translate = (sx - gx * new_k - cx, sy - gy * new_k - cy);
		self.scale = new_k;
		// a wheel zoom is a complete gesture of its own
		self.baseline = Some(self.translate);
		Some(new_k)
	}

	fn steady_view(&self) -> ViewTransform {
		let (cx, cy) = self.bounds.center_offset(self.scale);
		ViewTransform {
			x: cx + self.translate.0,
			y: cy + self.translate.1,
			k: self.scale,
		}
	}

	/// The transform to draw with, mid-animation if centering.
	pub fn view(&self) -> ViewTransform {
		match &self.animation {
			Some(anim) => {
				let t = (anim.elapsed / anim.duration).clamp(0.0, 1.0);
				anim.from.lerp(&anim.to, ease_out_cubic(t))
			}
			None => self.steady_view(),
		}
	}

	/// Bring graph point `(px, py)` to the viewport center over `duration` ms. Replaces any
	/// running centering animation.
	pub fn center_on(&mut self, px: f64, py: f64, duration: f64) {
		let from = self.view();
		let x = -px * self.scale + self.width / 2.0;
		let y = -py * self.scale + self.height / 2.0;
		let (cx, cy) = self.bounds.center_offset(self.scale);
		self.translate = (x - cx, y - cy);
		self.animation = Some(CenteringAnimation {
			from,
			to: self.steady_view(),
			elapsed: 0.0,
			duration,
		});
		if duration <= 0.0 {
			self.finish_animation();
		}
	}

	pub fn is_centering(&self) -> bool {
		self.animation.is_some()
	}

	/// Advance the centering animation. Returns `true` on the step that completes it.
	pub fn advance(&mut self, dt: f64) -> bool {
		let Some(anim) = self.animation.as_mut() else {
			return false;
		};
		anim.elapsed += dt;
		if anim.elapsed >= anim.duration {
			self.finish_animation();
			return true;
		}
		false
	}

	fn finish_animation(&mut self) {
		if self.animation.take().is_some() {
			self.baseline = Some(self.translate);
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn begin_gesture(&mut self) {
		self.baseline = Some(self.translate);
	}

	pub fn end_gesture(&mut self) {
		self.pan.active = false;
		self.baseline = Some(self.translate);
	}

	pub fn is_dragged(&self) -> bool {
		self.baseline.is_some_and(|b| b != self.translate)
	}

	pub fn start_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			translate_start_x: self.translate.0,
			translate_start_y: self.translate.1,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		self.translate = (
			self.pan.translate_start_x + (sx - self.pan.start_x),
			self.pan.translate_start_y + (sy - self.pan.start_y),
		);
	}
}
