use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;

use log::{debug, info};

use super::camera::{Bounds, Camera, ViewTransform, ease_out_cubic};
use super::error::{ConstructionError, InvalidEventError, OutOfRangeError};
use super::events::{EventBus, EventKind, GraphEvent, ListenerId};
use super::highlight::{HighlightState, PendingHover};
use super::labels::{ApproxMeasure, MeasureText, place_labels};
use super::layout::LayoutEngine;
use super::model::{Item, ItemKey, Link, Node, normalize};
use super::options::GraphOptions;
use super::relations::{RelationIndex, Relations};
use super::styles::GlobalStyle;
use super::types::GraphInput;

/// Duration of the emphasis fade, in milliseconds.
pub const STYLE_TRANSITION: f64 = 200.0;
const DEFAULT_WIDTH: f64 = 800.0;
const DEFAULT_HEIGHT: f64 = 600.0;
const WHEEL_FACTOR: f64 = 1.1;
const DBL_CLICK_SCALE: f64 = 0.05;
/// Extra screen pixels around a line that still count as hitting it.
const LINE_HIT_SLOP: f64 = 2.0;

enum LoadPhase {
	Pending,
	Loading {
		engine: Box<dyn LayoutEngine>,
		ticks_per_step: usize,
		progress: u8,
		since_step: f64,
	},
	Drawn,
}

/// One interactive graph instance.
///
/// All time-based behavior (hover delay, centering, fades, progressive layout) advances only in
/// [`Graph::tick`].
pub struct Graph {
	namespace: String,
	options: GraphOptions,
	pub(crate) nodes: Vec<Node>,
	pub(crate) links: Vec<Link>,
	styles: GlobalStyle,
	pub(crate) relations: OnceCell<RelationIndex>,
	ids: OnceCell<HashMap<String, ItemKey>>,
	pub(crate) events: EventBus,
	pub(crate) camera: Camera,
	pub(crate) highlight: HighlightState,
	pub(crate) pending_hover: Option<PendingHover>,
	/// Progress of the emphasis fade, 0 to 1.
	pub(crate) fade: f64,
	phase: LoadPhase,
	hovered: Option<ItemKey>,
	measure: Box<dyn MeasureText>,
}

impl fmt::Debug for Graph {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Graph")
			.field("namespace", &self.namespace)
			.field("nodes", &self.nodes.len())
			.field("links", &self.links.len())
			.field("highlight", &self.highlight)
			.field("drawn", &self.is_drawn())
			.finish()
	}
}

impl Graph {
	/// Validate `input` and build an undrawn instance whose ids are prefixed with `namespace`.
	pub fn new(
		input: GraphInput,
		namespace: impl Into<String>,
		options: GraphOptions,
	) -> Result<Self, ConstructionError> {
		let namespace = namespace.into();
		let normalized = normalize(input, &namespace, &options)?;
		info!(
			"graph {namespace} created with {} nodes and {} links",
			normalized.nodes.len(),
			normalized.links.len()
		);
		let camera = Camera::new(
			options.zoom_min_scale,
			options.zoom_max_scale,
			options.zoom_initial_scale,
			DEFAULT_WIDTH,
			DEFAULT_HEIGHT,
		);
		Ok(Self {
			namespace,
			options,
			nodes: normalized.nodes,
			links: normalized.links,
			styles: normalized.styles,
			relations: OnceCell::new(),
			ids: OnceCell::new(),
			events: EventBus::default(),
			camera,
			highlight: HighlightState::Idle,
			pending_hover: None,
			fade: 1.0,
			phase: LoadPhase::Pending,
			hovered: None,
			measure: Box::new(ApproxMeasure::default()),
		})
	}

	/// Replace the text measurement used by label placement.
	pub fn with_measure(mut self, measure: impl MeasureText + 'static) -> Self {
		self.measure = Box::new(measure);
		self
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn options(&self) -> &GraphOptions {
		&self.options
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn styles(&self) -> &GlobalStyle {
		&self.styles
	}

	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	/// The transform to draw the node layer with.
	pub fn view(&self) -> ViewTransform {
		self.camera.view()
	}

	pub fn is_drawn(&self) -> bool {
		matches!(self.phase, LoadPhase::Drawn)
	}

	pub fn is_loading(&self) -> bool {
		matches!(self.phase, LoadPhase::Loading { .. })
	}

	/// Opacity of masked items right now, fading in after each change of focus.
	pub fn masked_alpha(&self) -> f64 {
		1.0 + (self.styles.masked_opacity - 1.0) * ease_out_cubic(self.fade)
	}

	/// Run the layout and settle positions. Returns `false` if the graph was already drawn or is
	/// loading.
	pub fn draw(&mut self, engine: impl LayoutEngine + 'static) -> bool {
		if !matches!(self.phase, LoadPhase::Pending) {
			return false;
		}
		self.events.emit(GraphEvent::BeforeLoad);
		let mut engine: Box<dyn LayoutEngine> = Box::new(engine);
		engine.start(&self.nodes, &self.links);
		let ticks = self.options.layout_ticks(self.nodes.len());

		if self.options.progressive_loading {
			self.phase = LoadPhase::Loading {
				engine,
				ticks_per_step: ticks.div_ceil(100),
				progress: 0,
				since_step: 0.0,
			};
			self.step_loading();
			return true;
		}

		for _ in 0..ticks {
			engine.tick();
		}
		engine.stop();
		engine.write_positions(&mut self.nodes);
		self.events.emit(GraphEvent::Loaded);
		self.finish_drawing();
		true
	}

	/// Run one percent of the layout budget.
	fn step_loading(&mut self) {
		let LoadPhase::Loading {
			engine,
			ticks_per_step,
			progress,
			since_step,
		} = &mut self.phase
		else {
			return;
		};
		for _ in 0..*ticks_per_step {
			engine.tick();
		}
		*progress += 1;
		*since_step = 0.0;
		let progress = *progress;
		self.events.emit(GraphEvent::Loading(progress));
		if progress < 100 {
			return;
		}
		if let LoadPhase::Loading { mut engine, .. } =
			std::mem::replace(&mut self.phase, LoadPhase::Pending)
		{
			engine.stop();
			engine.write_positions(&mut self.nodes);
		}
		self.events.emit(GraphEvent::Loaded);
		self.finish_drawing();
	}

	fn finish_drawing(&mut self) {
		place_labels(&mut self.nodes, self.measure.as_ref());
		self.camera.fit(Bounds::of(&self.nodes));
		self.phase = LoadPhase::Drawn;
		debug!("graph {} drawn", self.namespace);
		self.events.emit(GraphEvent::Drawn);
	}

	/// Advance every timer and animation by `dt` milliseconds.
	pub fn tick(&mut self, dt: f64) {
		if let LoadPhase::Loading { since_step, .. } = &mut self.phase {
			*since_step += dt;
			if *since_step >= self.options.loading_interval {
				self.step_loading();
			}
		}
		self.advance_hover(dt);
		if self.camera.advance(dt) {
			debug!("centering finished");
		}
		if self.fade < 1.0 {
			self.fade = (self.fade + dt / STYLE_TRANSITION).min(1.0);
		}
	}

	pub fn scale(&self) -> f64 {
		self.camera.scale()
	}

	/// Set the zoom scale, keeping the translate. Emits [`GraphEvent::Zoomed`] once.
	pub fn zoom(&mut self, scale: f64) -> Result<(), OutOfRangeError> {
		self.camera.set_scale(scale).inspect_err(|err| debug!("{err}"))?;
		self.events.emit(GraphEvent::Zoomed(scale));
		Ok(())
	}

	/// Animate the camera so the node, or the midpoint of the link, lands at the viewport center.
	pub fn center_item(&mut self, id: &str) -> bool {
		match self.key_of(id) {
			Some(key) => {
				self.center_key(key);
				true
			}
			None => false,
		}
	}

	pub(crate) fn center_key(&mut self, key: ItemKey) {
		let (x, y) = match key {
			ItemKey::Node(i) => (self.nodes[i].x, self.nodes[i].y),
			ItemKey::Link(i) => {
				let link = &self.links[i];
				let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
				((s.x + t.x) / 2.0, (s.y + t.y) / 2.0)
			}
		};
		self.camera.center_on(x, y, self.options.centering_duration);
	}

	/// Track a new viewport size, re-centering the highlighted item if there is one.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.camera.resize(width, height);
		if let Some(key) = self.highlight.focus() {
			self.center_key(key);
		}
	}

	/// Resolve a node or link by id.
	pub fn item(&self, id: &str) -> Option<Item<'_>> {
		self.key_of(id).map(|key| match key {
			ItemKey::Node(i) => Item::Node(&self.nodes[i]),
			ItemKey::Link(i) => Item::Link(&self.links[i]),
		})
	}

	pub fn key_of(&self, id: &str) -> Option<ItemKey> {
		self.ids
			.get_or_init(|| {
				let nodes = self.nodes.iter().map(|n| (n.id.clone(), ItemKey::Node(n.index)));
				let links = self.links.iter().map(|l| (l.id.clone(), ItemKey::Link(l.index)));
				nodes.chain(links).collect()
			})
			.get(id)
			.copied()
	}

	pub(crate) fn item_id(&self, key: ItemKey) -> &str {
		match key {
			ItemKey::Node(i) => &self.nodes[i].id,
			ItemKey::Link(i) => &self.links[i].id,
		}
	}

	/// Direct neighbors of a node. `None` for isolated nodes and unknown ids.
	pub fn node_relations(&self, node_id: &str) -> Option<&Relations> {
		self.relations
			.get_or_init(|| RelationIndex::build(&self.nodes, &self.links))
			.get(node_id)
	}

	/// Show or hide every node tagged `filter`, and the links touching them. With `show` unset the
	/// first tagged node's state is flipped. Returns the visibility applied, or `None` if no node
	/// carries the tag.
	pub fn toggle_nodes(&mut self, filter: &str, show: Option<bool>) -> Option<bool> {
		let first = self.nodes.iter().find(|n| n.filters.contains(filter))?;
		let show = show.unwrap_or(!first.shown);
		let mut touched = vec![false; self.nodes.len()];
		for node in self.nodes.iter_mut().filter(|n| n.filters.contains(filter)) {
			node.shown = show;
			touched[node.index] = true;
		}
		for link in &mut self.links {
			if touched[link.source] || touched[link.target] {
				link.shown = self.nodes[link.source].shown && self.nodes[link.target].shown;
			}
		}
		debug!("filter {filter}: shown = {show}");
		Some(show)
	}

	/// Subscribe by event name (`zoomed`, `item-clicked`, ...).
	pub fn on(
		&mut self,
		name: &str,
		listener: impl FnMut(&GraphEvent) + 'static,
	) -> Result<ListenerId, InvalidEventError> {
		self.events.on(name, listener)
	}

	pub fn subscribe(
		&mut self,
		kind: EventKind,
		listener: impl FnMut(&GraphEvent) + 'static,
	) -> ListenerId {
		self.events.subscribe(kind, listener)
	}

	pub fn off(&mut self, id: ListenerId) -> bool {
		self.events.off(id)
	}

	/// A link is visible only while it and both of its endpoints are shown.
	pub fn link_visible(&self, link: &Link) -> bool {
		link.shown && self.nodes[link.source].shown && self.nodes[link.target].shown
	}

	/// Topmost shown item under the screen point.
	pub fn item_at(&self, sx: f64, sy: f64) -> Option<ItemKey> {
		let view = self.camera.view();
		let (gx, gy) = view.screen_to_graph(sx, sy);
		let node = self.nodes.iter().rev().find(|n| {
			n.shown && (n.x - gx).hypot(n.y - gy) <= n.style.circle_r * n.appearance.scale
		});
		if let Some(node) = node {
			return Some(ItemKey::Node(node.index));
		}
		self.links
			.iter()
			.rev()
			.find(|l| {
				let (s, t) = (&self.nodes[l.source], &self.nodes[l.target]);
				let reach = l.appearance.stroke_width / 2.0 + LINE_HIT_SLOP / view.k;
				self.link_visible(l)
					&& segment_distance((gx, gy), (s.x, s.y), (t.x, t.y)) <= reach
			})
			.map(|l| ItemKey::Link(l.index))
	}

	pub fn hovered(&self) -> Option<ItemKey> {
		self.hovered
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if !self.is_drawn() {
			return;
		}
		if self.camera.pan.active {
			self.camera.pan_to(sx, sy);
			return;
		}
		let hit = self.item_at(sx, sy);
		if hit == self.hovered {
			return;
		}
		if let Some(previous) = self.hovered.take() {
			self.exit_key(previous);
		}
		if let Some(key) = hit {
			self.enter_key(key);
		}
		self.hovered = hit;
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if !self.is_drawn() {
			return;
		}
		self.camera.begin_gesture();
		if !self.camera.is_centering() {
			self.camera.start_pan(sx, sy);
		}
	}

	pub fn pointer_up(&mut self, sx: f64, sy: f64) {
		if !self.is_drawn() {
			return;
		}
		match self.item_at(sx, sy) {
			Some(key) => {
				self.click_key(key);
			}
			None => self.click_background(),
		}
		self.camera.end_gesture();
	}

	pub fn pointer_leave(&mut self) {
		self.camera.pan.active = false;
		if let Some(previous) = self.hovered.take() {
			self.exit_key(previous);
		}
	}

	/// Zoom around the cursor, one step per wheel notch.
	pub fn wheel(&mut self, delta_y: f64, sx: f64, sy: f64) {
		if !self.is_drawn() || delta_y == 0.0 {
			return;
		}
		let factor = if delta_y < 0.0 {
			WHEEL_FACTOR
		} else {
			1.0 / WHEEL_FACTOR
		};
		if let Some(scale) = self.camera.zoom_at(factor, sx, sy) {
			self.events.emit(GraphEvent::Zoomed(scale));
		}
	}

	/// Double-clicking the background zooms out a little.
	pub fn double_click(&mut self, sx: f64, sy: f64) {
		if !self.is_drawn() || self.item_at(sx, sy).is_some() {
			return;
		}
		let _ = self.zoom(self.scale() - DBL_CLICK_SCALE);
	}
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 == 0.0 {
		0.0
	} else {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
	};
	(p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::components::relational_graph::layout::PresetLayout;
	use crate::components::relational_graph::types::{LinkInput, NodeInput};

	fn graph(options: GraphOptions) -> Graph {
		let input = GraphInput {
			nodes: vec![NodeInput::default(); 3],
			links: vec![LinkInput::new(0, 1), LinkInput::new(1, 2)],
			styles: None,
		};
		let mut graph = Graph::new(input, "g0", options).unwrap();
		graph.draw(PresetLayout {
			positions: vec![(-100.0, 0.0), (0.0, 0.0), (100.0, 0.0)],
		});
		graph
	}

	#[test]
	fn segment_distance_clamps_to_endpoints() {
		assert_eq!(segment_distance((0.0, 5.0), (-10.0, 0.0), (10.0, 0.0)), 5.0);
		assert_eq!(segment_distance((13.0, 4.0), (-10.0, 0.0), (10.0, 0.0)), 5.0);
		assert_eq!(segment_distance((3.0, 4.0), (0.0, 0.0), (0.0, 0.0)), 5.0);
	}

	#[test]
	fn draw_runs_once() {
		let mut graph = graph(GraphOptions::default());
		assert!(graph.is_drawn());
		assert!(!graph.draw(PresetLayout::default()));
	}

	#[test]
	fn hit_testing_prefers_nodes_over_links() {
		let graph = graph(GraphOptions::default());
		let view = graph.view();
		let (sx, sy) = view.graph_to_screen(0.0, 0.0);
		assert_eq!(graph.item_at(sx, sy), Some(ItemKey::Node(1)));
		let (sx, sy) = view.graph_to_screen(50.0, 1.0);
		assert_eq!(graph.item_at(sx, sy), Some(ItemKey::Link(1)));
		let (sx, sy) = view.graph_to_screen(50.0, 30.0);
		assert_eq!(graph.item_at(sx, sy), None);
	}

	#[test]
	fn hidden_items_are_not_hit() {
		let mut graph = graph(GraphOptions::default());
		graph.nodes[1].shown = false;
		let view = graph.view();
		let (sx, sy) = view.graph_to_screen(0.0, 0.0);
		assert_eq!(graph.item_at(sx, sy), None);
		// both links end at the hidden node
		let (sx, sy) = view.graph_to_screen(50.0, 1.0);
		assert_eq!(graph.item_at(sx, sy), None);
		assert!(graph.links().iter().all(|l| !graph.link_visible(l)));
	}

	#[test]
	fn wheel_zoom_is_clamped_and_reported() {
		let zooms = Rc::new(RefCell::new(Vec::new()));
		let mut graph = graph(GraphOptions::default());
		let seen = zooms.clone();
		graph.subscribe(EventKind::Zoomed, move |e| seen.borrow_mut().push(e.clone()));
		// already at the maximum scale
		graph.wheel(-1.0, 400.0, 300.0);
		assert!(zooms.borrow().is_empty());
		graph.wheel(1.0, 400.0, 300.0);
		assert_eq!(zooms.borrow().len(), 1);
		assert!(graph.scale() < 1.0);
	}

	#[test]
	fn background_double_click_zooms_out() {
		let mut graph = graph(GraphOptions::default());
		graph.double_click(5.0, 5.0);
		assert!((graph.scale() - 0.95).abs() < 1e-9);
	}

	#[test]
	fn masked_alpha_fades_in() {
		let mut graph = graph(GraphOptions::default());
		assert!(graph.highlight_node("g0-1", Default::default()));
		assert_eq!(graph.masked_alpha(), 1.0);
		graph.tick(STYLE_TRANSITION);
		assert!((graph.masked_alpha() - 0.2).abs() < 1e-9);
	}
}
