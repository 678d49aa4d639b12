//! Which item is emphasized, and how hover, click and drag move that around.

use log::debug;

use super::events::GraphEvent;
use super::model::{ItemKey, ItemKind};
use super::state::Graph;
use super::styles::Tier;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HighlightState {
	#[default]
	Idle,
	Highlighted {
		key: ItemKey,
		/// Survives hover exit; only a click elsewhere or an explicit clear ends it.
		sticky: bool,
	},
}

impl HighlightState {
	pub fn focus(&self) -> Option<ItemKey> {
		match self {
			HighlightState::Idle => None,
			HighlightState::Highlighted { key, .. } => Some(*key),
		}
	}

	pub fn is_sticky(&self) -> bool {
		matches!(self, HighlightState::Highlighted { sticky: true, .. })
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HighlightOptions {
	/// Also emphasize the direct neighbors of a node and the links to them.
	pub highlight_related: bool,
	/// Make the highlight sticky.
	pub keep_highlighting: bool,
}

impl Default for HighlightOptions {
	fn default() -> Self {
		Self {
			highlight_related: true,
			keep_highlighting: false,
		}
	}
}

/// A hover highlight waiting out its delay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingHover {
	pub key: ItemKey,
	/// Milliseconds left.
	pub remaining: f64,
}

impl Graph {
	pub fn highlight_state(&self) -> HighlightState {
		self.highlight
	}

	/// Emphasize a node, and unless disabled its neighbors. `false` if `id` is not a node.
	pub fn highlight_node(&mut self, id: &str, options: HighlightOptions) -> bool {
		match self.key_of(id) {
			Some(key @ ItemKey::Node(_)) => {
				self.apply_highlight(key, options);
				true
			}
			_ => false,
		}
	}

	/// Emphasize a link and both of its endpoints. `false` if `id` is not a link.
	pub fn highlight_link(&mut self, id: &str, options: HighlightOptions) -> bool {
		match self.key_of(id) {
			Some(key @ ItemKey::Link(_)) => {
				self.apply_highlight(key, options);
				true
			}
			_ => false,
		}
	}

	/// Clear all emphasis and restore every item's base appearance.
	pub fn unhighlight_all(&mut self) {
		self.highlight = HighlightState::Idle;
		for node in &mut self.nodes {
			node.emphasis.masked = false;
			node.set_tier(Tier::Base);
		}
		for link in &mut self.links {
			link.emphasis.masked = false;
			link.set_tier(Tier::Base);
		}
	}

	fn apply_highlight(&mut self, key: ItemKey, options: HighlightOptions) {
		if self.highlight.focus() != Some(key) {
			self.unhighlight_all();
			self.fade = 0.0;
		}
		self.highlight = HighlightState::Highlighted {
			key,
			sticky: options.keep_highlighting,
		};
		debug!("highlight {} (sticky: {})", self.item_id(key), options.keep_highlighting);

		for node in &mut self.nodes {
			node.emphasis.masked = true;
			node.set_tier(Tier::Base);
		}
		for link in &mut self.links {
			link.emphasis.masked = true;
			link.set_tier(Tier::Base);
		}

		match key {
			ItemKey::Node(i) => {
				self.nodes[i].emphasis.masked = false;
				self.nodes[i].set_tier(Tier::Center);
				if !options.highlight_related {
					return;
				}
				let relations = self
					.relations
					.get_or_init(|| super::relations::RelationIndex::build(&self.nodes, &self.links));
				let Some(related) = relations.get(&self.nodes[i].id) else {
					return;
				};
				for &n in &related.nodes {
					self.nodes[n].emphasis.masked = false;
					self.nodes[n].set_tier(Tier::Highlighted);
				}
				for &l in &related.links {
					self.links[l].emphasis.masked = false;
					self.links[l].set_tier(Tier::Highlighted);
				}
			}
			ItemKey::Link(i) => {
				let (source, target) = (self.links[i].source, self.links[i].target);
				self.links[i].emphasis.masked = false;
				self.links[i].set_tier(Tier::Center);
				for n in [source, target] {
					self.nodes[n].emphasis.masked = false;
					self.nodes[n].set_tier(Tier::Center);
				}
			}
		}
	}

	fn hover_enabled(&self, kind: ItemKind) -> bool {
		match kind {
			ItemKind::Node => self.options().highlight_hovering_node,
			ItemKind::Link => self.options().highlight_hovering_link,
		}
	}

	/// The pointer entered an item. Returns `false` for unknown ids.
	pub fn hover_enter(&mut self, id: &str) -> bool {
		self.key_of(id).map(|key| self.enter_key(key)).is_some()
	}

	/// The pointer left an item. Returns `false` for unknown ids.
	pub fn hover_exit(&mut self, id: &str) -> bool {
		self.key_of(id).map(|key| self.exit_key(key)).is_some()
	}

	pub(crate) fn enter_key(&mut self, key: ItemKey) {
		if !self.hover_enabled(key.kind()) || self.highlight.is_sticky() || self.camera.is_centering()
		{
			return;
		}
		self.pending_hover = Some(PendingHover {
			key,
			remaining: self.options().highlighting_delay,
		});
	}

	pub(crate) fn exit_key(&mut self, key: ItemKey) {
		if self.camera.is_centering() {
			return;
		}
		self.pending_hover = None;
		if !self.hover_enabled(key.kind()) {
			return;
		}
		if let ItemKey::Node(i) = key {
			self.nodes[i].full_title = false;
		}
		if !self.highlight.is_sticky() {
			self.unhighlight_all();
		}
	}

	pub(crate) fn advance_hover(&mut self, dt: f64) {
		let Some(pending) = self.pending_hover.as_mut() else {
			return;
		};
		pending.remaining -= dt;
		if pending.remaining > 0.0 {
			return;
		}
		let key = pending.key;
		self.pending_hover = None;
		if self.camera.is_centering() {
			return;
		}
		if let ItemKey::Node(i) = key {
			self.nodes[i].full_title = true;
		}
		self.apply_highlight(key, HighlightOptions::default());
	}

	/// Click on an item: sticky highlight, centering and [`GraphEvent::ItemClicked`], as enabled by
	/// the options. Returns `false` for unknown ids and for the end of a drag.
	pub fn click(&mut self, id: &str) -> bool {
		match self.key_of(id) {
			Some(key) => self.click_key(key),
			None => false,
		}
	}

	pub(crate) fn click_key(&mut self, key: ItemKey) -> bool {
		if self.camera.is_dragged() {
			return false;
		}
		self.pending_hover = None;
		let options = self.options();
		let (highlight, center) = match key.kind() {
			ItemKind::Node => (options.highlight_clicked_node, options.center_clicked_node),
			ItemKind::Link => (options.highlight_clicked_link, options.center_clicked_link),
		};
		if highlight {
			self.apply_highlight(
				key,
				HighlightOptions {
					highlight_related: true,
					keep_highlighting: true,
				},
			);
		}
		if center {
			self.center_key(key);
		}
		let id = self.item_id(key).to_string();
		self.events.emit(GraphEvent::ItemClicked {
			id,
			kind: key.kind(),
		});
		true
	}

	/// Click on empty canvas clears the highlight unless the gesture was a drag.
	pub fn click_background(&mut self) {
		if !self.camera.is_dragged() {
			self.unhighlight_all();
		}
	}
}
