use serde::Deserialize;

/// Behaviour switches and tunables of one graph instance.
///
/// Deserializes from the camelCase keys the JSON front end uses; missing keys keep their
/// defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphOptions {
	pub highlight_hovering_node: bool,
	pub highlight_clicked_node: bool,
	pub highlight_hovering_link: bool,
	pub highlight_clicked_link: bool,
	/// Debounce before a hovered item gets highlighted, in milliseconds.
	pub highlighting_delay: f64,

	pub center_clicked_node: bool,
	pub center_clicked_link: bool,
	/// Centering animation length, in milliseconds.
	pub centering_duration: f64,

	/// Titles longer than this are shortened to `head...tail`.
	pub max_title_length: usize,

	pub zoom_min_scale: f64,
	pub zoom_max_scale: f64,
	pub zoom_initial_scale: f64,

	pub node_default_title: String,

	/// Step the layout across frames, reporting progress, instead of in one go.
	pub progressive_loading: bool,
	/// Layout iterations; `None` uses `max(n² / 50, 2500)`.
	pub tick_count: Option<usize>,
	/// Minimum pause between progressive layout steps, in milliseconds.
	pub loading_interval: f64,
}

impl Default for GraphOptions {
	fn default() -> Self {
		Self {
			highlight_hovering_node: true,
			highlight_clicked_node: true,
			highlight_hovering_link: true,
			highlight_clicked_link: true,
			highlighting_delay: 300.0,
			center_clicked_node: true,
			center_clicked_link: true,
			centering_duration: 500.0,
			max_title_length: 20,
			zoom_min_scale: 0.4,
			zoom_max_scale: 1.0,
			zoom_initial_scale: 1.0,
			node_default_title: "untitled".into(),
			progressive_loading: false,
			tick_count: None,
			loading_interval: 10.0,
		}
	}
}

impl GraphOptions {
	/// Number of layout iterations for a graph of `node_count` nodes.
	pub fn layout_ticks(&self, node_count: usize) -> usize {
		self.tick_count
			.unwrap_or_else(|| (node_count * node_count / 50).max(2500))
	}

	/// Shorten `title` to the configured maximum: half from the front, `...`, half from the back.
	pub fn short_title(&self, title: &str) -> String {
		let len = title.chars().count();
		if len <= self.max_title_length {
			return title.to_string();
		}
		let half = self.max_title_length / 2;
		let head: String = title.chars().take(half).collect();
		let tail: String = title.chars().skip(len - half).collect();
		format!("{head}...{tail}")
	}
}
