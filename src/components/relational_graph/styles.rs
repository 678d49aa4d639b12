//! Style records and the cascade that resolves them.
//!
//! Every visual property resolves through four levels: built-in default, graph-global
//! overrides, per-item overrides and finally the state tier (highlighted or center). The
//! state tier inherits the base property when no level sets it.
//!
//! Partial records are merged by [`cascade`]. A value only overrides a lower level when it is
//! explicit: `null`, a missing key, an empty string or a non-finite number never does.

use serde::{Deserialize, Deserializer};

/// A value that can tell whether it was deliberately set.
pub trait Explicit {
	/// `false` for placeholder values that must not override a lower cascade level.
	fn is_explicit(&self) -> bool;
}

impl Explicit for String {
	fn is_explicit(&self) -> bool {
		!self.trim().is_empty()
	}
}

impl Explicit for f64 {
	fn is_explicit(&self) -> bool {
		self.is_finite()
	}
}

/// A partial style record that can be layered over another one.
pub trait Cascade: Default {
	/// Copy every explicit value of `upper` over `self`.
	fn overlay(&mut self, upper: &Self);
}

fn overlay_value<T: Clone + Explicit>(slot: &mut Option<T>, upper: &Option<T>) {
	if let Some(value) = upper.as_ref().filter(|v| v.is_explicit()) {
		*slot = Some(value.clone());
	}
}

/// Merge partial records from lowest to highest precedence. Absent layers are skipped.
pub fn cascade<'a, T: Cascade + 'a>(layers: impl IntoIterator<Item = Option<&'a T>>) -> T {
	let mut merged = T::default();
	for layer in layers.into_iter().flatten() {
		merged.overlay(layer);
	}
	merged
}

/// Numbers arrive as `12` or `"12"`; anything unparseable counts as absent.
fn lenient_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Repr {
		Number(f64),
		Text(String),
	}
	Ok(match Option::<Repr>::deserialize(de)? {
		Some(Repr::Number(n)) => Some(n),
		Some(Repr::Text(s)) => s.trim().parse().ok(),
		None => None,
	})
}

macro_rules! overrides {
	(
		$(#[$meta:meta])*
		$name:ident {
			$( $(#[$fmeta:meta])* $field:ident : $ty:ty, )*
		}
	) => {
		$(#[$meta])*
		#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
		#[serde(default, rename_all = "camelCase")]
		pub struct $name {
			$( $(#[$fmeta])* pub $field: Option<$ty>, )*
		}

		impl Cascade for $name {
			fn overlay(&mut self, upper: &Self) {
				$( overlay_value(&mut self.$field, &upper.$field); )*
			}
		}
	};
}

overrides! {
	/// Partial circle and label styling.
	NodeStyleOverrides {
		#[serde(deserialize_with = "lenient_number")]
		circle_r: f64,
		circle_fill: String,
		circle_stroke: String,
		#[serde(deserialize_with = "lenient_number")]
		circle_stroke_width: f64,

		#[serde(deserialize_with = "lenient_number")]
		circle_highlighted_scale: f64,
		circle_highlighted_fill: String,
		circle_highlighted_stroke: String,
		#[serde(deserialize_with = "lenient_number")]
		circle_highlighted_stroke_width: f64,

		#[serde(deserialize_with = "lenient_number")]
		circle_center_scale: f64,
		circle_center_fill: String,
		circle_center_stroke: String,
		#[serde(deserialize_with = "lenient_number")]
		circle_center_stroke_width: f64,

		#[serde(deserialize_with = "lenient_number")]
		label_font_size: f64,
	}
}

overrides! {
	/// Partial line styling.
	LinkStyleOverrides {
		line_stroke: String,
		#[serde(deserialize_with = "lenient_number")]
		line_stroke_width: f64,
		/// Comma or space separated dash lengths, e.g. `"5,5"`.
		line_stroke_dasharray: String,

		line_highlighted_stroke: String,
		#[serde(deserialize_with = "lenient_number")]
		line_highlighted_stroke_width: f64,

		line_center_stroke: String,
		#[serde(deserialize_with = "lenient_number")]
		line_center_stroke_width: f64,
	}
}

/// Graph-level styles. Node and link keys given here form the global cascade level.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleOverrides {
	#[serde(deserialize_with = "lenient_number")]
	pub masked_opacity: Option<f64>,
	pub background_fill: Option<String>,
	#[serde(flatten)]
	pub node: NodeStyleOverrides,
	#[serde(flatten)]
	pub link: LinkStyleOverrides,
}

/// Resolved graph-level styles.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalStyle {
	pub masked_opacity: f64,
	pub background_fill: String,
}

impl GlobalStyle {
	pub fn resolve(overrides: Option<&StyleOverrides>) -> Self {
		let masked_opacity = overrides
			.and_then(|o| o.masked_opacity)
			.filter(Explicit::is_explicit)
			.unwrap_or(0.2);
		let background_fill = overrides
			.and_then(|o| o.background_fill.clone())
			.filter(Explicit::is_explicit)
			.unwrap_or_else(|| "#FAFAFA".into());
		Self {
			masked_opacity,
			background_fill,
		}
	}
}

/// Emphasis level of an item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tier {
	#[default]
	Base,
	Highlighted,
	Center,
}

/// What a circle currently looks like.
#[derive(Clone, Debug, PartialEq)]
pub struct CircleAppearance {
	pub fill: String,
	pub stroke: String,
	pub stroke_width: f64,
	pub scale: f64,
}

/// What a line currently looks like.
#[derive(Clone, Debug, PartialEq)]
pub struct LineAppearance {
	pub stroke: String,
	pub stroke_width: f64,
}

/// Fully resolved node style, every tier present.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	pub circle_r: f64,
	pub circle_fill: String,
	pub circle_stroke: String,
	pub circle_stroke_width: f64,
	pub circle_highlighted_scale: f64,
	pub circle_highlighted_fill: String,
	pub circle_highlighted_stroke: String,
	pub circle_highlighted_stroke_width: f64,
	pub circle_center_scale: f64,
	pub circle_center_fill: String,
	pub circle_center_stroke: String,
	pub circle_center_stroke_width: f64,
	pub label_font_size: f64,
}

impl NodeStyle {
	/// Resolve `layers` (lowest precedence first) on top of the built-in defaults.
	pub fn resolve<'a>(layers: impl IntoIterator<Item = Option<&'a NodeStyleOverrides>>) -> Self {
		let m = cascade(layers);
		let circle_fill = m.circle_fill.unwrap_or_else(|| "#00F".into());
		let circle_stroke = m.circle_stroke.unwrap_or_else(|| "#999".into());
		let circle_stroke_width = m.circle_stroke_width.unwrap_or(1.0);
		Self {
			circle_r: m.circle_r.unwrap_or(17.0),
			circle_highlighted_scale: m.circle_highlighted_scale.unwrap_or(1.0),
			circle_highlighted_fill: m
				.circle_highlighted_fill
				.unwrap_or_else(|| circle_fill.clone()),
			circle_highlighted_stroke: m
				.circle_highlighted_stroke
				.unwrap_or_else(|| circle_stroke.clone()),
			circle_highlighted_stroke_width: m
				.circle_highlighted_stroke_width
				.unwrap_or(circle_stroke_width),
			circle_center_scale: m.circle_center_scale.unwrap_or(1.5),
			circle_center_fill: m.circle_center_fill.unwrap_or_else(|| circle_fill.clone()),
			circle_center_stroke: m
				.circle_center_stroke
				.unwrap_or_else(|| circle_stroke.clone()),
			circle_center_stroke_width: m.circle_center_stroke_width.unwrap_or(circle_stroke_width),
			label_font_size: m.label_font_size.unwrap_or(12.0),
			circle_fill,
			circle_stroke,
			circle_stroke_width,
		}
	}

	pub fn appearance(&self, tier: Tier) -> CircleAppearance {
		match tier {
			Tier::Base => CircleAppearance {
				fill: self.circle_fill.clone(),
				stroke: self.circle_stroke.clone(),
				stroke_width: self.circle_stroke_width,
				scale: 1.0,
			},
			Tier::Highlighted => CircleAppearance {
				fill: self.circle_highlighted_fill.clone(),
				stroke: self.circle_highlighted_stroke.clone(),
				stroke_width: self.circle_highlighted_stroke_width,
				scale: self.circle_highlighted_scale,
			},
			Tier::Center => CircleAppearance {
				fill: self.circle_center_fill.clone(),
				stroke: self.circle_center_stroke.clone(),
				stroke_width: self.circle_center_stroke_width,
				scale: self.circle_center_scale,
			},
		}
	}
}

/// Fully resolved link style.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkStyle {
	pub line_stroke: String,
	pub line_stroke_width: f64,
	/// Empty for a solid line.
	pub line_stroke_dasharray: Vec<f64>,
	pub line_highlighted_stroke: String,
	pub line_highlighted_stroke_width: f64,
	pub line_center_stroke: String,
	pub line_center_stroke_width: f64,
}

impl LinkStyle {
	/// Resolve `layers` (lowest precedence first) on top of the built-in defaults.
	pub fn resolve<'a>(layers: impl IntoIterator<Item = Option<&'a LinkStyleOverrides>>) -> Self {
		let m = cascade(layers);
		let line_stroke = m.line_stroke.unwrap_or_else(|| "#DDD".into());
		Self {
			line_stroke_width: m.line_stroke_width.unwrap_or(3.0),
			line_stroke_dasharray: m
				.line_stroke_dasharray
				.as_deref()
				.map(parse_dasharray)
				.unwrap_or_default(),
			line_highlighted_stroke: m
				.line_highlighted_stroke
				.unwrap_or_else(|| line_stroke.clone()),
			line_highlighted_stroke_width: m.line_highlighted_stroke_width.unwrap_or(4.0),
			line_center_stroke: m.line_center_stroke.unwrap_or_else(|| line_stroke.clone()),
			line_center_stroke_width: m.line_center_stroke_width.unwrap_or(4.0),
			line_stroke,
		}
	}

	pub fn appearance(&self, tier: Tier) -> LineAppearance {
		match tier {
			Tier::Base => LineAppearance {
				stroke: self.line_stroke.clone(),
				stroke_width: self.line_stroke_width,
			},
			Tier::Highlighted => LineAppearance {
				stroke: self.line_highlighted_stroke.clone(),
				stroke_width: self.line_highlighted_stroke_width,
			},
			Tier::Center => LineAppearance {
				stroke: self.line_center_stroke.clone(),
				stroke_width: self.line_center_stroke_width,
			},
		}
	}
}

impl Default for NodeStyle {
	fn default() -> Self {
		Self::resolve(std::iter::empty())
	}
}

impl Default for LinkStyle {
	fn default() -> Self {
		Self::resolve(std::iter::empty())
	}
}

fn parse_dasharray(raw: &str) -> Vec<f64> {
	raw.split(|c: char| c == ',' || c.is_whitespace())
		.filter_map(|part| part.trim().parse::<f64>().ok())
		.filter(|n| n.is_finite() && *n >= 0.0)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(json: &str) -> NodeStyleOverrides {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn builtin_defaults_fill_every_tier() {
		let style = NodeStyle::default();
		assert_eq!(style.circle_r, 17.0);
		assert_eq!(style.circle_fill, "#00F");
		assert_eq!(style.circle_highlighted_fill, "#00F");
		assert_eq!(style.circle_center_stroke, "#999");
		assert_eq!(style.circle_center_scale, 1.5);

		let link = LinkStyle::default();
		assert_eq!(link.line_stroke, "#DDD");
		assert_eq!(link.line_center_stroke, "#DDD");
		assert_eq!(link.line_highlighted_stroke_width, 4.0);
		assert!(link.line_stroke_dasharray.is_empty());
	}

	#[test]
	fn item_level_wins_over_global() {
		let global = node(r#"{"circleFill": "red", "circleHighlightedFill": "blue"}"#);
		let item = node(r#"{"circleFill": "purple"}"#);
		let style = NodeStyle::resolve([Some(&global), Some(&item)]);
		assert_eq!(style.circle_fill, "purple");
		// the state tier set globally still beats the item's base property
		assert_eq!(style.circle_highlighted_fill, "blue");
		assert_eq!(style.circle_center_fill, "purple");
	}

	#[test]
	fn null_and_empty_values_never_override() {
		let global = node(r#"{"circleFill": "red", "circleStroke": "black"}"#);
		let item = node(r#"{"circleFill": null, "circleStroke": "  "}"#);
		let style = NodeStyle::resolve([Some(&global), Some(&item)]);
		assert_eq!(style.circle_fill, "red");
		assert_eq!(style.circle_stroke, "black");
	}

	#[test]
	fn numbers_may_be_strings() {
		let style = NodeStyle::resolve([Some(&node(r#"{"labelFontSize": "15", "circleR": "x"}"#))]);
		assert_eq!(style.label_font_size, 15.0);
		assert_eq!(style.circle_r, 17.0);
	}

	#[test]
	fn link_highlight_precedence_is_global_then_item() {
		let globals: StyleOverrides =
			serde_json::from_str(r#"{"lineHighlightedStroke": "blue", "lineCenterStroke": "blue"}"#)
				.unwrap();
		let item: LinkStyleOverrides = serde_json::from_str(
			r#"{"lineStroke": "black", "lineHighlightedStroke": "yellow", "lineStrokeDasharray": "5,5"}"#,
		)
		.unwrap();
		let overridden = LinkStyle::resolve([Some(&globals.link), Some(&item)]);
		assert_eq!(overridden.line_highlighted_stroke, "yellow");
		assert_eq!(overridden.line_center_stroke, "blue");
		assert_eq!(overridden.line_stroke_dasharray, vec![5.0, 5.0]);

		let plain = LinkStyle::resolve([Some(&globals.link), None]);
		assert_eq!(plain.line_highlighted_stroke, "blue");
		assert_eq!(plain.line_stroke, "#DDD");
	}

	#[test]
	fn tiers_pick_matching_properties() {
		let style = NodeStyle::resolve([Some(&node(
			r#"{"circleCenterFill": "yellow", "circleHighlightedScale": 1.5}"#,
		))]);
		assert_eq!(style.appearance(Tier::Center).fill, "yellow");
		assert_eq!(style.appearance(Tier::Highlighted).scale, 1.5);
		assert_eq!(style.appearance(Tier::Base).scale, 1.0);
	}

	#[test]
	fn global_style_defaults() {
		let global = GlobalStyle::resolve(None);
		assert_eq!(global.masked_opacity, 0.2);
		assert_eq!(global.background_fill, "#FAFAFA");
		let custom: StyleOverrides = serde_json::from_str(r#"{"backgroundFill": "gray"}"#).unwrap();
		assert_eq!(GlobalStyle::resolve(Some(&custom)).background_fill, "gray");
	}
}
