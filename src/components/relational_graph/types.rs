use serde::Deserialize;

use super::styles::{LinkStyleOverrides, NodeStyleOverrides, StyleOverrides};

/// An id as it appears in raw graph data: JSON callers write both `"a"` and `1`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
	/// A textual id.
	Text(String),
	/// A numeric id.
	Number(i64),
}

impl std::fmt::Display for RawId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RawId::Text(s) => f.write_str(s),
			RawId::Number(n) => write!(f, "{n}"),
		}
	}
}

impl From<&str> for RawId {
	fn from(value: &str) -> Self {
		RawId::Text(value.to_string())
	}
}

impl From<i64> for RawId {
	fn from(value: i64) -> Self {
		RawId::Number(value)
	}
}

/// Filter tags accept a single string or a list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "FilterRepr")]
pub struct Filters(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum FilterRepr {
	One(String),
	Many(Vec<String>),
}

impl From<FilterRepr> for Filters {
	fn from(repr: FilterRepr) -> Self {
		match repr {
			FilterRepr::One(tag) => Filters(vec![tag]),
			FilterRepr::Many(tags) => Filters(tags),
		}
	}
}

impl Filters {
	/// Whether `tag` is one of the filters.
	pub fn contains(&self, tag: &str) -> bool {
		self.0.iter().any(|t| t == tag)
	}
}

/// A node as supplied by the caller.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NodeInput {
	/// Defaults to the node's index.
	pub id: Option<RawId>,
	pub title: Option<String>,
	/// Free-form type tag, exposed as a CSS-like class name.
	#[serde(rename = "type")]
	pub kind: Option<String>,
	pub filter: Option<Filters>,
	pub styles: Option<NodeStyleOverrides>,
}

/// A link as supplied by the caller; endpoints are indices into the node array.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LinkInput {
	pub source: usize,
	pub target: usize,
	/// Defaults to `<source id>-<target id>[-<filter>]`.
	#[serde(default)]
	pub id: Option<RawId>,
	#[serde(default)]
	pub filter: Option<String>,
	#[serde(default)]
	pub styles: Option<LinkStyleOverrides>,
}

/// Raw graph data handed to [`Graph::new`](super::Graph::new). It is consumed by construction.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GraphInput {
	pub nodes: Vec<NodeInput>,
	pub links: Vec<LinkInput>,
	pub styles: Option<StyleOverrides>,
}

impl GraphInput {
	/// Parse graph data in its JSON shape (camelCase style keys).
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}

impl NodeInput {
	/// A node with only a title set.
	pub fn titled(title: impl Into<String>) -> Self {
		Self {
			title: Some(title.into()),
			..Self::default()
		}
	}
}

impl LinkInput {
	/// A plain link between two node indices.
	pub fn new(source: usize, target: usize) -> Self {
		Self {
			source,
			target,
			..Self::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_numeric_ids_and_filter_shapes() {
		let input = GraphInput::from_json(
			r#"{
				"nodes": [{"id": 1, "filter": ["a", "e"]}, {"id": "x", "filter": "b"}, {"title": null}],
				"links": [{"source": 0, "target": 1, "filter": "f"}]
			}"#,
		)
		.unwrap();
		assert_eq!(input.nodes[0].id, Some(RawId::Number(1)));
		assert_eq!(input.nodes[1].id, Some(RawId::Text("x".into())));
		assert!(input.nodes[0].filter.as_ref().unwrap().contains("e"));
		assert_eq!(input.nodes[1].filter, Some(Filters(vec!["b".into()])));
		assert!(input.nodes[2].title.is_none());
		assert_eq!(input.links[0].filter.as_deref(), Some("f"));
		assert!(input.styles.is_none());
	}

	#[test]
	fn links_are_optional() {
		let input = GraphInput::from_json(r#"{"nodes": [{}]}"#).unwrap();
		assert_eq!(input.nodes.len(), 1);
		assert!(input.links.is_empty());
	}
}
