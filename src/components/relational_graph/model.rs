//! Normalized node and link records and the validator that produces them.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::error::ConstructionError;
use super::labels::{BBox, LabelPlacement};
use super::options::GraphOptions;
use super::styles::{
	CircleAppearance, GlobalStyle, LineAppearance, LinkStyle, NodeStyle, Tier,
};
use super::types::{Filters, GraphInput, RawId};

/// Transient emphasis flags read by the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Emphasis {
	pub masked: bool,
	pub tier: Tier,
}

impl Emphasis {
	pub fn is_highlighted(&self) -> bool {
		self.tier != Tier::Base
	}

	pub fn is_center(&self) -> bool {
		self.tier == Tier::Center
	}
}

#[derive(Clone, Debug)]
pub struct Node {
	/// Namespaced id, unique within the graph instance.
	pub id: String,
	/// Id as supplied (or the array index), without the namespace.
	pub raw_id: String,
	pub index: usize,
	pub title: String,
	pub short_title: String,
	pub kind: Option<String>,
	pub filters: Filters,
	pub style: NodeStyle,
	pub shown: bool,
	pub x: f64,
	pub y: f64,
	pub label: LabelPlacement,
	pub circle_box: BBox,
	pub emphasis: Emphasis,
	pub appearance: CircleAppearance,
	/// Set while hover highlighting shows the untruncated title.
	pub full_title: bool,
}

impl Node {
	pub fn group_id(&self) -> String {
		format!("graph-group-{}", self.id)
	}

	pub fn circle_id(&self) -> String {
		format!("graph-circle-{}", self.id)
	}

	pub fn text_id(&self) -> String {
		format!("graph-text-{}", self.id)
	}

	pub fn type_class(&self) -> String {
		format!("graph-type-{}", self.kind.as_deref().unwrap_or("none"))
	}

	/// The text the label currently shows.
	pub fn display_title(&self) -> &str {
		if self.full_title {
			&self.title
		} else {
			&self.short_title
		}
	}

	/// Move emphasis to `tier` and re-derive the circle appearance from the cascade.
	pub(crate) fn set_tier(&mut self, tier: Tier) {
		self.emphasis.tier = tier;
		self.appearance = self.style.appearance(tier);
	}
}

#[derive(Clone, Debug)]
pub struct Link {
	pub id: String,
	pub index: usize,
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	pub filter: Option<String>,
	pub style: LinkStyle,
	pub shown: bool,
	pub emphasis: Emphasis,
	pub appearance: LineAppearance,
}

impl Link {
	pub fn line_id(&self) -> String {
		format!("graph-line-{}", self.id)
	}

	pub(crate) fn set_tier(&mut self, tier: Tier) {
		self.emphasis.tier = tier;
		self.appearance = self.style.appearance(tier);
	}
}

/// Either kind of graph item.
#[derive(Clone, Copy, Debug)]
pub enum Item<'a> {
	Node(&'a Node),
	Link(&'a Link),
}

impl<'a> Item<'a> {
	pub fn id(&self) -> &'a str {
		match self {
			Item::Node(node) => &node.id,
			Item::Link(link) => &link.id,
		}
	}

	pub fn kind(&self) -> ItemKind {
		match self {
			Item::Node(_) => ItemKind::Node,
			Item::Link(_) => ItemKind::Link,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
	Node,
	Link,
}

/// Position of an item in the node or link array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKey {
	Node(usize),
	Link(usize),
}

impl ItemKey {
	pub fn kind(&self) -> ItemKind {
		match self {
			ItemKey::Node(_) => ItemKind::Node,
			ItemKey::Link(_) => ItemKind::Link,
		}
	}
}

/// Hands out instance namespaces (`g0`, `g1`, ...) so ids of graphs sharing a page never collide.
#[derive(Clone, Debug, Default)]
pub struct Namespaces {
	next: usize,
}

impl Namespaces {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn next_namespace(&mut self) -> String {
		let namespace = format!("g{}", self.next);
		self.next += 1;
		namespace
	}
}

/// Output of [`normalize`].
#[derive(Debug)]
pub struct Normalized {
	pub nodes: Vec<Node>,
	pub links: Vec<Link>,
	pub styles: GlobalStyle,
}

/// Validate `input` and turn it into id-bearing, fully styled records.
pub fn normalize(
	input: GraphInput,
	namespace: &str,
	options: &GraphOptions,
) -> Result<Normalized, ConstructionError> {
	let GraphInput {
		nodes: node_inputs,
		links: link_inputs,
		styles,
	} = input;
	if node_inputs.is_empty() {
		return Err(ConstructionError::EmptyGraph);
	}
	let prefix = format!("{namespace}-");
	let globals = styles.unwrap_or_default();

	let raw_ids: Vec<String> = node_inputs
		.iter()
		.enumerate()
		.map(|(i, n)| n.id.as_ref().map_or_else(|| i.to_string(), RawId::to_string))
		.collect();
	check_unique_node_ids(&raw_ids)?;

	let nodes: Vec<Node> = node_inputs
		.into_iter()
		.zip(raw_ids)
		.enumerate()
		.map(|(index, (input, raw_id))| {
			let style = NodeStyle::resolve([Some(&globals.node), input.styles.as_ref()]);
			let title = input
				.title
				.filter(|t| !t.is_empty())
				.unwrap_or_else(|| options.node_default_title.clone());
			Node {
				id: format!("{prefix}{raw_id}"),
				raw_id,
				index,
				short_title: options.short_title(&title),
				title,
				kind: input.kind,
				filters: input.filter.unwrap_or_default(),
				appearance: style.appearance(Tier::Base),
				style,
				shown: true,
				x: 0.0,
				y: 0.0,
				label: LabelPlacement::default(),
				circle_box: BBox::default(),
				emphasis: Emphasis::default(),
				full_title: false,
			}
		})
		.collect();

	let mut identities = HashSet::new();
	// link ids share one namespace with node ids
	let mut taken_ids: HashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
	let mut links = Vec::with_capacity(link_inputs.len());
	for (index, input) in link_inputs.into_iter().enumerate() {
		let (from, to) = (input.source, input.target);
		if from >= nodes.len() || to >= nodes.len() {
			return Err(ConstructionError::InvalidLink { from, to });
		}
		if from == to {
			return Err(ConstructionError::SelfLink { index: from });
		}
		let filter = input.filter.filter(|f| !f.is_empty());
		if !identities.insert((from, to, filter.clone())) {
			return Err(ConstructionError::DuplicateLink { from, to, filter });
		}
		let raw_id = match (&input.id, &filter) {
			(Some(id), _) => id.to_string(),
			(None, Some(filter)) => {
				format!("{}-{}-{filter}", nodes[from].raw_id, nodes[to].raw_id)
			}
			(None, None) => format!("{}-{}", nodes[from].raw_id, nodes[to].raw_id),
		};
		let id = format!("{prefix}{raw_id}");
		if !taken_ids.insert(id.clone()) {
			return Err(ConstructionError::DuplicateLinkId { id: raw_id });
		}
		let style = LinkStyle::resolve([Some(&globals.link), input.styles.as_ref()]);
		links.push(Link {
			id,
			index,
			source: from,
			target: to,
			filter,
			appearance: style.appearance(Tier::Base),
			style,
			shown: true,
			emphasis: Emphasis::default(),
		});
	}

	debug!(
		"normalized graph {namespace}: {} nodes, {} links",
		nodes.len(),
		links.len()
	);
	Ok(Normalized {
		nodes,
		links,
		styles: GlobalStyle::resolve(Some(&globals)),
	})
}

fn check_unique_node_ids(raw_ids: &[String]) -> Result<(), ConstructionError> {
	let mut seen: HashMap<&str, Vec<usize>> = HashMap::new();
	for (i, id) in raw_ids.iter().enumerate() {
		seen.entry(id.as_str()).or_default().push(i);
	}
	// report the first id (in input order) that collides, with every index it occupies
	match raw_ids.iter().find(|id| seen[id.as_str()].len() > 1) {
		Some(id) => Err(ConstructionError::DuplicateNodeId {
			id: id.clone(),
			indices: seen[id.as_str()].clone(),
		}),
		None => Ok(()),
	}
}
