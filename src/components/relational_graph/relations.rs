use std::collections::HashMap;

use super::model::{Link, Node};

/// Direct neighbors of one node. The four vectors are index-aligned: `node_ids[i]` is reached
/// through `line_ids[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Relations {
	pub node_ids: Vec<String>,
	pub line_ids: Vec<String>,
	/// Neighbor node indices.
	pub nodes: Vec<usize>,
	/// Connecting link indices.
	pub links: Vec<usize>,
}

/// Undirected adjacency keyed by node id. Nodes without links have no entry.
#[derive(Clone, Debug, Default)]
pub struct RelationIndex {
	by_node: HashMap<String, Relations>,
}

impl RelationIndex {
	pub fn build(nodes: &[Node], links: &[Link]) -> Self {
		let mut by_node: HashMap<String, Relations> = HashMap::new();
		for link in links {
			for (from, to) in [(link.source, link.target), (link.target, link.source)] {
				let entry = by_node.entry(nodes[from].id.clone()).or_default();
				entry.node_ids.push(nodes[to].id.clone());
				entry.line_ids.push(link.line_id());
				entry.nodes.push(to);
				entry.links.push(link.index);
			}
		}
		Self { by_node }
	}

	pub fn get(&self, node_id: &str) -> Option<&Relations> {
		self.by_node.get(node_id)
	}
}
