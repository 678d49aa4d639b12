use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::model::{Link, Node};

/// A layout engine the graph drives to settle node positions.
pub trait LayoutEngine {
	/// Load the topology. Links are read-only; only positions come back.
	fn start(&mut self, nodes: &[Node], links: &[Link]);
	fn tick(&mut self);
	fn stop(&mut self);
	/// Copy the current positions into `nodes`.
	fn write_positions(&self, nodes: &mut [Node]);
}

/// Tunables of [`ForceLayout`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutParams {
	/// Rest length a linked pair settles around.
	pub link_distance: f32,
	pub repulsion: f32,
	/// Pull toward the origin applied every tick, as a fraction of the distance.
	pub gravity: f32,
	/// Velocity damping per tick.
	pub friction: f32,
	pub max_force: f32,
	pub node_speed: f32,
	pub mass: f32,
	/// Seconds simulated by one tick.
	pub time_step: f32,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			link_distance: 150.0,
			repulsion: 150.0,
			gravity: 0.001,
			friction: 0.9,
			max_force: 100.0,
			node_speed: 3000.0,
			mass: 10.0,
			time_step: 0.016,
		}
	}
}

impl LayoutParams {
	/// Spring constant at which charge repulsion and spring pull balance at `link_distance`
	/// for an isolated pair.
	fn spring(&self) -> f32 {
		self.repulsion * self.mass * self.mass / self.link_distance.powi(3)
	}
}

/// Force-directed layout backed by `force_graph`.
pub struct ForceLayout {
	params: LayoutParams,
	graph: Option<ForceGraph<usize, ()>>,
}

impl ForceLayout {
	pub fn new(params: LayoutParams) -> Self {
		Self {
			params,
			graph: None,
		}
	}
}

impl Default for ForceLayout {
	fn default() -> Self {
		Self::new(LayoutParams::default())
	}
}

impl LayoutEngine for ForceLayout {
	fn start(&mut self, nodes: &[Node], links: &[Link]) {
		let p = &self.params;
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: p.repulsion,
			force_spring: p.spring(),
			force_max: p.max_force,
			node_speed: p.node_speed,
			damping_factor: p.friction,
		});
		// seed on a ring so the simulation starts untangled and deterministic
		let ring = (p.link_distance as f64) * (nodes.len() as f64).sqrt() / 2.0;
		let indices: Vec<DefaultNodeIdx> = (0..nodes.len())
			.map(|i| {
				let angle = (i as f64) * 2.0 * PI / nodes.len() as f64;
				graph.add_node(NodeData {
					x: (ring * angle.cos()) as f32,
					y: (ring * angle.sin()) as f32,
					mass: p.mass,
					is_anchor: false,
					user_data: i,
				})
			})
			.collect();
		for link in links {
			graph.add_edge(indices[link.source], indices[link.target], EdgeData::default());
		}
		self.graph = Some(graph);
	}

	fn tick(&mut self) {
		let Some(graph) = self.graph.as_mut() else {
			return;
		};
		graph.update(self.params.time_step);
		let gravity = self.params.gravity;
		if gravity > 0.0 {
			graph.visit_nodes_mut(|node| {
				if !node.data.is_anchor {
					node.data.x -= node.data.x * gravity;
					node.data.y -= node.data.y * gravity;
				}
			});
		}
	}

	fn stop(&mut self) {}

	fn write_positions(&self, nodes: &mut [Node]) {
		let Some(graph) = self.graph.as_ref() else {
			return;
		};
		graph.visit_nodes(|node| {
			if let Some(target) = nodes.get_mut(node.data.user_data) {
				target.x = node.x() as f64;
				target.y = node.y() as f64;
			}
		});
	}
}

/// Positions decided elsewhere, applied as-is.
#[derive(Clone, Debug, Default)]
pub struct PresetLayout {
	pub positions: Vec<(f64, f64)>,
}

impl LayoutEngine for PresetLayout {
	fn start(&mut self, _nodes: &[Node], _links: &[Link]) {}

	fn tick(&mut self) {}

	fn stop(&mut self) {}

	fn write_positions(&self, nodes: &mut [Node]) {
		for (node, &(x, y)) in nodes.iter_mut().zip(&self.positions) {
			node.x = x;
			node.y = y;
		}
	}
}
