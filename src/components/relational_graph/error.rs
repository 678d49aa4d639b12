use std::fmt;

/// Structural problems in the input graph. Construction fails as a whole.
///
/// Link endpoints are reported as `from`/`to` node indices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
	#[error("Node length must not be zero.")]
	EmptyGraph,

	#[error("Found duplicate node id: {id}. Id exists in nodes: {}", IndexList(.indices))]
	DuplicateNodeId { id: String, indices: Vec<usize> },

	#[error("Link (source: {from}, target: {to}) does not exist.")]
	InvalidLink { from: usize, to: usize },

	#[error("Link (source: {index}, target: {index}) connects a node to itself.")]
	SelfLink { index: usize },

	#[error("Found duplicate link (source: {from}, target: {to}).")]
	DuplicateLink {
		from: usize,
		to: usize,
		filter: Option<String>,
	},

	#[error("Found duplicate link id: {id}.")]
	DuplicateLinkId { id: String },
}

/// An event name that `on` does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid event: {0}")]
pub struct InvalidEventError(pub String);

/// A zoom request outside `[min, max]`; the camera is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("zoom scale {requested} is outside [{min}, {max}]")]
pub struct OutOfRangeError {
	pub requested: f64,
	pub min: f64,
	pub max: f64,
}

struct IndexList<'a>(&'a [usize]);

impl fmt::Display for IndexList<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, index) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{index}")?;
		}
		Ok(())
	}
}
