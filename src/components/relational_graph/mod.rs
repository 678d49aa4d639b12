//! Interactive relational graph: validation, relations, highlighting, label placement, camera
//! and the canvas front end.

pub mod camera;
mod component;
pub mod error;
pub mod events;
pub mod highlight;
pub mod labels;
pub mod layout;
pub mod model;
pub mod options;
pub mod relations;
mod render;
pub mod state;
pub mod styles;
pub mod types;

pub use component::RelationalGraphCanvas;
pub use error::{ConstructionError, InvalidEventError, OutOfRangeError};
pub use events::{EventKind, GraphEvent, ListenerId};
pub use highlight::{HighlightOptions, HighlightState};
pub use layout::{ForceLayout, LayoutEngine, LayoutParams, PresetLayout};
pub use model::{Item, ItemKey, ItemKind, Link, Namespaces, Node};
pub use options::GraphOptions;
pub use relations::Relations;
pub use state::Graph;
pub use types::{GraphInput, LinkInput, NodeInput};
