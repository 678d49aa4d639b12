//! Interactive relational graph on a 2-D canvas.
//!
//! [`Graph`] is the framework-free core: validation, relation lookups, highlighting, label
//! placement and the camera, all advanced explicitly through [`Graph::tick`].
//! [`RelationalGraphCanvas`] mounts it on a canvas with Leptos; [`App`] is the demo app.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
pub mod components;
mod pages;

pub use components::relational_graph::{
	ConstructionError, EventKind, ForceLayout, Graph, GraphEvent, GraphInput, GraphOptions,
	HighlightOptions, HighlightState, InvalidEventError, Item, ItemKey, ItemKind, LayoutEngine,
	LayoutParams, Link, LinkInput, ListenerId, Namespaces, Node, NodeInput, OutOfRangeError,
	PresetLayout, RelationalGraphCanvas, Relations,
};

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the homepage and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();
	// one prefix factory per app, so every mounted graph gets distinct element ids
	provide_context(StoredValue::new(Namespaces::new()));

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Relational Graph" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
