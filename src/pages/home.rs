use leptos::prelude::*;

use crate::components::relational_graph::types::{Filters, GraphInput, LinkInput, NodeInput};
use crate::components::relational_graph::{GraphOptions, Namespaces, RelationalGraphCanvas};

const KINDS: [&str; 3] = ["person", "place", "thing"];

/// Generate a random tree with a few extra cross links, tagged with one filter per kind.
fn generate_sample_data(n: usize) -> GraphInput {
	let nodes = (0..n)
		.map(|i| {
			let kind = KINDS[i % KINDS.len()];
			NodeInput {
				kind: Some(kind.to_string()),
				filter: Some(Filters(vec![kind.to_string()])),
				..NodeInput::titled(format!("{kind} {i}"))
			}
		})
		.collect();

	let mut links: Vec<LinkInput> = (1..n)
		.map(|i| LinkInput::new(i, (rand_simple(i) * i as f64) as usize))
		.collect();
	// a handful of cross links, skipping any that would repeat a tree edge
	for i in (5..n).step_by(7) {
		let target = (rand_simple(i * 31) * i as f64) as usize;
		let exists = links.iter().any(|l| {
			(l.source, l.target) == (i, target) || (l.source, l.target) == (target, i)
		});
		if target != i && !exists {
			links.push(LinkInput {
				filter: Some("cross".into()),
				..LinkInput::new(i, target)
			});
		}
	}

	GraphInput {
		nodes,
		links,
		styles: None,
	}
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Next prefix from the app's shared [`Namespaces`], or `g0` outside the app.
fn next_namespace() -> String {
	use_context::<StoredValue<Namespaces>>()
		.and_then(|namespaces| namespaces.try_update_value(Namespaces::next_namespace))
		.unwrap_or_else(|| "g0".into())
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(move || generate_sample_data(60));
	let namespace = next_namespace();
	let (filters, set_filters) = signal(
		KINDS
			.iter()
			.map(|k| (k.to_string(), true))
			.collect::<Vec<_>>(),
	);
	let (clicked, set_clicked) = signal(None::<String>);

	let toggle = move |kind: &'static str| {
		set_filters.update(|filters| {
			for (tag, shown) in filters.iter_mut() {
				if tag == kind {
					*shown = !*shown;
				}
			}
		});
	};

	view! {
		<div class="fullscreen-graph">
			<RelationalGraphCanvas
				data=graph_data
				namespace=namespace
				options=GraphOptions::default()
				fullscreen=true
				filters=filters
				on_item_click=Callback::new(move |id: String| set_clicked.set(Some(id)))
			/>
			<div class="graph-overlay">
				<h1>"Relational Graph"</h1>
				<p class="subtitle">
					"Hover to highlight, click to pin and center. Scroll to zoom. Drag to pan."
				</p>
				<p class="controls">
					{KINDS
						.iter()
						.map(|&kind| {
							view! {
								<button on:click=move |_| toggle(kind)>{format!("toggle {kind}")}</button>
							}
						})
						.collect_view()}
				</p>
				<p class="selection">
					{move || clicked.get().map(|id| format!("clicked: {id}")).unwrap_or_default()}
				</p>
			</div>
		</div>
	}
}
