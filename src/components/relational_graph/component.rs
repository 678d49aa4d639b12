use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::events::{EventKind, GraphEvent};
use super::layout::ForceLayout;
use super::options::GraphOptions;
use super::render::{self, CanvasMeasure};
use super::state::Graph;
use super::types::GraphInput;

/// Milliseconds advanced per animation frame.
const FRAME_MS: f64 = 16.0;

type Shared<T> = Rc<RefCell<Option<T>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	let w = window.inner_width().ok()?.as_f64()?;
	let h = window.inner_height().ok()?.as_f64()?;
	Some((w, h))
}

/// Pointer position relative to the canvas.
fn local_position(canvas: &NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn apply_filters(graph: &mut Graph, filters: &[(String, bool)]) {
	for (tag, shown) in filters {
		if graph.toggle_nodes(tag, Some(*shown)).is_none() {
			warn!("no node carries filter {tag}");
		}
	}
}

/// Interactive relational graph drawn on a canvas.
///
/// `filters` pairs a filter tag with its visibility; every change is applied with
/// [`Graph::toggle_nodes`].
#[component]
pub fn RelationalGraphCanvas(
	#[prop(into)] data: Signal<GraphInput>,
	#[prop(into)] namespace: String,
	#[prop(optional)] options: GraphOptions,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional, into)] filters: Option<Signal<Vec<(String, bool)>>>,
	#[prop(optional, into)] on_item_click: Option<Callback<String>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let graph: Shared<Graph> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let (graph_init, animate_init, resize_cb_init) =
		(graph.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				error!("canvas has no 2d context");
				return;
			}
		};

		let mut instance = match Graph::new(data.get(), namespace.clone(), options.clone()) {
			Ok(graph) => graph.with_measure(CanvasMeasure { ctx: ctx.clone() }),
			Err(err) => {
				error!("invalid graph data: {err}");
				return;
			}
		};
		instance.resize(w, h);
		if let Some(callback) = on_item_click {
			instance.subscribe(EventKind::ItemClicked, move |event| {
				if let GraphEvent::ItemClicked { id, .. } = event {
					callback.run(id.clone());
				}
			});
		}
		instance.draw(ForceLayout::default());
		// a rebuilt graph starts with every node shown
		if let Some(filters) = filters {
			apply_filters(&mut instance, &filters.get_untracked());
		}
		*graph_init.borrow_mut() = Some(instance);
		// new data reuses the running frame loop
		if animate_init.borrow().is_some() {
			return;
		}

		if fullscreen {
			let (graph_resize, canvas_resize) = (graph_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut g) = *graph_resize.borrow_mut() {
					g.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (graph_anim, animate_inner) = (graph_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut g) = *graph_anim.borrow_mut() {
				g.tick(FRAME_MS);
				render::render(g, &ctx);
			}
			if let (Some(cb), Some(window)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	if let Some(filters) = filters {
		let graph_filters = graph.clone();
		Effect::new(move |_| {
			let filters = filters.get();
			if let Some(ref mut g) = *graph_filters.borrow_mut() {
				apply_filters(g, &filters);
			}
		});
	}

	let graph_md = graph.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(&canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut g) = *graph_md.borrow_mut() {
			g.pointer_down(x, y);
		}
	};

	let graph_mm = graph.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(&canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut g) = *graph_mm.borrow_mut() {
			g.pointer_move(x, y);
		}
	};

	let graph_mu = graph.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(&canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut g) = *graph_mu.borrow_mut() {
			g.pointer_up(x, y);
		}
	};

	let graph_ml = graph.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut g) = *graph_ml.borrow_mut() {
			g.pointer_leave();
		}
	};

	let graph_dc = graph.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(&canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut g) = *graph_dc.borrow_mut() {
			g.double_click(x, y);
		}
	};

	let graph_wh = graph.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_position(&canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut g) = *graph_wh.borrow_mut() {
			g.wheel(ev.delta_y(), x, y);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="relational-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
