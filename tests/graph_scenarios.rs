use std::cell::RefCell;
use std::rc::Rc;

use relational_graph_canvas::components::relational_graph::styles::Tier;
use relational_graph_canvas::{
	Graph, GraphEvent, GraphInput, GraphOptions, HighlightOptions, HighlightState, Item, ItemKey,
	ItemKind, Namespaces, PresetLayout,
};

const DATA1: &str = r#"{
	"styles": {
		"backgroundFill": "gray",
		"circleR": 20,
		"circleFill": "red",
		"labelFontSize": "15",
		"circleHighlightedScale": 1.5,
		"circleHighlightedFill": "blue",
		"circleHighlightedStroke": "black",
		"circleHighlightedStrokeWidth": 1.2,
		"circleCenterScale": 2,
		"circleCenterFill": "yellow",
		"circleCenterStroke": "gray",
		"circleCenterStrokeWidth": 1.5,
		"lineHighlightedStroke": "blue",
		"lineCenterStroke": "blue"
	},
	"nodes": [
		{"title": null, "styles": {"circleFill": "green"}},
		{"title": "has title", "id": "has-id", "styles": {"circleFill": "purple"}},
		{"title": "3rd circle", "id": "has-id-2"},
		{"title": "4th circle", "id": "has-id-3"}
	],
	"links": [
		{"source": 0, "target": 1, "styles": {
			"lineStroke": "black", "lineStrokeWidth": 4,
			"lineHighlightedStroke": "yellow", "lineHighlightedStrokeWidth": 6,
			"lineCenterStroke": "yellow", "lineCenterStrokeWidth": 6
		}},
		{"source": 0, "target": 3, "styles": {
			"lineHighlightedStrokeWidth": 5, "lineCenterStrokeWidth": 5
		}}
	]
}"#;

const DATA2: &str = r##"{
	"nodes": [
		{"title": null, "filter": ["a", "e"]},
		{"title": "has title", "id": "has-id", "filter": "b"},
		{"title": "3rd note", "filter": "a"},
		{"title": "4th node", "filter": "c"}
	],
	"links": [
		{"source": 0, "target": 1},
		{"source": 0, "target": 2, "styles": {
			"lineStrokeWidth": 5, "lineStrokeDasharray": "5,5",
			"lineStroke": "red", "lineCenterStroke": "#ddd"
		}}
	]
}"##;

fn drawn(json: &str, options: GraphOptions) -> Graph {
	let input = GraphInput::from_json(json).unwrap();
	let mut graph = Graph::new(input, "g0", options).unwrap();
	assert!(graph.draw(PresetLayout {
		positions: vec![(0.0, 0.0), (150.0, 0.0), (-150.0, 0.0), (0.0, 150.0)],
	}));
	graph
}

fn record(graph: &mut Graph) -> Rc<RefCell<Vec<GraphEvent>>> {
	let log = Rc::new(RefCell::new(Vec::new()));
	for name in ["before-load", "loading", "loaded", "drawn", "zoomed", "item-clicked"] {
		let log = log.clone();
		graph
			.on(name, move |event| log.borrow_mut().push(event.clone()))
			.unwrap();
	}
	log
}

fn tiers(graph: &Graph) -> (Vec<Option<Tier>>, Vec<Option<Tier>>) {
	let visible = |masked: bool, tier: Tier| (!masked).then_some(tier);
	(
		graph
			.nodes()
			.iter()
			.map(|n| visible(n.emphasis.masked, n.emphasis.tier))
			.collect(),
		graph
			.links()
			.iter()
			.map(|l| visible(l.emphasis.masked, l.emphasis.tier))
			.collect(),
	)
}

fn close(a: (f64, f64), b: (f64, f64)) -> bool {
	(a.0 - b.0).abs() < 1e-6 && (a.1 - b.1).abs() < 1e-6
}

#[test]
fn clicking_through_nodes_and_links_moves_the_focus() {
	use Tier::{Center, Highlighted};

	let mut graph = drawn(DATA1, GraphOptions::default());

	assert!(graph.click("g0-has-id-3"));
	assert_eq!(
		tiers(&graph),
		(
			vec![Some(Highlighted), None, None, Some(Center)],
			vec![None, Some(Highlighted)],
		)
	);
	assert_eq!(graph.nodes()[3].appearance.fill, "yellow");
	assert_eq!(graph.nodes()[3].appearance.scale, 2.0);
	assert_eq!(graph.nodes()[0].appearance.fill, "blue");
	assert_eq!(graph.links()[1].appearance.stroke, "blue");
	assert_eq!(graph.links()[1].appearance.stroke_width, 5.0);

	assert!(graph.click("g0-0"));
	assert_eq!(
		tiers(&graph),
		(
			vec![Some(Center), Some(Highlighted), None, Some(Highlighted)],
			vec![Some(Highlighted), Some(Highlighted)],
		)
	);
	assert_eq!(graph.links()[0].appearance.stroke, "yellow");

	assert!(graph.click("g0-0-has-id"));
	assert_eq!(
		tiers(&graph),
		(
			vec![Some(Center), Some(Center), None, None],
			vec![Some(Center), None],
		)
	);
	assert!(!graph.nodes()[3].emphasis.is_highlighted());
	assert_eq!(
		graph.highlight_state(),
		HighlightState::Highlighted {
			key: ItemKey::Link(0),
			sticky: true,
		}
	);

	// the link midpoint ends up in the middle of the viewport
	graph.tick(500.0);
	assert!(close(graph.view().graph_to_screen(75.0, 0.0), (400.0, 300.0)));
}

#[test]
fn unhighlight_restores_resolved_styles() {
	let mut graph = drawn(DATA1, GraphOptions::default());
	graph.highlight_node("g0-0", HighlightOptions::default());
	graph.unhighlight_all();

	let fills: Vec<&str> = graph
		.nodes()
		.iter()
		.map(|n| n.appearance.fill.as_str())
		.collect();
	assert_eq!(fills, vec!["green", "purple", "red", "red"]);
	assert!(graph.nodes().iter().all(|n| n.appearance.scale == 1.0));
	assert!(graph.nodes().iter().all(|n| !n.emphasis.masked));
	assert_eq!(graph.links()[0].appearance.stroke, "black");
	assert_eq!(graph.links()[0].appearance.stroke_width, 4.0);
	assert_eq!(graph.links()[1].appearance.stroke, "#DDD");
	assert_eq!(graph.links()[1].appearance.stroke_width, 3.0);
	assert_eq!(graph.nodes()[0].style.label_font_size, 15.0);
	assert_eq!(graph.styles().background_fill, "gray");
}

#[test]
fn toggling_filters_hides_nodes_and_their_links() {
	let mut graph = drawn(DATA2, GraphOptions::default());
	let shown = |g: &Graph| {
		(
			g.nodes().iter().map(|n| n.shown).collect::<Vec<_>>(),
			g.links().iter().map(|l| l.shown).collect::<Vec<_>>(),
		)
	};

	assert_eq!(graph.toggle_nodes("a", None), Some(false));
	assert_eq!(
		shown(&graph),
		(vec![false, true, false, true], vec![false, false])
	);

	assert_eq!(graph.toggle_nodes("b", None), Some(false));
	assert_eq!(
		shown(&graph),
		(vec![false, false, false, true], vec![false, false])
	);

	assert_eq!(graph.toggle_nodes("a", None), Some(true));
	assert_eq!(
		shown(&graph),
		(vec![true, false, true, true], vec![false, true])
	);

	assert_eq!(graph.toggle_nodes("e", Some(false)), Some(false));
	assert_eq!(
		shown(&graph),
		(vec![false, false, true, true], vec![false, false])
	);

	assert_eq!(graph.toggle_nodes("missing", None), None);
}

#[test]
fn dasharray_is_parsed_from_the_link_style() {
	let graph = drawn(DATA2, GraphOptions::default());
	assert_eq!(graph.links()[1].style.line_stroke_dasharray, vec![5.0, 5.0]);
	assert!(graph.links()[0].style.line_stroke_dasharray.is_empty());
}

#[test]
fn zoom_is_range_checked_and_reported_once() {
	let options = GraphOptions {
		zoom_min_scale: 0.2,
		zoom_max_scale: 0.8,
		zoom_initial_scale: 0.4,
		..GraphOptions::default()
	};
	let mut graph = drawn(DATA1, options);
	let events = record(&mut graph);

	let err = graph.zoom(0.1).unwrap_err();
	assert_eq!((err.min, err.max), (0.2, 0.8));
	assert!(graph.zoom(0.9).is_err());
	assert_eq!(graph.scale(), 0.4);
	assert!(events.borrow().is_empty());

	graph.zoom(0.6).unwrap();
	assert_eq!(graph.scale(), 0.6);
	assert_eq!(*events.borrow(), vec![GraphEvent::Zoomed(0.6)]);
}

#[test]
fn progressive_loading_reports_each_percent() {
	let options = GraphOptions {
		progressive_loading: true,
		tick_count: Some(200),
		..GraphOptions::default()
	};
	let input = GraphInput::from_json(DATA1).unwrap();
	let mut graph = Graph::new(input, "g0", options).unwrap();
	let events = record(&mut graph);

	assert!(graph.draw(PresetLayout {
		positions: vec![(0.0, 0.0), (150.0, 0.0), (-150.0, 0.0), (0.0, 150.0)],
	}));
	assert!(graph.is_loading());
	assert!(!graph.draw(PresetLayout::default()));
	assert_eq!(
		*events.borrow(),
		vec![GraphEvent::BeforeLoad, GraphEvent::Loading(1)]
	);

	// shorter than the loading interval: no step
	graph.tick(5.0);
	assert_eq!(events.borrow().len(), 2);

	for _ in 0..100 {
		graph.tick(10.0);
	}
	assert!(graph.is_drawn());
	let events = events.borrow();
	let mut expected = vec![GraphEvent::BeforeLoad];
	expected.extend((1..=100).map(GraphEvent::Loading));
	expected.push(GraphEvent::Loaded);
	expected.push(GraphEvent::Drawn);
	assert_eq!(*events, expected);
	assert_eq!(graph.nodes()[3].y, 150.0);
}

#[test]
fn eager_draw_reports_load_then_draw() {
	let input = GraphInput::from_json(DATA1).unwrap();
	let mut graph = Graph::new(input, "g0", GraphOptions::default()).unwrap();
	let events = record(&mut graph);
	graph.draw(PresetLayout::default());
	assert_eq!(
		*events.borrow(),
		vec![GraphEvent::BeforeLoad, GraphEvent::Loaded, GraphEvent::Drawn]
	);
}

#[test]
fn namespaces_keep_instances_apart() {
	let mut namespaces = Namespaces::new();
	let a = Graph::new(
		GraphInput::from_json(DATA2).unwrap(),
		namespaces.next_namespace(),
		GraphOptions::default(),
	)
	.unwrap();
	let b = Graph::new(
		GraphInput::from_json(DATA2).unwrap(),
		namespaces.next_namespace(),
		GraphOptions::default(),
	)
	.unwrap();
	assert_eq!(a.nodes()[1].id, "g0-has-id");
	assert_eq!(b.nodes()[1].id, "g1-has-id");
	for node in a.nodes() {
		assert!(b.item(&node.id).is_none());
	}
	for link in a.links() {
		assert!(b.item(&link.id).is_none());
	}
}

#[test]
fn items_and_relations_resolve_by_id() {
	let graph = drawn(DATA1, GraphOptions::default());
	match graph.item("g0-0-has-id") {
		Some(Item::Link(link)) => assert_eq!((link.source, link.target), (0, 1)),
		other => panic!("expected a link, got {other:?}"),
	}
	assert_eq!(graph.item("g0-has-id-2").map(|i| i.kind()), Some(ItemKind::Node));
	assert!(graph.item("has-id").is_none());

	let hub = graph.node_relations("g0-0").unwrap();
	assert_eq!(hub.node_ids, vec!["g0-has-id", "g0-has-id-3"]);
	assert_eq!(
		hub.line_ids,
		vec!["graph-line-g0-0-has-id", "graph-line-g0-0-has-id-3"]
	);
	assert!(graph.node_relations("g0-has-id-2").is_none());
}

#[test]
fn resize_recenters_the_highlighted_item() {
	let mut graph = drawn(DATA1, GraphOptions::default());
	graph.click("g0-has-id-3");
	graph.tick(500.0);
	assert!(close(graph.view().graph_to_screen(0.0, 150.0), (400.0, 300.0)));

	graph.resize(1000.0, 800.0);
	assert!(graph.camera().is_centering());
	graph.tick(500.0);
	assert!(close(graph.view().graph_to_screen(0.0, 150.0), (500.0, 400.0)));
}

#[test]
fn resize_without_highlight_keeps_the_view() {
	let mut graph = drawn(DATA1, GraphOptions::default());
	let before = graph.view();
	graph.resize(1000.0, 800.0);
	assert!(!graph.camera().is_centering());
	assert_eq!(graph.view(), before);
}

#[test]
fn dragging_suppresses_the_click() {
	let mut graph = drawn(DATA1, GraphOptions::default());
	let events = record(&mut graph);
	let (sx, sy) = graph.view().graph_to_screen(0.0, 0.0);

	graph.pointer_down(sx, sy);
	graph.pointer_move(sx + 30.0, sy);
	graph.pointer_up(sx + 30.0, sy);
	assert_eq!(graph.highlight_state(), HighlightState::Idle);
	assert!(events.borrow().is_empty());

	// a click that stays put goes through
	graph.pointer_down(sx + 30.0, sy);
	graph.pointer_up(sx + 30.0, sy);
	assert_eq!(
		graph.highlight_state(),
		HighlightState::Highlighted {
			key: ItemKey::Node(0),
			sticky: true,
		}
	);
	assert_eq!(
		*events.borrow(),
		vec![GraphEvent::ItemClicked {
			id: "g0-0".into(),
			kind: ItemKind::Node,
		}]
	);
}

#[test]
fn dragging_keeps_a_sticky_highlight() {
	let mut graph = drawn(DATA1, GraphOptions::default());
	graph.click("g0-0");
	graph.tick(500.0);

	// pan from empty canvas
	graph.pointer_down(5.0, 5.0);
	graph.pointer_move(45.0, 25.0);
	graph.pointer_up(45.0, 25.0);
	assert!(matches!(
		graph.highlight_state(),
		HighlightState::Highlighted { sticky: true, .. }
	));

	graph.pointer_down(5.0, 5.0);
	graph.pointer_up(5.0, 5.0);
	assert_eq!(graph.highlight_state(), HighlightState::Idle);
}

#[test]
fn wheel_zoom_after_a_gesture_does_not_swallow_clicks() {
	let mut graph = drawn(DATA1, GraphOptions::default());
	graph.pointer_down(5.0, 5.0);
	graph.pointer_up(5.0, 5.0);
	graph.wheel(1.0, 10.0, 10.0);
	assert!(graph.scale() < 1.0);

	assert!(graph.click("g0-has-id"));
	assert!(matches!(
		graph.highlight_state(),
		HighlightState::Highlighted { key: ItemKey::Node(1), sticky: true }
	));
	graph.tick(500.0);
	graph.wheel(1.0, 10.0, 10.0);
	graph.click_background();
	assert_eq!(graph.highlight_state(), HighlightState::Idle);
}

#[test]
fn hovering_highlights_after_the_delay() {
	let mut graph = drawn(DATA1, GraphOptions::default());
	let (sx, sy) = graph.view().graph_to_screen(150.0, 0.0);

	graph.pointer_move(sx, sy);
	assert_eq!(graph.hovered(), Some(ItemKey::Node(1)));
	graph.tick(299.0);
	assert_eq!(graph.highlight_state(), HighlightState::Idle);
	graph.tick(1.0);
	assert_eq!(
		graph.highlight_state(),
		HighlightState::Highlighted {
			key: ItemKey::Node(1),
			sticky: false,
		}
	);
	assert_eq!(graph.nodes()[1].display_title(), "has title");

	graph.pointer_move(5.0, 5.0);
	assert_eq!(graph.hovered(), None);
	assert_eq!(graph.highlight_state(), HighlightState::Idle);
}

#[test]
fn disabled_hover_highlighting_does_nothing() {
	let options = GraphOptions {
		highlight_hovering_node: false,
		..GraphOptions::default()
	};
	let mut graph = drawn(DATA1, options);
	graph.hover_enter("g0-0");
	graph.tick(1000.0);
	assert_eq!(graph.highlight_state(), HighlightState::Idle);
}

#[test]
fn panicking_listener_does_not_stop_delivery() {
	let mut graph = drawn(DATA1, GraphOptions::default());
	graph.on("ZOOMED", |_| panic!("listener bug")).unwrap();
	let events = record(&mut graph);
	graph.zoom(0.5).unwrap();
	assert_eq!(*events.borrow(), vec![GraphEvent::Zoomed(0.5)]);
	assert!(graph.on("exploded", |_| {}).is_err());
}
