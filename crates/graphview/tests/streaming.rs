use std::collections::HashSet;
use std::f64::consts::TAU;
use std::time::Instant;

use graphview::*;
use proptest::prelude::*;

fn graph(width: f64, height: f64) -> ProofGraph {
    let mut graph = ProofGraph::new(
        LayoutEngine::default(),
        ZoomLimits::default(),
        Size::new(width, height),
    );
    graph.start_session();
    graph.channel_ready();
    graph
}

fn node(id: &str, level: usize, parent: Option<&str>) -> Event {
    Event::NodeAdded(NewNode {
        id: id.to_string(),
        statement: format!("statement {id}"),
        level,
        parent_id: parent.map(str::to_string),
        is_elementary: false,
    })
}

fn ids(list: &[&str]) -> HashSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_root_is_placed_on_center() {
    let mut g = graph(1024.0, 768.0);
    let applied = g.ingest(node("root", 0, None)).unwrap();
    assert_eq!(
        applied,
        Applied::Inserted {
            id: "root".into(),
            position: Position::new(512.0, 384.0)
        }
    );
}

#[test]
fn test_siblings_take_consecutive_eighths() {
    let mut g = graph(800.0, 600.0);
    let center = g.viewport().center();
    g.ingest(node("root", 0, None)).unwrap();
    for id in ["a", "b", "c"] {
        g.ingest(node(id, 1, Some("root"))).unwrap();
    }
    for (k, id) in ["a", "b", "c"].iter().enumerate() {
        let p = g.model().node(id).unwrap().position;
        let expected = center.polar_offset(200.0, k as f64 * TAU / 8.0);
        assert!((p.x - expected.x).abs() < 1e-9);
        assert!((p.y - expected.y).abs() < 1e-9);
    }
}

#[test]
fn test_resize_moves_center_for_later_nodes_only() {
    let mut g = graph(800.0, 600.0);
    g.ingest(node("root", 0, None)).unwrap();
    g.resize(1200.0, 600.0);
    g.ingest(node("a", 1, Some("root"))).unwrap();

    assert_eq!(g.model().node("root").unwrap().position, Position::new(400.0, 300.0));
    assert_eq!(g.model().node("a").unwrap().position, Position::new(800.0, 300.0));
}

#[test]
fn test_clear_then_new_session_starts_fresh() {
    let mut g = graph(800.0, 600.0);
    g.ingest(node("root", 0, None)).unwrap();
    g.ingest(node("a", 1, Some("root"))).unwrap();
    g.ingest(node("b", 1, Some("root"))).unwrap();

    g.clear();
    assert_eq!(g.model().size(), 0);
    assert_eq!(g.session(), &SessionState::Idle);

    g.start_session();
    g.channel_ready();
    g.ingest(node("root", 0, None)).unwrap();
    let Applied::Inserted { position, .. } = g.ingest(node("z", 1, Some("root"))).unwrap() else {
        panic!("expected insert");
    };
    assert_eq!(position, Position::new(600.0, 300.0));
}

#[test]
fn test_view_state_survives_new_session() {
    let mut g = graph(800.0, 600.0);
    g.wheel(100.0, 100.0, 1.0);
    let before = g.viewport().transform();
    g.start_session();
    assert_eq!(g.viewport().transform(), before);
}

#[test]
fn test_selection_highlights_chain_and_excludes_sibling() {
    let mut g = graph(800.0, 600.0);
    g.ingest(node("root", 0, None)).unwrap();
    g.ingest(node("A", 1, Some("root"))).unwrap();
    g.ingest(node("B", 2, Some("A"))).unwrap();
    g.ingest(node("C", 1, Some("root"))).unwrap();

    assert!(g.select_node("B"));
    assert_eq!(g.highlight_set(), ids(&["root", "A", "B"]));
    assert_eq!(g.selected_node().map(|n| n.id.as_str()), Some("B"));

    let view = g.view();
    let c = view.node("C").unwrap().clone();
    assert!(view.style(&c).dimmed);
    assert!(!view.style(&c).highlighted);

    g.deselect_all();
    assert!(g.highlight_set().is_empty());
    assert!(!g.view().style(&c).dimmed);
}

#[test]
fn test_view_lookup_matches_model() {
    let mut g = graph(800.0, 600.0);
    g.ingest(node("root", 0, None)).unwrap();
    for i in 0..50 {
        g.ingest(node(&format!("n-{i}"), 1, Some("root"))).unwrap();
    }
    let view = g.view();
    for n in view.nodes {
        assert_eq!(view.node(&n.id), Some(n));
    }
    for c in view.connections {
        assert_eq!(view.node(&c.to_id).map(|n| n.parent_id.as_deref()), Some(Some(c.from_id.as_str())));
    }
    assert!(view.node("missing").is_none());
}

#[test]
fn test_selection_follows_growing_subtree() {
    let mut g = graph(800.0, 600.0);
    g.ingest(node("root", 0, None)).unwrap();
    g.ingest(node("A", 1, Some("root"))).unwrap();
    g.select_node("A");

    g.ingest(node("A1", 2, Some("A"))).unwrap();
    g.ingest(node("A1x", 3, Some("A1"))).unwrap();
    g.ingest(node("C", 1, Some("root"))).unwrap();

    assert_eq!(g.highlight_set(), ids(&["root", "A", "A1", "A1x"]));
    assert_eq!(
        g.highlight_set(),
        DependencyHighlighter::highlight_set_for("A", g.model().connections())
    );
}

#[test]
fn test_unknown_selection_keeps_previous() {
    let mut g = graph(800.0, 600.0);
    g.ingest(node("root", 0, None)).unwrap();
    g.select_node("root");
    assert!(!g.select_node("nope"));
    assert_eq!(g.highlight_set(), ids(&["root"]));
}

#[test]
fn test_pointer_down_hits_node_or_pans() {
    let mut g = graph(800.0, 600.0);
    g.ingest(node("root", 0, None)).unwrap();

    assert_eq!(g.pointer_down(420.0, 310.0), PointerTarget::Node("root".into()));
    assert!(!g.viewport().is_dragging());
    assert_eq!(g.highlight_set(), ids(&["root"]));

    assert_eq!(g.pointer_down(10.0, 10.0), PointerTarget::Background);
    assert!(g.highlight_set().is_empty());
    g.pointer_move(60.0, 30.0);
    g.pointer_up();
    assert_eq!(g.viewport().transform().pan_x, 50.0);
    assert_eq!(g.viewport().transform().pan_y, 20.0);

    // root is now drawn 50px right and 20px down
    assert!(g.node_at(470.0, 320.0).is_some());
    assert!(g.node_at(339.0, 300.0).is_none());
}

#[test]
fn test_hit_test_respects_zoom() {
    let mut g = graph(800.0, 600.0);
    g.ingest(node("root", 0, None)).unwrap();
    for _ in 0..5 {
        g.wheel(400.0, 300.0, 1.0);
    }
    // zoom 0.59049 around the root leaves it under the cursor but shrinks its box
    assert!(g.node_at(400.0, 300.0).is_some());
    assert!(g.node_at(440.0, 300.0).is_none());
}

#[test]
fn test_update_and_completion_flow() {
    let mut g = graph(800.0, 600.0);
    g.ingest(node("root", 0, None)).unwrap();
    g.ingest(node("a", 1, Some("root"))).unwrap();
    let update = Event::from_json(
        r#"{"type":"node_update","data":{"id":"a","is_elementary":true,"explanation":"basic","proof_text":"by inspection"}}"#,
    )
    .unwrap();
    assert_eq!(g.ingest(update).unwrap(), Applied::Updated { id: "a".into() });

    let a = g.model().node("a").unwrap();
    assert!(a.is_elementary);
    assert_eq!(a.proof_text, "by inspection");
    assert!(!g.view().style(a).analyzing);

    g.ingest(Event::SessionCompleted).unwrap();
    assert_eq!(g.session(), &SessionState::Completed);
    assert_eq!(g.model().size(), 2);
    assert_eq!(g.status().progress, 100);
}

#[test]
fn test_tick_settles_appearing_nodes() {
    let mut g = graph(800.0, 600.0);
    let start = Instant::now();
    g.ingest_at(node("root", 0, None), start).unwrap();
    assert!(g.view().style(&g.model().nodes()[0]).appearing);
    assert_eq!(g.tick(start + APPEAR_DURATION), 1);
    assert!(!g.model().nodes()[0].appearing);
}

proptest! {
    #[test]
    fn prop_counts_match_accepted_events(parents in prop::collection::vec(any::<prop::sample::Index>(), 0..60)) {
        let mut g = graph(800.0, 600.0);
        g.ingest(node("n0", 0, None)).unwrap();
        let mut levels = vec![0usize];
        for (i, pick) in parents.iter().enumerate() {
            let parent = pick.index(levels.len());
            let id = format!("n{}", i + 1);
            let level = levels[parent] + 1;
            g.ingest(node(&id, level, Some(&format!("n{parent}")))).unwrap();
            levels.push(level);
        }
        prop_assert_eq!(g.model().size(), parents.len() + 1);
        prop_assert_eq!(g.model().connections().len(), parents.len());
        prop_assert_eq!(g.highlight_set().len(), 0);
    }

    #[test]
    fn prop_zoom_keeps_point_under_cursor(
        steps in prop::collection::vec((0.0f64..2000.0, 0.0f64..2000.0, -1.0f64..1.0), 1..40),
        pan in (-500.0f64..500.0, -500.0f64..500.0),
    ) {
        let mut viewport = ViewportController::default();
        viewport.begin_drag(0.0, 0.0);
        viewport.continue_drag(pan.0, pan.1);
        viewport.end_drag();

        for (x, y, direction) in steps {
            let anchor = viewport.to_layout(Position::new(x, y));
            viewport.zoom_at(x, y, direction);
            let back = viewport.to_screen(anchor);
            prop_assert!((back.x - x).abs() < 1e-6);
            prop_assert!((back.y - y).abs() < 1e-6);
            prop_assert!((0.1..=5.0).contains(&viewport.zoom()));
        }
    }
}
