use std::collections::BTreeMap;
use std::path::Path;

use column_graph_layout::config::Config;
use column_graph_layout::ir::Graph;
use column_graph_layout::layout::{
    ColumnGraph, ColumnLayout, FnGraph, Layout, Point, Rect, Size, compute_layout,
};
use column_graph_layout::parser::parse_graph;

fn config() -> Config {
    let mut config = Config::default();
    config.measure.fast_text_metrics = true;
    config
}

fn load_fixture(rel: &str) -> Graph {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    parse_graph(&input).unwrap_or_else(|err| panic!("{rel}: {err}"))
}

fn layout_fixture(rel: &str) -> (Graph, Layout) {
    let graph = load_fixture(rel);
    let layout = compute_layout(&graph, &config()).unwrap_or_else(|err| panic!("{rel}: {err}"));
    (graph, layout)
}

fn assert_layout_invariants(rel: &str, graph: &Graph, layout: &Layout) {
    let config = config();
    let padding = config.layout.item_padding;
    let nodes = &layout.graph.nodes;

    assert_eq!(nodes.len(), graph.items.len(), "{rel}: every item is placed");
    for item in &graph.items {
        let count = nodes.iter().filter(|node| node.item == item.id).count();
        assert_eq!(count, 1, "{rel}: {} placed {count} times", item.id);
    }

    let mut lanes: BTreeMap<i32, Vec<Rect>> = BTreeMap::new();
    for node in nodes {
        lanes.entry(node.position.x).or_default().push(node.rect());
    }
    for rects in lanes.values_mut() {
        rects.sort_by_key(|rect| rect.top);
        for pair in rects.windows(2) {
            assert!(
                pair[1].top >= pair[0].bottom + padding.vertical(),
                "{rel}: {:?} overlaps {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    let bounds = layout.graph.graph_rect;
    for node in nodes {
        let rect = node.rect();
        assert!(
            rect.left >= bounds.left
                && rect.top >= bounds.top
                && rect.right <= bounds.right
                && rect.bottom <= bounds.bottom,
            "{rel}: {} escapes the graph rect",
            node.item
        );
    }

    let content = config.layout.content_padding;
    assert_eq!(bounds.top_left(), Point::new(content.left, content.top), "{rel}");
    assert_eq!(layout.width, bounds.width() + content.horizontal(), "{rel}");

    let index = graph.index();
    let expected_links = nodes
        .iter()
        .flat_map(|from| nodes.iter().map(move |to| (from, to)))
        .filter(|(from, to)| from.item != to.item && index.linked(&from.item, &to.item))
        .count();
    assert_eq!(layout.graph.links.len(), expected_links, "{rel}: link count");
}

#[test]
fn lay_out_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let fixtures = [
        "chain.cgl",
        "multiline_labels.cgl",
        "negative_columns.cgl",
        "same_column.cgl",
        "shared_child.cgl",
        "unreached.cgl",
        "worked_example.cgl",
        "worked_example.json",
    ];

    for rel in fixtures {
        let (graph, layout) = layout_fixture(rel);
        assert_layout_invariants(rel, &graph, &layout);
    }
}

#[test]
fn worked_example_positions() {
    let (_, layout) = layout_fixture("worked_example.cgl");
    assert_eq!(
        layout.info.item_rects,
        vec![
            Rect::new(16, 4, 116, 54),
            Rect::new(148, 4, 248, 54),
            Rect::new(148, 62, 248, 112),
        ]
    );
    assert_eq!(layout.graph.graph_rect.size(), Size::new(264, 116));
}

#[test]
fn json_and_line_documents_agree() {
    let (_, from_lines) = layout_fixture("worked_example.cgl");
    let (_, from_json) = layout_fixture("worked_example.json");
    assert_eq!(from_lines.graph.nodes, from_json.graph.nodes);
    assert_eq!(from_lines.graph.links, from_json.graph.links);
}

#[test]
fn shared_child_sits_on_first_parent_row() {
    let (_, layout) = layout_fixture("shared_child.cgl");
    let find = |id: &str| {
        layout
            .graph
            .nodes
            .iter()
            .find(|node| node.item == id)
            .map(|node| node.position)
            .unwrap()
    };
    assert_eq!(find("Merge").y, find("Left").y);
    assert!(find("Right").y > find("Left").y);
    assert!(find("After").y >= find("Merge").y);
}

/// An item reached through several parents hangs under the first of them
/// that was placed; it never starts above that parent.
fn assert_children_below_first_parent(rel: &str, graph: &Graph, layout: &Layout) {
    let nodes = &layout.graph.nodes;
    let index = graph.index();
    let order = |id: &String| nodes.iter().position(|node| &node.item == id);

    for child in &graph.items {
        let first_parent = graph
            .items
            .iter()
            .filter(|parent| parent.column < child.column && index.linked(&parent.id, &child.id))
            .filter_map(|parent| order(&parent.id).map(|idx| (idx, parent)))
            .min_by_key(|(idx, _)| *idx);
        let (Some((parent_idx, parent)), Some(child_idx)) = (first_parent, order(&child.id)) else {
            continue;
        };
        if parent_idx > child_idx {
            continue;
        }
        assert!(
            nodes[child_idx].position.y >= nodes[parent_idx].position.y,
            "{rel}: {} starts above {}",
            child.id,
            parent.id
        );
    }
}

#[test]
fn children_never_start_above_their_parent() {
    for rel in ["chain.cgl", "negative_columns.cgl", "shared_child.cgl", "unreached.cgl"] {
        let (graph, layout) = layout_fixture(rel);
        assert_children_below_first_parent(rel, &graph, &layout);
    }
}

#[test]
fn layout_is_idempotent() {
    let graph = load_fixture("chain.cgl");
    let first = compute_layout(&graph, &config()).unwrap();
    let second = compute_layout(&graph, &config()).unwrap();
    assert_eq!(first.graph.nodes, second.graph.nodes);
    assert_eq!(first.graph.links, second.graph.links);
    assert_eq!(first.info, second.info);
}

#[test]
fn interleaving_columns_does_not_move_unlinked_items() {
    let column = |item: &&str| match item.as_bytes()[0] {
        b'a' => 0,
        b'b' => 1,
        _ => 2,
    };
    let graph = FnGraph::new(column, |_: &&str, _: &&str| false);
    let layout = ColumnLayout::with_defaults();

    let grouped = ["a1", "a2", "b1", "b2", "c1"];
    let interleaved = ["c1", "b1", "a1", "b2", "a2"];
    let sizes_for = |items: &[&str]| -> Vec<Size> {
        items
            .iter()
            .map(|item| {
                let height = if item.ends_with('1') { 30 } else { 50 };
                Size::new(40 + 10 * item.len() as i32, height)
            })
            .collect()
    };

    let positions = |items: &[&'static str]| -> BTreeMap<&'static str, Point> {
        layout
            .compute(items, &sizes_for(items), &graph)
            .unwrap()
            .nodes
            .into_iter()
            .map(|node| (node.item, node.position))
            .collect()
    };
    assert_eq!(positions(&grouped[..]), positions(&interleaved[..]));
}

#[test]
fn empty_document_has_empty_layout() {
    let graph = parse_graph("colgraph\n%% nothing here").unwrap();
    let layout = compute_layout(&graph, &config()).unwrap();
    assert!(layout.graph.is_empty());
    assert!(layout.graph.links.is_empty());
    assert_eq!(layout.info.item_rects, Vec::<Rect>::new());
}
