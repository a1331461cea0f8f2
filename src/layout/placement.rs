//! Column-by-column node placement.
//!
//! Placement starts from a list of roots and walks forward links depth-first.
//! Each column keeps a vertical cursor holding the lowest y a new item may
//! take. Placing a node pushes the cursors of its own and all earlier columns
//! below the node, and pulls the cursors of later columns down to the row the
//! node started on, so children never begin above their parent.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use std::ops::Bound;

use super::{
    ColumnGraph, Insets, MeasuredColumns, Node, Point, Size, column_offsets, column_widths,
};

/// Mutable state of one placement pass.
#[derive(Debug, Clone)]
pub struct LayoutContext<T> {
    column_x: BTreeMap<i32, i32>,
    y_cursor: BTreeMap<i32, i32>,
    placed: HashSet<T>,
}

impl<T: Clone + Eq + Hash> LayoutContext<T> {
    pub fn new(columns: &MeasuredColumns<T>, padding: Insets) -> Self {
        let column_x = column_offsets(&column_widths(columns, padding));
        let y_cursor = columns.keys().map(|key| (*key, 0)).collect();
        Self {
            column_x,
            y_cursor,
            placed: HashSet::new(),
        }
    }

    pub fn is_placed(&self, item: &T) -> bool {
        self.placed.contains(item)
    }

    /// Next free y in `column`.
    pub fn cursor(&self, column: i32) -> i32 {
        self.y_cursor.get(&column).copied().unwrap_or(0)
    }

    pub fn column_x(&self, column: i32) -> Option<i32> {
        self.column_x.get(&column).copied()
    }

    fn advance(&mut self, column: i32, item_y: i32, next_y: i32) {
        for (key, cursor) in self.y_cursor.iter_mut() {
            let floor = if *key <= column { next_y } else { item_y };
            *cursor = (*cursor).max(floor);
        }
    }
}

/// Places `roots` and everything reachable from them through forward links.
///
/// Output is depth-first pre-order: each root, then its subtree. Items
/// reached through several parents are placed once, under whichever parent
/// got there first. Roots without a measured entry in `columns` are skipped.
pub fn place_from_roots<T, G>(
    roots: &[T],
    graph: &G,
    columns: &MeasuredColumns<T>,
    padding: Insets,
) -> Vec<Node<T>>
where
    T: Clone + Eq + Hash,
    G: ColumnGraph<T> + ?Sized,
{
    let mut context = LayoutContext::new(columns, padding);
    place_with_context(roots, graph, columns, padding, &mut context)
}

/// Same as [`place_from_roots`], continuing from an existing pass.
pub fn place_with_context<T, G>(
    roots: &[T],
    graph: &G,
    columns: &MeasuredColumns<T>,
    padding: Insets,
    context: &mut LayoutContext<T>,
) -> Vec<Node<T>>
where
    T: Clone + Eq + Hash,
    G: ColumnGraph<T> + ?Sized,
{
    let mut nodes = Vec::new();
    let mut frames: Vec<std::vec::IntoIter<T>> = vec![roots.to_vec().into_iter()];

    while let Some(frame) = frames.last_mut() {
        let Some(item) = frame.next() else {
            frames.pop();
            continue;
        };
        if context.is_placed(&item) {
            continue;
        }

        let column = graph.column_of(&item);
        let Some(size) = measured_size(columns, column, &item) else {
            tracing::trace!(column, "skipping item with no measured entry in its column");
            continue;
        };
        let Some(lane_x) = context.column_x(column) else {
            continue;
        };

        let item_y = context.cursor(column);
        let node_y = item_y.saturating_add(padding.top);
        let next_y = node_y
            .saturating_add(size.height)
            .saturating_add(padding.bottom);

        nodes.push(Node {
            item: item.clone(),
            size,
            position: Point::new(lane_x.saturating_add(padding.left), node_y),
        });
        context.placed.insert(item.clone());
        context.advance(column, item_y, next_y);

        let children = children_of(&item, column, graph, columns);
        if !children.is_empty() {
            frames.push(children.into_iter());
        }
    }

    nodes
}

fn measured_size<T: PartialEq>(
    columns: &MeasuredColumns<T>,
    column: i32,
    item: &T,
) -> Option<Size> {
    columns
        .get(&column)?
        .iter()
        .find(|(candidate, _)| candidate == item)
        .map(|(_, size)| *size)
}

/// Linked items in later columns, furthest column first, without repeats.
fn children_of<T, G>(parent: &T, column: i32, graph: &G, columns: &MeasuredColumns<T>) -> Vec<T>
where
    T: Clone + Eq + Hash,
    G: ColumnGraph<T> + ?Sized,
{
    let mut seen: HashSet<&T> = HashSet::new();
    columns
        .range((Bound::Excluded(column), Bound::Unbounded))
        .rev()
        .flat_map(|(_, entries)| entries.iter().map(|(candidate, _)| candidate))
        .filter(|candidate| graph.linked(parent, *candidate))
        .filter(|candidate| seen.insert(*candidate))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FnGraph, partition_measured};

    const PADDING: Insets = Insets {
        left: 16,
        top: 4,
        right: 16,
        bottom: 4,
    };

    fn place(
        items: &[&'static str],
        column: fn(&&'static str) -> i32,
        linked: fn(&&'static str, &&'static str) -> bool,
        roots: &[&'static str],
    ) -> Vec<Node<&'static str>> {
        let sizes = vec![Size::new(100, 50); items.len()];
        let columns = partition_measured(items, &sizes, column);
        let graph = FnGraph::new(column, linked);
        place_from_roots(roots, &graph, &columns, PADDING)
    }

    fn position(nodes: &[Node<&'static str>], item: &str) -> Point {
        nodes
            .iter()
            .find(|node| node.item == item)
            .map(|node| node.position)
            .unwrap_or_else(|| panic!("{item} was not placed"))
    }

    #[test]
    fn siblings_stack_under_their_parent() {
        let nodes = place(
            &["A", "B", "C"],
            |item| if *item == "A" { 0 } else { 1 },
            |from, to| *from == "A" && (*to == "B" || *to == "C"),
            &["A"],
        );
        assert_eq!(position(&nodes, "A"), Point::new(16, 4));
        assert_eq!(position(&nodes, "B"), Point::new(148, 4));
        assert_eq!(position(&nodes, "C"), Point::new(148, 62));
        let order: Vec<&str> = nodes.iter().map(|node| node.item).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn furthest_children_are_placed_first() {
        let nodes = place(
            &["A", "B", "D"],
            |item| match *item {
                "A" => 0,
                "B" => 1,
                _ => 2,
            },
            |from, to| *from == "A" && (*to == "B" || *to == "D"),
            &["A"],
        );
        let order: Vec<&str> = nodes.iter().map(|node| node.item).collect();
        assert_eq!(order, vec!["A", "D", "B"]);
        assert_eq!(position(&nodes, "D").y, 4);
        // D pushed every earlier lane below itself.
        assert_eq!(position(&nodes, "B").y, 62);
    }

    #[test]
    fn next_root_starts_below_previous_subtree() {
        let nodes = place(
            &["A", "X", "B", "C"],
            |item| if *item == "A" || *item == "X" { 0 } else { 1 },
            |from, to| *from == "A" && (*to == "B" || *to == "C"),
            &["A", "X"],
        );
        // A's subtree spans two rows, so X starts after C.
        assert_eq!(position(&nodes, "X"), Point::new(16, 120));
    }

    #[test]
    fn later_columns_wait_for_the_current_row() {
        let nodes = place(
            &["A", "X", "Y"],
            |item| if *item == "Y" { 1 } else { 0 },
            |from, to| *from == "X" && *to == "Y",
            &["A", "X"],
        );
        // Lane 1 is still empty after A, but X pulls its cursor down to X's row.
        assert_eq!(position(&nodes, "X"), Point::new(16, 62));
        assert_eq!(position(&nodes, "Y"), Point::new(148, 62));
    }

    #[test]
    fn shared_child_is_placed_once() {
        let nodes = place(
            &["A", "B", "C"],
            |item| if *item == "C" { 1 } else { 0 },
            |_, to| *to == "C",
            &["A", "B"],
        );
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes.iter().filter(|node| node.item == "C").count(), 1);
        assert_eq!(position(&nodes, "C").y, 4);
    }

    #[test]
    fn unknown_root_is_skipped() {
        let nodes = place(&["A"], |_| 0, |_, _| false, &["missing", "A"]);
        assert_eq!(nodes.len(), 1);
        assert_eq!(position(&nodes, "A"), Point::new(16, 4));
    }

    #[test]
    fn same_column_nodes_never_overlap() {
        let items = ["A", "B", "C", "D", "E"];
        let nodes = place(&items, |_| 0, |_, _| false, &items);
        for pair in nodes.windows(2) {
            let upper = &pair[0];
            let lower = &pair[1];
            assert!(
                lower.position.y >= upper.position.y + upper.size.height + PADDING.vertical(),
                "{} overlaps {}",
                lower.item,
                upper.item
            );
        }
    }

    #[test]
    fn context_cursors_track_lowest_free_row() {
        let items = vec!["A", "B"];
        let sizes = vec![Size::new(10, 20), Size::new(10, 30)];
        let column = |item: &&str| if *item == "A" { 0 } else { 1 };
        let columns = partition_measured(&items, &sizes, column);
        let graph = FnGraph::new(column, |_: &&str, _: &&str| false);
        let mut context = LayoutContext::new(&columns, PADDING);
        place_with_context(&["A"], &graph, &columns, PADDING, &mut context);
        assert_eq!(context.cursor(0), 28);
        assert_eq!(context.cursor(1), 0);
        place_with_context(&["B"], &graph, &columns, PADDING, &mut context);
        assert_eq!(context.cursor(0), 38);
        assert_eq!(context.cursor(1), 38);
        assert!(context.is_placed(&"A") && context.is_placed(&"B"));
    }
}
