use serde::Serialize;

use super::{GraphLayout, Insets, Link, Node, Rect, Size};

pub(super) fn nodes_rect<T>(nodes: &[Node<T>], padding: Insets) -> Option<Rect> {
    let mut iter = nodes.iter();
    let first = iter.next()?.rect();
    Some(iter.fold(first, |acc, node| acc.union(&node.rect())).expand(padding))
}

pub(super) fn links_rect(links: &[Link]) -> Option<Rect> {
    Rect::enclosing(
        links
            .iter()
            .flat_map(|link| [link.start, link.center, link.end]),
    )
}

pub(super) fn graph_rect(nodes_rect: Option<Rect>, links_rect: Option<Rect>) -> Rect {
    match (nodes_rect, links_rect) {
        (Some(nodes), Some(links)) => nodes.union(&links),
        (Some(nodes), None) => nodes,
        (None, Some(links)) => links,
        (None, None) => Rect::ZERO,
    }
}

/// Geometry handed to whatever hosts the graph: one rect per input item,
/// the scrollable area and the padding kept around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutInfo {
    /// In input order; items that were not placed get [`Rect::ZERO`].
    pub item_rects: Vec<Rect>,
    pub container_size: Size,
    pub movable_area: Rect,
    pub content_padding: Insets,
}

impl LayoutInfo {
    /// Builds the info for `layout` as placed inside a container of at most
    /// `max_container` pixels. Item rects are expressed relative to the graph
    /// rect's top-left corner.
    pub fn for_layout<T: PartialEq>(
        layout: &GraphLayout<T>,
        items: &[T],
        max_container: Option<Size>,
        content_padding: Insets,
    ) -> Self {
        let offset = layout.offset();
        let item_rects = items
            .iter()
            .map(|item| {
                layout
                    .node_for(item)
                    .map(|node| node.rect().translate(offset.x, offset.y))
                    .unwrap_or(Rect::ZERO)
            })
            .collect();
        let graph_size = layout.graph_rect.size();
        let container_size = match max_container {
            Some(limit) => Size::new(
                graph_size.width.min(limit.width),
                graph_size.height.min(limit.height),
            ),
            None => graph_size,
        };
        Self {
            item_rects,
            container_size,
            movable_area: layout.graph_rect,
            content_padding,
        }
    }

    /// Smallest rect covering the selected item rects (all when `indices`
    /// is `None`), or a zero rect when nothing is selected.
    pub fn items_rect(&self, indices: Option<&[usize]>) -> Rect {
        let selected: Vec<&Rect> = match indices {
            Some(indices) => self
                .item_rects
                .iter()
                .enumerate()
                .filter(|(idx, _)| indices.contains(idx))
                .map(|(_, rect)| rect)
                .collect(),
            None => self.item_rects.iter().collect(),
        };
        let mut iter = selected.into_iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(*first, |acc, rect| acc.union(rect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Point;

    fn node(x: i32, y: i32) -> Node<u8> {
        Node {
            item: 0,
            size: Size::new(100, 50),
            position: Point::new(x, y),
        }
    }

    #[test]
    fn nodes_rect_includes_item_padding() {
        let nodes = vec![node(16, 4), node(148, 62)];
        let rect = nodes_rect(&nodes, Insets::new(16, 4, 16, 4)).unwrap();
        assert_eq!(rect, Rect::new(0, 0, 264, 116));
    }

    #[test]
    fn graph_rect_falls_back_to_zero() {
        assert_eq!(graph_rect(None, None), Rect::ZERO);
        let links = Rect::new(-20, 0, 10, 10);
        let nodes = Rect::new(0, 0, 50, 50);
        assert_eq!(graph_rect(Some(nodes), Some(links)), Rect::new(-20, 0, 50, 50));
    }

    #[test]
    fn items_rect_of_empty_selection_is_zero() {
        let info = LayoutInfo {
            item_rects: vec![Rect::new(10, 10, 20, 20)],
            container_size: Size::new(100, 100),
            movable_area: Rect::ZERO,
            content_padding: Insets::default(),
        };
        assert_eq!(info.items_rect(Some(&[])), Rect::ZERO);
        assert_eq!(info.items_rect(None), info.item_rects[0]);
    }
}
