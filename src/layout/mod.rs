mod bounds;
mod columns;
mod error;
mod placement;
mod relation;
mod roots;
mod routing;
pub(crate) mod types;
pub use bounds::LayoutInfo;
pub use columns::*;
pub use error::LayoutError;
pub use placement::{LayoutContext, place_from_roots, place_with_context};
pub use relation::{ColumnGraph, FnGraph};
pub use roots::{collect_roots, find_roots};
pub use routing::build_links;
pub use types::*;

use crate::config::{Config, LayoutConfig};
use crate::ir::Graph;
use crate::text_metrics;
use std::hash::Hash;

/// Column-flow layout engine.
///
/// Holds the padding and traversal settings; every call to
/// [`ColumnLayout::compute`] runs an independent pass.
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    config: LayoutConfig,
}

impl ColumnLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }

    /// Lays out `items`, where `sizes[i]` is the measured size of `items[i]`.
    ///
    /// Roots are collected from the main column (or the first column when the
    /// main one is empty) and placed depth-first. With `place_unreached` set,
    /// items no root leads to are placed afterwards, column by column.
    pub fn compute<T, G>(
        &self,
        items: &[T],
        sizes: &[Size],
        graph: &G,
    ) -> Result<GraphLayout<T>, LayoutError>
    where
        T: Clone + Eq + Hash,
        G: ColumnGraph<T> + ?Sized,
    {
        if items.len() != sizes.len() {
            return Err(LayoutError::SizeMismatch {
                items: items.len(),
                sizes: sizes.len(),
            });
        }
        if items.is_empty() {
            return Ok(GraphLayout::empty());
        }

        let padding = self.config.item_padding;
        let columns = partition_measured(items, sizes, |item| graph.column_of(item));
        let plain = items_only(&columns);

        let main_items = plain
            .get(&self.config.main_column)
            .or_else(|| {
                tracing::debug!(
                    main_column = self.config.main_column,
                    "main column is empty, falling back to the first column"
                );
                plain.values().next()
            })
            .cloned()
            .unwrap_or_default();

        let roots = collect_roots(&main_items, graph, &plain)?;
        let mut context = LayoutContext::new(&columns, padding);
        let mut nodes = place_with_context(&roots, graph, &columns, padding, &mut context);

        if self.config.place_unreached {
            let rest: Vec<T> = plain
                .values()
                .flatten()
                .filter(|item| !context.is_placed(item))
                .cloned()
                .collect();
            if !rest.is_empty() {
                tracing::debug!(
                    count = rest.len(),
                    "placing items unreachable from the main column"
                );
                nodes.extend(place_with_context(&rest, graph, &columns, padding, &mut context));
            }
        }

        let links = build_links(
            &nodes,
            |from, to| graph.linked(from, to),
            |from, to| graph.same_column_side(from, to),
            self.config.same_column_link_padding,
        );

        let nodes_rect = bounds::nodes_rect(&nodes, padding);
        let links_rect = bounds::links_rect(&links);
        let graph_rect = bounds::graph_rect(nodes_rect, links_rect);

        tracing::debug!(
            items = items.len(),
            nodes = nodes.len(),
            links = links.len(),
            width = graph_rect.width(),
            height = graph_rect.height(),
            "column layout computed"
        );

        Ok(GraphLayout {
            nodes,
            links,
            nodes_rect,
            links_rect,
            graph_rect,
        })
    }
}

/// Layout of a parsed graph document, in canvas coordinates.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Translated so the graph rect starts at the content padding corner.
    pub graph: GraphLayout<String>,
    /// Item rects relative to the graph rect, in document order.
    pub info: LayoutInfo,
    pub width: i32,
    pub height: i32,
}

/// Measures every item without an explicit size and lays out the document.
pub fn compute_layout(graph: &Graph, config: &Config) -> Result<Layout, LayoutError> {
    let ids: Vec<String> = graph.items.iter().map(|item| item.id.clone()).collect();
    let sizes: Vec<Size> = graph
        .items
        .iter()
        .map(|item| {
            item.size
                .unwrap_or_else(|| text_metrics::measure_item(&item.label, &config.measure))
        })
        .collect();

    let mut layout_config = config.layout.clone();
    if let Some(main_column) = graph.main_column {
        layout_config.main_column = main_column;
    }
    let content_padding = layout_config.content_padding;

    let index = graph.index();
    let raw = ColumnLayout::new(layout_config).compute(&ids, &sizes, &index)?;
    let info = LayoutInfo::for_layout(&raw, &ids, None, content_padding);
    let width = raw.width().saturating_add(content_padding.horizontal());
    let height = raw.height().saturating_add(content_padding.vertical());
    let placed = raw
        .normalized()
        .translate(content_padding.left, content_padding.top);

    Ok(Layout {
        graph: placed,
        info,
        width,
        height,
    })
}
