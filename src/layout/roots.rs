use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use super::{ColumnGraph, LayoutError};

/// Parents of `item`: linked items from earlier columns, ordered by column
/// and then by their position inside the column.
fn parents_of<T, G>(item: &T, graph: &G, columns: &BTreeMap<i32, Vec<T>>) -> Vec<T>
where
    T: Clone,
    G: ColumnGraph<T> + ?Sized,
{
    let column = graph.column_of(item);
    columns
        .range(..column)
        .flat_map(|(_, candidates)| candidates.iter())
        .filter(|candidate| graph.linked(*candidate, item))
        .cloned()
        .collect()
}

/// Walks ancestors depth-first and calls `emit` for each root in order.
///
/// `skip` holds items whose roots have already been emitted by an earlier
/// walk; their subtrees are not expanded again.
fn walk_roots<T, G>(
    start: &T,
    graph: &G,
    columns: &BTreeMap<i32, Vec<T>>,
    mut skip: Option<&mut HashSet<T>>,
    mut emit: impl FnMut(T),
) -> Result<(), LayoutError>
where
    T: Clone + Eq + Hash,
    G: ColumnGraph<T> + ?Sized,
{
    let mut stack: Vec<(T, usize)> = vec![(start.clone(), 0)];
    let mut path: Vec<T> = Vec::new();

    while let Some((item, depth)) = stack.pop() {
        path.truncate(depth);
        if let Some(position) = path.iter().position(|ancestor| ancestor == &item) {
            return Err(LayoutError::CyclicGraph {
                column: graph.column_of(&item),
                depth: path.len() - position,
            });
        }
        if let Some(seen) = skip.as_deref_mut() {
            if !seen.insert(item.clone()) {
                continue;
            }
        }

        let parents = parents_of(&item, graph, columns);
        if parents.is_empty() {
            emit(item);
            continue;
        }
        path.push(item);
        for parent in parents.into_iter().rev() {
            stack.push((parent, depth + 1));
        }
    }
    Ok(())
}

/// Ultimate ancestors of `item`.
///
/// An item without parents is its own root. Otherwise the result is the
/// concatenation of every parent's roots, duplicates included.
pub fn find_roots<T, G>(
    item: &T,
    graph: &G,
    columns: &BTreeMap<i32, Vec<T>>,
) -> Result<Vec<T>, LayoutError>
where
    T: Clone + Eq + Hash,
    G: ColumnGraph<T> + ?Sized,
{
    let mut roots = Vec::new();
    walk_roots(item, graph, columns, None, |root| roots.push(root))?;
    Ok(roots)
}

/// Union of [`find_roots`] over `items`, first occurrence wins.
pub fn collect_roots<T, G>(
    items: &[T],
    graph: &G,
    columns: &BTreeMap<i32, Vec<T>>,
) -> Result<Vec<T>, LayoutError>
where
    T: Clone + Eq + Hash,
    G: ColumnGraph<T> + ?Sized,
{
    let mut expanded: HashSet<T> = HashSet::new();
    let mut emitted: HashSet<T> = HashSet::new();
    let mut roots = Vec::new();
    for item in items {
        walk_roots(item, graph, columns, Some(&mut expanded), |root| {
            if emitted.insert(root.clone()) {
                roots.push(root);
            }
        })?;
    }
    tracing::trace!(count = roots.len(), "collected layout roots");
    Ok(roots)
}
