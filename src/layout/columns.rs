use std::collections::BTreeMap;

use super::{Insets, Size};

/// Items grouped by column key, each paired with its measured size.
pub type MeasuredColumns<T> = BTreeMap<i32, Vec<(T, Size)>>;

/// Groups items by column. Keys come out ascending and every group keeps the
/// input order of its items.
pub fn partition<T: Clone>(items: &[T], column_of: impl Fn(&T) -> i32) -> BTreeMap<i32, Vec<T>> {
    let mut columns: BTreeMap<i32, Vec<T>> = BTreeMap::new();
    for item in items {
        columns.entry(column_of(item)).or_default().push(item.clone());
    }
    columns
}

/// Like [`partition`], but keeps each item's size next to it. Items past the
/// end of `sizes` have nothing to place and are left out.
pub fn partition_measured<T: Clone>(
    items: &[T],
    sizes: &[Size],
    column_of: impl Fn(&T) -> i32,
) -> MeasuredColumns<T> {
    if items.len() > sizes.len() {
        tracing::debug!(
            dropped = items.len() - sizes.len(),
            "items without a measured size are left out of the layout"
        );
    }
    let mut columns: MeasuredColumns<T> = BTreeMap::new();
    for (item, size) in items.iter().zip(sizes) {
        columns
            .entry(column_of(item))
            .or_default()
            .push((item.clone(), *size));
    }
    columns
}

/// Drops the sizes, keeping grouping and order.
pub fn items_only<T: Clone>(columns: &MeasuredColumns<T>) -> BTreeMap<i32, Vec<T>> {
    columns
        .iter()
        .map(|(key, entries)| (*key, entries.iter().map(|(item, _)| item.clone()).collect()))
        .collect()
}

/// Width of each column lane: the widest item plus horizontal item padding.
pub fn column_widths<T>(columns: &MeasuredColumns<T>, padding: Insets) -> BTreeMap<i32, i32> {
    columns
        .iter()
        .map(|(key, entries)| {
            let width = entries
                .iter()
                .map(|(_, size)| size.width)
                .max()
                .map(|max_width| max_width.saturating_add(padding.horizontal()))
                .unwrap_or(0);
            (*key, width)
        })
        .collect()
}

/// Left edge of each lane: running sum of the widths before it, from 0.
pub fn column_offsets(widths: &BTreeMap<i32, i32>) -> BTreeMap<i32, i32> {
    let mut x: i32 = 0;
    widths
        .iter()
        .map(|(key, width)| {
            let offset = x;
            x = x.saturating_add(*width);
            (*key, offset)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_groups_and_sorts_columns() {
        let items = vec![("a", 2), ("b", 0), ("c", 2), ("d", -1), ("e", 0)];
        let columns = partition(&items, |item| item.1);
        let keys: Vec<i32> = columns.keys().copied().collect();
        assert_eq!(keys, vec![-1, 0, 2]);
        let names: Vec<&str> = columns[&2].iter().map(|item| item.0).collect();
        assert_eq!(names, vec!["a", "c"]);
        let names: Vec<&str> = columns[&0].iter().map(|item| item.0).collect();
        assert_eq!(names, vec!["b", "e"]);
    }

    #[test]
    fn partition_of_nothing_is_empty() {
        let items: Vec<u32> = Vec::new();
        assert!(partition(&items, |_| 0).is_empty());
    }

    #[test]
    fn partition_measured_skips_items_without_size() {
        let items = vec![1, 2, 3];
        let sizes = vec![Size::new(10, 10), Size::new(20, 20)];
        let columns = partition_measured(&items, &sizes, |_| 0);
        assert_eq!(columns[&0].len(), 2);
        assert_eq!(columns[&0][1], (2, Size::new(20, 20)));
    }

    #[test]
    fn lanes_are_padded_and_accumulated() {
        let items = vec![1, 2, 3];
        let sizes = vec![Size::new(100, 10), Size::new(60, 10), Size::new(80, 10)];
        let columns = partition_measured(&items, &sizes, |item| if *item == 1 { 0 } else { 5 });
        let widths = column_widths(&columns, Insets::new(16, 4, 8, 4));
        assert_eq!(widths[&0], 124);
        assert_eq!(widths[&5], 104);
        let offsets = column_offsets(&widths);
        assert_eq!(offsets[&0], 0);
        assert_eq!(offsets[&5], 124);
    }
}
