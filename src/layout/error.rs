use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// An item showed up again on its own ancestor path. Only reachable when
    /// the column function disagrees with itself between calls.
    #[error("cyclic link chain: item in column {column} is its own ancestor ({depth} levels up)")]
    CyclicGraph { column: i32, depth: usize },

    #[error("got {sizes} measured sizes for {items} items")]
    SizeMismatch { items: usize, sizes: usize },
}
