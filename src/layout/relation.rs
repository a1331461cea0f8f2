use super::LinkSide;

/// Column assignment and adjacency for a set of items.
///
/// `linked(a, b)` is read as "a is a parent of b" whenever `a` sits in an
/// earlier column than `b`. Implementations must be pure: the layout calls
/// these methods many times per pass and expects stable answers.
pub trait ColumnGraph<T> {
    fn column_of(&self, item: &T) -> i32;

    fn linked(&self, from: &T, to: &T) -> bool;

    /// Side used for connectors between two items of the same column.
    fn same_column_side(&self, _from: &T, _to: &T) -> LinkSide {
        LinkSide::Right
    }
}

impl<T, G: ColumnGraph<T> + ?Sized> ColumnGraph<T> for &G {
    fn column_of(&self, item: &T) -> i32 {
        (**self).column_of(item)
    }

    fn linked(&self, from: &T, to: &T) -> bool {
        (**self).linked(from, to)
    }

    fn same_column_side(&self, from: &T, to: &T) -> LinkSide {
        (**self).same_column_side(from, to)
    }
}

/// Adapts a pair of closures to [`ColumnGraph`]. Same-column links always
/// go on the right.
#[derive(Debug, Clone, Copy)]
pub struct FnGraph<C, L> {
    column_of: C,
    linked: L,
}

impl<C, L> FnGraph<C, L> {
    pub fn new(column_of: C, linked: L) -> Self {
        Self { column_of, linked }
    }
}

impl<T, C, L> ColumnGraph<T> for FnGraph<C, L>
where
    C: Fn(&T) -> i32,
    L: Fn(&T, &T) -> bool,
{
    fn column_of(&self, item: &T) -> i32 {
        (self.column_of)(item)
    }

    fn linked(&self, from: &T, to: &T) -> bool {
        (self.linked)(from, to)
    }
}
