use serde::{Deserialize, Serialize};

/// Measured size of an item, in whole pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0,
        height: 0,
    };

    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Padding on each side of a box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> i32 {
        self.left.saturating_add(self.right)
    }

    pub fn vertical(&self) -> i32 {
        self.top.saturating_add(self.bottom)
    }
}

/// Axis-aligned integer rectangle. `right`/`bottom` are exclusive edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x.saturating_add(size.width),
            origin.y.saturating_add(size.height),
        )
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Center with integer halving, matching how link midpoints are computed.
    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width() / 2,
            self.top + self.height() / 2,
        )
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn expand(&self, insets: Insets) -> Rect {
        Rect {
            left: self.left.saturating_sub(insets.left),
            top: self.top.saturating_sub(insets.top),
            right: self.right.saturating_add(insets.right),
            bottom: self.bottom.saturating_add(insets.bottom),
        }
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            left: self.left.saturating_add(dx),
            top: self.top.saturating_add(dy),
            right: self.right.saturating_add(dx),
            bottom: self.bottom.saturating_add(dy),
        }
    }

    /// Smallest rect covering every point, or `None` for an empty iterator.
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = Rect {
            left: first.x,
            top: first.y,
            right: first.x,
            bottom: first.y,
        };
        for point in iter {
            rect.left = rect.left.min(point.x);
            rect.top = rect.top.min(point.y);
            rect.right = rect.right.max(point.x);
            rect.bottom = rect.bottom.max(point.y);
        }
        Some(rect)
    }
}

/// Which side of a column a same-column connector is routed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSide {
    Left,
    #[default]
    Right,
}

impl LinkSide {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Self::Left),
            "right" | "r" => Some(Self::Right),
            _ => None,
        }
    }
}

/// An item placed at a concrete position during one layout pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<T> {
    pub item: T,
    pub size: Size,
    pub position: Point,
}

impl<T> Node<T> {
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn left_mid(&self) -> Point {
        Point::new(self.position.x, self.position.y + self.size.height / 2)
    }

    pub fn right_mid(&self) -> Point {
        Point::new(
            self.position.x.saturating_add(self.size.width),
            self.position.y + self.size.height / 2,
        )
    }
}

/// Elbow connector between two placed nodes.
///
/// `from`/`to` index into the node list the link was built from. The
/// connector runs horizontally from `start` to `center.x`, vertically to
/// `end.y`, then horizontally into `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub from: usize,
    pub to: usize,
    pub start: Point,
    pub center: Point,
    pub end: Point,
}

impl Link {
    pub fn points(&self) -> [Point; 4] {
        [
            self.start,
            Point::new(self.center.x, self.start.y),
            Point::new(self.center.x, self.end.y),
            self.end,
        ]
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Link {
        Link {
            from: self.from,
            to: self.to,
            start: self.start.offset(dx, dy),
            center: self.center.offset(dx, dy),
            end: self.end.offset(dx, dy),
        }
    }
}

/// Result of one layout pass.
#[derive(Debug, Clone)]
pub struct GraphLayout<T> {
    /// Depth-first placement order, not sorted by position.
    pub nodes: Vec<Node<T>>,
    pub links: Vec<Link>,
    /// Node extents grown by item padding.
    pub nodes_rect: Option<Rect>,
    /// Extents of every link's start, center and end.
    pub links_rect: Option<Rect>,
    /// Union of the two rects above, or a zero rect when both are absent.
    pub graph_rect: Rect,
}

impl<T> GraphLayout<T> {
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            nodes_rect: None,
            links_rect: None,
            graph_rect: Rect::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn width(&self) -> i32 {
        self.graph_rect.width()
    }

    pub fn height(&self) -> i32 {
        self.graph_rect.height()
    }

    /// Translation that moves the graph rect to the origin.
    pub fn offset(&self) -> Point {
        Point::new(-self.graph_rect.left, -self.graph_rect.top)
    }

    pub fn node_for(&self, item: &T) -> Option<&Node<T>>
    where
        T: PartialEq,
    {
        self.nodes.iter().find(|node| &node.item == item)
    }

    pub fn translate(mut self, dx: i32, dy: i32) -> Self {
        for node in &mut self.nodes {
            node.position = node.position.offset(dx, dy);
        }
        for link in &mut self.links {
            *link = link.translate(dx, dy);
        }
        self.nodes_rect = self.nodes_rect.map(|rect| rect.translate(dx, dy));
        self.links_rect = self.links_rect.map(|rect| rect.translate(dx, dy));
        self.graph_rect = self.graph_rect.translate(dx, dy);
        self
    }

    /// Shifts everything so the graph rect starts at (0, 0).
    pub fn normalized(self) -> Self {
        let offset = self.offset();
        self.translate(offset.x, offset.y)
    }
}
