use super::{Link, LinkSide, Node, Point};

/// Builds an elbow connector for every ordered pair of distinct nodes where
/// `linked(from, to)` holds.
///
/// Links between nodes sharing an x run out of the side picked by `side_of`
/// and bend `same_column_padding` pixels away from the column. All other
/// links leave the facing edges and bend halfway between them.
pub fn build_links<T>(
    nodes: &[Node<T>],
    linked: impl Fn(&T, &T) -> bool,
    side_of: impl Fn(&T, &T) -> LinkSide,
    same_column_padding: i32,
) -> Vec<Link> {
    let mut links = Vec::new();
    for (from_idx, from) in nodes.iter().enumerate() {
        for (to_idx, to) in nodes.iter().enumerate() {
            if from_idx == to_idx || !linked(&from.item, &to.item) {
                continue;
            }
            let (start, center, end) = if from.position.x == to.position.x {
                same_column_elbow(from, to, side_of(&from.item, &to.item), same_column_padding)
            } else {
                cross_column_elbow(from, to)
            };
            links.push(Link {
                from: from_idx,
                to: to_idx,
                start,
                center,
                end,
            });
        }
    }
    links
}

fn same_column_elbow<T>(
    from: &Node<T>,
    to: &Node<T>,
    side: LinkSide,
    padding: i32,
) -> (Point, Point, Point) {
    let (start, end, bend_x) = match side {
        LinkSide::Right => {
            let start = from.right_mid();
            (start, to.right_mid(), start.x + padding)
        }
        LinkSide::Left => {
            let start = from.left_mid();
            (start, to.left_mid(), start.x - padding)
        }
    };
    let center = Point::new(bend_x, start.y + (end.y - start.y) / 2);
    (start, center, end)
}

fn cross_column_elbow<T>(from: &Node<T>, to: &Node<T>) -> (Point, Point, Point) {
    let (start, end) = if from.position.x < to.position.x {
        (from.right_mid(), to.left_mid())
    } else {
        (from.left_mid(), to.right_mid())
    };
    let center = Point::new(
        start.x + (end.x - start.x) / 2,
        start.y + (end.y - start.y) / 2,
    );
    (start, center, end)
}
