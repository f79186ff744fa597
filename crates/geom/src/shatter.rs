use super::Rect;

/// Subtract a set of rectangles from `glass`, returning pairwise-disjoint
/// tiles whose union is exactly the area of `glass` not covered by any rock.
///
/// Each rock splits every tile it overlaps into at most four strips: a left
/// and right strip spanning the tile's full height, then a top and bottom
/// strip spanning the width of the overlap. Tiles entirely covered by a rock
/// disappear. The order of the rocks only affects the particular tiling.
pub fn shatter(glass: Rect, rocks: &[Rect]) -> Vec<Rect> {
    let mut tiles = Vec::new();
    if glass.is_empty() {
        return tiles;
    }
    tiles.push(glass);

    for rock in rocks.iter().filter(|r| !r.is_empty()) {
        let mut next = Vec::with_capacity(tiles.len() + 3);
        for tile in tiles.drain(..) {
            let Some(hole) = tile.intersect(*rock) else {
                next.push(tile);
                continue;
            };
            if hole.left() > tile.left() {
                next.push(Rect::from_edges(
                    tile.left(),
                    tile.top(),
                    hole.left(),
                    tile.bottom(),
                ));
            }
            if hole.right() < tile.right() {
                next.push(Rect::from_edges(
                    hole.right(),
                    tile.top(),
                    tile.right(),
                    tile.bottom(),
                ));
            }
            if hole.top() > tile.top() {
                next.push(Rect::from_edges(
                    hole.left(),
                    tile.top(),
                    hole.right(),
                    hole.top(),
                ));
            }
            if hole.bottom() < tile.bottom() {
                next.push(Rect::from_edges(
                    hole.left(),
                    hole.bottom(),
                    hole.right(),
                    tile.bottom(),
                ));
            }
        }
        tiles = next;
    }
    tiles
}
