/// TileGrid: sparse coordinate → tile map, read-only after load.
///
/// Absent coordinates are floor. Runtime state such as "exit open" or
/// "key collected" lives on the session's entities, never in the grid.

use std::collections::HashMap;

use super::tile::TileKind;

/// Bounding box of all populated coordinates, in tile coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Extent {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Extent {
    /// Grow the extent by `margin` tiles on every side (camera bounds).
    pub fn padded(&self, margin: i32) -> Extent {
        Extent {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }
}

#[derive(Clone, Debug, Default)]
pub struct TileGrid {
    tiles: HashMap<(i32, i32), TileKind>,
    extent: Extent,
}

impl TileGrid {
    /// Kind at `(x, y)`, or `None` when the coordinate was never assigned.
    #[inline]
    pub fn lookup(&self, x: i32, y: i32) -> Option<TileKind> {
        self.tiles.get(&(x, y)).copied()
    }

    /// Kind at `(x, y)` with absence read as `Empty`.
    #[inline]
    pub fn kind_at(&self, x: i32, y: i32) -> TileKind {
        self.lookup(x, y).unwrap_or_default()
    }

    /// Computed once at construction. All zeros for an empty grid.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Every coordinate holding `kind`, sorted by (y, x) so that callers
    /// building entities get a stable order independent of hashing.
    pub fn coords_of(&self, kind: TileKind) -> Vec<(i32, i32)> {
        let mut out: Vec<(i32, i32)> = self.tiles.iter()
            .filter(|(_, &k)| k == kind)
            .map(|(&c, _)| c)
            .collect();
        out.sort_by_key(|&(x, y)| (y, x));
        out
    }

    fn compute_extent(tiles: &HashMap<(i32, i32), TileKind>) -> Extent {
        let mut keys = tiles.keys();
        let Some(&(x0, y0)) = keys.next() else { return Extent::default() };
        keys.fold(
            Extent { min_x: x0, min_y: y0, max_x: x0, max_y: y0 },
            |e, &(x, y)| Extent {
                min_x: e.min_x.min(x),
                min_y: e.min_y.min(y),
                max_x: e.max_x.max(x),
                max_y: e.max_y.max(y),
            },
        )
    }
}

/// Later assignments to the same coordinate replace earlier ones.
impl FromIterator<((i32, i32), TileKind)> for TileGrid {
    fn from_iter<I: IntoIterator<Item = ((i32, i32), TileKind)>>(iter: I) -> Self {
        let tiles: HashMap<(i32, i32), TileKind> = iter.into_iter().collect();
        let extent = TileGrid::compute_extent(&tiles);
        TileGrid { tiles, extent }
    }
}

#[cfg(test)]
pub(crate) fn grid_from(cells: &[(i32, i32, TileKind)]) -> TileGrid {
    cells.iter().map(|&(x, y, k)| ((x, y), k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_coordinate_is_floor() {
        let g = grid_from(&[(1, 1, TileKind::Wall)]);
        assert_eq!(g.lookup(1, 1), Some(TileKind::Wall));
        assert_eq!(g.lookup(2, 1), None);
        assert_eq!(g.kind_at(-40, 99), TileKind::Empty);
    }

    #[test]
    fn extent_covers_all_tiles() {
        let g = grid_from(&[
            (3, -1, TileKind::Wall),
            (-2, 4, TileKind::Door),
            (0, 0, TileKind::SpawnPoint),
        ]);
        assert_eq!(g.extent(), Extent { min_x: -2, min_y: -1, max_x: 3, max_y: 4 });
        assert_eq!(g.extent().width(), 6);
        assert_eq!(g.extent().height(), 6);
        assert_eq!(g.extent().padded(20).max_x, 23);
    }

    #[test]
    fn empty_grid_has_zero_extent() {
        let g = TileGrid::default();
        assert!(g.is_empty());
        assert_eq!(g.extent(), Extent::default());
    }

    #[test]
    fn last_assignment_wins() {
        let g: TileGrid = vec![((0, 0), TileKind::Wall), ((0, 0), TileKind::Key)]
            .into_iter()
            .collect();
        assert_eq!(g.len(), 1);
        assert_eq!(g.lookup(0, 0), Some(TileKind::Key));
    }

    #[test]
    fn coords_of_is_sorted_row_major() {
        let g = grid_from(&[
            (5, 2, TileKind::Enemy),
            (1, 2, TileKind::Enemy),
            (9, 0, TileKind::Enemy),
            (4, 4, TileKind::Wall),
        ]);
        assert_eq!(g.coords_of(TileKind::Enemy), vec![(9, 0), (1, 2), (5, 2)]);
    }
}
