/// MovementValidator: may an actor take one step in a direction?
///
/// The actor's position is projected a short way forward along the
/// movement axis and the probe point is matched against the grid. A point
/// is "at" a tile when both axis deltas are strictly under half a tile, so
/// each tile owns the unit cell centered on its coordinate.
///
/// Walls always block. Doors block unless the mover holds the key.
/// Absent cells are floor and never block.

use super::entity::Direction;
use super::geom::Vec2;
use super::grid::TileGrid;
use super::tile::TileKind;

/// Forward probe distance per direction, in tile units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeOffsets {
    pub up: f32,
    pub down: f32,
    pub left: f32,
    pub right: f32,
}

impl ProbeOffsets {
    pub fn along(&self, dir: Direction) -> f32 {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

impl Default for ProbeOffsets {
    fn default() -> Self {
        ProbeOffsets { up: 0.2, down: 0.3, left: 0.3, right: 0.2 }
    }
}

pub struct MovementValidator<'a> {
    grid: &'a TileGrid,
    probe: ProbeOffsets,
}

impl<'a> MovementValidator<'a> {
    pub fn new(grid: &'a TileGrid, probe: ProbeOffsets) -> Self {
        MovementValidator { grid, probe }
    }

    /// Single-point check from the actor's center.
    pub fn can_move(&self, pos: Vec2, dir: Direction, has_key: bool) -> bool {
        !self.blocks(self.probe_point(pos, dir), has_key)
    }

    /// Two-point check: the forward probe is taken at `±half_span` across
    /// the movement axis, so a wide body does not clip wall corners.
    pub fn can_move_span(&self, pos: Vec2, half_span: f32, dir: Direction, has_key: bool) -> bool {
        let p = self.probe_point(pos, dir);
        let (a, b) = if dir.is_horizontal() {
            (Vec2::new(p.x, p.y - half_span), Vec2::new(p.x, p.y + half_span))
        } else {
            (Vec2::new(p.x - half_span, p.y), Vec2::new(p.x + half_span, p.y))
        };
        !self.blocks(a, has_key) && !self.blocks(b, has_key)
    }

    fn probe_point(&self, pos: Vec2, dir: Direction) -> Vec2 {
        let (dx, dy) = dir.delta();
        let reach = self.probe.along(dir);
        Vec2::new(pos.x + dx * reach, pos.y + dy * reach)
    }

    /// Is the point inside a wall cell, or a door cell without the key?
    pub fn blocks(&self, p: Vec2, has_key: bool) -> bool {
        match tile_at(self.grid, p) {
            Some(k) if k.is_wall() => true,
            Some(k) if k.is_door() => !has_key,
            _ => false,
        }
    }
}

/// Tile whose cell strictly contains `p`, if any.
/// A point exactly on a cell border belongs to neither neighbour.
pub fn tile_at(grid: &TileGrid, p: Vec2) -> Option<TileKind> {
    let tx = p.x.round();
    let ty = p.y.round();
    if (p.x - tx).abs() >= 0.5 || (p.y - ty).abs() >= 0.5 {
        return None;
    }
    grid.lookup(tx as i32, ty as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::grid_from;

    fn validator(grid: &TileGrid) -> MovementValidator<'_> {
        MovementValidator::new(grid, ProbeOffsets::default())
    }

    #[test]
    fn wall_to_the_right_blocks() {
        let g = grid_from(&[(5, 5, TileKind::Wall)]);
        let v = validator(&g);
        assert!(!v.can_move(Vec2::new(4.85, 5.0), Direction::Right, false));
        assert!(!v.can_move(Vec2::new(4.85, 5.0), Direction::Right, true));
    }

    #[test]
    fn door_passable_only_with_key() {
        let g = grid_from(&[(5, 5, TileKind::Door)]);
        let v = validator(&g);
        assert!(v.can_move(Vec2::new(4.85, 5.0), Direction::Right, true));
    }

    #[test]
    fn door_gated_by_key() {
        let g = grid_from(&[(5, 5, TileKind::Door)]);
        let v = validator(&g);
        for (pos, dir) in [
            (Vec2::new(4.85, 5.0), Direction::Right),
            (Vec2::new(5.2, 5.0), Direction::Left),
            (Vec2::new(5.0, 4.9), Direction::Up),
            (Vec2::new(5.0, 5.25), Direction::Down),
        ] {
            assert!(!v.can_move(pos, dir, false), "{dir:?} from {pos:?} without key");
            assert!(v.can_move(pos, dir, true), "{dir:?} from {pos:?} with key");
        }
    }

    #[test]
    fn absent_cells_never_block() {
        // Only non-blocking kinds nearby: every direction from every sample is free.
        let g = grid_from(&[
            (1, 0, TileKind::Key),
            (0, 1, TileKind::Obstacle),
            (-1, 0, TileKind::Platform),
            (0, 0, TileKind::SpawnPoint),
        ]);
        let v = validator(&g);
        let mut x = -3.0;
        while x <= 3.0 {
            let mut y = -3.0;
            while y <= 3.0 {
                for dir in Direction::ALL {
                    assert!(v.can_move(Vec2::new(x, y), dir, false));
                    assert!(v.can_move_span(Vec2::new(x, y), 0.3, dir, false));
                }
                y += 0.37;
            }
            x += 0.41;
        }
    }

    #[test]
    fn probe_distance_is_asymmetric() {
        // Wall at x=5: the right probe reaches 0.2, the left probe 0.3.
        let g = grid_from(&[(5, 0, TileKind::Wall)]);
        let v = validator(&g);
        assert!(v.can_move(Vec2::new(4.25, 0.0), Direction::Right, false));
        assert!(!v.can_move(Vec2::new(4.35, 0.0), Direction::Right, false));
        assert!(v.can_move(Vec2::new(5.85, 0.0), Direction::Left, false));
        assert!(!v.can_move(Vec2::new(5.75, 0.0), Direction::Left, false));
    }

    #[test]
    fn span_probe_catches_corner() {
        // Wall diagonally ahead: the center probe misses, one corner hits.
        let g = grid_from(&[(1, 1, TileKind::Wall)]);
        let v = validator(&g);
        let pos = Vec2::new(0.4, 0.4);
        assert!(v.can_move(pos, Direction::Right, false));
        assert!(!v.can_move_span(pos, 0.3, Direction::Right, false));
    }

    #[test]
    fn cell_border_is_exclusive() {
        let g = grid_from(&[(1, 0, TileKind::Wall)]);
        assert_eq!(tile_at(&g, Vec2::new(0.5, 0.0)), None);
        assert_eq!(tile_at(&g, Vec2::new(0.51, 0.0)), Some(TileKind::Wall));
        assert_eq!(tile_at(&g, Vec2::new(1.0, 0.5)), None);
    }
}
