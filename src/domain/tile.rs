/// What a maze cell is, keyed by its numeric level-file code (0..=7).
///
/// Walls always stop movement; a door stops it until the hero carries the key.
/// Hearts may land anywhere except walls, traps and doors.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TileKind {
    Empty,
    Wall,       // Always blocks movement
    SpawnPoint, // Hero entry
    Door,       // Exit: blocks until the key is held
    Obstacle,   // Trap: damages on contact
    Enemy,      // Enemy spawn
    Key,        // Unlocks doors
    Platform,   // Jump landing ledge
}

impl TileKind {
    /// Map a level-file code to a tile kind.
    ///
    /// `0=Wall 1=SpawnPoint 2=Door 3=Obstacle 4=Enemy 5=Key 6=Platform`.
    /// Anything else is unknown and the caller decides what to do with it.
    pub fn from_code(code: i32) -> Option<TileKind> {
        match code {
            0 => Some(TileKind::Wall),
            1 => Some(TileKind::SpawnPoint),
            2 => Some(TileKind::Door),
            3 => Some(TileKind::Obstacle),
            4 => Some(TileKind::Enemy),
            5 => Some(TileKind::Key),
            6 => Some(TileKind::Platform),
            _ => None,
        }
    }

    /// Does this tile always block movement?
    pub fn is_wall(self) -> bool {
        matches!(self, TileKind::Wall)
    }

    /// Does this tile block movement unless the mover holds the key?
    pub fn is_door(self) -> bool {
        matches!(self, TileKind::Door)
    }

    /// Can a heart be placed on this tile?
    pub fn allows_heart(self) -> bool {
        !matches!(self, TileKind::Wall | TileKind::Obstacle | TileKind::Door)
    }
}

impl Default for TileKind {
    fn default() -> Self {
        TileKind::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_kinds() {
        assert_eq!(TileKind::from_code(0), Some(TileKind::Wall));
        assert_eq!(TileKind::from_code(2), Some(TileKind::Door));
        assert_eq!(TileKind::from_code(6), Some(TileKind::Platform));
        assert_eq!(TileKind::from_code(7), None);
        assert_eq!(TileKind::from_code(-1), None);
    }

    #[test]
    fn heart_placement_avoids_blocking_tiles() {
        assert!(!TileKind::Wall.allows_heart());
        assert!(!TileKind::Obstacle.allows_heart());
        assert!(!TileKind::Door.allows_heart());
        assert!(TileKind::Empty.allows_heart());
        assert!(TileKind::Key.allows_heart());
    }
}
