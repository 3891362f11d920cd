/// EntityDirector: picks an enemy's direction each tick.
///
/// Two policies:
///   - **Roamer**: random walk. Walks `roam_step` tiles, then re-picks.
///     Also re-picks whenever the current direction is blocked.
///     A pick never repeats the previous pick.
///   - **Chaser**: within `radius` of its target, steps greedily toward it
///     along x first, then y. Falls back to a random pick when the greedy
///     direction is blocked. Out of range it roams.

use rand::Rng;

use crate::error::{MazeError, Result};

use super::entity::{ActorId, Direction};
use super::geom::Vec2;
use super::movement::MovementValidator;

/// Offsets below this count as aligned, so a chaser stops flipping
/// between Left and Right once it is level with its target.
const ALIGN_EPS: f32 = 0.05;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Policy {
    Roamer,
    Chaser { target: ActorId, radius: f32 },
}

#[derive(Clone, Debug)]
pub struct EntityDirector {
    policy: Policy,
    roam_step: f32,
    traveled: f32,
    last_pick: Option<Direction>,
}

impl EntityDirector {
    pub fn roamer(roam_step: f32) -> Self {
        EntityDirector { policy: Policy::Roamer, roam_step, traveled: 0.0, last_pick: None }
    }

    /// A chaser must be told whom to chase.
    pub fn chaser(enemy: usize, target: Option<ActorId>, radius: f32, roam_step: f32) -> Result<Self> {
        let target = target.ok_or(MazeError::ChaserWithoutTarget { enemy })?;
        Ok(EntityDirector {
            policy: Policy::Chaser { target, radius },
            roam_step,
            traveled: 0.0,
            last_pick: None,
        })
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn target(&self) -> Option<ActorId> {
        match self.policy {
            Policy::Chaser { target, .. } => Some(target),
            Policy::Roamer => None,
        }
    }

    /// Uniform pick over the four directions, never equal to the last pick.
    pub fn pick_random<R: Rng>(&mut self, rng: &mut R) -> Direction {
        let dir = loop {
            let d = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
            if Some(d) != self.last_pick {
                break d;
            }
        };
        self.last_pick = Some(dir);
        self.traveled = 0.0;
        dir
    }

    /// Direction for this tick. `target_pos` is the tracked actor's position
    /// (ignored by roamers).
    pub fn decide<R: Rng>(
        &mut self,
        pos: Vec2,
        current: Direction,
        target_pos: Option<Vec2>,
        validator: &MovementValidator,
        rng: &mut R,
    ) -> Direction {
        if let (Policy::Chaser { radius, .. }, Some(t)) = (self.policy, target_pos) {
            if pos.distance(t) <= radius {
                return match greedy_toward(pos, t) {
                    Some(d) if validator.can_move(pos, d, false) => d,
                    Some(_) => self.pick_random(rng),
                    None => current,
                };
            }
        }
        self.roam(pos, current, validator, rng)
    }

    fn roam<R: Rng>(
        &mut self,
        pos: Vec2,
        current: Direction,
        validator: &MovementValidator,
        rng: &mut R,
    ) -> Direction {
        if self.traveled >= self.roam_step || !validator.can_move(pos, current, false) {
            self.pick_random(rng)
        } else {
            current
        }
    }

    /// Account for distance walked since the last pick.
    pub fn advance(&mut self, dist: f32) {
        self.traveled += dist;
    }
}

/// Axis step toward `to`: x is compared first, y only when x is aligned.
/// `None` when both axes are aligned.
pub fn greedy_toward(from: Vec2, to: Vec2) -> Option<Direction> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx > ALIGN_EPS {
        Some(Direction::Right)
    } else if dx < -ALIGN_EPS {
        Some(Direction::Left)
    } else if dy > ALIGN_EPS {
        Some(Direction::Up)
    } else if dy < -ALIGN_EPS {
        Some(Direction::Down)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::{grid_from, TileGrid};
    use crate::domain::movement::ProbeOffsets;
    use crate::domain::tile::TileKind;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn chaser() -> EntityDirector {
        EntityDirector::chaser(0, Some(ActorId::Hero), 5.0, 5.0).unwrap()
    }

    #[test]
    fn roamer_never_repeats_pick() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut d = EntityDirector::roamer(5.0);
        let mut prev = d.pick_random(&mut rng);
        for _ in 0..2000 {
            let next = d.pick_random(&mut rng);
            assert_ne!(next, prev);
            prev = next;
        }
    }

    #[test]
    fn roamer_uses_every_direction() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut d = EntityDirector::roamer(5.0);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(d.pick_random(&mut rng));
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn chaser_prefers_x_axis() {
        let grid = TileGrid::default();
        let v = MovementValidator::new(&grid, ProbeOffsets::default());
        let mut rng = SmallRng::seed_from_u64(3);
        let mut d = chaser();
        let me = Vec2::new(0.0, 0.0);
        for target in [Vec2::new(1.0, 1.0), Vec2::new(0.5, 3.0), Vec2::new(3.0, 0.2)] {
            let dir = d.decide(me, Direction::Down, Some(target), &v, &mut rng);
            assert_eq!(dir, Direction::Right, "target {target:?}");
        }
    }

    #[test]
    fn greedy_falls_through_axes() {
        let o = Vec2::new(0.0, 0.0);
        assert_eq!(greedy_toward(o, Vec2::new(-2.0, 4.0)), Some(Direction::Left));
        assert_eq!(greedy_toward(o, Vec2::new(0.0, 4.0)), Some(Direction::Up));
        assert_eq!(greedy_toward(o, Vec2::new(0.0, -1.0)), Some(Direction::Down));
        assert_eq!(greedy_toward(o, o), None);
    }

    #[test]
    fn blocked_chaser_picks_random() {
        // Wall directly right of the chaser, target beyond it.
        let grid = grid_from(&[(1, 0, TileKind::Wall)]);
        let v = MovementValidator::new(&grid, ProbeOffsets::default());
        let mut rng = SmallRng::seed_from_u64(11);
        let mut d = chaser();
        let me = Vec2::new(0.4, 0.0);
        for _ in 0..50 {
            let dir = d.decide(me, Direction::Right, Some(Vec2::new(3.0, 0.0)), &v, &mut rng);
            assert!(Direction::ALL.contains(&dir));
        }
        // Every fallback is a fresh random pick, so it never sticks on one value.
        let a = d.decide(me, Direction::Right, Some(Vec2::new(3.0, 0.0)), &v, &mut rng);
        let b = d.decide(me, Direction::Right, Some(Vec2::new(3.0, 0.0)), &v, &mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn chaser_out_of_range_roams() {
        let grid = TileGrid::default();
        let v = MovementValidator::new(&grid, ProbeOffsets::default());
        let mut rng = SmallRng::seed_from_u64(5);
        let mut d = chaser();
        let dir = d.decide(Vec2::new(0.0, 0.0), Direction::Down, Some(Vec2::new(10.0, 0.0)), &v, &mut rng);
        // Unblocked and not yet walked roam_step: keeps going.
        assert_eq!(dir, Direction::Down);
    }

    #[test]
    fn roamer_repicks_after_roam_step() {
        let grid = TileGrid::default();
        let v = MovementValidator::new(&grid, ProbeOffsets::default());
        let mut rng = SmallRng::seed_from_u64(9);
        let mut d = EntityDirector::roamer(5.0);
        let first = d.pick_random(&mut rng);
        d.advance(4.9);
        assert_eq!(d.decide(Vec2::new(0.0, 0.0), first, None, &v, &mut rng), first);
        d.advance(0.2);
        assert_ne!(d.decide(Vec2::new(0.0, 0.0), first, None, &v, &mut rng), first);
    }

    #[test]
    fn roamer_repicks_when_blocked() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut d = EntityDirector::roamer(5.0);
        let first = d.pick_random(&mut rng);
        let (dx, dy) = first.delta();
        let grid = grid_from(&[(dx as i32, dy as i32, TileKind::Wall)]);
        let v = MovementValidator::new(&grid, ProbeOffsets::default());
        let pos = Vec2::new(dx * 0.45, dy * 0.45);
        assert!(!v.can_move(pos, first, false));
        assert_ne!(d.decide(pos, first, None, &v, &mut rng), first);
    }

    #[test]
    fn chaser_without_target_is_rejected() {
        let err = EntityDirector::chaser(3, None, 5.0, 5.0).unwrap_err();
        assert!(matches!(err, MazeError::ChaserWithoutTarget { enemy: 3 }));
    }
}
