/// CollisionResolver: hero-vs-world contact for one tick.
///
///   1. Hazards (traps, enemies) with a per-category damage cooldown
///   2. Keys
///   3. Hearts (capped at max lives)
///   4. Exits (locked without the key, open for good once unlocked)
///
/// Enemies never take damage. Only flags and counters change here;
/// what to show or play is up to whoever reads the events.

use tracing::debug;

use crate::domain::geom::Rect;
use super::event::{GameEvent, HazardKind};
use super::world::Session;

/// Points for picking up a key.
pub const KEY_SCORE: u32 = 100;

/// Damage gate for one hazard category.
///
/// First contact hurts at once. While contact continues, it hurts again
/// each time `duration` more seconds pass. One tick without contact
/// disarms the gate, so the next touch hurts immediately.
#[derive(Clone, Copy, Debug)]
pub struct HazardCooldown {
    engaged: bool,
    timer: f32,
    duration: f32,
}

impl HazardCooldown {
    pub fn new(duration: f32) -> Self {
        HazardCooldown { engaged: false, timer: 0.0, duration }
    }

    /// Feed this tick's contact state. Returns true if it costs a life.
    pub fn contact(&mut self, touching: bool, dt: f32) -> bool {
        if !touching {
            self.engaged = false;
            self.timer = 0.0;
            return false;
        }
        if !self.engaged {
            self.engaged = true;
            self.timer = 0.0;
            return true;
        }
        self.timer += dt;
        if self.timer >= self.duration {
            self.timer = 0.0;
            return true;
        }
        false
    }

    /// Inside a damage window (touching since the last hit).
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }
}

pub fn resolve(s: &mut Session, dt: f32, events: &mut Vec<GameEvent>) {
    let hero = s.hero.body.rect();
    resolve_hazards(s, &hero, dt, events);
    resolve_keys(s, &hero, events);
    resolve_hearts(s, &hero, events);
    resolve_exits(s, &hero, events);
}

// ── Hazards ──

fn resolve_hazards(s: &mut Session, hero: &Rect, dt: f32, events: &mut Vec<GameEvent>) {
    let on_obstacle = s.traps.iter().any(|&(x, y)| hero.overlaps(&Rect::tile(x, y)));
    let on_enemy = s.enemies.iter().any(|e| hero.overlaps(&e.body.rect()));

    if s.obstacle_cooldown.contact(on_obstacle, dt) {
        lose_life(s, HazardKind::Obstacle, events);
    }
    if s.enemy_cooldown.contact(on_enemy, dt) {
        lose_life(s, HazardKind::Enemy, events);
    }
}

fn lose_life(s: &mut Session, cause: HazardKind, events: &mut Vec<GameEvent>) {
    if s.hero.lives == 0 {
        return;
    }
    s.hero.lives -= 1;
    debug!("hit by {cause:?}, {} lives left", s.hero.lives);
    events.push(GameEvent::LifeLost { cause });
}

// ── Pickups ──

fn resolve_keys(s: &mut Session, hero: &Rect, events: &mut Vec<GameEvent>) {
    for key in s.keys.iter_mut() {
        if key.visible() && hero.overlaps(&key.rect()) {
            key.collected = true;
            s.hero.has_key = true;
            s.score += KEY_SCORE;
            debug!("key collected at {:?}", key.tile);
            events.push(GameEvent::KeyCollected);
        }
    }
}

fn resolve_hearts(s: &mut Session, hero: &Rect, events: &mut Vec<GameEvent>) {
    let max = s.config.rules.max_lives;
    for (index, heart) in s.hearts.iter_mut().enumerate() {
        if s.hero.lives >= max {
            break;
        }
        if heart.visible() && hero.overlaps(&heart.rect()) {
            heart.collected = true;
            s.hero.lives += 1;
            events.push(GameEvent::HeartCollected { index });
        }
    }
}

// ── Exits ──

fn resolve_exits(s: &mut Session, hero: &Rect, events: &mut Vec<GameEvent>) {
    for (index, exit) in s.exits.iter_mut().enumerate() {
        if exit.open || !hero.overlaps(&exit.rect()) {
            continue;
        }
        if s.hero.has_key {
            exit.open = true;
            debug!("exit {index} opened");
            events.push(GameEvent::ExitOpened { index });
        } else {
            s.hero.body.rollback();
            if s.hero.jump.is_airborne() {
                s.hero.jump.abort(s.hero.body.pos.y);
            }
            events.push(GameEvent::ExitBlocked);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Direction;
    use crate::domain::geom::Vec2;
    use crate::domain::tile::TileKind;
    use crate::sim::world::test_session;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn cooldown_single_hit_within_window() {
        let mut cd = HazardCooldown::new(3.0);
        let hits = (0..120).filter(|_| cd.contact(true, DT)).count();
        assert_eq!(hits, 1);
        assert!(cd.is_engaged());
    }

    #[test]
    fn cooldown_repeats_after_window() {
        let mut cd = HazardCooldown::new(1.0);
        // 1 immediate hit, then one per full second of contact: 3 s → 4 hits.
        let hits = (0..13).filter(|_| cd.contact(true, 0.25)).count();
        assert_eq!(hits, 4);
    }

    #[test]
    fn cooldown_resets_when_contact_lapses() {
        let mut cd = HazardCooldown::new(3.0);
        assert!(cd.contact(true, DT));
        assert!(!cd.contact(true, DT));
        assert!(!cd.contact(false, DT));
        assert!(!cd.is_engaged());
        assert!(cd.contact(true, DT));
    }

    #[test]
    fn standing_on_trap_costs_one_life_per_window() {
        let mut s = test_session(&[(0, 0, TileKind::SpawnPoint), (0, 0, TileKind::Obstacle)], "");
        // Spawn overwritten by the trap: hero sits at the origin on top of it.
        let mut events = vec![];
        for _ in 0..60 {
            resolve(&mut s, DT, &mut events);
        }
        assert_eq!(s.hero.lives, 2);
        assert_eq!(events, vec![GameEvent::LifeLost { cause: HazardKind::Obstacle }]);
        assert!(!s.is_vulnerable());
    }

    #[test]
    fn obstacle_and_enemy_cooldowns_are_independent() {
        let mut s = test_session(
            &[(0, 0, TileKind::SpawnPoint), (1, 0, TileKind::Obstacle), (0, 3, TileKind::Enemy)],
            "[rules]\nchaser_every = 0\n",
        );
        let mut events = vec![];
        s.hero.body.pos = Vec2::new(0.6, 0.0);
        resolve(&mut s, DT, &mut events);
        s.enemies[0].body.pos = Vec2::new(0.6, 0.5);
        resolve(&mut s, DT, &mut events);
        assert_eq!(
            events,
            vec![
                GameEvent::LifeLost { cause: HazardKind::Obstacle },
                GameEvent::LifeLost { cause: HazardKind::Enemy },
            ],
        );
        assert_eq!(s.hero.lives, 1);
    }

    #[test]
    fn key_sets_flag_and_scores() {
        let mut s = test_session(&[(0, 0, TileKind::SpawnPoint), (1, 0, TileKind::Key)], "");
        let mut events = vec![];
        s.hero.body.pos = Vec2::new(0.9, 0.0);
        resolve(&mut s, DT, &mut events);
        resolve(&mut s, DT, &mut events);
        assert!(s.hero.has_key);
        assert!(!s.keys[0].visible());
        assert_eq!(s.score, KEY_SCORE);
        assert_eq!(events, vec![GameEvent::KeyCollected]);
    }

    #[test]
    fn hearts_never_exceed_max_lives() {
        let mut s = test_session(&[(0, 0, TileKind::SpawnPoint)], "[rules]\nheart_count = 2\n");
        s.hearts = vec![
            crate::domain::entity::Pickup::new((0, 0)),
            crate::domain::entity::Pickup::new((0, 0)),
        ];
        let mut events = vec![];

        // Full health: hearts stay put.
        resolve(&mut s, DT, &mut events);
        assert_eq!(s.hero.lives, 3);
        assert!(s.hearts.iter().all(|h| h.visible()));

        s.hero.lives = 2;
        resolve(&mut s, DT, &mut events);
        assert_eq!(s.hero.lives, 3);
        assert_eq!(events, vec![GameEvent::HeartCollected { index: 0 }]);
        assert!(s.hearts[1].visible());

        // Collected hearts are gone for good.
        s.hero.lives = 1;
        resolve(&mut s, DT, &mut events);
        resolve(&mut s, DT, &mut events);
        assert_eq!(s.hero.lives, 2);
        assert!(!s.hearts[0].visible() && !s.hearts[1].visible());
    }

    #[test]
    fn locked_exit_rolls_back() {
        let mut s = test_session(&[(0, 0, TileKind::SpawnPoint), (1, 0, TileKind::Door)], "");
        s.hero.body.pos = Vec2::new(0.1, 0.0);
        s.hero.body.remember();
        s.hero.body.step(Direction::Right, 0.3);
        let mut events = vec![];
        resolve(&mut s, DT, &mut events);
        assert_eq!(events, vec![GameEvent::ExitBlocked]);
        assert_eq!(s.hero.body.pos, Vec2::new(0.1, 0.0));
        assert!(!s.exits[0].open);
    }

    #[test]
    fn exit_opens_with_key_and_stays_open() {
        let mut s = test_session(&[(0, 0, TileKind::SpawnPoint), (1, 0, TileKind::Door)], "");
        s.hero.has_key = true;
        s.hero.body.pos = Vec2::new(0.5, 0.0);
        let mut events = vec![];
        resolve(&mut s, DT, &mut events);
        assert!(s.exits[0].open);

        s.hero.has_key = false;
        for _ in 0..10 {
            resolve(&mut s, DT, &mut events);
        }
        assert!(s.exits[0].open);
        assert_eq!(s.hero.body.pos, Vec2::new(0.5, 0.0));
        assert_eq!(events, vec![GameEvent::ExitOpened { index: 0 }]);
    }
}
