/// Session: the complete state of one level being played.
///
/// ## Ownership
///
/// The session owns the `TileGrid` and every entity built from it.
/// The grid is never mutated; "collected", "open" and similar runtime
/// state lives on the entities. `restart()` rebuilds all entities from
/// the same grid.
///
/// ## Coordinates
///
/// Tile units, +y up. Tile `(x, y)` covers the unit cell centered on it.
/// The renderer flips y through `Camera`.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::domain::director::EntityDirector;
use crate::domain::entity::{ActorId, Enemy, Exit, Hero, Pickup};
use crate::domain::geom::{Rect, Vec2};
use crate::domain::grid::{Extent, TileGrid};
use crate::domain::jump::JumpController;
use crate::domain::tile::TileKind;
use crate::error::{MazeError, Result};
use super::collision::HazardCooldown;

/// Score before time is deducted.
const BASE_SCORE: i64 = 1000;
/// Bonus for finishing with the key.
const KEY_BONUS: i64 = 100;
/// Above this many candidate cells, hearts are sampled instead of enumerated.
const HEART_SCAN_LIMIT: i64 = 1 << 16;
const HEART_ATTEMPTS_PER_PICK: usize = 64;

/// Camera: a viewport into the world.
///
/// `(x, top)` is the world coordinate of the top-left visible cell.
/// View row `r` shows world row `top - r`.
#[derive(Clone, Debug)]
pub struct Camera {
    pub x: i32,
    pub top: i32,
    pub view_w: usize,
    pub view_h: usize,
}

impl Camera {
    pub fn new() -> Self {
        Camera { x: 0, top: 0, view_w: 0, view_h: 0 }
    }

    /// Scroll so the target stays inside the inner 60% of the view,
    /// clamped to `bounds`. Bounds smaller than the view are centered.
    pub fn follow(&mut self, tx: i32, ty: i32, bounds: Extent) {
        if self.view_w == 0 || self.view_h == 0 { return; }
        let (vw, vh) = (self.view_w as i32, self.view_h as i32);

        if bounds.width() <= vw {
            self.x = bounds.min_x - (vw - bounds.width()) / 2;
        } else {
            let margin = vw / 5;
            if tx < self.x + margin {
                self.x = tx - margin;
            } else if tx > self.x + vw - margin - 1 {
                self.x = tx - vw + margin + 1;
            }
            self.x = self.x.clamp(bounds.min_x, bounds.max_x - vw + 1);
        }

        if bounds.height() <= vh {
            self.top = bounds.max_y + (vh - bounds.height()) / 2;
        } else {
            let margin = vh / 5;
            if ty > self.top - margin {
                self.top = ty + margin;
            } else if ty < self.top - vh + margin + 1 {
                self.top = ty + vh - margin - 1;
            }
            self.top = self.top.clamp(bounds.min_y + vh - 1, bounds.max_y);
        }
    }

    /// Snap directly onto the target (level start / restart).
    pub fn center_on(&mut self, tx: i32, ty: i32, bounds: Extent) {
        self.x = tx - self.view_w as i32 / 2;
        self.top = ty + self.view_h as i32 / 2;
        self.follow(tx, ty, bounds);
    }

    /// World cell → view cell, or None if off screen.
    pub fn world_to_view(&self, wx: i32, wy: i32) -> Option<(usize, usize)> {
        let vx = wx - self.x;
        let vy = self.top - wy;
        if vx >= 0 && vx < self.view_w as i32 && vy >= 0 && vy < self.view_h as i32 {
            Some((vx as usize, vy as usize))
        } else {
            None
        }
    }
}

pub struct Session {
    // ── Level ──
    pub grid: TileGrid,
    pub config: GameConfig,
    pub rng: SmallRng,
    pub level_name: String,

    // ── Entities ──
    pub hero: Hero,
    pub enemies: Vec<Enemy>,
    pub traps: Vec<(i32, i32)>,
    pub keys: Vec<Pickup>,
    pub hearts: Vec<Pickup>,
    pub exits: Vec<Exit>,
    pub platforms: Vec<Rect>,
    /// Top, bottom, left, right. Touching any one wins.
    pub bands: [Rect; 4],

    // ── Damage gates ──
    pub obstacle_cooldown: HazardCooldown,
    pub enemy_cooldown: HazardCooldown,

    // ── Meta ──
    pub paused: bool,
    pub winner: bool,
    pub score: u32,
    pub elapsed: f32,
    pub tick: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: f32,
    pub camera: Camera,
}

// ── Construction ──

impl Session {
    pub fn new(grid: TileGrid, config: &GameConfig, rng: SmallRng) -> Result<Self> {
        let mut s = Session {
            grid,
            config: config.clone(),
            rng,
            level_name: String::new(),
            hero: Hero::new(Vec2::default(), config.rules.start_lives, JumpController::new(config.jump, 0.0)),
            enemies: vec![],
            traps: vec![],
            keys: vec![],
            hearts: vec![],
            exits: vec![],
            platforms: vec![],
            bands: [Rect::new(0.0, 0.0, 0.0, 0.0); 4],
            obstacle_cooldown: HazardCooldown::new(config.rules.obstacle_cooldown),
            enemy_cooldown: HazardCooldown::new(config.rules.enemy_cooldown),
            paused: false,
            winner: false,
            score: 0,
            elapsed: 0.0,
            tick: 0,
            message: String::new(),
            message_timer: 0.0,
            camera: Camera::new(),
        };
        s.populate()?;
        Ok(s)
    }

    /// Rebuild every entity from the grid, as if the level were reloaded.
    pub fn restart(&mut self) -> Result<()> {
        self.populate()?;
        info!("level restarted");
        Ok(())
    }

    fn populate(&mut self) -> Result<()> {
        let rules = self.config.rules.clone();
        if self.grid.is_empty() {
            warn!("level has no tiles");
        }

        let spawn = match self.grid.coords_of(TileKind::SpawnPoint).first() {
            Some(&(x, y)) => Vec2::new(x as f32, y as f32),
            None => {
                warn!("level has no spawn point, starting at the origin");
                Vec2::default()
            }
        };
        self.hero = Hero::new(spawn, rules.start_lives, JumpController::new(self.config.jump, spawn.y));

        self.enemies.clear();
        for (n, tile) in self.grid.coords_of(TileKind::Enemy).into_iter().enumerate() {
            let chaser = rules.chaser_every > 0 && (n + 1) % rules.chaser_every == 0;
            let target = chaser.then_some(ActorId::Hero);
            self.spawn_enemy(tile, chaser, target)?;
        }

        self.traps = self.grid.coords_of(TileKind::Obstacle);
        self.keys = self.grid.coords_of(TileKind::Key).into_iter().map(Pickup::new).collect();
        self.exits = self.grid.coords_of(TileKind::Door).into_iter().map(Exit::new).collect();
        let thickness = self.config.platform_thickness;
        self.platforms = self.grid.coords_of(TileKind::Platform).into_iter()
            .map(|(x, y)| Rect::centered(Vec2::new(x as f32, y as f32), 1.0, thickness))
            .collect();
        self.hearts = self.place_hearts(rules.heart_count);
        self.bands = win_bands(self.grid.extent(), rules.exit_gap, rules.band_thickness);

        self.obstacle_cooldown = HazardCooldown::new(rules.obstacle_cooldown);
        self.enemy_cooldown = HazardCooldown::new(rules.enemy_cooldown);
        self.paused = false;
        self.winner = false;
        self.score = 0;
        self.elapsed = 0.0;
        self.tick = 0;
        self.message.clear();
        self.message_timer = 0.0;

        info!(
            "session ready: {} enemies ({} chasers), {} traps, {} keys, {} exits, {} hearts",
            self.enemies.len(),
            self.enemies.iter().filter(|e| e.is_chaser()).count(),
            self.traps.len(), self.keys.len(), self.exits.len(), self.hearts.len(),
        );
        Ok(())
    }

    /// Add an enemy on `tile`. A chaser needs a target that already exists.
    pub fn spawn_enemy(&mut self, tile: (i32, i32), chaser: bool, target: Option<ActorId>) -> Result<usize> {
        let index = self.enemies.len();
        let rules = &self.config.rules;
        let (mut director, speed) = if chaser {
            let d = EntityDirector::chaser(index, target, rules.chase_radius, rules.roam_step)?;
            (d, self.config.speed.chaser_speed)
        } else {
            (EntityDirector::roamer(rules.roam_step), self.config.speed.enemy_speed)
        };
        if let Some(ActorId::Enemy(t)) = director.target() {
            if t >= index {
                return Err(MazeError::UnknownTarget { enemy: index, target: ActorId::Enemy(t) });
            }
        }
        let direction = director.pick_random(&mut self.rng);
        let pos = Vec2::new(tile.0 as f32, tile.1 as f32);
        self.enemies.push(Enemy::new(pos, direction, speed, director));
        Ok(index)
    }

    /// Distinct random cells in `[0..=max_x] x [0..=max_y]` not on a wall,
    /// trap or door.
    ///
    /// Small areas are enumerated. Large sparse ones are sampled with a
    /// bounded number of attempts, so cost tracks `count`, not the area.
    fn place_hearts(&mut self, count: usize) -> Vec<Pickup> {
        let e = self.grid.extent();
        if count == 0 || e.max_x < 0 || e.max_y < 0 {
            return vec![];
        }
        let area = (e.max_x as i64 + 1) * (e.max_y as i64 + 1);
        if area <= HEART_SCAN_LIMIT {
            let mut cells = Vec::new();
            for y in 0..=e.max_y {
                for x in 0..=e.max_x {
                    if self.grid.kind_at(x, y).allows_heart() {
                        cells.push((x, y));
                    }
                }
            }
            return cells.choose_multiple(&mut self.rng, count).copied().map(Pickup::new).collect();
        }

        let mut chosen: Vec<(i32, i32)> = Vec::with_capacity(count);
        for _ in 0..count * HEART_ATTEMPTS_PER_PICK {
            if chosen.len() == count { break; }
            let cell = (self.rng.gen_range(0..=e.max_x), self.rng.gen_range(0..=e.max_y));
            if self.grid.kind_at(cell.0, cell.1).allows_heart() && !chosen.contains(&cell) {
                chosen.push(cell);
            }
        }
        if chosen.len() < count {
            warn!("placed {} of {} hearts", chosen.len(), count);
        }
        chosen.into_iter().map(Pickup::new).collect()
    }
}

/// Four bands just outside the maze: top, bottom, left, right.
/// They start `gap` tiles past the outermost tile edge.
pub fn win_bands(e: Extent, gap: f32, thickness: f32) -> [Rect; 4] {
    let left = e.min_x as f32 - 0.5 - gap;
    let right = e.max_x as f32 + 0.5 + gap;
    let bottom = e.min_y as f32 - 0.5 - gap;
    let top = e.max_y as f32 + 0.5 + gap;
    let t = thickness;
    let w = right - left + 2.0 * t;
    let h = top - bottom + 2.0 * t;
    [
        Rect::new(left - t, top, w, t),
        Rect::new(left - t, bottom - t, w, t),
        Rect::new(left - t, bottom - t, t, h),
        Rect::new(right, bottom - t, t, h),
    ]
}

// ── Queries ──

impl Session {
    pub fn lives(&self) -> u32 {
        self.hero.lives
    }

    pub fn has_key(&self) -> bool {
        self.hero.has_key
    }

    pub fn is_dead(&self) -> bool {
        self.hero.is_dead()
    }

    pub fn is_winner(&self) -> bool {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner || self.is_dead()
    }

    /// False while inside either damage window.
    pub fn is_vulnerable(&self) -> bool {
        !self.obstacle_cooldown.is_engaged() && !self.enemy_cooldown.is_engaged()
    }

    /// Position of a trackable actor.
    pub fn actor_pos(&self, id: ActorId) -> Option<Vec2> {
        match id {
            ActorId::Hero => Some(self.hero.body.pos),
            ActorId::Enemy(i) => self.enemies.get(i).map(|e| e.body.pos),
        }
    }

    /// Highest y the hero's center may reach: the top edge of the maze.
    pub fn ceiling(&self) -> f32 {
        self.grid.extent().max_y as f32 + 0.5
    }

    /// Allowed x range for the hero's center while airborne.
    pub fn horizontal_limits(&self) -> (f32, f32) {
        let e = self.grid.extent();
        let half = self.hero.body.w / 2.0;
        (e.min_x as f32 - 0.5 + half, e.max_x as f32 + 0.5 - half)
    }

    /// Final score for a win at the current time.
    pub fn final_score(&self) -> u32 {
        let bonus = if self.hero.has_key { KEY_BONUS } else { 0 };
        (BASE_SCORE - self.elapsed as i64 + bonus).max(0) as u32
    }

    pub fn set_message(&mut self, msg: &str, seconds: f32) {
        self.message = msg.to_string();
        self.message_timer = seconds;
    }
}

#[cfg(test)]
pub(crate) fn test_session(cells: &[(i32, i32, TileKind)], toml: &str) -> Session {
    use rand::SeedableRng;
    let mut config = GameConfig::from_toml_str(toml);
    config.rules.heart_count = 0;
    let grid = crate::domain::grid::grid_from(cells);
    Session::new(grid, &config, SmallRng::seed_from_u64(1)).unwrap()
}
