/// Entities: Hero, Enemy, and the pickups/exits the hero interacts with.
/// Positions are continuous tile units; every body is centered on its position.

use super::director::{EntityDirector, Policy};
use super::geom::{Rect, Vec2};
use super::jump::JumpController;

/// Hero is 40 px in a 60 px tile.
pub const HERO_SIZE: f32 = 2.0 / 3.0;
/// Enemies fill a whole tile.
pub const ENEMY_SIZE: f32 = 1.0;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit step for this direction. +y is up.
    pub fn delta(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, 1.0),
            Direction::Down => (0.0, -1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Names an actor a chaser can track.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorId {
    Hero,
    Enemy(usize),
}

/// Position + fixed box + the pre-move position used for rollback.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub pos: Vec2,
    pub prev: Vec2,
    pub w: f32,
    pub h: f32,
}

impl Body {
    pub fn new(pos: Vec2, w: f32, h: f32) -> Self {
        Body { pos, prev: pos, w, h }
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.pos, self.w, self.h)
    }

    /// Record the current position as the rollback point.
    pub fn remember(&mut self) {
        self.prev = self.pos;
    }

    pub fn rollback(&mut self) {
        self.pos = self.prev;
    }

    /// Move `dist` tile units along `dir`.
    pub fn step(&mut self, dir: Direction, dist: f32) {
        let (dx, dy) = dir.delta();
        self.pos.x += dx * dist;
        self.pos.y += dy * dist;
    }
}

#[derive(Clone, Debug)]
pub struct Hero {
    pub body: Body,
    pub direction: Direction,
    pub lives: u32,
    pub has_key: bool,
    pub jump: JumpController,
}

impl Hero {
    pub fn new(pos: Vec2, lives: u32, jump: JumpController) -> Self {
        Hero {
            body: Body::new(pos, HERO_SIZE, HERO_SIZE),
            direction: Direction::Down,
            lives,
            has_key: false,
            jump,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.lives == 0
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: Body,
    pub direction: Direction,
    pub speed: f32,
    pub director: EntityDirector,
}

impl Enemy {
    pub fn new(pos: Vec2, direction: Direction, speed: f32, director: EntityDirector) -> Self {
        Enemy { body: Body::new(pos, ENEMY_SIZE, ENEMY_SIZE), direction, speed, director }
    }

    pub fn is_chaser(&self) -> bool {
        matches!(self.director.policy(), Policy::Chaser { .. })
    }
}

/// A pickup (key or heart) occupying one tile cell.
#[derive(Clone, Debug)]
pub struct Pickup {
    pub tile: (i32, i32),
    pub collected: bool,
}

impl Pickup {
    pub fn new(tile: (i32, i32)) -> Self {
        Pickup { tile, collected: false }
    }

    pub fn visible(&self) -> bool {
        !self.collected
    }

    pub fn rect(&self) -> Rect {
        Rect::tile(self.tile.0, self.tile.1)
    }
}

/// Exit door. Once opened it stays open for the rest of the level.
#[derive(Clone, Debug)]
pub struct Exit {
    pub tile: (i32, i32),
    pub open: bool,
}

impl Exit {
    pub fn new(tile: (i32, i32)) -> Self {
        Exit { tile, open: false }
    }

    pub fn rect(&self) -> Rect {
        Rect::tile(self.tile.0, self.tile.1)
    }
}
