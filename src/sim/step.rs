/// The tick function: advances a session by one frame.
///
/// Processing order:
///   1. Input / direction resolution (hero input, jump start, enemy directors)
///   2. Movement validation + position update
///   3. Jump arc + platform snapping + horizontal clamp
///   4. Collision resolution (hazards, pickups, exits)
///   5. Win / lose check
///
/// A paused or finished session does not change at all.

use tracing::info;

use crate::domain::entity::Direction;
use crate::domain::movement::MovementValidator;
use super::collision;
use super::event::GameEvent;
use super::world::Session;

/// One frame of already-mapped player input.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub direction: Option<Direction>,
    pub jump: bool,
    pub sprint: bool,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn tick(s: &mut Session, input: FrameInput, dt: f32) -> Vec<GameEvent> {
    if s.paused || s.is_over() { return vec![]; }

    let mut events = Vec::new();
    s.tick += 1;
    s.elapsed += dt;

    if s.message_timer > 0.0 {
        s.message_timer -= dt;
        if s.message_timer <= 0.0 { s.message.clear(); }
    }

    resolve_input(s, input, &mut events);
    resolve_enemy_directions(s);
    resolve_movement(s, input, dt);
    resolve_jump(s, dt, &mut events);
    collision::resolve(s, dt, &mut events);
    resolve_outcome(s, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// 1. Input / directions
// ══════════════════════════════════════════════════════════════

fn resolve_input(s: &mut Session, input: FrameInput, events: &mut Vec<GameEvent>) {
    if let Some(dir) = input.direction {
        s.hero.direction = dir;
    }
    if input.jump {
        let ceiling = s.ceiling();
        if s.hero.jump.start_jump(s.hero.body.pos.y, ceiling) {
            events.push(GameEvent::JumpStarted);
        }
    }
}

fn resolve_enemy_directions(s: &mut Session) {
    let targets: Vec<_> = s.enemies.iter()
        .map(|e| e.director.target().and_then(|id| s.actor_pos(id)))
        .collect();
    let validator = MovementValidator::new(&s.grid, s.config.probe.offsets);

    for (e, target_pos) in s.enemies.iter_mut().zip(targets) {
        e.direction = e.director.decide(e.body.pos, e.direction, target_pos, &validator, &mut s.rng);
    }
}

// ══════════════════════════════════════════════════════════════
// 2. Movement
// ══════════════════════════════════════════════════════════════

fn resolve_movement(s: &mut Session, input: FrameInput, dt: f32) {
    let validator = MovementValidator::new(&s.grid, s.config.probe.offsets);

    let hero = &mut s.hero;
    hero.body.remember();
    if let Some(dir) = input.direction {
        // Mid-air the vertical axis belongs to the jump.
        let free_axis = dir.is_horizontal() || !hero.jump.is_airborne();
        if free_axis && validator.can_move_span(hero.body.pos, s.config.probe.span, dir, hero.has_key) {
            let mut speed = s.config.speed.hero_speed;
            if input.sprint { speed *= s.config.speed.sprint_multiplier; }
            hero.body.step(dir, speed * dt);
        }
    }

    for e in s.enemies.iter_mut() {
        e.body.remember();
        if validator.can_move(e.body.pos, e.direction, false) {
            let dist = e.speed * dt;
            e.body.step(e.direction, dist);
            e.director.advance(dist);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// 3. Jump
// ══════════════════════════════════════════════════════════════

fn resolve_jump(s: &mut Session, dt: f32, events: &mut Vec<GameEvent>) {
    if !s.hero.jump.is_airborne() { return; }

    let (min_x, max_x) = s.horizontal_limits();
    let ceiling = s.ceiling();
    let hero = &mut s.hero;
    hero.body.pos.x = hero.body.pos.x.clamp(min_x, max_x);

    let mut y = hero.body.pos.y;
    let mut landed = hero.jump.update(&mut y, dt, ceiling);
    hero.body.pos.y = y;
    landed |= hero.jump.resolve_platforms(&mut hero.body, &s.platforms);

    if landed {
        events.push(GameEvent::Landed);
    }
}

// ══════════════════════════════════════════════════════════════
// 5. Win / lose
// ══════════════════════════════════════════════════════════════

fn resolve_outcome(s: &mut Session, events: &mut Vec<GameEvent>) {
    if s.is_dead() {
        s.score = 0;
        info!("hero died after {:.1}s", s.elapsed);
        events.push(GameEvent::Lost);
        return;
    }
    let hero = s.hero.body.rect();
    if s.bands.iter().any(|b| b.overlaps(&hero)) {
        s.winner = true;
        s.score = s.final_score();
        info!("escaped after {:.1}s, score {}", s.elapsed, s.score);
        events.push(GameEvent::Won { score: s.score });
    }
}
