/// JumpController: vertical arc state machine.
///
/// ```text
///   Grounded ──start_jump──▶ Ascending ──apex / ceiling / platform below──▶ Descending
///       ▲                                                                   │
///       └──────────────── back at start height / landed on platform ◀───────┘
/// ```
///
/// Heights are actor-center y values in tile units (+y is up).

use super::entity::Body;
use super::geom::Rect;

/// Slack when deciding which side of a platform the actor came from.
const SIDE_EPS: f32 = 1e-3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JumpState {
    Grounded,
    Ascending,
    Descending,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JumpParams {
    pub height: f32,
    pub margin: f32,
    pub ascend_rate: f32,
    pub descend_rate: f32,
}

impl Default for JumpParams {
    fn default() -> Self {
        JumpParams { height: 2.0, margin: 0.5, ascend_rate: 6.0, descend_rate: 6.0 }
    }
}

#[derive(Clone, Debug)]
pub struct JumpController {
    state: JumpState,
    ground_level: f32,
    apex_y: f32,
    start_y: f32,
    params: JumpParams,
}

impl JumpController {
    pub fn new(params: JumpParams, ground_level: f32) -> Self {
        JumpController {
            state: JumpState::Grounded,
            ground_level,
            apex_y: ground_level,
            start_y: ground_level,
            params,
        }
    }

    pub fn state(&self) -> JumpState {
        self.state
    }

    pub fn is_airborne(&self) -> bool {
        self.state != JumpState::Grounded
    }

    #[cfg(test)]
    pub fn ground_level(&self) -> f32 {
        self.ground_level
    }

    #[cfg(test)]
    pub fn apex_y(&self) -> f32 {
        self.apex_y
    }

    /// Begin a jump from height `y`. Ignored unless grounded.
    ///
    /// Near the ceiling the apex is pulled down to `ceiling - margin`
    /// (never below the start height).
    pub fn start_jump(&mut self, y: f32, ceiling: f32) -> bool {
        if self.state != JumpState::Grounded {
            return false;
        }
        let p = self.params;
        self.start_y = y;
        self.ground_level = y;
        self.apex_y = if ceiling - y <= p.height + p.margin {
            (ceiling - p.margin).max(y)
        } else {
            y + p.height
        };
        self.state = JumpState::Ascending;
        true
    }

    /// Integrate one tick. Returns true when the arc ends back on the ground.
    pub fn update(&mut self, y: &mut f32, dt: f32, ceiling: f32) -> bool {
        let mut landed = false;
        match self.state {
            JumpState::Grounded => return false,
            JumpState::Ascending => {
                *y += self.params.ascend_rate * dt;
                if *y >= self.apex_y {
                    *y = self.apex_y;
                    self.state = JumpState::Descending;
                }
            }
            JumpState::Descending => {
                *y -= self.params.descend_rate * dt;
                if *y <= self.start_y {
                    *y = self.start_y;
                    self.state = JumpState::Grounded;
                    landed = true;
                }
            }
        }
        if self.is_airborne() && *y > ceiling {
            *y = ceiling;
            self.state = JumpState::Descending;
        }
        landed
    }

    /// Snap against platforms the body now overlaps, judged by which side
    /// `body.prev` was on. Hitting one from below ends the ascent; landing on
    /// one from above grounds the actor and raises the ground level.
    /// Returns true on a landing.
    pub fn resolve_platforms(&mut self, body: &mut Body, platforms: &[Rect]) -> bool {
        let half = body.h / 2.0;
        let prev_top = body.prev.y + half;
        let prev_bottom = body.prev.y - half;
        for p in platforms {
            if !body.rect().overlaps(p) {
                continue;
            }
            match self.state {
                JumpState::Ascending if prev_top <= p.bottom() + SIDE_EPS => {
                    body.pos.y = p.bottom() - half;
                    self.state = JumpState::Descending;
                }
                JumpState::Descending if prev_bottom >= p.top() - SIDE_EPS => {
                    body.pos.y = p.top() + half;
                    self.state = JumpState::Grounded;
                    self.ground_level = body.pos.y;
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    /// Cut the arc short and stand at `y` (used when the move is rolled back).
    pub fn abort(&mut self, y: f32) {
        self.state = JumpState::Grounded;
        self.ground_level = y;
        self.start_y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::HERO_SIZE;
    use crate::domain::geom::Vec2;

    const DT: f32 = 1.0 / 60.0;
    const CEILING: f32 = 100.0;

    fn platform(tx: i32, ty: i32) -> Rect {
        Rect::centered(Vec2::new(tx as f32, ty as f32), 1.0, 0.17)
    }

    /// Tick `body` until grounded (or a safety cap). Returns ticks used.
    fn run(ctrl: &mut JumpController, body: &mut Body, plats: &[Rect]) -> usize {
        for n in 1..=1000 {
            body.remember();
            let mut y = body.pos.y;
            let mut landed = ctrl.update(&mut y, DT, CEILING);
            body.pos.y = y;
            landed |= ctrl.resolve_platforms(body, plats);
            if landed {
                return n;
            }
        }
        panic!("jump never landed");
    }

    #[test]
    fn jump_round_trip_returns_to_ground() {
        let mut ctrl = JumpController::new(JumpParams::default(), 3.25);
        let mut body = Body::new(Vec2::new(0.0, 3.25), HERO_SIZE, HERO_SIZE);
        assert!(ctrl.start_jump(body.pos.y, CEILING));
        assert_eq!(ctrl.state(), JumpState::Ascending);
        run(&mut ctrl, &mut body, &[]);
        assert_eq!(ctrl.state(), JumpState::Grounded);
        assert_eq!(body.pos.y, 3.25);
        assert_eq!(ctrl.ground_level(), 3.25);
    }

    #[test]
    fn reaches_apex_then_descends() {
        let mut ctrl = JumpController::new(JumpParams::default(), 0.0);
        let mut y = 0.0;
        ctrl.start_jump(y, CEILING);
        let mut peak: f32 = 0.0;
        while ctrl.is_airborne() {
            ctrl.update(&mut y, DT, CEILING);
            peak = peak.max(y);
        }
        assert_eq!(peak, 2.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn start_jump_only_from_ground() {
        let mut ctrl = JumpController::new(JumpParams::default(), 0.0);
        assert!(ctrl.start_jump(0.0, CEILING));
        assert!(!ctrl.start_jump(0.5, CEILING));
        assert_eq!(ctrl.apex_y(), 2.0);
    }

    #[test]
    fn apex_clamped_near_ceiling() {
        let mut ctrl = JumpController::new(JumpParams::default(), 8.5);
        ctrl.start_jump(8.5, 10.0);
        assert_eq!(ctrl.apex_y(), 9.5);

        let mut ctrl = JumpController::new(JumpParams::default(), 9.8);
        ctrl.start_jump(9.8, 10.0);
        assert_eq!(ctrl.apex_y(), 9.8);
    }

    #[test]
    fn ceiling_forces_descent() {
        let mut ctrl = JumpController::new(JumpParams::default(), 0.0);
        ctrl.start_jump(0.0, CEILING);
        // Ceiling lowered after launch: the next tick pins y to it.
        let mut y = 0.0;
        ctrl.update(&mut y, DT, 0.05);
        assert_eq!(y, 0.05);
        assert_eq!(ctrl.state(), JumpState::Descending);
    }

    #[test]
    fn platform_above_stops_ascent() {
        let plats = [platform(0, 1)];
        let mut ctrl = JumpController::new(JumpParams::default(), 0.0);
        let mut body = Body::new(Vec2::new(0.0, 0.0), HERO_SIZE, HERO_SIZE);
        ctrl.start_jump(0.0, CEILING);
        let mut max_top: f32 = body.rect().top();
        for _ in 0..1000 {
            body.remember();
            let mut y = body.pos.y;
            let landed = ctrl.update(&mut y, DT, CEILING);
            body.pos.y = y;
            ctrl.resolve_platforms(&mut body, &plats);
            max_top = max_top.max(body.rect().top());
            if landed {
                break;
            }
        }
        assert!(max_top <= plats[0].bottom() + 1e-4);
        assert_eq!(ctrl.state(), JumpState::Grounded);
        assert_eq!(body.pos.y, 0.0);
    }

    #[test]
    fn landing_on_platform_raises_ground() {
        let plats = [platform(2, 1)];
        let mut ctrl = JumpController::new(JumpParams::default(), 0.0);
        let mut body = Body::new(Vec2::new(0.0, 0.0), HERO_SIZE, HERO_SIZE);
        ctrl.start_jump(0.0, CEILING);

        // Rise to the apex beside the platform, then drift over it.
        while ctrl.state() == JumpState::Ascending {
            body.remember();
            let mut y = body.pos.y;
            ctrl.update(&mut y, DT, CEILING);
            body.pos.y = y;
            ctrl.resolve_platforms(&mut body, &plats);
        }
        body.pos.x = 2.0;
        run(&mut ctrl, &mut body, &plats);

        let rest = plats[0].top() + HERO_SIZE / 2.0;
        assert!((body.pos.y - rest).abs() < 1e-5);
        assert!((ctrl.ground_level() - rest).abs() < 1e-5);

        // The next jump launches from the platform.
        assert!(ctrl.start_jump(body.pos.y, CEILING));
        run(&mut ctrl, &mut body, &[]);
        assert!((body.pos.y - rest).abs() < 1e-5);
    }

    #[test]
    fn abort_grounds_in_place() {
        let mut ctrl = JumpController::new(JumpParams::default(), 0.0);
        ctrl.start_jump(0.0, CEILING);
        ctrl.abort(0.4);
        assert!(!ctrl.is_airborne());
        assert_eq!(ctrl.ground_level(), 0.4);
    }
}
