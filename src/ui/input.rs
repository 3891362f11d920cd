/// Keyboard state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement while a key is held
///   - Edge-triggered actions (jump, pause, sprint toggle)
///   - The most recently pressed direction winning when several are held
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Direction;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// A held key: when it was first pressed and when it last reported activity.
#[derive(Clone, Copy, Debug)]
struct Held {
    since: Instant,
    last: Instant,
}

pub struct InputState {
    held: HashMap<KeyCode, Held>,

    /// Keys that went from "not held" to "held" during the last drain.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Honor Release events. Only true when keyboard enhancement is on.
    pub honor_release: bool,
}

/// Arrow keys and WASD.
pub fn key_direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::Right),
        _ => None,
    }
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            held: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);
                self.apply(key, Instant::now());
            }
        }

        let now = Instant::now();
        self.held.retain(|_, h| now.duration_since(h.last) < HOLD_TIMEOUT);
    }

    fn apply(&mut self, key: KeyEvent, now: Instant) {
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.held.remove(&key.code);
            }
            // Without enhancement, releases are inferred from the timeout.
            KeyEventKind::Release => {}
            _ => {
                let entry = self.held.entry(key.code).or_insert_with(|| Held { since: now, last: now });
                if entry.since == now {
                    self.fresh_presses.push(key.code);
                }
                entry.last = now;
            }
        }
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.get(&code).map_or(false, |h| h.last.elapsed() < HOLD_TIMEOUT)
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Direction of the most recently pressed movement key still held.
    pub fn held_direction(&self) -> Option<Direction> {
        self.held.iter()
            .filter(|(code, _)| self.is_held(**code))
            .filter_map(|(code, h)| key_direction(*code).map(|d| (h.since, d)))
            .max_by_key(|(since, _)| *since)
            .map(|(_, d)| d)
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_map_to_directions() {
        assert_eq!(key_direction(KeyCode::Up), Some(Direction::Up));
        assert_eq!(key_direction(KeyCode::Char('a')), Some(Direction::Left));
        assert_eq!(key_direction(KeyCode::Char('D')), Some(Direction::Right));
        assert_eq!(key_direction(KeyCode::Char(' ')), None);
    }

    #[test]
    fn repeat_is_not_a_fresh_press() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.apply(press(KeyCode::Char(' ')), t0);
        assert!(input.was_pressed(KeyCode::Char(' ')));
        input.fresh_presses.clear();
        input.apply(press(KeyCode::Char(' ')), t0 + Duration::from_millis(30));
        assert!(!input.was_pressed(KeyCode::Char(' ')));
        assert!(input.is_held(KeyCode::Char(' ')));
    }

    #[test]
    fn latest_direction_wins() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.apply(press(KeyCode::Left), t0);
        input.apply(press(KeyCode::Up), t0 + Duration::from_millis(10));
        assert_eq!(input.held_direction(), Some(Direction::Up));
        input.honor_release = true;
        input.apply(KeyEvent::new_with_kind(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Release), t0);
        assert_eq!(input.held_direction(), Some(Direction::Left));
    }
}
