//! Hunting behavior: decides each frame where a creature should head.
//!
//! The controller stalks a lagged point behind the pointer, pounces once the
//! pointer has rested long enough, and curls around it when it stays idle.
//! Its output is a [`Plan`] that the creature's integrator consumes.

mod personality;

pub use personality::{Gains, Personality};

use crate::creature::Drive;
use crate::math::{heading, polar, Vec2};
use std::collections::VecDeque;
use std::f32::consts::{PI, TAU};

/// Pointer rest time (ms) after which the creature may coil.
pub const IDLE_THRESHOLD: f32 = 1200.0;
/// Pointer movement (px) that counts as leaving the idle spot.
pub const IDLE_RADIUS: f32 = 25.0;
pub const COIL_RADIUS: f32 = 25.0;
pub const STALK_DISTANCE: f32 = 250.0;
/// Nominal rest time (ms) before a pounce.
pub const POUNCE_TRIGGER: f32 = 2500.0;
/// Fraction of the gap to the ideal stalk point closed per frame.
pub const LAG_SPEED: f32 = 0.1;
/// Aggression gained per millisecond away from the pointer.
pub const AGGRESSION_RATE: f32 = 0.0005;
pub const HISTORY_SIZE: usize = 10;
/// Minimum time (ms) between two coils that reset aggression.
pub const COIL_COOLDOWN: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PounceState {
    #[default]
    None,
    Approaching,
    Attacking,
    Wrapping,
}

/// Where to go this frame and how eagerly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plan {
    pub target: Vec2,
    pub target_angle: f32,
    pub distance: f32,
    pub pounce_state: PounceState,
    pub pouncing: bool,
    pub coiling: bool,
    pub gains: Gains,
}

impl Plan {
    pub fn drive(&self) -> Drive {
        Drive {
            target: self.target,
            target_angle: self.target_angle,
            distance: self.distance,
            forward_gain: self.gains.forward,
            turn_gain: self.gains.turn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PointerSample {
    position: Vec2,
    time: f64,
}

#[derive(Debug, Clone)]
pub struct BehaviorController {
    personality: Personality,
    elapsed: f64,
    history: VecDeque<PointerSample>,
    last_pointer: Vec2,
    idle_time: f32,
    hunt_time: f32,
    stalk: Vec2,
    stalk_angle: f32,
    pounce_timer: f32,
    has_pounced: bool,
    last_coil: Option<f64>,
    aggression: f32,
    coil_angle: f32,
    pounce_state: PounceState,
    wrap_radius: f32,
    target_angle: f32,
}

impl BehaviorController {
    /// Starts calm, stalking from `origin` as if the pointer rested there.
    pub fn new(personality: Personality, origin: Vec2) -> Self {
        Self {
            personality,
            elapsed: 0.0,
            history: VecDeque::with_capacity(HISTORY_SIZE + 1),
            last_pointer: origin,
            idle_time: 0.0,
            hunt_time: 0.0,
            stalk: origin,
            stalk_angle: 0.0,
            pounce_timer: 0.0,
            has_pounced: false,
            last_coil: None,
            aggression: 0.0,
            coil_angle: 0.0,
            pounce_state: PounceState::None,
            wrap_radius: COIL_RADIUS,
            target_angle: 0.0,
        }
    }

    pub fn personality(&self) -> &Personality {
        &self.personality
    }

    pub fn pounce_state(&self) -> PounceState {
        self.pounce_state
    }

    pub fn has_pounced(&self) -> bool {
        self.has_pounced
    }

    pub fn aggression(&self) -> f32 {
        self.aggression
    }

    pub fn idle_time(&self) -> f32 {
        self.idle_time
    }

    pub fn pounce_timer(&self) -> f32 {
        self.pounce_timer
    }

    pub fn stalk_position(&self) -> Vec2 {
        self.stalk
    }

    pub fn wrap_radius(&self) -> f32 {
        self.wrap_radius
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Advances the controller by `dt_ms` milliseconds for a body at `body`
    /// and a pointer at `pointer`.
    pub fn step(&mut self, body: Vec2, pointer: Vec2, dt_ms: f32) -> Plan {
        self.elapsed += f64::from(dt_ms);
        let to_pointer = body.distance(pointer);

        self.update_aggression(to_pointer, dt_ms);
        self.hunt_time += dt_ms;
        self.track_pointer(pointer, dt_ms);
        self.update_stalk(pointer);

        let (pouncing, coiling) = self.update_pounce(to_pointer);
        self.plan(body, pointer, to_pointer, dt_ms, pouncing, coiling)
    }

    fn update_aggression(&mut self, to_pointer: f32, dt_ms: f32) {
        if to_pointer > COIL_RADIUS * 2.0 {
            self.aggression = (self.aggression + dt_ms * AGGRESSION_RATE).min(1.0);
        } else if to_pointer < COIL_RADIUS && self.idle_time > IDLE_THRESHOLD {
            let due = self
                .last_coil
                .map_or(true, |at| self.elapsed - at > COIL_COOLDOWN);
            if due {
                self.last_coil = Some(self.elapsed);
                self.aggression = 0.0;
                log::trace!("coiled at {:.0} ms, aggression reset", self.elapsed);
            }
        }
    }

    fn reset_idle(&mut self) {
        self.idle_time = 0.0;
        self.pounce_timer = 0.0;
        self.has_pounced = false;
    }

    fn track_pointer(&mut self, pointer: Vec2, dt_ms: f32) {
        let delta = pointer - self.last_pointer;
        let moved = delta.x.abs() > 1.0 || delta.y.abs() > 1.0;

        if moved && delta.length() > IDLE_RADIUS {
            self.reset_idle();
            self.history.push_back(PointerSample {
                position: pointer,
                time: self.elapsed,
            });
            while self.history.len() > HISTORY_SIZE {
                self.history.pop_front();
            }
        } else {
            let resting = self
                .history
                .back()
                .map_or(true, |last| pointer.distance(last.position) < IDLE_RADIUS);
            if resting {
                self.idle_time += dt_ms;
                self.pounce_timer += dt_ms;
            } else {
                self.reset_idle();
            }
        }
        self.last_pointer = pointer;
    }

    fn update_stalk(&mut self, pointer: Vec2) {
        let p = self.personality;
        let a = self.aggression;

        let distance = if p.brute {
            STALK_DISTANCE * (1.0 - a * 0.5)
        } else {
            let mut d = STALK_DISTANCE * (1.0 + p.sneaky * 0.3);
            if a > 0.5 {
                d += (a * PI * 4.0).sin() * 40.0 * a;
            }
            d
        };

        if let Some(angle) = heading(self.stalk, pointer) {
            self.stalk_angle = angle;
        }
        let wobble = if !p.brute && p.sneaky > 0.3 {
            (a * TAU + self.hunt_time / 200.0).sin() * 0.4 * p.sneaky
        } else {
            0.0
        };
        let ideal = pointer - polar(self.stalk_angle + wobble, distance);

        let lag = if p.brute {
            LAG_SPEED * 1.5
        } else {
            LAG_SPEED * (0.7 + p.sneaky * 0.3)
        };
        if ideal.distance(self.stalk) > 5.0 {
            self.stalk += (ideal - self.stalk) * lag;
        }
    }

    fn set_state(&mut self, state: PounceState) {
        if self.pounce_state != state {
            log::trace!("pounce state {:?} -> {:?}", self.pounce_state, state);
            self.pounce_state = state;
        }
    }

    /// Runs the pounce state machine; returns the pouncing and coiling flags.
    fn update_pounce(&mut self, to_pointer: f32) -> (bool, bool) {
        let p = self.personality;
        let trigger = if p.brute {
            POUNCE_TRIGGER * (1.0 - self.aggression * 0.5)
        } else {
            POUNCE_TRIGGER * (1.0 + p.sneaky * 0.3)
        };

        let mut pouncing = false;
        let mut coiling = false;
        let should_coil = to_pointer < COIL_RADIUS
            && self.idle_time > IDLE_THRESHOLD
            && self.pounce_state == PounceState::None;

        if self.pounce_timer > trigger
            && !self.has_pounced
            && !should_coil
            && self.pounce_state == PounceState::None
        {
            self.set_state(PounceState::Approaching);
            self.has_pounced = true;
            pouncing = true;
        }

        if self.pounce_state == PounceState::Approaching && to_pointer < STALK_DISTANCE * 0.5 {
            if p.anaconda {
                self.set_state(PounceState::Wrapping);
                self.wrap_radius = COIL_RADIUS * 1.2;
            } else {
                self.set_state(PounceState::Attacking);
            }
        }

        let close_enough = if p.anaconda {
            to_pointer < COIL_RADIUS * 2.0 && self.idle_time > 500.0
        } else {
            to_pointer < COIL_RADIUS * 0.5
        };
        let striking = matches!(
            self.pounce_state,
            PounceState::Wrapping | PounceState::Attacking
        );
        // Anacondas keep circling once they have wrapped.
        if striking && close_enough && self.idle_time > 300.0 && !p.anaconda {
            self.set_state(PounceState::None);
            self.has_pounced = false;
            self.wrap_radius = COIL_RADIUS;
            coiling = true;
        }

        if self.pounce_state != PounceState::None && to_pointer > STALK_DISTANCE * 1.5 {
            self.set_state(PounceState::None);
            self.has_pounced = false;
            self.wrap_radius = COIL_RADIUS;
            pouncing = false;
        }

        if should_coil && self.pounce_state == PounceState::None {
            coiling = true;
        }
        (pouncing, coiling)
    }

    fn advance_coil(&mut self, rate: f32, dt_ms: f32) {
        self.coil_angle += dt_ms * rate;
        if self.coil_angle > TAU {
            self.coil_angle -= TAU;
        }
    }

    fn plan(
        &mut self,
        body: Vec2,
        pointer: Vec2,
        to_pointer: f32,
        dt_ms: f32,
        mut pouncing: bool,
        coiling: bool,
    ) -> Plan {
        let a = self.aggression;
        let toward_pointer = heading(body, pointer).unwrap_or(self.target_angle);
        let mut target = self.stalk;
        let mut distance = body.distance(target);

        match self.pounce_state {
            PounceState::Wrapping => {
                pouncing = true;
                let sway = (a * TAU + self.hunt_time / 500.0).sin() * (COIL_RADIUS * 0.2);
                self.wrap_radius = COIL_RADIUS * 1.1 + sway;
                self.advance_coil(0.004 + a * 0.002, dt_ms);
                target = pointer + polar(self.coil_angle, self.wrap_radius);
                distance = body.distance(target);
            }
            PounceState::Attacking => {
                pouncing = true;
                let offset = (to_pointer * 0.1).min(5.0);
                target = pointer - polar(toward_pointer, offset);
                distance = to_pointer * 4.0;
            }
            PounceState::Approaching => {
                pouncing = true;
                target = if self.personality.brute {
                    pointer
                } else {
                    let curve = (1.0 - a) * 30.0;
                    let angle = toward_pointer + (self.hunt_time / 100.0).sin() * (curve / STALK_DISTANCE);
                    pointer - polar(angle, curve)
                };
                distance = to_pointer * (1.5 + a * 0.5);
            }
            PounceState::None if coiling => {
                self.advance_coil(0.003, dt_ms);
                target = pointer + polar(self.coil_angle, COIL_RADIUS);
                distance = body.distance(target) * 0.3;
            }
            PounceState::None => {}
        }

        if let Some(angle) = heading(body, target) {
            self.target_angle = angle;
        }

        Plan {
            target,
            target_angle: self.target_angle,
            distance,
            pounce_state: self.pounce_state,
            pouncing,
            coiling,
            gains: Gains::select(self.pounce_state, pouncing, coiling, &self.personality, a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FRAME: f32 = 16.0;

    fn brute_at(origin: Vec2) -> BehaviorController {
        BehaviorController::new(Personality::from_girdles(2), origin)
    }

    #[test]
    fn aggression_builds_while_far_away() {
        let origin = Vec2::new(400.0, 300.0);
        let mut behavior = brute_at(origin);
        behavior.step(origin, origin + Vec2::new(200.0, 0.0), 100.0);
        assert_relative_eq!(behavior.aggression(), 0.05, epsilon = 1e-6);
        for _ in 0..100 {
            behavior.step(origin, origin + Vec2::new(200.0, 0.0), 100.0);
        }
        assert_relative_eq!(behavior.aggression(), 1.0);
    }

    #[test]
    fn large_pointer_jump_is_recorded_and_resets_timers() {
        let origin = Vec2::new(400.0, 300.0);
        let mut behavior = brute_at(origin);
        for _ in 0..10 {
            behavior.step(origin, origin, FRAME);
        }
        assert!(behavior.idle_time() > 0.0);
        behavior.step(origin, origin + Vec2::new(100.0, 0.0), FRAME);
        assert_eq!(behavior.idle_time(), 0.0);
        assert_eq!(behavior.history_len(), 1);
    }

    #[test]
    fn history_is_bounded() {
        let origin = Vec2::new(400.0, 300.0);
        let mut behavior = brute_at(origin);
        for i in 0..30 {
            let offset = if i % 2 == 0 { 60.0 } else { 0.0 };
            behavior.step(origin, origin + Vec2::new(offset, 0.0), FRAME);
        }
        assert_eq!(behavior.history_len(), HISTORY_SIZE);
    }

    #[test]
    fn stalk_point_trails_the_pointer() {
        let origin = Vec2::new(100.0, 100.0);
        let mut behavior = brute_at(origin);
        let pointer = Vec2::new(700.0, 100.0);
        for _ in 0..200 {
            behavior.step(origin, pointer, FRAME);
        }
        let gap = behavior.stalk_position().distance(pointer);
        // Fully aggressive brutes stalk at half distance.
        assert!((gap - STALK_DISTANCE * 0.5).abs() < 10.0, "gap {gap}");
    }

    #[test]
    fn resting_pointer_far_away_triggers_pounce() {
        let body = Vec2::new(100.0, 100.0);
        let pointer = Vec2::new(400.0, 100.0);
        let mut behavior = brute_at(body);
        behavior.step(body, pointer, FRAME);
        let mut pounced = false;
        for _ in 0..400 {
            let plan = behavior.step(body, pointer, FRAME);
            if plan.pounce_state == PounceState::Approaching {
                assert!(plan.pouncing);
                assert!(behavior.has_pounced());
                assert_eq!(plan.target, pointer);
                pounced = true;
                break;
            }
        }
        assert!(pounced);
    }

    #[test]
    fn plan_drive_carries_gains() {
        let origin = Vec2::new(0.0, 0.0);
        let mut behavior = brute_at(origin);
        let plan = behavior.step(origin, Vec2::new(300.0, 0.0), FRAME);
        let drive = plan.drive();
        assert_eq!(drive.forward_gain, plan.gains.forward);
        assert_eq!(drive.target, plan.target);
    }
}
