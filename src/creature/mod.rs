//! Articulated creatures: a segment tree carried by a root body with
//! forward and rotational momentum, plus the limbs it drives.

mod genome;

pub use genome::Genome;

use crate::ik::{Appendage, Skeleton};
use crate::math::{polar, wrap_to_pi, Vec2};
use rand::Rng;
use std::f32::consts::PI;

/// Acceleration model for one degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    pub accel: f32,
    pub friction: f32,
    /// Fraction of speed lost each frame.
    pub resistance: f32,
    pub threshold: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    pub forward: Momentum,
    pub rotation: Momentum,
}

/// Per-frame steering input for [`Creature::follow`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drive {
    pub target: Vec2,
    pub target_angle: f32,
    /// Distance used for the threshold checks; behaviors scale it.
    pub distance: f32,
    pub forward_gain: f32,
    pub turn_gain: f32,
}

impl Drive {
    /// Plain pursuit of `target` from `from` with unit gains.
    pub fn toward(from: Vec2, target: Vec2) -> Self {
        let offset = target - from;
        Self {
            target,
            target_angle: offset.y.atan2(offset.x),
            distance: offset.length(),
            forward_gain: 1.0,
            turn_gain: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Creature {
    skeleton: Skeleton,
    appendages: Vec<Appendage>,
    params: MotionParams,
    forward_velocity: f32,
    speed: f32,
    turn_speed: f32,
}

impl Creature {
    pub fn new(skeleton: Skeleton, params: MotionParams) -> Self {
        Self {
            skeleton,
            appendages: Vec::new(),
            params,
            forward_velocity: 0.0,
            speed: 0.0,
            turn_speed: 0.0,
        }
    }

    pub fn attach(&mut self, appendage: Appendage) {
        self.appendages.push(appendage);
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn appendages(&self) -> &[Appendage] {
        &self.appendages
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    pub fn position(&self) -> Vec2 {
        self.skeleton.root().position
    }

    pub fn heading(&self) -> f32 {
        self.skeleton.root().abs_angle
    }

    /// Effective forward speed applied last frame, never negative.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn turn_speed(&self) -> f32 {
        self.turn_speed
    }

    /// Share of appendages that are grounded legs; 1 with no appendages.
    pub fn planted_fraction(&self) -> f32 {
        if self.appendages.is_empty() {
            return 1.0;
        }
        let planted = self.appendages.iter().filter(|a| a.is_planted()).count();
        planted as f32 / self.appendages.len() as f32
    }

    /// Integrates one frame of body motion, then drags the skeleton along
    /// and updates every appendage.
    pub fn follow<R: Rng + ?Sized>(&mut self, drive: &Drive, rng: &mut R) {
        let forward = self.params.forward;
        let rotation = self.params.rotation;
        let engaged = drive.distance > forward.threshold;

        let accel = forward.accel * self.planted_fraction() * drive.forward_gain;
        if engaged {
            self.forward_velocity += accel;
        }
        self.forward_velocity *= 1.0 - forward.resistance;
        self.speed = (self.forward_velocity - forward.friction).max(0.0);

        let heading = self.heading();
        let error = wrap_to_pi(heading - drive.target_angle);
        if error.abs() > rotation.threshold && engaged {
            let sign = if error > 0.0 { 1.0 } else { -1.0 };
            self.turn_speed -= rotation.accel * drive.turn_gain * sign;
        }
        self.turn_speed *= 1.0 - rotation.resistance;
        if self.turn_speed.abs() > rotation.friction {
            self.turn_speed -= rotation.friction * self.turn_speed.signum();
        } else {
            self.turn_speed = 0.0;
        }

        let heading = wrap_to_pi(heading + self.turn_speed);
        let root = self.skeleton.root_mut();
        root.position += polar(heading, self.speed);

        // The joint tree grows out of the body's rear, so children are
        // solved against the reversed heading.
        root.abs_angle = heading + PI;
        self.skeleton.follow_children(Skeleton::ROOT, true);
        for appendage in &mut self.appendages {
            appendage.update(&mut self.skeleton, drive.target, rng);
        }
        self.skeleton.root_mut().abs_angle = heading;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ik::JointConstraint;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params() -> MotionParams {
        MotionParams {
            forward: Momentum {
                accel: 2.0,
                friction: 0.3,
                resistance: 0.5,
                threshold: 16.0,
            },
            rotation: Momentum {
                accel: 0.5,
                friction: 0.085,
                resistance: 0.5,
                threshold: 0.3,
            },
        }
    }

    fn worm() -> Creature {
        let mut skeleton = Skeleton::new(Vec2::new(200.0, 200.0), 0.0);
        let mut spine = Skeleton::ROOT;
        for _ in 0..8 {
            spine = skeleton.add(spine, 4.0, JointConstraint::new(0.0, 2.0, 1.1));
        }
        Creature::new(skeleton, params())
    }

    #[test]
    fn moves_toward_distant_target() {
        let mut creature = worm();
        let mut rng = StdRng::seed_from_u64(3);
        let target = Vec2::new(400.0, 200.0);
        let start = creature.position().distance(target);
        for _ in 0..30 {
            let drive = Drive::toward(creature.position(), target);
            creature.follow(&drive, &mut rng);
        }
        assert!(creature.position().distance(target) < start);
        assert!(creature.skeleton().rigidity_error() < 1e-3);
    }

    #[test]
    fn stays_put_inside_threshold() {
        let mut creature = worm();
        let mut rng = StdRng::seed_from_u64(3);
        let start = creature.position();
        let drive = Drive::toward(start, start + Vec2::new(5.0, 0.0));
        for _ in 0..10 {
            creature.follow(&drive, &mut rng);
        }
        assert_eq!(creature.speed(), 0.0);
        assert_abs_diff_eq!(creature.position().x, start.x);
    }

    #[test]
    fn small_turn_speed_snaps_to_zero() {
        let mut creature = worm();
        let mut rng = StdRng::seed_from_u64(3);
        creature.turn_speed = 0.1;
        let drive = Drive {
            target: creature.position(),
            target_angle: creature.heading(),
            distance: 0.0,
            forward_gain: 1.0,
            turn_gain: 1.0,
        };
        creature.follow(&drive, &mut rng);
        assert_eq!(creature.turn_speed(), 0.0);
    }

    #[test]
    fn heading_is_restored_after_propagation() {
        let mut creature = worm();
        let mut rng = StdRng::seed_from_u64(3);
        let target = Vec2::new(200.0, 400.0);
        for _ in 0..20 {
            let drive = Drive::toward(creature.position(), target);
            creature.follow(&drive, &mut rng);
            assert!(creature.heading() > -PI - 1e-4 && creature.heading() <= PI + 1e-4);
        }
        assert!(creature.heading() > 0.0);
    }

    #[test]
    fn no_appendages_counts_as_fully_planted() {
        assert_eq!(worm().planted_fraction(), 1.0);
    }
}
