use super::{Creature, Momentum, MotionParams};
use crate::behavior::Personality;
use crate::ik::{Appendage, JointConstraint, Leg, SegmentId, Skeleton};
use crate::math::Vec2;
use rand::Rng;
use std::f32::consts::PI;

pub const MAX_LEGS: u32 = 12;
pub const NECK_VERTEBRAE: usize = 6;
pub const RIB_VERTEBRAE: usize = 6;
/// Links from the foot up toward the shoulder that a leg solves.
pub const LEG_CHAIN: usize = 3;

/// Randomly rolled build parameters of a lizard-like skeleton.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Genome {
    /// Leg count as rolled, before it is evened out into girdles.
    pub rolled_legs: u32,
    /// Shoulder girdles, each carrying a left and a right leg.
    pub girdles: u32,
    /// Scale applied to every segment length.
    pub size: f32,
    pub variation: f32,
    pub speed_multiplier: f32,
    pub tail_length: u32,
}

impl Genome {
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let rolled_legs = rng.random_range(1..=MAX_LEGS);
        let variation = rng.random_range(0.8f32..1.2);
        let tail_length = rng.random_range(4..rolled_legs * 8 + 4);

        let base = 8.0 / (rolled_legs as f32).sqrt();
        let girdles = (rolled_legs + rolled_legs % 2).clamp(2, MAX_LEGS);

        Self {
            rolled_legs,
            girdles,
            size: base * 0.2 * variation,
            variation,
            speed_multiplier: 0.5 + (rolled_legs - 1) as f32 * (2.5 / 11.0),
            tail_length,
        }
    }

    pub fn personality(&self) -> Personality {
        Personality::from_girdles(self.girdles)
    }

    pub fn motion_params(&self) -> MotionParams {
        let s = self.size;
        let m = self.speed_multiplier;
        MotionParams {
            forward: Momentum {
                accel: s * 10.0 * m,
                friction: s * 2.0 * (1.5 - m * 0.25),
                resistance: 0.5,
                threshold: 16.0,
            },
            rotation: Momentum {
                accel: 0.5 * m,
                friction: 0.085,
                resistance: 0.5,
                threshold: 0.3,
            },
        }
    }

    /// Number of segments `build` produces, root excluded.
    pub fn segment_count(&self) -> usize {
        let girdles = self.girdles as usize;
        let vertebra = 1 + 2 * 4;
        let leg = 3 + 4;
        NECK_VERTEBRAE * vertebra
            + (girdles - 1) * RIB_VERTEBRAE * vertebra
            + girdles * 2 * leg
            + self.tail_length as usize * vertebra
    }

    /// Grows the skeleton at `origin`, facing +x, and wires up its legs.
    pub fn build(&self, origin: Vec2) -> Creature {
        let s = self.size;
        let mut skeleton = Skeleton::new(origin, 0.0);
        let mut legs = Vec::with_capacity(self.girdles as usize * 2);
        let mut spine = Skeleton::ROOT;

        for _ in 0..NECK_VERTEBRAE {
            spine = skeleton.add(spine, s * 4.0, JointConstraint::new(0.0, PI * 2.0 / 3.0, 1.1));
            for side in [-1.0f32, 1.0] {
                let mut whisker = skeleton.add(spine, s * 3.0, JointConstraint::new(side, 0.1, 2.0));
                for _ in 0..3 {
                    whisker = skeleton.add(whisker, s * 0.1, JointConstraint::new(-side * 0.1, 0.1, 2.0));
                }
            }
        }

        for girdle in 0..self.girdles {
            if girdle > 0 {
                for _ in 0..RIB_VERTEBRAE {
                    spine = skeleton.add(spine, s * 4.0, JointConstraint::new(0.0, PI / 2.0, 1.5));
                    for side in [-1.0f32, 1.0] {
                        let mut rib = skeleton.add(
                            spine,
                            s * 3.0,
                            JointConstraint::new(side * PI / 2.0, 0.1, 1.5),
                        );
                        for _ in 0..3 {
                            rib = skeleton.add(rib, s * 3.0, JointConstraint::new(-side * 0.3, 0.1, 2.0));
                        }
                    }
                }
            }
            for side in [-1.0f32, 1.0] {
                let foot = self.grow_leg(&mut skeleton, spine, side);
                let speed = s * 12.0 * self.speed_multiplier;
                if let Some(leg) = Leg::new(&skeleton, foot, LEG_CHAIN, speed) {
                    legs.push(leg);
                }
            }
        }

        let tail = self.tail_length as f32;
        for i in 0..self.tail_length {
            spine = skeleton.add(spine, s * 4.0, JointConstraint::new(0.0, PI * 2.0 / 3.0, 1.1));
            let spike = s * 3.0 * (tail - i as f32) / tail;
            for side in [-1.0f32, 1.0] {
                let branch = skeleton.add(spine, s * 3.0, JointConstraint::new(side, 0.1, 2.0));
                for _ in 0..3 {
                    skeleton.add(branch, spike, JointConstraint::new(-side * 0.1, 0.1, 2.0));
                }
            }
        }

        let mut creature = Creature::new(skeleton, self.motion_params());
        for leg in legs {
            creature.attach(Appendage::Leg(leg));
        }
        creature
    }

    fn grow_leg(&self, skeleton: &mut Skeleton, spine: SegmentId, side: f32) -> SegmentId {
        let s = self.size;
        let shoulder = skeleton.add(spine, s * 12.0, JointConstraint::new(side * PI / 4.0, 0.0, 8.0));
        let upper = skeleton.add(shoulder, s * 16.0, JointConstraint::new(-side * PI / 4.0, PI * 2.0, 1.0));
        let lower = skeleton.add(upper, s * 16.0, JointConstraint::new(side * PI / 2.0, PI, 2.0));
        for toe in 0..4 {
            let spread = (toe as f32 / 3.0 - 0.5) * PI / 2.0;
            skeleton.add(lower, s * 4.0, JointConstraint::new(spread, 0.1, 4.0));
        }
        lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(42)]
    #[case(1234)]
    fn rolled_values_stay_in_range(#[case] seed: u64) {
        let genome = Genome::roll(&mut StdRng::seed_from_u64(seed));
        assert!((1..=MAX_LEGS).contains(&genome.rolled_legs));
        assert!(genome.girdles % 2 == 0 && (2..=MAX_LEGS).contains(&genome.girdles));
        assert!(genome.girdles >= genome.rolled_legs);
        assert!((0.8..1.2).contains(&genome.variation));
        assert!(genome.tail_length >= 4 && genome.tail_length < genome.rolled_legs * 8 + 4);
    }

    #[test]
    fn build_matches_segment_count() {
        let genome = Genome::roll(&mut StdRng::seed_from_u64(5));
        let creature = genome.build(Vec2::new(320.0, 240.0));
        assert_eq!(creature.skeleton().len(), genome.segment_count() + 1);
        assert_eq!(creature.appendages().len(), genome.girdles as usize * 2);
        assert_eq!(creature.skeleton().validate(), Ok(()));
    }

    #[test]
    fn segment_count_for_fixed_genome() {
        let genome = Genome {
            rolled_legs: 3,
            girdles: 4,
            size: 1.0,
            variation: 1.0,
            speed_multiplier: 1.0,
            tail_length: 10,
        };
        assert_eq!(genome.segment_count(), 54 + 3 * 54 + 14 * 4 + 9 * 10);
    }

    #[test]
    fn same_seed_same_structure() {
        let a = Genome::roll(&mut StdRng::seed_from_u64(99));
        let b = Genome::roll(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
        let left = a.build(Vec2::ZERO);
        let right = b.build(Vec2::ZERO);
        assert_eq!(left.skeleton().len(), right.skeleton().len());
        for id in left.skeleton().ids() {
            assert_eq!(left.skeleton().get(id).position, right.skeleton().get(id).position);
        }
    }

    #[test]
    fn built_skeleton_is_rigid() {
        let genome = Genome::roll(&mut StdRng::seed_from_u64(17));
        let creature = genome.build(Vec2::new(100.0, 100.0));
        assert!(creature.skeleton().rigidity_error() < 1e-3);
    }
}
