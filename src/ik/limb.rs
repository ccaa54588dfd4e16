use super::segment::{SegmentId, Skeleton};
use crate::math::{direction, heading, polar, wrap_to_pi, Vec2};
use rand::Rng;
use std::f32::consts::PI;

/// End-effector drift from the foothold that lifts a planted foot.
pub const LIFT_DISTANCE: f32 = 1.0;
/// Squared per-frame change in forwardness below which a swing ends.
pub const STRIDE_SETTLE: f32 = 1.0;

const SOLVE_ITERATIONS: usize = 10;
const SOLVE_TOLERANCE: f32 = 0.01;

/// A chain of segments from just below the hip to the end effector.
///
/// The segments stay owned by the [`Skeleton`]; a limb only holds handles.
#[derive(Debug, Clone)]
pub struct Limb {
    nodes: Vec<SegmentId>,
    hip: SegmentId,
    speed: f32,
}

impl Limb {
    /// Walks up to `length` links from `end` toward the root. The walk stops
    /// early at the root, which then serves as the hip. Returns `None` when
    /// `end` is the root itself.
    pub fn new(skeleton: &Skeleton, end: SegmentId, length: usize, speed: f32) -> Option<Self> {
        skeleton.get(end).parent()?;

        let mut nodes = Vec::with_capacity(length.max(1));
        let mut node = end;
        for _ in 0..length.max(1) {
            nodes.push(node);
            match skeleton.get(node).parent() {
                Some(parent) if !skeleton.get(parent).is_root() => node = parent,
                _ => break,
            }
        }
        nodes.reverse();
        let hip = skeleton.get(nodes[0]).parent()?;

        Some(Self { nodes, hip, speed })
    }

    pub fn nodes(&self) -> &[SegmentId] {
        &self.nodes
    }

    pub fn hip(&self) -> SegmentId {
        self.hip
    }

    pub fn end(&self) -> SegmentId {
        self.nodes[self.nodes.len() - 1]
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Moves the end effector at most `speed` closer to `target`.
    ///
    /// The joints first relax from their springs. The end is then aimed at
    /// the rate-limited step point and the chain is solved with alternating
    /// passes: from the end back toward the hip, placing each node at the
    /// size of the link below it, then from the hip outward, re-anchoring each
    /// link at its own size.
    pub fn move_to(&self, skeleton: &mut Skeleton, target: Vec2) {
        skeleton.update_relative(self.nodes[0], true, true);

        let end = skeleton.get(self.end());
        let remaining = (end.position.distance(target) - self.speed).max(0.0);
        let aim = direction(target, end.position).unwrap_or_else(|| polar(end.abs_angle + PI, 1.0));
        let step = target + aim * remaining;

        let base = skeleton.get(self.hip).position;
        let mut solved: Vec<Vec2> = self.nodes.iter().map(|&id| skeleton.get(id).position).collect();
        for _ in 0..SOLVE_ITERATIONS {
            self.forward_pass(skeleton, &mut solved, step);
            self.backward_pass(skeleton, &mut solved, base);
            if solved[solved.len() - 1].distance(step) <= SOLVE_TOLERANCE {
                break;
            }
        }

        for (&id, &position) in self.nodes.iter().zip(solved.iter()) {
            skeleton.orient_towards(id, position);
            let off_chain: Vec<SegmentId> = skeleton
                .get(id)
                .children()
                .iter()
                .copied()
                .filter(|child| !self.nodes.contains(child))
                .collect();
            for child in off_chain {
                skeleton.update_relative(child, true, false);
            }
        }
    }

    fn forward_pass(&self, skeleton: &Skeleton, solved: &mut [Vec2], step: Vec2) {
        let n = solved.len();
        solved[n - 1] = step;
        for i in (0..n - 1).rev() {
            let below = skeleton.get(self.nodes[i + 1]);
            let dir = direction(solved[i + 1], solved[i])
                .unwrap_or_else(|| polar(below.abs_angle + PI, 1.0));
            solved[i] = solved[i + 1] + dir * below.size;
        }
    }

    fn backward_pass(&self, skeleton: &Skeleton, solved: &mut [Vec2], base: Vec2) {
        let mut prev = base;
        for (slot, &id) in solved.iter_mut().zip(self.nodes.iter()) {
            let segment = skeleton.get(id);
            let dir = direction(prev, *slot).unwrap_or_else(|| polar(segment.abs_angle, 1.0));
            *slot = prev + dir * segment.size;
            prev = *slot;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitPhase {
    Planted,
    Swinging,
}

/// A limb that steps: it holds a foothold until dragged off it, then swings
/// toward a new one until the stride stops advancing.
#[derive(Debug, Clone)]
pub struct Leg {
    limb: Limb,
    goal: Vec2,
    phase: GaitPhase,
    forwardness: f32,
    reach: f32,
    swing: f32,
    swing_offset: f32,
}

impl Leg {
    pub fn new(skeleton: &Skeleton, end: SegmentId, length: usize, speed: f32) -> Option<Self> {
        let limb = Limb::new(skeleton, end, length, speed)?;
        let body_angle = skeleton.root().abs_angle;
        let hip = skeleton.get(limb.hip());
        let foot = skeleton.get(limb.end()).position;

        let reach = 0.9 * hip.position.distance(foot);
        let rel = wrap_to_pi(body_angle - heading(hip.position, foot).unwrap_or(body_angle));
        let side = if rel < 0.0 { 1.0 } else { -1.0 };
        let swing = -rel + side * PI / 2.0;
        let swing_offset = body_angle - hip.abs_angle;

        Some(Self {
            limb,
            goal: foot,
            phase: GaitPhase::Planted,
            forwardness: 0.0,
            reach,
            swing,
            swing_offset,
        })
    }

    pub fn limb(&self) -> &Limb {
        &self.limb
    }

    pub fn goal(&self) -> Vec2 {
        self.goal
    }

    pub fn phase(&self) -> GaitPhase {
        self.phase
    }

    pub fn forwardness(&self) -> f32 {
        self.forwardness
    }

    pub fn reach(&self) -> f32 {
        self.reach
    }

    pub fn is_planted(&self) -> bool {
        self.phase == GaitPhase::Planted
    }

    pub fn update<R: Rng + ?Sized>(&mut self, skeleton: &mut Skeleton, rng: &mut R) {
        self.limb.move_to(skeleton, self.goal);

        let hip = skeleton.get(self.limb.hip());
        let (hip_position, hip_angle) = (hip.position, hip.abs_angle);
        let foot = skeleton.get(self.limb.end()).position;

        match self.phase {
            GaitPhase::Planted => {
                if foot.distance(self.goal) > LIFT_DISTANCE {
                    let jitter = rng.random_range(-1.0f32..=1.0) * self.reach / 2.0;
                    let angle = self.swing + hip_angle + self.swing_offset;
                    self.goal = hip_position + polar(angle, self.reach) + Vec2::splat(jitter);
                    self.phase = GaitPhase::Swinging;
                    log::trace!("leg {:?} lifted toward {:?}", self.limb.end(), self.goal);
                }
            }
            GaitPhase::Swinging => {
                let offset = foot - hip_position;
                let theta = offset.y.atan2(offset.x) - hip_angle;
                let forwardness = offset.length() * theta.cos();
                let delta = self.forwardness - forwardness;
                self.forwardness = forwardness;

                if delta * delta < STRIDE_SETTLE {
                    self.goal = foot;
                    self.phase = GaitPhase::Planted;
                    log::trace!("leg {:?} planted at {:?}", self.limb.end(), self.goal);
                }
            }
        }
    }
}

/// Anything a creature drives each frame after its body has moved.
#[derive(Debug, Clone)]
pub enum Appendage {
    /// Reaches for the creature's current goal every frame.
    Arm(Limb),
    Leg(Leg),
}

impl Appendage {
    pub fn limb(&self) -> &Limb {
        match self {
            Appendage::Arm(limb) => limb,
            Appendage::Leg(leg) => leg.limb(),
        }
    }

    /// Only legs ever count as grounded.
    pub fn is_planted(&self) -> bool {
        matches!(self, Appendage::Leg(leg) if leg.is_planted())
    }

    pub fn update<R: Rng + ?Sized>(&mut self, skeleton: &mut Skeleton, target: Vec2, rng: &mut R) {
        match self {
            Appendage::Arm(limb) => limb.move_to(skeleton, target),
            Appendage::Leg(leg) => leg.update(skeleton, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ik::JointConstraint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rig() -> (Skeleton, SegmentId, SegmentId) {
        let mut skeleton = Skeleton::new(Vec2::new(100.0, 100.0), 0.0);
        let spine = skeleton.add(Skeleton::ROOT, 10.0, JointConstraint::new(0.0, PI / 2.0, 1.5));
        let shoulder = skeleton.add(spine, 6.0, JointConstraint::new(PI / 4.0, 0.0, 8.0));
        let upper = skeleton.add(shoulder, 8.0, JointConstraint::new(-PI / 4.0, 2.0 * PI, 1.0));
        let lower = skeleton.add(upper, 8.0, JointConstraint::new(PI / 2.0, PI, 2.0));
        for k in 0..4 {
            let spread = (k as f32 / 3.0 - 0.5) * PI / 2.0;
            skeleton.add(lower, 2.0, JointConstraint::new(spread, 0.1, 4.0));
        }
        (skeleton, spine, lower)
    }

    #[test]
    fn limb_collects_nodes_below_hip() {
        let (skeleton, spine, lower) = rig();
        let limb = Limb::new(&skeleton, lower, 3, 1.0).expect("limb");
        assert_eq!(limb.nodes().len(), 3);
        assert_eq!(limb.hip(), spine);
        assert_eq!(limb.end(), lower);
    }

    #[test]
    fn limb_stops_at_root() {
        let (skeleton, spine, lower) = rig();
        let limb = Limb::new(&skeleton, lower, 10, 1.0).expect("limb");
        assert_eq!(limb.nodes()[0], spine);
        assert_eq!(limb.hip(), Skeleton::ROOT);
        assert!(Limb::new(&skeleton, Skeleton::ROOT, 3, 1.0).is_none());
    }

    #[test]
    fn move_to_keeps_links_rigid() {
        let (mut skeleton, _, lower) = rig();
        let limb = Limb::new(&skeleton, lower, 3, 0.5).expect("limb");
        let target = skeleton.get(lower).position + Vec2::new(3.0, 4.0);
        limb.move_to(&mut skeleton, target);
        assert!(skeleton.rigidity_error() < 1e-3);
    }

    #[test]
    fn target_within_step_leaves_foot_in_place() {
        let (mut skeleton, _, lower) = rig();
        let limb = Limb::new(&skeleton, lower, 3, 5.0).expect("limb");
        let start = skeleton.get(lower).position;
        limb.move_to(&mut skeleton, start);
        let foot = skeleton.get(lower).position;
        limb.move_to(&mut skeleton, foot);
        assert!(skeleton.get(lower).position.distance(foot) < 0.25);
    }

    #[test]
    fn arm_moves_toward_target() {
        let (mut skeleton, _, lower) = rig();
        let limb = Limb::new(&skeleton, lower, 3, 2.0).expect("limb");
        let target = skeleton.get(lower).position + Vec2::new(2.0, 3.0);
        let before = skeleton.get(lower).position.distance(target);
        let mut arm = Appendage::Arm(limb);
        let mut rng = StdRng::seed_from_u64(1);
        arm.update(&mut skeleton, target, &mut rng);
        assert!(skeleton.get(lower).position.distance(target) < before);
        assert!(!arm.is_planted());
    }

    #[test]
    fn dragged_leg_lifts_within_one_update() {
        let (mut skeleton, _, lower) = rig();
        let mut leg = Leg::new(&skeleton, lower, 3, 0.5).expect("leg");
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(leg.phase(), GaitPhase::Planted);

        skeleton.root_mut().position += Vec2::new(10.0, 0.0);
        skeleton.follow_children(Skeleton::ROOT, true);
        leg.update(&mut skeleton, &mut rng);

        assert_eq!(leg.phase(), GaitPhase::Swinging);
    }

    #[test]
    fn swing_ends_only_when_stride_settles() {
        let (mut skeleton, _, lower) = rig();
        let mut leg = Leg::new(&skeleton, lower, 3, 0.5).expect("leg");
        let mut rng = StdRng::seed_from_u64(11);
        skeleton.root_mut().position += Vec2::new(10.0, 0.0);
        skeleton.follow_children(Skeleton::ROOT, true);
        leg.update(&mut skeleton, &mut rng);
        assert_eq!(leg.phase(), GaitPhase::Swinging);

        let mut planted = false;
        for _ in 0..200 {
            let before = leg.forwardness();
            leg.update(&mut skeleton, &mut rng);
            let delta = before - leg.forwardness();
            match leg.phase() {
                GaitPhase::Swinging => assert!(delta * delta >= STRIDE_SETTLE),
                GaitPhase::Planted => {
                    assert!(delta * delta < STRIDE_SETTLE);
                    planted = true;
                    break;
                }
            }
        }
        assert!(planted, "leg never planted");
        assert!(skeleton.get(lower).position.distance(leg.goal()) < 1e-4);
    }
}
