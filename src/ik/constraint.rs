use crate::math::wrap_around;

/// Angular limits of a joint, relative to its parent's absolute angle.
///
/// `range` is the full width of the allowed arc around `default_angle`;
/// `stiffness` divides the deviation from rest before the arc is enforced,
/// so higher values pull harder toward the rest pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointConstraint {
    pub default_angle: f32,
    pub range: f32,
    pub stiffness: f32,
}

impl JointConstraint {
    pub fn new(default_angle: f32, range: f32, stiffness: f32) -> Self {
        Self {
            default_angle,
            range: range.max(0.0),
            stiffness: stiffness.max(1.0),
        }
    }

    /// A joint that never springs back and spans the whole circle.
    pub fn free(default_angle: f32) -> Self {
        Self::new(default_angle, std::f32::consts::TAU, 1.0)
    }

    pub fn min_angle(&self) -> f32 {
        self.default_angle - self.range / 2.0
    }

    pub fn max_angle(&self) -> f32 {
        self.default_angle + self.range / 2.0
    }

    /// Brings `angle` onto the 2π window centred on the rest angle.
    pub fn wrap(&self, angle: f32) -> f32 {
        wrap_around(angle, self.default_angle)
    }

    /// Wraps, relaxes toward rest by `1/stiffness`, then clamps to the arc.
    pub fn apply(&self, angle: f32) -> f32 {
        let relaxed = (self.wrap(angle) - self.default_angle) / self.stiffness + self.default_angle;
        relaxed.clamp(self.min_angle(), self.max_angle())
    }
}
