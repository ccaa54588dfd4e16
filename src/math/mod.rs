//! Math utilities module
//!
//! Provides convenient re-exports from glam and the 2D angle helpers the
//! kinematics code is built on.

mod angle;

pub use angle::{direction, heading, polar, wrap_around, wrap_to_pi, EPSILON};

// Re-export commonly used glam types
pub use glam::Vec2;
