//! Inverse Kinematics module
//!
//! Segment trees with spring-limited joints, the fixed-link chain used by
//! the simple followers, and the limb solvers that drive legs.

pub mod chain;
pub mod constraint;
pub mod limb;
pub mod segment;

pub use chain::{Chain, ChainBuilder, ChainNode};
pub use constraint::JointConstraint;
pub use limb::{Appendage, GaitPhase, Leg, Limb};
pub use segment::{Segment, SegmentId, Skeleton, StructureError};
