//! # followers
//!
//! Procedurally animated screen-space creatures that chase the pointer.
//!
//! ## Features
//! - Arena segment trees with spring-limited joints and rigid links
//! - Iterated two-pass limb solving with a self-organising stepping gait
//! - A stalk, pounce and coil behavior that steers each legged creature
//! - Three variants: a chain fish, a soft dragon and a rolled lizard skeleton
//! - Drawing through a small [`render::Canvas`] trait (egui backend included)
//!
//! ## Example
//! ```rust
//! use followers::{DrawList, FollowerRegistry, Vec2};
//!
//! let mut registry = FollowerRegistry::with_seed(Vec2::new(800.0, 600.0), 7);
//! registry.set_enabled(true, Some("Skeletile"));
//!
//! for _ in 0..60 {
//!     registry.update(Vec2::new(500.0, 250.0), 0.016);
//! }
//!
//! let mut canvas = DrawList::new();
//! registry.draw(&mut canvas);
//! assert!(!canvas.is_empty());
//! ```

pub mod behavior;
pub mod clock;
pub mod config;
pub mod creature;
pub mod follower;
pub mod ik;
pub mod logging;
pub mod math;
pub mod registry;
pub mod render;

pub use behavior::{BehaviorController, Gains, Personality, Plan, PounceState};
pub use clock::{clamp_delta, FrameClock};
pub use config::{ConfigError, FollowerSettings};
pub use creature::{Creature, Drive, Genome, Momentum, MotionParams};
pub use follower::{Follower, FollowerKind, FrameInput};
pub use ik::{
    Appendage, Chain, ChainBuilder, GaitPhase, JointConstraint, Leg, Limb, SegmentId, Skeleton,
    StructureError,
};
pub use math::Vec2;
pub use registry::FollowerRegistry;
pub use render::{Canvas, DrawList, Rgba};
