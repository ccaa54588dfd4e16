//! The follower variants and the single interface the registry drives them
//! through.

mod dragon;
mod fish;
mod skeletile;

pub use dragon::{Dragon, DragonLook};
pub use fish::Fish;
pub use skeletile::Skeletile;

use crate::math::Vec2;
use crate::render::Canvas;

/// Per-frame input from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    pub pointer: Vec2,
    /// Seconds since the previous frame, already clamped.
    pub dt: f32,
    pub viewport: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowerKind {
    Fish,
    Dragon,
    Skeletile,
}

impl FollowerKind {
    /// Registration order; the first entry is the default selection.
    pub const ALL: [FollowerKind; 3] = [
        FollowerKind::Fish,
        FollowerKind::Dragon,
        FollowerKind::Skeletile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FollowerKind::Fish => "2D Fish",
            FollowerKind::Dragon => "Dragon",
            FollowerKind::Skeletile => "Skeletile",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Procedural variants can be rebuilt with a fresh roll.
    pub fn can_regenerate(self) -> bool {
        !matches!(self, FollowerKind::Fish)
    }
}

/// A live follower. Spawning builds it from scratch; dropping it discards
/// its whole body.
#[derive(Debug, Clone)]
pub enum Follower {
    Fish(Fish),
    Dragon(Dragon),
    Skeletile(Skeletile),
}

impl Follower {
    /// Builds a follower centred in `viewport`. `seed` drives every random
    /// choice the variant makes.
    pub fn spawn(kind: FollowerKind, viewport: Vec2, seed: u64) -> Self {
        let center = viewport / 2.0;
        let follower = match kind {
            FollowerKind::Fish => Follower::Fish(Fish::new(center)),
            FollowerKind::Dragon => Follower::Dragon(Dragon::new(center, seed)),
            FollowerKind::Skeletile => Follower::Skeletile(Skeletile::new(center, seed)),
        };
        log::debug!("spawned {} (seed {seed})", kind.name());
        follower
    }

    pub fn kind(&self) -> FollowerKind {
        match self {
            Follower::Fish(_) => FollowerKind::Fish,
            Follower::Dragon(_) => FollowerKind::Dragon,
            Follower::Skeletile(_) => FollowerKind::Skeletile,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn can_regenerate(&self) -> bool {
        self.kind().can_regenerate()
    }

    pub fn update(&mut self, input: &FrameInput) {
        match self {
            Follower::Fish(fish) => fish.update(input.pointer),
            Follower::Dragon(dragon) => dragon.update(input.pointer, input.viewport),
            Follower::Skeletile(skeletile) => skeletile.update(input.pointer, input.dt),
        }
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        match self {
            Follower::Fish(fish) => fish.draw(canvas),
            Follower::Dragon(dragon) => dragon.draw(canvas),
            Follower::Skeletile(skeletile) => skeletile.draw(canvas),
        }
    }
}
