//! Owns the single live follower and the host-facing controls for it.

use crate::clock::clamp_delta;
use crate::config::FollowerSettings;
use crate::follower::{Follower, FollowerKind, FrameInput};
use crate::math::Vec2;
use crate::render::Canvas;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct FollowerRegistry {
    enabled: bool,
    selected: Option<String>,
    active: Option<Follower>,
    viewport: Vec2,
    seeds: StdRng,
}

impl FollowerRegistry {
    pub fn new(viewport: Vec2) -> Self {
        Self::from_rng(viewport, StdRng::from_os_rng())
    }

    /// Deterministic registry: every spawn draws its seed from `seed`.
    pub fn with_seed(viewport: Vec2, seed: u64) -> Self {
        Self::from_rng(viewport, StdRng::seed_from_u64(seed))
    }

    fn from_rng(viewport: Vec2, seeds: StdRng) -> Self {
        Self {
            enabled: false,
            selected: None,
            active: None,
            viewport,
            seeds,
        }
    }

    pub fn list_variant_names(&self) -> Vec<&'static str> {
        FollowerKind::ALL.iter().map(|kind| kind.name()).collect()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn active(&self) -> Option<&Follower> {
        self.active.as_ref()
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Used for the next spawn; a live follower keeps its layout.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    fn spawn(&mut self, kind: FollowerKind) {
        let seed = self.seeds.random::<u64>();
        self.active = Some(Follower::spawn(kind, self.viewport, seed));
    }

    fn discard(&mut self) {
        if let Some(old) = self.active.take() {
            log::debug!("discarded {}", old.name());
        }
    }

    /// Switches to the named variant, discarding the current one first.
    /// An unknown name leaves nothing active. While disabled only the
    /// selection is remembered.
    pub fn select_variant(&mut self, name: Option<&str>) {
        self.discard();
        self.selected = name.map(str::to_owned);

        let Some(name) = name else {
            return;
        };
        match FollowerKind::from_name(name) {
            Some(kind) if self.enabled => self.spawn(kind),
            Some(_) => {}
            None => log::warn!("unknown follower {name:?}, none active"),
        }
    }

    /// Enabling spawns `preferred`, else the remembered selection, else the
    /// first variant. Unknown names leave nothing active.
    pub fn set_enabled(&mut self, enabled: bool, preferred: Option<&str>) {
        self.enabled = enabled;
        if !enabled {
            self.discard();
            return;
        }

        let wanted = preferred
            .map(str::to_owned)
            .or_else(|| self.selected.clone())
            .unwrap_or_else(|| FollowerKind::ALL[0].name().to_owned());
        self.select_variant(Some(&wanted));
    }

    /// Rebuilds the active follower with a fresh seed. A no-op for fixed
    /// variants or when nothing is active.
    pub fn regenerate_active(&mut self) {
        let Some(kind) = self.active.as_ref().map(Follower::kind) else {
            return;
        };
        if !kind.can_regenerate() {
            return;
        }
        self.discard();
        self.spawn(kind);
        log::debug!("regenerated {}", kind.name());
    }

    pub fn can_regenerate_active(&self) -> bool {
        self.active.as_ref().is_some_and(Follower::can_regenerate)
    }

    /// `dt` is the raw frame delta in seconds; it is clamped here.
    pub fn update(&mut self, pointer: Vec2, dt: f32) {
        if !self.enabled {
            return;
        }
        let input = FrameInput {
            pointer,
            dt: clamp_delta(dt),
            viewport: self.viewport,
        };
        if let Some(follower) = self.active.as_mut() {
            follower.update(&input);
        }
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        if !self.enabled {
            return;
        }
        if let Some(follower) = &self.active {
            follower.draw(canvas);
        }
    }

    pub fn settings(&self) -> FollowerSettings {
        FollowerSettings {
            enabled: self.enabled,
            selected_follower: self.selected.clone(),
        }
    }

    pub fn apply_settings(&mut self, settings: &FollowerSettings) {
        self.selected = settings.selected_follower.clone();
        self.set_enabled(settings.enabled, settings.selected_follower.as_deref());
    }
}
