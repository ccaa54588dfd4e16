use crate::math::{heading, polar, Vec2};
use crate::render::{Canvas, Rgba};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

pub const MIN_SEGMENTS: usize = 15;
pub const MAX_SEGMENTS: usize = 35;

const HEAD_EASE: f32 = 10.0;
const BODY_EASE: f32 = 4.0;
const WANDER_MARGIN: f32 = 20.0;
const ELLIPSE_SIDES: usize = 16;

const HEAD_COLORS: [Rgba; 6] = [
    Rgba::new(1.0, 1.0, 1.0, 1.0),
    Rgba::new(1.0, 0.8, 0.8, 1.0),
    Rgba::new(0.8, 1.0, 0.8, 1.0),
    Rgba::new(0.8, 0.8, 1.0, 1.0),
    Rgba::new(1.0, 1.0, 0.8, 1.0),
    Rgba::new(1.0, 0.8, 1.0, 1.0),
];

const GRADIENTS: [(Rgba, Rgba); 3] = [
    (Rgba::new(0.8, 0.8, 0.8, 1.0), Rgba::new(0.0, 0.0, 0.0, 1.0)),
    (Rgba::new(0.87, 0.87, 0.87, 1.0), Rgba::new(0.2, 0.2, 0.2, 1.0)),
    (Rgba::new(0.73, 0.73, 0.73, 1.0), Rgba::new(0.13, 0.13, 0.13, 1.0)),
];

/// Rolled appearance and motion parameters of one dragon.
#[derive(Debug, Clone, PartialEq)]
pub struct DragonLook {
    pub segments: usize,
    /// Sorted, distinct segment indices drawn as fins.
    pub fins: Vec<usize>,
    pub head_color: Rgba,
    pub fin_gradient: (Rgba, Rgba),
    pub spine_gradient: (Rgba, Rgba),
    pub scale: f32,
    pub spacing: f32,
    pub wander_speed: f32,
}

impl DragonLook {
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let segments = rng.random_range(MIN_SEGMENTS..=MAX_SEGMENTS);
        let fin_count = rng.random_range(2..=4);
        let mut fins = Vec::with_capacity(fin_count);
        while fins.len() < fin_count {
            let index = rng.random_range(2..segments - 2);
            if !fins.contains(&index) {
                fins.push(index);
            }
        }
        fins.sort_unstable();

        let head_color = HEAD_COLORS[rng.random_range(0..HEAD_COLORS.len())];
        let fin_gradient = GRADIENTS[rng.random_range(0..GRADIENTS.len())];
        let spine_gradient = GRADIENTS[rng.random_range(0..GRADIENTS.len())];

        Self {
            segments,
            fins,
            head_color,
            fin_gradient,
            spine_gradient,
            scale: rng.random_range(0.15..0.45),
            spacing: rng.random_range(4.0..6.0),
            wander_speed: rng.random_range(0.002..0.004),
        }
    }
}

/// A soft, loosely linked chain that drifts around the pointer.
#[derive(Debug, Clone)]
pub struct Dragon {
    look: DragonLook,
    points: Vec<Vec2>,
    /// Last known heading of each link, kept while points coincide.
    angles: Vec<f32>,
    wander_radius: f32,
    wander_phase: f32,
    last_pointer: Option<Vec2>,
}

impl Dragon {
    pub fn new(center: Vec2, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let wander_phase = rng.random::<f32>();
        let look = DragonLook::roll(&mut rng);
        Self {
            points: vec![center; look.segments],
            angles: vec![0.0; look.segments],
            look,
            wander_radius: 0.0,
            wander_phase,
            last_pointer: None,
        }
    }

    pub fn look(&self) -> &DragonLook {
        &self.look
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn wander_radius(&self) -> f32 {
        self.wander_radius
    }

    pub fn update(&mut self, pointer: Vec2, viewport: Vec2) {
        let moved = self
            .last_pointer
            .is_some_and(|last| last.distance(pointer) > 1.0);
        self.last_pointer = Some(pointer);
        if moved {
            self.wander_radius = 0.0;
        }

        let (w, h) = (viewport.x.max(1.0), viewport.y.max(1.0));
        let r = self.wander_radius;
        let wander = Vec2::new(
            (3.0 * self.wander_phase).cos() * r * w / h,
            (4.0 * self.wander_phase).sin() * r * h / w,
        );
        let head = self.points[0];
        self.points[0] = head + (wander + pointer - head) / HEAD_EASE;

        for i in 1..self.points.len() {
            let prev = self.points[i - 1];
            if let Some(a) = heading(prev, self.points[i]) {
                self.angles[i] = a;
            }
            let rest = (100.0 - i as f32) / self.look.spacing;
            let current = self.points[i];
            self.points[i] += (prev - current + polar(self.angles[i], rest)) / BODY_EASE;
        }

        if !moved && self.wander_radius < pointer.x.min(pointer.y) - WANDER_MARGIN {
            self.wander_radius += 1.0;
        }
        self.wander_phase += self.look.wander_speed;
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let n = self.points.len();
        if n < 2 {
            return;
        }
        let span = (n - 2).max(1) as f32;
        for i in 1..n {
            let prev = self.points[i - 1];
            let current = self.points[i];
            let a = heading(prev, current).unwrap_or(self.angles[i]);
            let center = (prev + current) * 0.5;
            let s = (162.0 + 4.0 * (1.0 - i as f32)) / 50.0 * self.look.scale;
            let t = (i - 1) as f32 / span;

            let (color, radius) = if i == 1 {
                (self.look.head_color, 20.0 * s)
            } else if self.look.fins.contains(&i) {
                let (from, to) = self.look.fin_gradient;
                (from.lerp(to, t), 15.0 * s)
            } else {
                let (from, to) = self.look.spine_gradient;
                (from.lerp(to, t), 8.0 * s)
            };
            canvas.convex_polygon(&ellipse(center, radius, radius * 0.5, a), color);
        }
    }
}

fn ellipse(center: Vec2, rx: f32, ry: f32, rotation: f32) -> Vec<Vec2> {
    let axis = Vec2::from_angle(rotation);
    (0..ELLIPSE_SIDES)
        .map(|k| {
            let t = k as f32 * TAU / ELLIPSE_SIDES as f32;
            center + axis.rotate(Vec2::new(rx * t.cos(), ry * t.sin()))
        })
        .collect()
}
