use crate::behavior::{BehaviorController, Plan};
use crate::creature::{Creature, Genome};
use crate::ik::Segment;
use crate::math::{heading, polar, Vec2};
use crate::render::{Canvas, Rgba};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f32::consts::{FRAC_PI_4, SQRT_2};

pub const BONE: Rgba = Rgba::hex(0xe8e8d8);
pub const BONE_WIDTH: f32 = 0.5;
/// Segments shorter than this are drawn as bare lines.
pub const MIN_GLYPH_SIZE: f32 = 1.0;
const ARC_STEPS: usize = 6;

/// A procedurally rolled lizard skeleton that hunts the pointer.
#[derive(Debug, Clone)]
pub struct Skeletile {
    genome: Genome,
    creature: Creature,
    behavior: BehaviorController,
    rng: StdRng,
    last_plan: Option<Plan>,
}

impl Skeletile {
    pub fn new(center: Vec2, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let genome = Genome::roll(&mut rng);
        let creature = genome.build(center);
        if let Err(err) = creature.skeleton().validate() {
            log::error!("generated skeleton is malformed: {err}");
        }
        log::debug!(
            "skeletile: {} girdles, tail {}, {} segments",
            genome.girdles,
            genome.tail_length,
            creature.skeleton().len()
        );
        let behavior = BehaviorController::new(genome.personality(), center);
        Self {
            genome,
            creature,
            behavior,
            rng,
            last_plan: None,
        }
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn creature(&self) -> &Creature {
        &self.creature
    }

    pub fn behavior(&self) -> &BehaviorController {
        &self.behavior
    }

    pub fn last_plan(&self) -> Option<&Plan> {
        self.last_plan.as_ref()
    }

    /// `dt` is in seconds.
    pub fn update(&mut self, pointer: Vec2, dt: f32) {
        let plan = self
            .behavior
            .step(self.creature.position(), pointer, dt * 1000.0);
        self.creature.follow(&plan.drive(), &mut self.rng);
        self.last_plan = Some(plan);
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let skeleton = self.creature.skeleton();
        for id in skeleton.ids() {
            let segment = skeleton.get(id);
            let Some(parent) = segment.parent() else {
                continue;
            };
            let parent = skeleton.get(parent);
            canvas.line(parent.position, segment.position, BONE, BONE_WIDTH);
            if segment.size >= MIN_GLYPH_SIZE {
                draw_joint(canvas, parent, segment);
            }
        }
    }
}

/// Three-quarter arc around the joint closed off by a small arrowhead that
/// points along the bone.
fn draw_joint<C: Canvas + ?Sized>(canvas: &mut C, parent: &Segment, segment: &Segment) {
    let a = heading(parent.position, segment.position).unwrap_or(segment.abs_angle);
    let r = (segment.size * 0.15).min(0.5);
    let p = segment.position;
    let start = a + FRAC_PI_4;
    let sweep = 6.0 * FRAC_PI_4;

    let arc: Vec<Vec2> = (0..=ARC_STEPS)
        .map(|i| p + polar(start + sweep * i as f32 / ARC_STEPS as f32, r))
        .collect();
    canvas.polyline(&arc, BONE, BONE_WIDTH, false);

    let first = p + polar(start, r);
    let last = p + polar(start + sweep, r);
    let tip = p + polar(a, r * SQRT_2);
    canvas.polyline(&[last, tip, first], BONE, BONE_WIDTH, true);
}
