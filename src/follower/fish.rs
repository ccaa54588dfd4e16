use crate::ik::Chain;
use crate::math::{heading, polar, Vec2};
use crate::render::{Canvas, Rgba};
use std::f32::consts::FRAC_PI_2;

pub const BODY_RADII: [f32; 7] = [11.0, 6.0, 19.0, 16.0, 12.0, 6.0, 3.0];
pub const LINK_LENGTH: f32 = 25.0;
pub const SMOOTHING: f32 = 0.15;

const BODY: Rgba = Rgba::hex(0x5f656e);
const ACCENT: Rgba = Rgba::new(1.0, 1.0, 1.0, 0.82);
const OUTLINE_WIDTH: f32 = 1.5;
/// Fins as (node index, size).
const FINS: [(usize, f32); 2] = [(2, 9.0), (4, 5.0)];
const FIN_SCALE: f32 = 3.5;
const EYE_SPACING: f32 = 10.0;
const EYE_RADIUS: f32 = 7.5;
const PUPIL_RADIUS: f32 = 2.5;
const TAIL_LENGTH: f32 = 18.0;
const TAIL_SPREAD: f32 = 0.45;
/// Samples per quadratic piece of the smoothed outline.
const OUTLINE_STEPS: usize = 4;

/// A fish-shaped chain that glides after the pointer.
#[derive(Debug, Clone)]
pub struct Fish {
    chain: Chain,
    curvature: f32,
}

impl Fish {
    pub fn new(head: Vec2) -> Self {
        let mut builder = Chain::builder()
            .origin(head)
            .link_length(LINK_LENGTH)
            .smoothing(SMOOTHING);
        for radius in BODY_RADII {
            builder = builder.add_node(radius);
        }
        Self {
            chain: builder.build(),
            curvature: 0.0,
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn curvature(&self) -> f32 {
        self.curvature
    }

    pub fn update(&mut self, pointer: Vec2) {
        self.chain.follow(pointer);
        self.curvature = self.chain.curvature();
    }

    /// Heading of node `i`, looking from it toward the head.
    fn facing(&self, i: usize) -> f32 {
        let nodes = self.chain.nodes();
        let forward = if i == 0 {
            nodes.get(1).and_then(|next| heading(next.position, nodes[0].position))
        } else {
            heading(nodes[i].position, nodes[i - 1].position)
        };
        forward.unwrap_or(0.0)
    }

    /// Left and right body edges at every node, head first.
    fn edges(&self) -> (Vec<Vec2>, Vec<Vec2>) {
        self.chain
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let a = self.facing(i);
                (
                    node.position + polar(a + FRAC_PI_2, node.size),
                    node.position + polar(a - FRAC_PI_2, node.size),
                )
            })
            .unzip()
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let nodes = self.chain.nodes();
        if nodes.len() < 2 {
            return;
        }
        self.draw_fins(canvas);
        self.draw_tail(canvas);
        self.draw_body(canvas);
        self.draw_eyes(canvas);
    }

    fn draw_body<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let head = self.chain.nodes()[0];
        let nose = head.position + polar(self.facing(0), head.size);
        let (left, right) = self.edges();

        canvas.convex_polygon(&[left[0], nose, right[0]], BODY);
        for i in 0..left.len() - 1 {
            canvas.convex_polygon(&[left[i], left[i + 1], right[i + 1], right[i]], BODY);
        }

        let mut ring = Vec::with_capacity(left.len() * 2 + 1);
        ring.push(nose);
        ring.extend(right.iter().copied());
        ring.extend(left.iter().rev().copied());
        canvas.polyline(&smooth_closed(&ring), ACCENT, OUTLINE_WIDTH, true);
    }

    fn draw_tail<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let nodes = self.chain.nodes();
        let last = nodes.len() - 1;
        let base = nodes[last].position;
        let back = self.facing(last) + std::f32::consts::PI + self.curvature * 0.5;
        canvas.convex_polygon(
            &[
                base,
                base + polar(back + TAIL_SPREAD, TAIL_LENGTH),
                base + polar(back - TAIL_SPREAD, TAIL_LENGTH),
            ],
            ACCENT,
        );
    }

    fn draw_fins<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let nodes = self.chain.nodes();
        for (index, size) in FINS {
            if index < 2 || index >= nodes.len() {
                continue;
            }
            let root = nodes[index].position;
            let front = nodes[index - 2].position;
            let Some(a) = heading(front, root) else {
                continue;
            };
            let span = size * FIN_SCALE;
            canvas.convex_polygon(
                &[
                    root,
                    root + polar(a + FRAC_PI_2, span),
                    front,
                    root + polar(a - FRAC_PI_2, span),
                ],
                ACCENT,
            );
        }
    }

    fn draw_eyes<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let head = self.chain.nodes()[0].position;
        let a = self.facing(0);
        for side in [FRAC_PI_2, -FRAC_PI_2] {
            let eye = head + polar(a + side, EYE_SPACING);
            canvas.circle(eye, EYE_RADIUS, ACCENT);
            canvas.circle(eye, PUPIL_RADIUS, Rgba::BLACK);
        }
    }
}

/// Rounds the corners of a closed outline with quadratic Bézier pieces
/// running between edge midpoints, each controlled by the corner it skips.
fn smooth_closed(points: &[Vec2]) -> Vec<Vec2> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(n * OUTLINE_STEPS);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let corner = points[i];
        let next = points[(i + 1) % n];
        let start = (prev + corner) * 0.5;
        let end = (corner + next) * 0.5;
        for step in 0..OUTLINE_STEPS {
            let t = step as f32 / OUTLINE_STEPS as f32;
            let u = 1.0 - t;
            out.push(start * (u * u) + corner * (2.0 * u * t) + end * (t * t));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;
    use approx::assert_abs_diff_eq;

    #[test]
    fn starts_straight_along_negative_x() {
        let fish = Fish::new(Vec2::new(400.0, 300.0));
        let nodes = fish.chain().nodes();
        assert_eq!(nodes.len(), BODY_RADII.len());
        assert_abs_diff_eq!(nodes[6].position.x, 400.0 - 6.0 * LINK_LENGTH);
        assert_eq!(fish.curvature(), 0.0);
    }

    #[test]
    fn draws_body_fins_tail_and_eyes() {
        let mut fish = Fish::new(Vec2::new(400.0, 300.0));
        fish.update(Vec2::new(450.0, 320.0));
        let mut canvas = DrawList::new();
        fish.draw(&mut canvas);
        // Nose cap, six body quads, two fins and the tail.
        assert_eq!(canvas.polygon_count(), 1 + 6 + 2 + 1);
        assert_eq!(canvas.circle_count(), 4);
        assert!(canvas.line_count() > 15 * OUTLINE_STEPS - 1);
    }

    #[test]
    fn smoothing_passes_through_edge_midpoints() {
        let square = [Vec2::ZERO, Vec2::new(2.0, 0.0), Vec2::new(2.0, 2.0), Vec2::new(0.0, 2.0)];
        let smooth = smooth_closed(&square);
        assert_eq!(smooth.len(), 4 * OUTLINE_STEPS);
        assert_abs_diff_eq!(smooth[0].x, 0.0);
        assert_abs_diff_eq!(smooth[0].y, 1.0);
    }
}
