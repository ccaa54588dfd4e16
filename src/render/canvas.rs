use crate::math::Vec2;

/// Straight RGBA colour, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// Immediate-mode drawing surface the followers paint onto.
pub trait Canvas {
    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32);

    fn convex_polygon(&mut self, points: &[Vec2], color: Rgba);

    fn circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    fn polyline(&mut self, points: &[Vec2], color: Rgba, width: f32, closed: bool) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], color, width);
        }
        if closed && points.len() > 2 {
            self.line(points[points.len() - 1], points[0], color, width);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgba,
        width: f32,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Rgba,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
}

/// Canvas that records every call, for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    pub fn polygon_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polygon { .. }))
            .count()
    }

    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    /// Whether every recorded coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.commands.iter().all(|c| match c {
            DrawCommand::Line { from, to, width, .. } => {
                from.is_finite() && to.is_finite() && width.is_finite()
            }
            DrawCommand::Polygon { points, .. } => points.iter().all(|p| p.is_finite()),
            DrawCommand::Circle { center, radius, .. } => center.is_finite() && radius.is_finite(),
        })
    }
}

impl Canvas for DrawList {
    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn convex_polygon(&mut self, points: &[Vec2], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }
}
