use super::canvas::{Canvas, Rgba};
use crate::math::Vec2;
use egui::{Color32, Painter, Pos2, Stroke};

impl From<Rgba> for Color32 {
    fn from(color: Rgba) -> Self {
        let [r, g, b, a] = color.to_rgba8();
        Color32::from_rgba_unmultiplied(r, g, b, a)
    }
}

fn pos(v: Vec2) -> Pos2 {
    Pos2::new(v.x, v.y)
}

/// Draws onto an egui layer, in points.
pub struct PainterCanvas<'a> {
    painter: &'a Painter,
}

impl<'a> PainterCanvas<'a> {
    pub fn new(painter: &'a Painter) -> Self {
        Self { painter }
    }
}

impl Canvas for PainterCanvas<'_> {
    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        self.painter
            .line_segment([pos(from), pos(to)], Stroke::new(width, Color32::from(color)));
    }

    fn convex_polygon(&mut self, points: &[Vec2], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        let points = points.iter().copied().map(pos).collect();
        self.painter
            .add(egui::Shape::convex_polygon(points, Color32::from(color), Stroke::NONE));
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.painter
            .circle_filled(pos(center), radius, Color32::from(color));
    }
}
