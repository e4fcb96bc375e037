//! Immediate-style drawing canvas attached to a stage node.
//!
//! A `Graphics` node records shapes in node-local coordinates. Effects
//! typically `clear()` and redraw every frame; static shapes (ring bands) are
//! recorded once. Tessellation into triangles happens when the draw list is
//! built (see `systems::vector`).

use glam::Vec2;
use crate::components::color::Color;

/// One recorded shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Open or closed stroked polyline.
    Stroke { points: Vec<Vec2>, width: f32, color: Color, closed: bool },
    /// Filled polygon (closed automatically).
    Fill { points: Vec<Vec2>, color: Color },
    /// Filled circle.
    Circle { center: Vec2, radius: f32, color: Color },
}

/// Command-recording canvas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graphics {
    shapes: Vec<Shape>,
}

impl Graphics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything recorded so far.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Single stroked segment.
    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        if width <= 0.0 || color.a <= 0.0 {
            return;
        }
        self.shapes.push(Shape::Stroke { points: vec![from, to], width, color, closed: false });
    }

    /// Open polyline. Fewer than two points draws nothing.
    pub fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        if points.len() < 2 || width <= 0.0 || color.a <= 0.0 {
            return;
        }
        self.shapes.push(Shape::Stroke { points: points.to_vec(), width, color, closed: false });
    }

    /// Closed stroked outline. Fewer than three points draws nothing.
    pub fn stroke_polygon(&mut self, points: &[Vec2], width: f32, color: Color) {
        if points.len() < 3 || width <= 0.0 || color.a <= 0.0 {
            return;
        }
        self.shapes.push(Shape::Stroke { points: points.to_vec(), width, color, closed: true });
    }

    /// Filled polygon. Fewer than three points draws nothing.
    pub fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 || color.a <= 0.0 {
            return;
        }
        self.shapes.push(Shape::Fill { points: points.to_vec(), color });
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 || color.a <= 0.0 {
            return;
        }
        self.shapes.push(Shape::Circle { center, radius, color });
    }

    /// Stroke part of an axis-aligned ellipse from `start` to `end` radians.
    /// `segments` controls smoothness for the whole sweep.
    pub fn stroke_arc(
        &mut self,
        center: Vec2,
        radii: Vec2,
        start: f32,
        end: f32,
        segments: usize,
        width: f32,
        color: Color,
    ) {
        let segments = segments.max(2);
        let points: Vec<Vec2> = (0..=segments)
            .map(|i| {
                let a = start + (end - start) * i as f32 / segments as f32;
                center + Vec2::new(radii.x * a.cos(), radii.y * a.sin())
            })
            .collect();
        self.stroke_polyline(&points, width, color);
    }
}
