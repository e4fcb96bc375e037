//! Lyon-based tessellation of stage shapes.
//!
//! Graphics canvases, circles and particles are turned into one flat
//! triangle-list vertex buffer per frame, already in stage coordinates.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};
use crate::components::color::Color;
use crate::components::graphics::Shape;
use crate::core::node::WorldTransform;

/// Per-vertex data for vector rendering. 6 floats = 24 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct VectorVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorVertex {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

struct FillVertexCtor {
    color: Color,
}

impl FillVertexConstructor<VectorVertex> for FillVertexCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> VectorVertex {
        let p = vertex.position();
        let c = self.color;
        VectorVertex { x: p.x, y: p.y, r: c.r, g: c.g, b: c.b, a: c.a }
    }
}

struct StrokeVertexCtor {
    color: Color,
}

impl StrokeVertexConstructor<VectorVertex> for StrokeVertexCtor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> VectorVertex {
        let p = vertex.position();
        let c = self.color;
        VectorVertex { x: p.x, y: p.y, r: c.r, g: c.g, b: c.b, a: c.a }
    }
}

/// Tessellators plus the frame's output buffer.
pub struct VectorState {
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    geometry: VertexBuffers<VectorVertex, u32>,
    buffer: Vec<f32>,
}

impl VectorState {
    pub fn new() -> Self {
        Self::with_capacity(16384)
    }

    pub fn with_capacity(max_vertices: usize) -> Self {
        Self {
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            geometry: VertexBuffers::new(),
            buffer: Vec::with_capacity(max_vertices * VectorVertex::FLOATS),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.buffer.len() / VectorVertex::FLOATS
    }

    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    pub fn vertices(&self) -> &[f32] {
        &self.buffer
    }

    fn flush_geometry(&mut self) {
        for idx in &self.geometry.indices {
            let v = &self.geometry.vertices[*idx as usize];
            self.buffer.extend_from_slice(&[v.x, v.y, v.r, v.g, v.b, v.a]);
        }
        self.geometry.vertices.clear();
        self.geometry.indices.clear();
    }

    fn polyline_path(points: &[Vec2], closed: bool) -> Path {
        let mut builder = Path::builder();
        builder.begin(point(points[0].x, points[0].y));
        for p in &points[1..] {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(closed);
        builder.build()
    }

    pub fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 || color.a <= 0.0 {
            return;
        }
        let path = Self::polyline_path(points, true);
        self.fill_path(&path, color);
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 || color.a <= 0.0 {
            return;
        }
        let mut builder = Path::builder();
        builder.add_circle(point(center.x, center.y), radius, lyon::path::Winding::Positive);
        let path = builder.build();
        self.fill_path(&path, color);
    }

    pub fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color, closed: bool) {
        if points.len() < 2 || width <= 0.0 || color.a <= 0.0 {
            return;
        }
        let path = Self::polyline_path(points, closed);
        self.stroke_path(&path, width, color);
    }

    fn fill_path(&mut self, path: &Path, color: Color) {
        let result = self.fill_tess.tessellate_path(
            path,
            &FillOptions::tolerance(0.5),
            &mut BuffersBuilder::new(&mut self.geometry, FillVertexCtor { color }),
        );
        if result.is_ok() {
            self.flush_geometry();
        } else {
            self.geometry.vertices.clear();
            self.geometry.indices.clear();
        }
    }

    fn stroke_path(&mut self, path: &Path, width: f32, color: Color) {
        let result = self.stroke_tess.tessellate_path(
            path,
            &StrokeOptions::tolerance(0.5).with_line_width(width),
            &mut BuffersBuilder::new(&mut self.geometry, StrokeVertexCtor { color }),
        );
        if result.is_ok() {
            self.flush_geometry();
        } else {
            self.geometry.vertices.clear();
            self.geometry.indices.clear();
        }
    }

    /// Tessellate a node-local shape into stage space.
    /// `modulate` is the node tint with the accumulated alpha folded in.
    pub fn draw_shape(&mut self, shape: &Shape, transform: &WorldTransform, modulate: Color) {
        let s = transform.scale.x.abs();
        match shape {
            Shape::Stroke { points, width, color, closed } => {
                let world: Vec<Vec2> = points.iter().map(|p| transform.apply(*p)).collect();
                self.stroke_polyline(&world, width * s, color.modulate(modulate), *closed);
            }
            Shape::Fill { points, color } => {
                let world: Vec<Vec2> = points.iter().map(|p| transform.apply(*p)).collect();
                self.fill_polygon(&world, color.modulate(modulate));
            }
            Shape::Circle { center, radius, color } => {
                self.fill_circle(transform.apply(*center), radius * s, color.modulate(modulate));
            }
        }
    }
}

impl Default for VectorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_vertex_is_24_bytes() {
        assert_eq!(std::mem::size_of::<VectorVertex>(), VectorVertex::STRIDE_BYTES);
    }

    #[test]
    fn fill_triangle_is_three_vertices() {
        let mut state = VectorState::new();
        state.fill_polygon(&[Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(50.0, 100.0)], Color::RED);
        assert_eq!(state.vertex_count(), 3);
    }

    #[test]
    fn transparent_and_degenerate_shapes_skip() {
        let mut state = VectorState::new();
        state.fill_circle(Vec2::ZERO, 10.0, Color::TRANSPARENT);
        state.fill_circle(Vec2::ZERO, 0.0, Color::RED);
        state.stroke_polyline(&[Vec2::ZERO], 2.0, Color::RED, false);
        assert_eq!(state.vertex_count(), 0);
    }

    #[test]
    fn shapes_land_in_stage_space() {
        let mut state = VectorState::new();
        let t = WorldTransform { pos: Vec2::new(500.0, 500.0), ..WorldTransform::IDENTITY };
        let shape = Shape::Fill {
            points: vec![Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)],
            color: Color::WHITE,
        };
        state.draw_shape(&shape, &t, Color::WHITE);
        let xs: Vec<f32> = state.vertices().chunks(VectorVertex::FLOATS).map(|v| v[0]).collect();
        assert!(xs.iter().all(|&x| (500.0..=510.0).contains(&x)));
    }

    #[test]
    fn clear_resets() {
        let mut state = VectorState::new();
        state.fill_circle(Vec2::ZERO, 5.0, Color::WHITE);
        assert!(state.vertex_count() > 0);
        state.clear();
        assert_eq!(state.vertex_count(), 0);
    }
}
