//! Sphere and orbit projection helpers shared by every planet effect.
//!
//! Conventions: unit-sphere points use screen axes (x right, y down) with
//! z pointing at the viewer, so `z > 0` is the visible hemisphere and a
//! point projects to `center + (x, y) * radius`.

use std::f32::consts::{FRAC_PI_4, PI, TAU};
use glam::{Quat, Vec2, Vec3};
use starhop_engine::Rng;

/// Uniform random point on the unit sphere.
pub fn random_unit_vector(rng: &mut Rng) -> Vec3 {
    let theta = TAU * rng.next_f32();
    let phi = (2.0 * rng.next_f32() - 1.0).clamp(-1.0, 1.0).acos();
    Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
}

/// `n` evenly spread points on the unit sphere (golden-angle spiral).
pub fn fibonacci_sphere(n: usize) -> Vec<Vec3> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![Vec3::Z];
    }
    let golden = PI * (3.0 - 5f32.sqrt());
    (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * i as f32 / (n - 1) as f32;
            let r = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden * i as f32;
            Vec3::new(theta.cos() * r, y, theta.sin() * r)
        })
        .collect()
}

/// Rotation by `angle` radians about `axis`. A zero axis yields identity.
pub fn axis_rotation(axis: Vec3, angle: f32) -> Quat {
    match axis.try_normalize() {
        Some(axis) => Quat::from_axis_angle(axis, angle),
        None => Quat::IDENTITY,
    }
}

/// Rotate `point` about `axis` by `angle` radians.
pub fn rotate_about(point: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    axis_rotation(axis, angle) * point
}

/// Orthonormal `(right, forward)` spanning the tangent plane at `normal`.
pub fn tangent_basis(normal: Vec3) -> (Vec3, Vec3) {
    let n = normal.normalize_or(Vec3::Z);
    let up = if n.dot(Vec3::Y).abs() > 0.99 { Vec3::X } else { Vec3::Y };
    let right = up.cross(n).normalize();
    let forward = n.cross(right);
    (right, forward)
}

/// Screen-space placement of a point on a tilted circular orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPoint {
    /// Offset from the orbit centre in px.
    pub pos: Vec2,
    /// Depth along the view axis, in px (positive towards the viewer).
    pub z: f32,
    pub is_front: bool,
    /// `z` remapped from `[-radius, radius]` to `[0, 1]`.
    pub normalized_z: f32,
}

/// Place a body at `angle` on a circle of `radius` lying in the XZ plane,
/// tilted by `tilt` about X and then turned by `rotation` about Y.
pub fn orbit_position(angle: f32, radius: f32, tilt: f32, rotation: f32) -> OrbitPoint {
    let circle = Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());
    let p = Quat::from_rotation_y(rotation) * (Quat::from_rotation_x(tilt) * circle);
    let normalized_z = if radius > 0.0 {
        ((p.z / radius + 1.0) * 0.5).clamp(0.0, 1.0)
    } else {
        0.5
    };
    OrbitPoint {
        pos: Vec2::new(p.x, p.y),
        z: p.z,
        is_front: p.z > 0.0,
        normalized_z,
    }
}

/// Fade factor for a surface point whose normal has view-axis component `z`.
/// 0 at or below `fade_end`, 1 at or above `fade_start`, a squared
/// smoothstep in between.
pub fn horizon_fade(z: f32, fade_start: f32, fade_end: f32) -> f32 {
    if z <= fade_end {
        return 0.0;
    }
    if z >= fade_start {
        return 1.0;
    }
    let t = (z - fade_end) / (fade_start - fade_end);
    let s = t * t * (3.0 - 2.0 * t);
    s * s
}

/// Light direction for a discrete phase 0..7 (wraps). Azimuth steps by
/// 45°, elevation is fixed at 45°. Phase 0 lights from behind the planet,
/// phase 4 from the viewer.
pub fn light_vector(phase: u8) -> Vec3 {
    let azimuth = (phase % 8) as f32 * FRAC_PI_4;
    let elevation = FRAC_PI_4;
    Vec3::new(
        elevation.cos() * azimuth.sin(),
        -elevation.sin(),
        -elevation.cos() * azimuth.cos(),
    )
}

/// Diffuse factor in `[0.2, 1.0]` from a two-segment ramp over `n·l`.
pub fn light_factor(normal: Vec3, light: Vec3) -> f32 {
    let d = normal.dot(light).clamp(-1.0, 1.0);
    if d <= -0.2 {
        0.2
    } else if d < 0.2 {
        0.4 + d
    } else {
        0.6 + (d - 0.2) * 0.5
    }
}

/// Project a sphere point onto the screen around `center`.
#[inline]
pub fn project(center: Vec2, radius: f32, p: Vec3) -> Vec2 {
    center + Vec2::new(p.x, p.y) * radius
}
