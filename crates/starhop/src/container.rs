//! A galaxy (container) of planets: layout on elliptical orbit bands and
//! directional neighbour queries for keyboard navigation.

use std::f32::consts::TAU;
use glam::Vec2;
use starhop_engine::{EngineContext, Node, NodeId, Rng};
use crate::config::ContainerConfig;
use crate::planet::{PlanetData, PLANET_RADIUS};
use crate::progression::{OrbitSlot, Progression};

// ── Layout constants ────────────────────────────────────────────────────

/// Clearance between the central planet and the innermost orbit.
pub const GAP: f32 = 40.0;
/// Clearance between the outermost orbit and the viewport edge.
pub const BORDER_PADDING: f32 = 24.0;
/// Vertical squash of the orbit band.
pub const ORBIT_FLATTEN: f32 = 0.75;
/// Minimum band width in px.
pub const MIN_BAND: f32 = 10.0;

/// Inner and outer band radii for a viewport.
pub fn orbit_band(width: f32, height: f32) -> (f32, f32) {
    let inner = 2.0 * PLANET_RADIUS + GAP;
    let outer = (width / 2.0).min(height / 2.0) - (PLANET_RADIUS + BORDER_PADDING);
    (inner, outer.max(inner + MIN_BAND))
}

/// Screen position of an orbit slot around `center` for a band.
pub fn slot_position(center: Vec2, (inner, outer): (f32, f32), slot: OrbitSlot) -> Vec2 {
    let r = inner + (outer - inner) * slot.radius;
    center + Vec2::new(slot.angle.cos() * r, slot.angle.sin() * r * ORBIT_FLATTEN)
}

pub struct Container {
    pub id: String,
    pub name: String,
    pub background: Option<String>,
    pub start_planet: Option<String>,
    config: ContainerConfig,
    planets: Vec<PlanetData>,
    layer: Option<NodeId>,
    size: Vec2,
}

impl Container {
    pub fn new(config: &ContainerConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            background: config.background.clone(),
            start_planet: config.start_planet.clone(),
            config: config.clone(),
            planets: Vec::new(),
            layer: None,
            size: Vec2::ZERO,
        }
    }

    /// Create the layer node and planet data, then lay planets out.
    /// Re-initialising first cleans up the previous run.
    pub fn init(&mut self, ctx: &mut EngineContext, width: f32, height: f32, progression: &mut Progression) {
        self.cleanup(ctx);
        self.layer = Some(ctx.add(Node::container().with_tag(format!("container:{}", self.id))));
        self.planets = self.config.planets.iter().map(PlanetData::from_config).collect();
        for planet in &mut self.planets {
            if progression.is_revealed(&self.id, planet.id()) {
                planet.body.hidden = false;
            }
        }
        self.update_positions(&mut ctx.rng, width, height, progression);
        log::info!("container {}: {} planets", self.id, self.planets.len());
    }

    /// Destroy every planet visual and the layer node.
    pub fn cleanup(&mut self, ctx: &mut EngineContext) {
        for planet in &mut self.planets {
            planet.destroy_visuals(ctx);
        }
        self.planets.clear();
        if let Some(layer) = self.layer.take() {
            ctx.destroy(layer);
        }
    }

    pub fn layer(&self) -> Option<NodeId> {
        self.layer
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn center(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn get_all(&self) -> &[PlanetData] {
        &self.planets
    }

    pub fn get_all_mut(&mut self) -> &mut [PlanetData] {
        &mut self.planets
    }

    pub fn get_by_id(&self, id: &str) -> Option<&PlanetData> {
        self.planets.iter().find(|p| p.id() == id)
    }

    pub fn get_by_id_mut(&mut self, id: &str) -> Option<&mut PlanetData> {
        self.planets.iter_mut().find(|p| p.id() == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.planets.iter().position(|p| p.id() == id)
    }

    /// Place every planet for a viewport. Persisted orbit slots are reused;
    /// unassigned satellites get evenly spaced angles from one random offset
    /// and the chosen slot is persisted.
    pub fn update_positions(&mut self, rng: &mut Rng, width: f32, height: f32, progression: &mut Progression) {
        self.size = Vec2::new(width, height);
        let center = self.center();
        let (inner, outer) = orbit_band(width, height);
        let satellites = self.planets.iter().filter(|p| !p.central).count();
        let offset = rng.range(0.0, TAU);

        let mut index = 0;
        for planet in &mut self.planets {
            // A planet borrowed by the intro overlay is placed by the overlay on restore.
            if planet.central {
                if !planet.body.hijacked {
                    planet.body.pos = center;
                }
                continue;
            }
            let slot = match progression.orbit_slot(&self.id, planet.id()) {
                Some(slot) => slot,
                None => {
                    let slot = OrbitSlot {
                        angle: (offset + index as f32 * TAU / satellites as f32) % TAU,
                        radius: planet.radius_override.unwrap_or_else(|| rng.next_f32()),
                    };
                    progression.set_orbit_slot(&self.id, planet.id(), slot);
                    slot
                }
            };
            index += 1;

            planet.orbit_angle = Some(slot.angle);
            planet.orbit_radius = Some(slot.radius);
            if !planet.body.hijacked {
                planet.body.pos = slot_position(center, (inner, outer), slot);
            }
        }
    }

    /// Where layout puts `planet` for the current size, ignoring any borrow.
    pub fn layout_position(&self, planet: &PlanetData) -> Vec2 {
        if planet.central {
            return self.center();
        }
        match (planet.orbit_angle, planet.orbit_radius) {
            (Some(angle), Some(radius)) => slot_position(
                self.center(),
                orbit_band(self.size.x, self.size.y),
                OrbitSlot { angle, radius },
            ),
            _ => planet.body.pos,
        }
    }

    /// Best planet in direction `(dx, dy)` from `from_id`: strictly ahead
    /// along the axis, scored by `distance * (1 + 2 * perpendicular / distance)`.
    pub fn find_nearest_neighbor(&self, from_id: &str, dx: f32, dy: f32) -> Option<&PlanetData> {
        let from = self.get_by_id(from_id)?.pos();
        let dir = Vec2::new(dx, dy).try_normalize()?;
        self.planets
            .iter()
            .filter(|p| p.id() != from_id)
            .filter_map(|p| {
                let delta = p.pos() - from;
                let along = delta.dot(dir);
                if along <= 0.0 {
                    return None;
                }
                let distance = delta.length();
                let perpendicular = delta.perp_dot(dir).abs();
                Some((p, distance * (1.0 + 2.0 * perpendicular / distance)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanetConfig;

    fn config(n: usize) -> ContainerConfig {
        let mut planets = vec![PlanetConfig { central: true, ..PlanetConfig::new("sun") }];
        planets.extend((1..n).map(|i| PlanetConfig::new(format!("p{}", i))));
        ContainerConfig {
            id: "sol".into(),
            name: "Sol".into(),
            background: None,
            start_planet: Some("sun".into()),
            planets,
        }
    }

    fn slots(container: &Container) -> Vec<(Option<f32>, Option<f32>)> {
        container.get_all().iter().map(|p| (p.orbit_angle, p.orbit_radius)).collect()
    }

    #[test]
    fn central_planet_sits_in_the_middle() {
        let mut ctx = EngineContext::new();
        let mut progression = Progression::new();
        let mut c = Container::new(&config(4));
        c.init(&mut ctx, 800.0, 600.0, &mut progression);
        let sun = c.get_by_id("sun").unwrap();
        assert_eq!(sun.pos(), Vec2::new(400.0, 300.0));
        assert_eq!(sun.orbit_angle, None);
    }

    #[test]
    fn satellites_stay_inside_the_viewport() {
        for (w, h) in [(800.0, 600.0), (1920.0, 1080.0), (400.0, 700.0), (360.0, 640.0)] {
            let mut ctx = EngineContext::new();
            let mut progression = Progression::new();
            let mut c = Container::new(&config(9));
            c.init(&mut ctx, w, h, &mut progression);
            for p in c.get_all() {
                let pos = p.pos();
                assert!(pos.x > 0.0 && pos.x < w, "{} x={} w={}", p.id(), pos.x, w);
                assert!(pos.y > 0.0 && pos.y < h, "{} y={} h={}", p.id(), pos.y, h);
            }
        }
    }

    #[test]
    fn band_is_clamped() {
        let (inner, outer) = orbit_band(100.0, 100.0);
        assert_eq!(inner, 104.0);
        assert_eq!(outer, 114.0);
    }

    #[test]
    fn satellites_are_evenly_spaced() {
        let mut ctx = EngineContext::new();
        let mut progression = Progression::new();
        let mut c = Container::new(&config(5));
        c.init(&mut ctx, 800.0, 600.0, &mut progression);
        let mut angles: Vec<f32> = c.get_all().iter().filter_map(|p| p.orbit_angle).collect();
        angles.sort_by(f32::total_cmp);
        for pair in angles.windows(2) {
            assert!((pair[1] - pair[0] - TAU / 4.0).abs() < 1e-3);
        }
    }

    #[test]
    fn init_twice_keeps_slots() {
        let mut ctx = EngineContext::new();
        let mut progression = Progression::new();
        let mut c = Container::new(&config(6));
        c.init(&mut ctx, 800.0, 600.0, &mut progression);
        let first = slots(&c);
        c.init(&mut ctx, 800.0, 600.0, &mut progression);
        assert_eq!(slots(&c), first);
    }

    #[test]
    fn resize_reuses_slots() {
        let mut ctx = EngineContext::new();
        let mut progression = Progression::new();
        let mut c = Container::new(&config(4));
        c.init(&mut ctx, 800.0, 600.0, &mut progression);
        let first = slots(&c);
        c.update_positions(&mut ctx.rng, 1200.0, 900.0, &mut progression);
        assert_eq!(slots(&c), first);
        assert_eq!(c.get_by_id("sun").unwrap().pos(), Vec2::new(600.0, 450.0));
    }

    #[test]
    fn cleared_slots_are_rolled_again() {
        let mut ctx = EngineContext::new();
        let mut progression = Progression::new();
        let mut c = Container::new(&config(4));
        c.init(&mut ctx, 800.0, 600.0, &mut progression);
        let first = slots(&c);
        progression.clear_orbit_slots("sol");
        c.update_positions(&mut ctx.rng, 800.0, 600.0, &mut progression);
        assert_ne!(slots(&c), first);
        assert!(progression.orbit_slot("sol", "p1").is_some());
    }

    #[test]
    fn radius_override_is_used() {
        let mut ctx = EngineContext::new();
        let mut progression = Progression::new();
        let mut cfg = config(2);
        cfg.planets[1].orbit_radius = Some(1.0);
        let mut c = Container::new(&cfg);
        c.init(&mut ctx, 800.0, 600.0, &mut progression);
        let p1 = c.get_by_id("p1").unwrap();
        assert_eq!(p1.orbit_radius, Some(1.0));
        assert_eq!(progression.orbit_slot("sol", "p1").map(|s| s.radius), Some(1.0));
    }

    #[test]
    fn revealed_planets_start_unfogged() {
        let mut ctx = EngineContext::new();
        let mut progression = Progression::new();
        progression.reveal("sol", "p2");
        let mut c = Container::new(&config(3));
        c.init(&mut ctx, 800.0, 600.0, &mut progression);
        assert!(c.get_by_id("p1").unwrap().is_hidden());
        assert!(!c.get_by_id("p2").unwrap().is_hidden());
    }

    #[test]
    fn nearest_neighbor_respects_direction() {
        let mut ctx = EngineContext::new();
        let mut progression = Progression::new();
        let mut c = Container::new(&config(4));
        c.init(&mut ctx, 800.0, 600.0, &mut progression);
        let place = |c: &mut Container, id: &str, pos: Vec2| c.get_by_id_mut(id).unwrap().body.pos = pos;
        place(&mut c, "sun", Vec2::new(400.0, 300.0));
        place(&mut c, "p1", Vec2::new(500.0, 300.0));
        place(&mut c, "p2", Vec2::new(400.0, 200.0));
        place(&mut c, "p3", Vec2::new(400.0, 300.0));

        assert_eq!(c.find_nearest_neighbor("sun", 1.0, 0.0).map(|p| p.id()), Some("p1"));
        assert_eq!(c.find_nearest_neighbor("sun", 0.0, -1.0).map(|p| p.id()), Some("p2"));
        assert!(c.find_nearest_neighbor("sun", -1.0, 0.0).is_none());
        assert!(c.find_nearest_neighbor("nowhere", 1.0, 0.0).is_none());
    }

    #[test]
    fn aligned_beats_merely_close() {
        let mut ctx = EngineContext::new();
        let mut progression = Progression::new();
        let mut c = Container::new(&config(3));
        c.init(&mut ctx, 800.0, 600.0, &mut progression);
        c.get_by_id_mut("sun").unwrap().body.pos = Vec2::ZERO;
        // Closer but far off-axis.
        c.get_by_id_mut("p1").unwrap().body.pos = Vec2::new(60.0, 80.0);
        c.get_by_id_mut("p2").unwrap().body.pos = Vec2::new(150.0, 0.0);
        assert_eq!(c.find_nearest_neighbor("sun", 1.0, 0.0).map(|p| p.id()), Some("p2"));
    }

    #[test]
    fn resize_skips_borrowed_planet() {
        let mut ctx = EngineContext::new();
        let mut progression = Progression::new();
        let mut c = Container::new(&config(3));
        c.init(&mut ctx, 800.0, 600.0, &mut progression);
        let borrowed = Vec2::new(400.0, 228.0);
        let p1 = c.get_by_id_mut("p1").unwrap();
        p1.body.hijacked = true;
        p1.body.pos = borrowed;

        c.update_positions(&mut ctx.rng, 1200.0, 900.0, &mut progression);
        let p1 = c.get_by_id("p1").unwrap();
        assert_eq!(p1.pos(), borrowed);
        let home = c.layout_position(p1);
        assert_ne!(home, borrowed);
        assert_eq!(c.layout_position(c.get_by_id("p2").unwrap()), c.get_by_id("p2").unwrap().pos());
    }

    #[test]
    fn cleanup_removes_layer() {
        let mut ctx = EngineContext::new();
        let mut progression = Progression::new();
        let mut c = Container::new(&config(3));
        c.init(&mut ctx, 800.0, 600.0, &mut progression);
        let layer = c.layer().unwrap();
        c.cleanup(&mut ctx);
        assert!(!ctx.stage.contains(layer));
        assert!(c.get_all().is_empty());
    }
}
