use glam::Vec2;
use crate::components::color::Color;
use crate::components::sprite::BlendMode;
use crate::systems::rng::Rng;

/// Static configuration of a particle emitter.
///
/// Times are in milliseconds. Particles live in the emitter node's local
/// space, so moving or re-parenting the node carries live particles with it.
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Palette; each particle picks one at random.
    pub colors: Vec<Color>,
    /// Particle lifetime.
    pub lifespan: f32,
    /// Min/max initial speed in px per second.
    pub speed: (f32, f32),
    /// Scale at birth and at death.
    pub scale: (f32, f32),
    /// Alpha at birth and at death.
    pub alpha: (f32, f32),
    pub blend: BlendMode,
    /// Milliseconds between automatic emissions. `<= 0` means manual only.
    pub frequency: f32,
    /// Particles per automatic emission.
    pub quantity: u32,
    /// Spawn jitter radius around the emission point.
    pub spread: f32,
    /// Base particle radius in px (multiplied by the scale ramp).
    pub radius: f32,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            colors: vec![Color::WHITE],
            lifespan: 1000.0,
            speed: (10.0, 30.0),
            scale: (1.0, 0.0),
            alpha: (1.0, 0.0),
            blend: BlendMode::Alpha,
            frequency: 100.0,
            quantity: 1,
            spread: 0.0,
            radius: 2.0,
        }
    }
}

impl EmitterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Builder pattern --

    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_lifespan(mut self, ms: f32) -> Self {
        self.lifespan = ms;
        self
    }

    pub fn with_speed(mut self, min: f32, max: f32) -> Self {
        self.speed = (min, max);
        self
    }

    pub fn with_scale(mut self, start: f32, end: f32) -> Self {
        self.scale = (start, end);
        self
    }

    pub fn with_alpha(mut self, start: f32, end: f32) -> Self {
        self.alpha = (start, end);
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_frequency(mut self, ms: f32) -> Self {
        self.frequency = ms;
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_spread(mut self, spread: f32) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

/// A live particle, in emitter-local coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: f32,
    pub lifespan: f32,
    pub color: Color,
}

impl Particle {
    /// Normalized age [0, 1].
    pub fn progress(&self) -> f32 {
        if self.lifespan <= 0.0 {
            1.0
        } else {
            (self.age / self.lifespan).clamp(0.0, 1.0)
        }
    }
}

/// Emitter state attached to a stage node.
#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    pub config: EmitterConfig,
    /// Whether automatic emission is running (manual emits always work).
    pub emitting: bool,
    particles: Vec<Particle>,
    accumulator: f32,
}

impl ParticleEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            config,
            emitting: true,
            particles: Vec::new(),
            accumulator: 0.0,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Spawn one particle at a local position.
    pub fn emit_particle_at(&mut self, at: Vec2, rng: &mut Rng) {
        let angle = rng.range(0.0, std::f32::consts::TAU);
        let dir = Vec2::new(angle.cos(), angle.sin());
        let jitter = if self.config.spread > 0.0 {
            dir * rng.range(0.0, self.config.spread)
        } else {
            Vec2::ZERO
        };
        let speed = rng.range(self.config.speed.0, self.config.speed.1.max(self.config.speed.0));
        let color = rng.pick(&self.config.colors).copied().unwrap_or(Color::WHITE);
        self.particles.push(Particle {
            pos: at + jitter,
            vel: dir * speed,
            age: 0.0,
            lifespan: self.config.lifespan,
            color,
        });
    }

    /// Age and move particles, then run automatic emission.
    pub fn tick(&mut self, dt_ms: f32, rng: &mut Rng) {
        let dt_s = dt_ms / 1000.0;
        for p in &mut self.particles {
            p.age += dt_ms;
            p.pos += p.vel * dt_s;
        }
        self.particles.retain(|p| p.age < p.lifespan);

        if !self.emitting || self.config.frequency <= 0.0 {
            return;
        }
        self.accumulator += dt_ms;
        while self.accumulator >= self.config.frequency {
            self.accumulator -= self.config.frequency;
            for _ in 0..self.config.quantity {
                self.emit_particle_at(Vec2::ZERO, rng);
            }
        }
    }

    /// Current (scale, alpha) of a particle from the config ramps.
    pub fn ramp(&self, particle: &Particle) -> (f32, f32) {
        let t = particle.progress();
        let (s0, s1) = self.config.scale;
        let (a0, a1) = self.config.alpha;
        (s0 + (s1 - s0) * t, a0 + (a1 - a0) * t)
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = EmitterConfig::default();
        assert_eq!(c.frequency, 100.0);
        assert_eq!(c.quantity, 1);
    }

    #[test]
    fn builder_pattern() {
        let c = EmitterConfig::new()
            .with_frequency(50.0)
            .with_quantity(3)
            .with_lifespan(400.0)
            .with_blend(BlendMode::Additive);
        assert_eq!(c.frequency, 50.0);
        assert_eq!(c.quantity, 3);
        assert_eq!(c.lifespan, 400.0);
        assert_eq!(c.blend, BlendMode::Additive);
    }

    #[test]
    fn frequency_accumulates() {
        let mut rng = Rng::new(1);
        let mut e = ParticleEmitter::new(EmitterConfig::new().with_frequency(100.0).with_quantity(2));
        e.tick(50.0, &mut rng);
        assert_eq!(e.particles().len(), 0);
        e.tick(60.0, &mut rng);
        assert_eq!(e.particles().len(), 2);
    }

    #[test]
    fn manual_only_emitter() {
        let mut rng = Rng::new(1);
        let mut e = ParticleEmitter::new(EmitterConfig::new().with_frequency(0.0));
        e.tick(1000.0, &mut rng);
        assert!(e.particles().is_empty());
        e.emit_particle_at(Vec2::new(5.0, 5.0), &mut rng);
        assert_eq!(e.particles().len(), 1);
    }

    #[test]
    fn particles_expire() {
        let mut rng = Rng::new(1);
        let mut e = ParticleEmitter::new(EmitterConfig::new().with_frequency(0.0).with_lifespan(100.0));
        e.emit_particle_at(Vec2::ZERO, &mut rng);
        e.tick(99.0, &mut rng);
        assert_eq!(e.particles().len(), 1);
        e.tick(2.0, &mut rng);
        assert!(e.particles().is_empty());
    }

    #[test]
    fn ramp_interpolates() {
        let e = ParticleEmitter::new(EmitterConfig::new().with_scale(1.0, 0.0).with_alpha(0.5, 0.0));
        let p = Particle { pos: Vec2::ZERO, vel: Vec2::ZERO, age: 50.0, lifespan: 100.0, color: Color::WHITE };
        let (s, a) = e.ramp(&p);
        assert!((s - 0.5).abs() < 1e-6);
        assert!((a - 0.25).abs() < 1e-6);
    }
}
