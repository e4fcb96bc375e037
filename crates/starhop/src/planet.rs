use glam::Vec2;
use starhop_engine::{Color, EngineContext, NodeId};
use crate::config::{EffectEntry, InteractionDescriptor, PlanetConfig};
use crate::effects::PlanetEffect;

/// Planet radius in px at `visual_scale == 1`.
pub const PLANET_RADIUS: f32 = 32.0;

/// Per-frame state effects read from their planet.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetBody {
    pub id: String,
    /// Centre in the coordinate space of whatever currently parents the visuals.
    pub pos: Vec2,
    pub hidden: bool,
    /// Set while the intro overlay borrows the visuals.
    pub hijacked: bool,
    pub visual_scale: f32,
    pub tint: Option<Color>,
    pub sprite: Option<NodeId>,
    /// 0..7, advanced by the cross-fade cycle.
    pub light_phase: u8,
    /// Displayed radius in px.
    pub radius: f32,
}

/// Cross-fade cycle between emoji frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameCycle {
    pub index: usize,
    /// Milliseconds into the current hold + fade.
    pub elapsed: f32,
}

/// One planet instance inside a container.
pub struct PlanetData {
    pub body: PlanetBody,
    pub name: String,
    pub central: bool,
    /// Assigned orbit, `None` until laid out (always `None` for the central planet).
    pub orbit_angle: Option<f32>,
    pub orbit_radius: Option<f32>,
    /// Band fraction override from the catalog.
    pub radius_override: Option<f32>,
    pub interaction: Option<InteractionDescriptor>,
    pub required_victories: u32,
    pub intro: String,
    pub frames: Vec<String>,
    pub texture: Option<String>,
    pub effect_entries: Vec<EffectEntry>,

    // Runtime handles
    pub overlay_sprite: Option<NodeId>,
    pub emitter: Option<NodeId>,
    pub lock_icon: Option<NodeId>,
    pub effects: Vec<Box<dyn PlanetEffect>>,
    pub cycle: FrameCycle,
}

impl PlanetData {
    pub fn from_config(config: &PlanetConfig) -> Self {
        let visual_scale = if config.visual_scale > 0.0 { config.visual_scale } else { 1.0 };
        Self {
            body: PlanetBody {
                id: config.id.clone(),
                pos: Vec2::ZERO,
                hidden: config.hidden && !config.central,
                hijacked: false,
                visual_scale,
                tint: config.tint,
                sprite: None,
                light_phase: 0,
                radius: PLANET_RADIUS * visual_scale,
            },
            name: config.name.clone(),
            central: config.central,
            orbit_angle: None,
            orbit_radius: None,
            radius_override: config.orbit_radius.map(|r| r.clamp(0.0, 1.0)),
            interaction: config.interaction.clone(),
            required_victories: config.required_victories,
            intro: config.intro.clone(),
            frames: config.frames.clone(),
            texture: config.texture.clone(),
            effect_entries: config.effects.clone(),
            overlay_sprite: None,
            emitter: None,
            lock_icon: None,
            effects: Vec::new(),
            cycle: FrameCycle::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.body.id
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn is_hidden(&self) -> bool {
        self.body.hidden
    }

    /// Locked while the container has fewer victories than required.
    pub fn is_locked(&self, victories: u32) -> bool {
        self.required_victories > 0 && victories < self.required_victories
    }

    /// Every stage node this planet owns apart from effect nodes.
    pub fn own_nodes(&self) -> Vec<NodeId> {
        [self.body.sprite, self.overlay_sprite, self.emitter, self.lock_icon]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Every stage node that makes up the planet on screen.
    pub fn visual_nodes(&self) -> Vec<NodeId> {
        let mut nodes = self.own_nodes();
        for effect in &self.effects {
            nodes.extend(effect.visual_elements());
        }
        nodes
    }

    /// Destroy the ambient emitter. Returns false if it was already gone.
    pub fn destroy_emitter(&mut self, ctx: &mut EngineContext) -> bool {
        match self.emitter.take() {
            Some(id) => ctx.destroy(id),
            None => false,
        }
    }

    /// Release every node, effect, tween and timer the planet holds.
    pub fn destroy_visuals(&mut self, ctx: &mut EngineContext) {
        for mut effect in self.effects.drain(..) {
            effect.destroy(ctx);
        }
        for id in [self.body.sprite.take(), self.overlay_sprite.take(), self.emitter.take(), self.lock_icon.take()]
            .into_iter()
            .flatten()
        {
            ctx.destroy(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starhop_engine::{EmitterConfig, Node};

    #[test]
    fn central_planets_are_never_fogged() {
        let mut config = PlanetConfig::new("sun");
        config.central = true;
        assert!(!PlanetData::from_config(&config).is_hidden());
        assert!(PlanetData::from_config(&PlanetConfig::new("moon")).is_hidden());
    }

    #[test]
    fn radius_follows_visual_scale() {
        let mut config = PlanetConfig::new("giant");
        config.visual_scale = 1.5;
        assert_eq!(PlanetData::from_config(&config).body.radius, 48.0);
        config.visual_scale = 0.0;
        assert_eq!(PlanetData::from_config(&config).body.radius, PLANET_RADIUS);
    }

    #[test]
    fn lock_gating() {
        let mut planet = PlanetData::from_config(&PlanetConfig::new("gate"));
        assert!(!planet.is_locked(0));
        planet.required_victories = 2;
        assert!(planet.is_locked(1));
        assert!(!planet.is_locked(2));
        assert!(!planet.is_locked(3));
    }

    #[test]
    fn emitter_is_destroyed_once() {
        let mut ctx = EngineContext::new();
        let mut planet = PlanetData::from_config(&PlanetConfig::new("fog"));
        let emitter = ctx.add(Node::emitter(EmitterConfig::new()));
        planet.emitter = Some(emitter);
        assert!(planet.destroy_emitter(&mut ctx));
        assert!(!planet.destroy_emitter(&mut ctx));
        assert!(!ctx.stage.contains(emitter));
    }
}
