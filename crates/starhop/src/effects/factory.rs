use starhop_engine::{EngineContext, NodeId};
use crate::config::EffectEntry;
use crate::planet::PlanetBody;
use super::{
    ColorCircles, EffectConfig, GhostShade, Glow, Hurricane, OrbitEffect, OrbitKind, PlanetEffect, RingEffect,
    RingKind, SolarFlares, Spin, SurfaceEffect, SurfaceKind,
};

/// Build the effect a config describes, with its nodes under `parent`.
pub fn build(ctx: &mut EngineContext, parent: NodeId, body: &PlanetBody, config: &EffectConfig) -> Box<dyn PlanetEffect> {
    match config {
        EffectConfig::Ring(c) => Box::new(RingEffect::new(ctx, parent, body, RingKind::Ring, c)),
        EffectConfig::GasBelt(c) => Box::new(RingEffect::new(ctx, parent, body, RingKind::GasBelt, c)),
        EffectConfig::AsteroidBelt(c) => Box::new(RingEffect::new(ctx, parent, body, RingKind::AsteroidBelt, c)),
        EffectConfig::MiniMoon(c) => Box::new(OrbitEffect::new(ctx, parent, body, OrbitKind::MiniMoon, c)),
        EffectConfig::Satellites(c) => Box::new(OrbitEffect::new(ctx, parent, body, OrbitKind::Satellites, c)),
        EffectConfig::Rectangles(c) => Box::new(SurfaceEffect::new(ctx, parent, body, SurfaceKind::Rectangles, c)),
        EffectConfig::Spikes(c) => Box::new(SurfaceEffect::new(ctx, parent, body, SurfaceKind::Spikes, c)),
        EffectConfig::Bubbles(c) => Box::new(SurfaceEffect::new(ctx, parent, body, SurfaceKind::Bubbles, c)),
        EffectConfig::Hurricane(c) => Box::new(Hurricane::new(ctx, parent, body, c)),
        EffectConfig::SolarFlares(c) => Box::new(SolarFlares::new(ctx, parent, body, c)),
        EffectConfig::GhostShade(c) => Box::new(GhostShade::new(ctx, parent, body, c)),
        EffectConfig::ColorCircles(c) => Box::new(ColorCircles::new(ctx, parent, body, c)),
        EffectConfig::Glow(c) => Box::new(Glow::new(ctx, parent, body, c)),
        EffectConfig::Spin(c) => Box::new(Spin::new(ctx, body, c)),
    }
}

/// Build one catalog entry. Unknown or malformed entries are logged and
/// produce no effect; the planet works without them.
pub fn create_effect(
    ctx: &mut EngineContext,
    parent: NodeId,
    body: &PlanetBody,
    entry: &EffectEntry,
) -> Option<Box<dyn PlanetEffect>> {
    match entry {
        EffectEntry::Known(config) => Some(build(ctx, parent, body, config)),
        EffectEntry::Unrecognized { tag } => {
            log::warn!("effects: unknown effect type '{}' on planet {}, skipping", tag, body.id);
            None
        }
        EffectEntry::Invalid { tag, reason } => {
            log::warn!("effects: invalid '{}' config on planet {}: {}", tag, body.id, reason);
            None
        }
    }
}

pub fn create_effects(
    ctx: &mut EngineContext,
    parent: NodeId,
    body: &PlanetBody,
    entries: &[EffectEntry],
) -> Vec<Box<dyn PlanetEffect>> {
    entries.iter().filter_map(|entry| create_effect(ctx, parent, body, entry)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::planet_fixture;

    fn entries(json: &str) -> Vec<EffectEntry> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn every_known_tag_builds() {
        let (mut ctx, layer, body) = planet_fixture();
        let json = format!(
            "[{}]",
            EffectConfig::TAGS.iter().map(|t| format!(r#"{{ "type": "{}" }}"#, t)).collect::<Vec<_>>().join(",")
        );
        let list = entries(&json);
        let effects = create_effects(&mut ctx, layer, &body, &list);
        let kinds: Vec<&str> = effects.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, EffectConfig::TAGS.to_vec());
    }

    #[test]
    fn unknown_and_invalid_entries_are_skipped() {
        let (mut ctx, layer, body) = planet_fixture();
        let list = entries(
            r#"[
                { "type": "wormhole" },
                { "type": "ring", "inner": "wide" },
                { "type": "spikes", "count": 4 }
            ]"#,
        );
        assert_eq!(list[0], EffectEntry::Unrecognized { tag: "wormhole".into() });
        assert!(matches!(&list[1], EffectEntry::Invalid { tag, .. } if tag == "ring"));
        let effects = create_effects(&mut ctx, layer, &body, &list);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind(), "spikes");
    }
}
