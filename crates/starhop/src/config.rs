//! Catalog data: containers, planets and their effect lists.
//!
//! Parsed from JSON the same way the engine parses its asset manifest.
//! Unknown effect tags survive parsing as `EffectEntry::Unrecognized` so old
//! or newer catalog data still loads.

use serde::{Deserialize, Deserializer};
use starhop_engine::Color;
use crate::effects::EffectConfig;

/// Every container the game knows.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub containers: Vec<ContainerConfig>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn container(&self, id: &str) -> Option<&ContainerConfig> {
        self.containers.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContainerConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Background texture key.
    #[serde(default)]
    pub background: Option<String>,
    /// Planet the ship parks at when entering; the first planet otherwise.
    #[serde(default)]
    pub start_planet: Option<String>,
    #[serde(default)]
    pub planets: Vec<PlanetConfig>,
}

/// What the interaction panel offers at a planet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionDescriptor {
    pub level_id: Option<String>,
    pub warp_container_id: Option<String>,
    pub has_shipyard: bool,
    pub show_always: bool,
}

fn default_true() -> bool {
    true
}

fn default_scale() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanetConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Fogged until the ship first arrives.
    #[serde(default = "default_true")]
    pub hidden: bool,
    #[serde(default = "default_scale")]
    pub visual_scale: f32,
    #[serde(default)]
    pub tint: Option<Color>,
    /// Sits in the container centre and never orbits.
    #[serde(default)]
    pub central: bool,
    /// Emoji frames cross-faded over time.
    #[serde(default)]
    pub frames: Vec<String>,
    #[serde(default)]
    pub texture: Option<String>,
    /// Fixed fraction 0..1 of the orbit band instead of a random one.
    #[serde(default)]
    pub orbit_radius: Option<f32>,
    #[serde(default)]
    pub interaction: Option<InteractionDescriptor>,
    /// Victories in this container needed to unlock; 0 means open.
    #[serde(default)]
    pub required_victories: u32,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub effects: Vec<EffectEntry>,
}

impl PlanetConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            hidden: true,
            visual_scale: 1.0,
            tint: None,
            central: false,
            frames: Vec::new(),
            texture: None,
            orbit_radius: None,
            interaction: None,
            required_victories: 0,
            intro: String::new(),
            effects: Vec::new(),
        }
    }
}

/// One element of a planet's `effects` array.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectEntry {
    Known(EffectConfig),
    /// A `type` the registry does not know.
    Unrecognized { tag: String },
    /// A known `type` whose fields failed to parse, or no `type` at all.
    Invalid { tag: String, reason: String },
}

impl<'de> Deserialize<'de> for EffectEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let tag = value.get("type").and_then(|t| t.as_str()).map(str::to_owned);
        match serde_json::from_value::<EffectConfig>(value) {
            Ok(config) => Ok(EffectEntry::Known(config)),
            Err(e) => Ok(match tag {
                Some(tag) if !EffectConfig::TAGS.contains(&tag.as_str()) => EffectEntry::Unrecognized { tag },
                Some(tag) => EffectEntry::Invalid { tag, reason: e.to_string() },
                None => EffectEntry::Invalid { tag: String::new(), reason: e.to_string() },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::RingConfig;

    const CATALOG: &str = r##"{
        "containers": [{
            "id": "sol",
            "name": "Sol",
            "background": "bg-sol",
            "start_planet": "sun",
            "planets": [
                { "id": "sun", "central": true, "hidden": false, "frames": ["☀️"] },
                {
                    "id": "saturn",
                    "tint": "#d8c8a0",
                    "required_victories": 2,
                    "intro": "Rings ahead.",
                    "interaction": { "level_id": "saturn-1", "has_shipyard": true },
                    "effects": [
                        { "type": "ring", "tilt": 0.5 },
                        { "type": "black_hole" }
                    ]
                }
            ]
        }]
    }"##;

    #[test]
    fn parses_catalog_with_defaults() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let sol = catalog.container("sol").unwrap();
        assert_eq!(sol.start_planet.as_deref(), Some("sun"));

        let sun = &sol.planets[0];
        assert!(sun.central);
        assert!(!sun.hidden);
        assert_eq!(sun.visual_scale, 1.0);

        let saturn = &sol.planets[1];
        assert!(saturn.hidden);
        assert_eq!(saturn.required_victories, 2);
        assert_eq!(saturn.tint, Some(Color::hex(0xd8c8a0)));
        let interaction = saturn.interaction.as_ref().unwrap();
        assert_eq!(interaction.level_id.as_deref(), Some("saturn-1"));
        assert!(interaction.has_shipyard);
        assert!(!interaction.show_always);
    }

    #[test]
    fn effect_entries_keep_unknown_tags() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let effects = &catalog.containers[0].planets[1].effects;
        assert_eq!(
            effects[0],
            EffectEntry::Known(EffectConfig::Ring(RingConfig { tilt: 0.5, ..Default::default() }))
        );
        assert_eq!(effects[1], EffectEntry::Unrecognized { tag: "black_hole".into() });
    }

    #[test]
    fn missing_type_is_invalid() {
        let entry: EffectEntry = serde_json::from_str(r#"{ "count": 3 }"#).unwrap();
        assert!(matches!(entry, EffectEntry::Invalid { ref tag, .. } if tag.is_empty()));
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        assert!(Catalog::from_json("{ \"containers\": 3 }").is_err());
        assert!(Catalog::from_json("").is_err());
    }
}
