//! Galaxy Map: the star map between arcade levels.
//!
//! Catalog data is compiled in. Progression lives in the browser's
//! localStorage, so reveals, victories and orbit slots survive a reload.

use starhop::{Catalog, GalaxyScene, KeyValueStore};
use starhop_engine::api::game::{EngineContext, Game, GameConfig};
use starhop_engine::input::queue::InputQueue;

const CATALOG_JSON: &str = include_str!("../assets/catalog.json");

const WORLD_W: f32 = 1280.0;
const WORLD_H: f32 = 720.0;

// ── Storage ──────────────────────────────────────────────────────────

/// `window.localStorage`. Reads and writes become no-ops when storage is
/// unavailable (private mode, no window).
pub struct LocalStore {
    storage: Option<web_sys::Storage>,
}

impl LocalStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("galaxy-map: localStorage unavailable, progress will not be kept");
        }
        Self { storage }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: String) {
        if let Some(storage) = &self.storage {
            if storage.set_item(key, &value).is_err() {
                log::warn!("galaxy-map: could not write '{}' to localStorage", key);
            }
        }
    }
}

// ── Game ─────────────────────────────────────────────────────────────

pub struct GalaxyMap {
    scene: GalaxyScene<LocalStore>,
}

impl GalaxyMap {
    pub fn new() -> Self {
        let catalog = Catalog::from_json(CATALOG_JSON).unwrap_or_else(|e| {
            log::warn!("galaxy-map: bad catalog, starting empty: {}", e);
            Catalog::default()
        });
        let config = GameConfig {
            world_width: WORLD_W,
            world_height: WORLD_H,
            ..GameConfig::default()
        };
        Self { scene: GalaxyScene::new(catalog, LocalStore::new()).with_config(config) }
    }
}

impl Game for GalaxyMap {
    fn config(&self) -> GameConfig {
        self.scene.config()
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.scene.init(ctx);
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        self.scene.update(ctx, input);
    }
}
