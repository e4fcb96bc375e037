//! Galaxy map scene: the `Game` the browser runs between arcade levels.

use glam::Vec2;
use starhop_engine::{
    keys, Color, EngineContext, Game, GameConfig, GameEvent, ImageSprite, InputEvent, InputQueue, Node, NodeId,
};
use crate::config::Catalog;
use crate::container::Container;
use crate::interaction::events;
use crate::navigator::PlanetNavigator;
use crate::progression::{KeyValueStore, Progression, CURRENCY};
use crate::visuals;

/// Wait before an opening intro starts, so the map is seen first.
pub const INTRO_DELAY_MS: f32 = 800.0;
const BACKGROUND_DEPTH: f32 = -10.0;
const STAR_COUNT: usize = 140;

/// `InputEvent::Custom` kinds the browser sends in.
pub mod custom {
    /// The arcade level launched from the open panel was won.
    pub const VICTORY: u32 = 1;
    /// `a` = amount of currency picked up.
    pub const LOOT: u32 = 2;
    /// Start a new game.
    pub const RESET: u32 = 3;
}

/// Follow-up that needs the whole scene.
#[derive(Debug, Clone, PartialEq)]
enum SceneAction {
    Warp(String),
    Reset,
}

pub struct GalaxyScene<S: KeyValueStore> {
    catalog: Catalog,
    config: GameConfig,
    store: S,
    progression: Progression,
    /// Last state written to the store.
    saved: Progression,
    container: Option<Container>,
    navigator: PlanetNavigator,
    background: Option<NodeId>,
    intro_delay: f32,
}

impl<S: KeyValueStore> GalaxyScene<S> {
    pub fn new(catalog: Catalog, store: S) -> Self {
        let progression = Progression::load(&store);
        Self {
            catalog,
            config: GameConfig::default(),
            store,
            saved: progression.clone(),
            progression,
            container: None,
            navigator: PlanetNavigator::new(),
            background: None,
            intro_delay: INTRO_DELAY_MS,
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_intro_delay(mut self, ms: f32) -> Self {
        self.intro_delay = ms;
        self
    }

    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    pub fn navigator(&self) -> &PlanetNavigator {
        &self.navigator
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tear down the active container and build `id`. Returns false for an
    /// unknown container, leaving the current one in place.
    pub fn enter_container(&mut self, ctx: &mut EngineContext, id: &str) -> bool {
        let Some(config) = self.catalog.container(id).cloned() else {
            log::warn!("scene: unknown container '{}'", id);
            return false;
        };
        self.navigator.reset(ctx);
        if let Some(mut old) = self.container.take() {
            old.cleanup(ctx);
        }

        let size = ctx.viewport;
        let mut container = Container::new(&config);
        container.init(ctx, size.x, size.y, &mut self.progression);
        visuals::create_visuals(ctx, &mut container, &self.progression);
        self.build_background(ctx, container.background.as_deref());

        let start = config.start_planet.clone().or_else(|| config.planets.first().map(|p| p.id.clone()));
        if let Some(start) = start {
            self.navigator.move_to_planet(ctx, &mut container, &mut self.progression, &start, true, self.intro_delay);
        }
        log::info!("scene: entered {} ({} planets)", config.id, config.planets.len());
        self.container = Some(container);
        self.persist();
        true
    }

    fn build_background(&mut self, ctx: &mut EngineContext, texture: Option<&str>) {
        if let Some(old) = self.background.take() {
            ctx.destroy(old);
        }
        let size = ctx.viewport;
        let node = match texture {
            Some(key) if ctx.textures.contains(key) => {
                Node::image(ImageSprite::new(key, size.x.max(size.y))).with_pos(size * 0.5)
            }
            other => {
                if let Some(key) = other {
                    log::warn!("scene: background texture '{}' is not registered, drawing stars", key);
                }
                Node::graphics()
            }
        };
        let id = ctx.add(node.with_tag("background").with_depth(BACKGROUND_DEPTH));
        if let Some(g) = ctx.stage.graphics_mut(id) {
            for _ in 0..STAR_COUNT {
                let pos = Vec2::new(ctx.rng.range(0.0, size.x), ctx.rng.range(0.0, size.y));
                let radius = ctx.rng.range(0.5, 1.6);
                g.fill_circle(pos, radius, Color::WHITE.with_alpha(ctx.rng.range(0.3, 0.9)));
            }
        }
        self.background = Some(id);
    }

    fn handle_input(&mut self, ctx: &mut EngineContext, event: &InputEvent) -> Option<SceneAction> {
        let Self { container, navigator, progression, .. } = self;
        let container = container.as_mut()?;
        match *event {
            InputEvent::PointerDown { x, y } => {
                if !navigator.advance(ctx, container) {
                    if let Some(id) = visuals::hit_test(container, Vec2::new(x, y)) {
                        navigator.handle_planet_click(ctx, container, progression, &id);
                    }
                }
                None
            }
            InputEvent::KeyDown { key_code } => {
                let direction = match key_code {
                    keys::LEFT | keys::A => Some((-1.0, 0.0)),
                    keys::RIGHT | keys::D => Some((1.0, 0.0)),
                    keys::UP | keys::W => Some((0.0, -1.0)),
                    keys::DOWN | keys::S => Some((0.0, 1.0)),
                    _ => None,
                };
                if let Some((dx, dy)) = direction {
                    navigator.navigate(ctx, container, progression, dx, dy);
                    return None;
                }
                if matches!(key_code, keys::SPACE | keys::ENTER) && !navigator.advance(ctx, container) {
                    return self.activate_panel(ctx);
                }
                None
            }
            InputEvent::Resize { width, height } => {
                container.update_positions(&mut ctx.rng, width, height, progression);
                navigator.repark(ctx, container);
                let texture = container.background.clone();
                self.build_background(ctx, texture.as_deref());
                None
            }
            InputEvent::Custom { kind, a, .. } => match kind {
                custom::VICTORY => {
                    progression.record_victory(&container.id);
                    let level = navigator
                        .current_planet()
                        .and_then(|id| container.get_by_id(id))
                        .and_then(|p| p.interaction.as_ref())
                        .and_then(|i| i.level_id.clone());
                    if let Some(level) = level {
                        progression.mark_defeated(&level);
                    }
                    visuals::update_visibility(ctx, container, progression);
                    log::info!("scene: victory in {} ({} total)", container.id, progression.victories(&container.id));
                    None
                }
                custom::LOOT => {
                    progression.add_loot(CURRENCY, a.max(0.0) as u32);
                    None
                }
                custom::RESET => Some(SceneAction::Reset),
                _ => None,
            },
            _ => None,
        }
    }

    /// Space or enter with the panel open: warp, launch the level or open
    /// the shipyard, in that order of preference.
    fn activate_panel(&self, ctx: &mut EngineContext) -> Option<SceneAction> {
        let container = self.container.as_ref()?;
        let id = self.navigator.panel.open_planet()?;
        let index = container.index_of(id)?;
        let interaction = container.get_by_id(id)?.interaction.as_ref()?;

        if let Some(target) = &interaction.warp_container_id {
            return Some(SceneAction::Warp(target.clone()));
        }
        if interaction.level_id.is_some() {
            ctx.emit_event(GameEvent::new(events::LAUNCH_LEVEL, index as f32, 0.0, 0.0));
        } else if interaction.has_shipyard {
            ctx.emit_event(GameEvent::new(events::OPEN_SHIPYARD, index as f32, 0.0, 0.0));
        }
        None
    }

    fn run_action(&mut self, ctx: &mut EngineContext, action: SceneAction) {
        match action {
            SceneAction::Warp(target) => {
                let Some(index) = self.catalog.containers.iter().position(|c| c.id == target) else {
                    log::warn!("scene: warp to unknown container '{}'", target);
                    return;
                };
                log::info!("scene: warping to {}", target);
                ctx.emit_event(GameEvent::new(events::WARP, index as f32, 0.0, 0.0));
                self.enter_container(ctx, &target);
            }
            SceneAction::Reset => {
                log::info!("scene: new game");
                self.progression.reset();
                if let Some(first) = self.catalog.containers.first().map(|c| c.id.clone()) {
                    self.enter_container(ctx, &first);
                }
            }
        }
    }

    /// Write progression if it changed since the last save.
    fn persist(&mut self) {
        if self.progression == self.saved {
            return;
        }
        match self.progression.save(&mut self.store) {
            Ok(()) => {
                self.saved = self.progression.clone();
                log::info!("scene: progression saved");
            }
            Err(e) => log::warn!("scene: failed to save progression: {}", e),
        }
    }
}

impl<S: KeyValueStore> Game for GalaxyScene<S> {
    fn config(&self) -> GameConfig {
        self.config.clone()
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        match self.catalog.containers.first().map(|c| c.id.clone()) {
            Some(first) => {
                self.enter_container(ctx, &first);
            }
            None => log::warn!("scene: catalog has no containers"),
        }
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        if let Some(container) = self.container.as_mut() {
            for event in ctx.drain_signals() {
                let navigator_owned =
                    self.navigator.handle_signal(ctx, container, &mut self.progression, &event);
                if !navigator_owned {
                    visuals::handle_signal(ctx, container, event.signal());
                }
            }
        }

        let mut actions = Vec::new();
        for event in input.iter() {
            actions.extend(self.handle_input(ctx, event));
        }
        for action in actions {
            self.run_action(ctx, action);
        }

        let (time, delta) = (ctx.time(), ctx.delta());
        self.navigator.update(ctx, delta);
        if let Some(container) = self.container.as_mut() {
            visuals::update(ctx, container, time, delta);
        }
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::NavState;
    use crate::progression::{MemoryStore, STORAGE_KEY};

    const CATALOG: &str = r#"{
        "containers": [
            {
                "id": "sol",
                "start_planet": "sun",
                "planets": [
                    { "id": "sun", "central": true, "frames": ["☀️"],
                      "interaction": { "warp_container_id": "vega" } },
                    { "id": "mars", "orbit_radius": 0.5, "required_victories": 0,
                      "interaction": { "level_id": "mars-1" },
                      "effects": [{ "type": "hurricane" }, { "type": "wormhole" }] }
                ]
            },
            {
                "id": "vega",
                "planets": [
                    { "id": "vega-prime", "central": true, "intro": "Far from home." }
                ]
            }
        ]
    }"#;

    fn scene() -> (EngineContext, GalaxyScene<MemoryStore>) {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let mut scene = GalaxyScene::new(catalog, MemoryStore::new()).with_intro_delay(0.0);
        let mut ctx = EngineContext::with_config(&scene.config());
        scene.init(&mut ctx);
        (ctx, scene)
    }

    fn step(ctx: &mut EngineContext, scene: &mut GalaxyScene<MemoryStore>, events: Vec<InputEvent>) {
        let mut input = InputQueue::new();
        for e in events {
            input.push(e);
        }
        ctx.advance(16.0);
        scene.update(ctx, &input);
    }

    fn idle(ctx: &mut EngineContext, scene: &mut GalaxyScene<MemoryStore>, frames: usize) {
        for _ in 0..frames {
            step(ctx, scene, Vec::new());
        }
    }

    #[test]
    fn init_parks_at_start_planet_and_saves_layout() {
        let (_ctx, scene) = scene();
        assert_eq!(scene.navigator().current_planet(), Some("sun"));
        assert!(scene.navigator().panel.is_open());
        assert!(scene.store().get(STORAGE_KEY).is_some());
        assert!(scene.progression().orbit_slot("sol", "mars").is_some());
    }

    #[test]
    fn click_travels_and_reveals() {
        let (mut ctx, mut scene) = scene();
        let mars = scene.container().unwrap().get_by_id("mars").unwrap().pos();
        let shown = scene.navigator().panel.shown_count();
        step(&mut ctx, &mut scene, vec![InputEvent::PointerDown { x: mars.x, y: mars.y }]);
        assert!(matches!(scene.navigator().state(), NavState::Traveling { .. }));
        idle(&mut ctx, &mut scene, 150);

        assert_eq!(scene.navigator().current_planet(), Some("mars"));
        assert_eq!(scene.navigator().panel.shown_count(), shown + 1);
        assert!(!scene.navigator().overlay.is_visible());
        assert!(scene.progression().is_revealed("sol", "mars"));
        let saved = Progression::load(scene.store());
        assert!(saved.is_revealed("sol", "mars"));
    }

    #[test]
    fn panel_action_launches_level_and_victory_is_recorded() {
        let (mut ctx, mut scene) = scene();
        let mars = scene.container().unwrap().get_by_id("mars").unwrap().pos();
        step(&mut ctx, &mut scene, vec![InputEvent::PointerDown { x: mars.x, y: mars.y }]);
        idle(&mut ctx, &mut scene, 150);

        step(&mut ctx, &mut scene, vec![InputEvent::KeyDown { key_code: keys::SPACE }]);
        assert!(ctx.events.iter().any(|e| e.kind == events::LAUNCH_LEVEL as f32 && e.a == 1.0));

        step(&mut ctx, &mut scene, vec![InputEvent::Custom { kind: custom::VICTORY, a: 0.0, b: 0.0, c: 0.0 }]);
        assert_eq!(scene.progression().victories("sol"), 1);
        assert!(scene.progression().is_defeated("mars-1"));
        assert_eq!(Progression::load(scene.store()).victories("sol"), 1);
    }

    #[test]
    fn warp_builds_the_other_container() {
        let (mut ctx, mut scene) = scene();
        let old_layer = scene.container().unwrap().layer().unwrap();
        step(&mut ctx, &mut scene, vec![InputEvent::KeyDown { key_code: keys::ENTER }]);

        let container = scene.container().unwrap();
        assert_eq!(container.id, "vega");
        assert!(!ctx.stage.contains(old_layer));
        assert_eq!(scene.navigator().current_planet(), Some("vega-prime"));
        // No delay in tests, so the intro opens straight away.
        assert!(scene.navigator().overlay.is_visible());
    }

    #[test]
    fn resize_keeps_orbits() {
        let (mut ctx, mut scene) = scene();
        let slot = scene.progression().orbit_slot("sol", "mars");
        ctx.resize(1280.0, 720.0);
        step(&mut ctx, &mut scene, vec![InputEvent::Resize { width: 1280.0, height: 720.0 }]);
        assert_eq!(scene.progression().orbit_slot("sol", "mars"), slot);
        let sun = scene.container().unwrap().get_by_id("sun").unwrap().pos();
        assert_eq!(sun, Vec2::new(640.0, 360.0));
        let ship = scene.navigator().ship.position(&ctx).unwrap();
        assert_eq!(ship, crate::ship::anchor_for(sun));
    }

    #[test]
    fn reset_starts_over() {
        let (mut ctx, mut scene) = scene();
        step(&mut ctx, &mut scene, vec![InputEvent::Custom { kind: custom::LOOT, a: 25.0, b: 0.0, c: 0.0 }]);
        assert_eq!(scene.progression().loot(CURRENCY), 25);
        step(&mut ctx, &mut scene, vec![InputEvent::Custom { kind: custom::RESET, a: 0.0, b: 0.0, c: 0.0 }]);
        assert_eq!(scene.progression().loot(CURRENCY), 0);
        assert_eq!(scene.container().unwrap().id, "sol");
        assert_eq!(Progression::load(scene.store()).loot(CURRENCY), 0);
    }
}
