use starhop_engine::{
    build_draw_list, AssetManifest, DrawList, EngineContext, FixedTimestep, Game, GameConfig,
    InputEvent, InputQueue, SpriteInstance,
};

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export
/// generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    idle_input: InputQueue,
    draw_list: DrawList,
    timestep: FixedTimestep,
    config: GameConfig,
    initialized: bool,
    texts_json: String,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        Self {
            ctx: EngineContext::with_config(&config),
            input: InputQueue::new(),
            idle_input: InputQueue::new(),
            draw_list: DrawList::with_capacity(config.max_instances, config.max_vector_vertices),
            timestep: FixedTimestep::new(config.fixed_dt),
            game,
            config,
            initialized: false,
            texts_json: String::from("[]"),
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.game.init(&mut self.ctx);
        self.initialized = true;
    }

    /// Push an input event into the queue. Resizes also update the viewport
    /// right away so the game sees the new size during the same step.
    pub fn push_input(&mut self, event: InputEvent) {
        if let InputEvent::Resize { width, height } = event {
            self.ctx.resize(width, height);
        }
        self.input.push(event);
    }

    /// Register textures the browser has loaded.
    pub fn load_manifest(&mut self, json: &str) {
        match AssetManifest::from_json(json) {
            Ok(manifest) => {
                self.ctx.textures.load(&manifest);
                log::info!("manifest: {} textures", manifest.textures.len());
            }
            Err(e) => log::warn!("manifest: failed to parse: {}", e),
        }
    }

    /// Run one frame: fixed steps of engine advance + game update, then
    /// rebuild the draw list. Input is delivered to the first step only.
    pub fn tick(&mut self, dt_ms: f32) {
        if !self.initialized {
            return;
        }

        self.ctx.clear_frame_data();

        let steps = self.timestep.accumulate(dt_ms);
        for step in 0..steps {
            self.ctx.advance(self.timestep.dt());
            let input = if step == 0 { &self.input } else { &self.idle_input };
            self.game.update(&mut self.ctx, input);
        }
        if steps > 0 {
            self.input.drain();
        }

        build_draw_list(&self.ctx.stage, &mut self.draw_list);
        self.texts_json = self.draw_list.texts_json().unwrap_or_else(|e| {
            log::warn!("texts: {}", e);
            String::from("[]")
        });
    }

    // ---- Pointer accessors for SharedArrayBuffer reads ----

    pub fn sprites_ptr(&self) -> *const f32 {
        self.draw_list.sprites_ptr()
    }

    pub fn sprite_count(&self) -> u32 {
        self.draw_list.sprites.len() as u32
    }

    pub fn sprite_floats(&self) -> u32 {
        SpriteInstance::FLOATS as u32
    }

    pub fn batches_ptr(&self) -> *const f32 {
        self.draw_list.batches_ptr()
    }

    pub fn batch_count(&self) -> u32 {
        self.draw_list.batches.len() as u32
    }

    #[cfg(feature = "vectors")]
    pub fn vector_vertices_ptr(&self) -> *const f32 {
        self.draw_list.vectors.buffer_ptr()
    }

    #[cfg(feature = "vectors")]
    pub fn vector_vertex_count(&self) -> u32 {
        self.draw_list.vectors.vertex_count() as u32
    }

    /// Texture key for a sprite's `texture` index.
    pub fn texture_key(&self, index: u32) -> String {
        self.draw_list.textures.get(index as usize).cloned().unwrap_or_default()
    }

    pub fn texts_json(&self) -> String {
        self.texts_json.clone()
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    pub fn world_width(&self) -> f32 {
        self.ctx.viewport.x
    }

    pub fn world_height(&self) -> f32 {
        self.ctx.viewport.y
    }

    // ---- Capacity accessors ----

    pub fn max_instances(&self) -> u32 {
        self.config.max_instances as u32
    }

    pub fn max_vector_vertices(&self) -> u32 {
        self.config.max_vector_vertices as u32
    }

    pub fn max_events(&self) -> u32 {
        self.config.max_events as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starhop_engine::{ImageSprite, Node};

    struct Probe {
        updates: u32,
        inputs_seen: usize,
    }

    impl Game for Probe {
        fn init(&mut self, ctx: &mut EngineContext) {
            ctx.add(Node::image(ImageSprite::new("ship", 32.0)));
        }

        fn update(&mut self, _ctx: &mut EngineContext, input: &InputQueue) {
            self.updates += 1;
            self.inputs_seen += input.len();
        }
    }

    fn runner() -> GameRunner<Probe> {
        let mut r = GameRunner::new(Probe { updates: 0, inputs_seen: 0 });
        r.init();
        r
    }

    #[test]
    fn tick_before_init_is_ignored() {
        let mut r = GameRunner::new(Probe { updates: 0, inputs_seen: 0 });
        r.tick(100.0);
        assert_eq!(r.game.updates, 0);
    }

    #[test]
    fn input_goes_to_first_step_only() {
        let mut r = runner();
        r.push_input(InputEvent::KeyDown { key_code: 32 });
        r.tick(40.0);
        assert_eq!(r.game.updates, 2);
        assert_eq!(r.game.inputs_seen, 1);
        assert!(r.input.is_empty());
    }

    #[test]
    fn resize_updates_viewport_immediately() {
        let mut r = runner();
        r.push_input(InputEvent::Resize { width: 320.0, height: 200.0 });
        assert_eq!(r.world_width(), 320.0);
        assert_eq!(r.world_height(), 200.0);
    }

    #[test]
    fn draw_list_is_rebuilt_each_frame() {
        let mut r = runner();
        r.tick(20.0);
        assert_eq!(r.sprite_count(), 1);
        assert_eq!(r.texture_key(0), "ship");
        assert_eq!(r.texts_json(), "[]");
    }

    #[test]
    fn bad_manifest_is_ignored() {
        let mut r = runner();
        r.load_manifest("not json");
        r.load_manifest(r#"{ "textures": { "glow": { "path": "glow.png" } } }"#);
        assert!(r.ctx.textures.contains("glow"));
    }
}
