pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod input;
pub mod assets;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext};
pub use api::types::{NodeId, Signal, SignalEvent, GameEvent};
pub use components::color::Color;
pub use components::emitter::{EmitterConfig, ParticleEmitter, Particle};
pub use components::graphics::{Graphics, Shape};
pub use components::sprite::{BlendMode, ImageSprite, TextLabel};
pub use core::node::{Node, NodeKind, NodeSnapshot, WorldTransform};
pub use core::stage::Stage;
pub use core::time::{FixedTimestep, FrameClock};
pub use renderer::instance::{DrawList, DrawBatch, BatchKind, SpriteInstance, TextDraw};
pub use input::queue::{InputEvent, InputQueue, keys};
pub use assets::manifest::AssetManifest;
pub use assets::registry::TextureRegistry;
pub use systems::rng::Rng;
pub use systems::render::build_draw_list;

#[cfg(feature = "vectors")]
pub use systems::vector::{VectorState, VectorVertex};

pub use extensions::{
    Easing, lerp, lerp_vec2, ease, ease_vec2, shortest_angle,
    TimerState, TimerId,
    TweenState, Tween, TweenId, TweenTarget, TweenLoop,
};
