pub mod instance;

pub use instance::{BatchKind, DrawBatch, DrawList, SpriteInstance, TextDraw};
