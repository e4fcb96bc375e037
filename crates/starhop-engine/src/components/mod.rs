pub mod color;
pub mod emitter;
pub mod graphics;
pub mod sprite;
