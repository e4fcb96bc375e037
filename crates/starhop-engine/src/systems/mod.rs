pub mod emitter;
pub mod render;
pub mod rng;
#[cfg(feature = "vectors")]
pub mod vector;
