use bytemuck::{Pod, Zeroable};
use serde::Serialize;
#[cfg(feature = "vectors")]
use crate::systems::vector::VectorState;

/// Per-sprite render data read by the TypeScript renderer.
/// 12 floats = 48 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    /// Rendered size in px (sprite size times accumulated scale).
    pub size: f32,
    /// Index into `DrawList::textures`.
    pub texture: f32,
    pub alpha: f32,
    /// 0 = alpha blend, 1 = additive.
    pub blend: f32,
    pub tint_r: f32,
    pub tint_g: f32,
    pub tint_b: f32,
    pub _pad: [f32; 2],
}

impl SpriteInstance {
    pub const FLOATS: usize = 12;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Which buffer a batch draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Vector = 0,
    Sprite = 1,
    Text = 2,
}

/// A run of consecutive draws from one buffer. The renderer walks batches
/// in order, so interleaved sprites and shapes keep their stacking.
/// 4 floats: kind, start, count, padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DrawBatch {
    pub kind: f32,
    pub start: f32,
    pub count: f32,
    pub _pad: f32,
}

impl DrawBatch {
    pub const FLOATS: usize = 4;

    pub fn kind(&self) -> BatchKind {
        match self.kind as u32 {
            1 => BatchKind::Sprite,
            2 => BatchKind::Text,
            _ => BatchKind::Vector,
        }
    }
}

/// A text label placed on screen. Serialized to JSON for the browser,
/// which renders text with the DOM canvas API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextDraw {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: [f32; 4],
    pub anchor: f32,
    pub wrap: f32,
}

/// Everything the browser needs to draw one frame.
pub struct DrawList {
    pub sprites: Vec<SpriteInstance>,
    pub texts: Vec<TextDraw>,
    pub batches: Vec<DrawBatch>,
    /// Texture keys referenced by `SpriteInstance::texture`.
    pub textures: Vec<String>,
    #[cfg(feature = "vectors")]
    pub vectors: VectorState,
}

impl DrawList {
    pub fn new() -> Self {
        Self::with_capacity(512, 16384)
    }

    pub fn with_capacity(max_sprites: usize, _max_vertices: usize) -> Self {
        Self {
            sprites: Vec::with_capacity(max_sprites),
            texts: Vec::new(),
            batches: Vec::new(),
            textures: Vec::new(),
            #[cfg(feature = "vectors")]
            vectors: VectorState::with_capacity(_max_vertices),
        }
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
        self.texts.clear();
        self.batches.clear();
        #[cfg(feature = "vectors")]
        self.vectors.clear();
    }

    /// Index of a texture key, interning it on first use.
    pub fn texture_index(&mut self, key: &str) -> u32 {
        match self.textures.iter().position(|k| k == key) {
            Some(i) => i as u32,
            None => {
                self.textures.push(key.to_string());
                (self.textures.len() - 1) as u32
            }
        }
    }

    /// Extend the last batch if it has the same kind, else open a new one.
    pub fn record(&mut self, kind: BatchKind, start: usize, count: usize) {
        if count == 0 {
            return;
        }
        if let Some(last) = self.batches.last_mut() {
            if last.kind() == kind && (last.start + last.count) as usize == start {
                last.count += count as f32;
                return;
            }
        }
        self.batches.push(DrawBatch {
            kind: kind as u32 as f32,
            start: start as f32,
            count: count as f32,
            _pad: 0.0,
        });
    }

    pub fn sprites_ptr(&self) -> *const f32 {
        self.sprites.as_ptr() as *const f32
    }

    pub fn batches_ptr(&self) -> *const f32 {
        self.batches.as_ptr() as *const f32
    }

    /// Current frame's text labels as JSON.
    pub fn texts_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.texts)
    }
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new()
    }
}
