use crate::components::color::Color;

/// Blend mode for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending (src-alpha, one-minus-src-alpha).
    #[default]
    Alpha,
    /// Additive blending for glow effects (src-alpha, one).
    Additive,
}

impl BlendMode {
    pub fn as_f32(self) -> f32 {
        match self {
            BlendMode::Alpha => 0.0,
            BlendMode::Additive => 1.0,
        }
    }
}

/// Texture-backed sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSprite {
    /// Texture key registered in the `TextureRegistry`.
    pub texture: String,
    /// Rendered size in px before node scale.
    pub size: f32,
    pub blend: BlendMode,
}

impl ImageSprite {
    pub fn new(texture: impl Into<String>, size: f32) -> Self {
        Self {
            texture: texture.into(),
            size,
            blend: BlendMode::Alpha,
        }
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }
}

/// Text label. Emoji glyphs are plain text as far as the engine is concerned.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub font_size: f32,
    pub color: Color,
    /// Horizontal anchor: 0 = left, 0.5 = centre, 1 = right.
    pub anchor: f32,
    /// Wrap width in px (0 = no wrapping).
    pub wrap_width: f32,
}

impl TextLabel {
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            color: Color::WHITE,
            anchor: 0.5,
            wrap_width: 0.0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_anchor(mut self, anchor: f32) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_wrap(mut self, width: f32) -> Self {
        self.wrap_width = width;
        self
    }
}
