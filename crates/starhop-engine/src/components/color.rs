use serde::{Deserialize, Serialize};

/// RGBA color, components in 0.0 - 1.0.
///
/// Deserializes from `"#rrggbb"` or `"#rrggbbaa"` strings so game data can be
/// written the way artists write colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a color from RGBA components (0.0 - 1.0).
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color from RGB components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create an opaque color from a packed `0xRRGGBB` value.
    pub fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Parse `#rrggbb` / `#rrggbbaa` (leading `#` optional).
    pub fn parse(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match digits.len() {
            6 => Some(Self::new(
                channel(0)? as f32 / 255.0,
                channel(2)? as f32 / 255.0,
                channel(4)? as f32 / 255.0,
                1.0,
            )),
            8 => Some(Self::new(
                channel(0)? as f32 / 255.0,
                channel(2)? as f32 / 255.0,
                channel(4)? as f32 / 255.0,
                channel(6)? as f32 / 255.0,
            )),
            _ => None,
        }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Multiply RGB by `factor` (alpha untouched), clamped to 0..1.
    pub fn shade(self, factor: f32) -> Self {
        Self {
            r: (self.r * factor).clamp(0.0, 1.0),
            g: (self.g * factor).clamp(0.0, 1.0),
            b: (self.b * factor).clamp(0.0, 1.0),
            a: self.a,
        }
    }

    /// Linear blend toward `other` by `t` (0 = self, 1 = other).
    pub fn mix(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Luminance-preserving grayscale, blended in by `amount`.
    pub fn desaturate(self, amount: f32) -> Self {
        let l = 0.299 * self.r + 0.587 * self.g + 0.114 * self.b;
        self.mix(Self::new(l, l, l, self.a), amount)
    }

    /// Component-wise multiply (used to apply node tints).
    pub fn modulate(self, tint: Color) -> Self {
        Self {
            r: self.r * tint.r,
            g: self.g * tint.g,
            b: self.b * tint.b,
            a: self.a * tint.a,
        }
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);
    pub const CYAN: Self = Self::rgb(0.0, 1.0, 1.0);
    pub const GRAY: Self = Self::rgb(0.5, 0.5, 0.5);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value).ok_or_else(|| format!("invalid color '{value}'"))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}{:02x}", byte(c.r), byte(c.g), byte(c.b), byte(c.a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_strings() {
        let c = Color::parse("#ff8000").unwrap();
        assert_eq!(c.r, 1.0);
        assert!((c.g - 0.502).abs() < 0.01);
        assert_eq!(c.b, 0.0);
        assert_eq!(c.a, 1.0);

        let c = Color::parse("00000080").unwrap();
        assert!((c.a - 0.502).abs() < 0.01);

        assert!(Color::parse("#12345").is_none());
        assert!(Color::parse("#zzzzzz").is_none());
    }

    #[test]
    fn deserializes_from_json_string() {
        let c: Color = serde_json::from_str("\"#00ff00\"").unwrap();
        assert_eq!(c, Color::rgb(0.0, 1.0, 0.0));
        assert!(serde_json::from_str::<Color>("\"green\"").is_err());
    }

    #[test]
    fn shade_and_mix_clamp() {
        let c = Color::rgb(0.8, 0.5, 0.2).shade(2.0);
        assert_eq!(c.r, 1.0);
        let m = Color::BLACK.mix(Color::WHITE, 0.5);
        assert!((m.g - 0.5).abs() < 1e-6);
    }

    #[test]
    fn desaturate_fully_is_gray() {
        let c = Color::RED.desaturate(1.0);
        assert!((c.r - c.g).abs() < 1e-6 && (c.g - c.b).abs() < 1e-6);
    }
}
