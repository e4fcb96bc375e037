use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Texture manifest for a game, loaded from JSON at runtime.
/// The browser owns the actual image data; Rust only needs to know which
/// keys exist and how big they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub textures: HashMap<String, TextureDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureDescriptor {
    /// Relative path to the image file.
    pub path: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
