use std::collections::HashMap;
use crate::assets::manifest::{AssetManifest, TextureDescriptor};

/// Registry of loaded texture keys.
/// Effects ask it before creating image nodes so a missing texture
/// degrades to "no node" instead of a broken draw.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    textures: HashMap<String, TextureDescriptor>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_manifest(manifest: &AssetManifest) -> Self {
        Self {
            textures: manifest.textures.clone(),
        }
    }

    /// Merge a manifest into the registry (later entries win).
    pub fn load(&mut self, manifest: &AssetManifest) {
        for (key, desc) in &manifest.textures {
            self.textures.insert(key.clone(), desc.clone());
        }
    }

    /// Register a key directly (tests and procedurally generated textures).
    pub fn insert(&mut self, key: impl Into<String>, path: impl Into<String>) {
        self.textures.insert(
            key.into(),
            TextureDescriptor { path: path.into(), width: 0, height: 0 },
        );
    }

    pub fn contains(&self, key: &str) -> bool {
        self.textures.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&TextureDescriptor> {
        self.textures.get(key)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
