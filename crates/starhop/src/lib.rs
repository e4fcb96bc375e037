//! Galaxy navigation core: planet effects drawn as projected 3D, orbit
//! layout of planets inside a container, ship travel with reveal and intro
//! sequencing, and persistent progression. Runs on `starhop-engine`.

pub mod config;
pub mod math;
pub mod effects;
pub mod planet;
pub mod progression;
pub mod container;
pub mod visuals;
pub mod ship;
pub mod interaction;
pub mod overlay;
pub mod navigator;
pub mod scene;

// Re-export key types at crate root for convenience
pub use config::{Catalog, ContainerConfig, EffectEntry, InteractionDescriptor, PlanetConfig};
pub use container::Container;
pub use effects::{create_effect, create_effects, EffectConfig, PlanetEffect};
pub use interaction::InteractionPanel;
pub use navigator::{NavState, PlanetNavigator};
pub use overlay::{IntroOverlay, OverlayOutcome};
pub use planet::{PlanetBody, PlanetData};
pub use progression::{KeyValueStore, MemoryStore, NullStore, OrbitSlot, Progression, PurchaseError};
pub use scene::GalaxyScene;
pub use ship::ShipController;
