//! Persistent player progression.
//!
//! One `Progression` value per running game, threaded explicitly through the
//! navigator, layout and visuals. Persistence goes through `KeyValueStore`
//! as a single JSON document.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use serde::{Deserialize, Serialize};

/// Key the whole progression document is stored under.
pub const STORAGE_KEY: &str = "starhop.progression";

/// Loot type merchants accept as payment.
pub const CURRENCY: &str = "credits";

// ── Storage ─────────────────────────────────────────────────────────────

/// Opaque string key-value store (browser localStorage, a file, memory).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

/// Store that forgets everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl KeyValueStore for NullStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, _key: &str, _value: String) {}
}

// ── State ───────────────────────────────────────────────────────────────

/// Persisted orbit assignment of one satellite planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitSlot {
    /// Radians.
    pub angle: f32,
    /// Fraction 0..1 of the container's orbit band.
    pub radius: f32,
}

/// An item a merchant sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantItem {
    pub module_id: String,
    pub price: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    NotStocked(String),
    InsufficientFunds { price: u32, available: u32 },
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseError::NotStocked(id) => write!(f, "merchant does not stock {}", id),
            PurchaseError::InsufficientFunds { price, available } => {
                write!(f, "costs {} {}, only {} available", price, CURRENCY, available)
            }
        }
    }
}

impl std::error::Error for PurchaseError {}

fn planet_key(container: &str, planet: &str) -> String {
    format!("{}:{}", container, planet)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    /// Loot counters by type.
    pub loot: BTreeMap<String, u32>,
    /// `container:planet` keys of planets no longer fogged.
    pub revealed: BTreeSet<String>,
    /// `container:planet` keys whose intro has been dismissed.
    pub intro_seen: BTreeSet<String>,
    /// Level ids beaten at least once.
    pub defeated: BTreeSet<String>,
    /// Victory count per container.
    pub victories: BTreeMap<String, u32>,
    /// Orbit assignments per container, then per planet.
    pub orbit_slots: BTreeMap<String, BTreeMap<String, OrbitSlot>>,
    /// Owned module ids with counts.
    pub modules: BTreeMap<String, u32>,
    /// Ship slot -> module id.
    pub loadout: BTreeMap<String, String>,
    pub merchant: Vec<MerchantItem>,
}

impl Progression {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Loot --

    pub fn add_loot(&mut self, kind: &str, amount: u32) {
        let entry = self.loot.entry(kind.to_string()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Spend loot if enough is available. Returns whether it was spent.
    pub fn spend_loot(&mut self, kind: &str, amount: u32) -> bool {
        match self.loot.get_mut(kind) {
            Some(have) if *have >= amount => {
                *have -= amount;
                true
            }
            _ => amount == 0,
        }
    }

    pub fn loot(&self, kind: &str) -> u32 {
        self.loot.get(kind).copied().unwrap_or(0)
    }

    // -- Planets --

    pub fn reveal(&mut self, container: &str, planet: &str) {
        self.revealed.insert(planet_key(container, planet));
    }

    pub fn is_revealed(&self, container: &str, planet: &str) -> bool {
        self.revealed.contains(&planet_key(container, planet))
    }

    pub fn mark_intro_seen(&mut self, container: &str, planet: &str) {
        self.intro_seen.insert(planet_key(container, planet));
    }

    pub fn is_intro_seen(&self, container: &str, planet: &str) -> bool {
        self.intro_seen.contains(&planet_key(container, planet))
    }

    pub fn mark_defeated(&mut self, level_id: &str) {
        self.defeated.insert(level_id.to_string());
    }

    pub fn is_defeated(&self, level_id: &str) -> bool {
        self.defeated.contains(level_id)
    }

    pub fn record_victory(&mut self, container: &str) {
        *self.victories.entry(container.to_string()).or_insert(0) += 1;
    }

    pub fn victories(&self, container: &str) -> u32 {
        self.victories.get(container).copied().unwrap_or(0)
    }

    // -- Orbit slots --

    pub fn orbit_slot(&self, container: &str, planet: &str) -> Option<OrbitSlot> {
        self.orbit_slots.get(container).and_then(|m| m.get(planet)).copied()
    }

    pub fn set_orbit_slot(&mut self, container: &str, planet: &str, slot: OrbitSlot) {
        self.orbit_slots
            .entry(container.to_string())
            .or_default()
            .insert(planet.to_string(), slot);
    }

    /// Forget every orbit assignment of a container so the next layout rolls new ones.
    pub fn clear_orbit_slots(&mut self, container: &str) {
        self.orbit_slots.remove(container);
    }

    // -- Modules and loadout --

    pub fn add_module(&mut self, module_id: &str) {
        *self.modules.entry(module_id.to_string()).or_insert(0) += 1;
    }

    /// Remove one copy. Returns false if none is owned.
    pub fn remove_module(&mut self, module_id: &str) -> bool {
        let Some(count) = self.modules.get_mut(module_id) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.modules.remove(module_id);
            self.loadout.retain(|_, m| m != module_id);
        }
        true
    }

    pub fn module_count(&self, module_id: &str) -> u32 {
        self.modules.get(module_id).copied().unwrap_or(0)
    }

    /// Put an owned module into a ship slot. Returns false if not owned.
    pub fn equip(&mut self, slot: &str, module_id: &str) -> bool {
        if self.module_count(module_id) == 0 {
            return false;
        }
        self.loadout.insert(slot.to_string(), module_id.to_string());
        true
    }

    pub fn unequip(&mut self, slot: &str) -> Option<String> {
        self.loadout.remove(slot)
    }

    // -- Merchant --

    pub fn set_merchant_stock(&mut self, items: Vec<MerchantItem>) {
        self.merchant = items;
    }

    /// Buy a stocked module with credits; the item leaves the stock.
    pub fn purchase(&mut self, module_id: &str) -> Result<(), PurchaseError> {
        let index = self
            .merchant
            .iter()
            .position(|item| item.module_id == module_id)
            .ok_or_else(|| PurchaseError::NotStocked(module_id.to_string()))?;
        let price = self.merchant[index].price;
        let available = self.loot(CURRENCY);
        if !self.spend_loot(CURRENCY, price) {
            return Err(PurchaseError::InsufficientFunds { price, available });
        }
        self.merchant.remove(index);
        self.add_module(module_id);
        Ok(())
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // -- Persistence --

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(self)?;
        store.set(STORAGE_KEY, json);
        Ok(())
    }

    /// Load from a store. Missing data yields a fresh state; corrupt data is
    /// logged and also yields a fresh state.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(json) = store.get(STORAGE_KEY) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(progression) => progression,
            Err(e) => {
                log::warn!("progression: discarding corrupt save data: {}", e);
                Self::default()
            }
        }
    }
}
