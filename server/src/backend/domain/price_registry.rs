//! Price registry: the single source of unit prices for every production table.
//!
//! Keys are commodity / activity names normalized to trimmed upper case. Each
//! key is owned by exactly one price row; a second row claiming the same key
//! is refused without touching the registry. The registry is owned by the
//! workbook and handed by reference to every computation, so all writes go
//! through `set` / `remove` / `release` under the workbook's single owner.

use log::{debug, warn};
use shared::RowId;
use std::collections::HashMap;

use super::errors::LaudoError;

/// Normalize an activity name into a registry key
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceEntry {
    pub key: String,
    pub value: f64,
    /// Price row that owns this key
    pub owner: RowId,
}

/// Outcome of a successful `set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryChange {
    Inserted,
    Updated,
    Unchanged,
    /// Empty key; nothing was written
    Ignored,
}

impl RegistryChange {
    /// Whether dependent rows need a recalculation pass
    pub fn is_mutation(&self) -> bool {
        matches!(self, RegistryChange::Inserted | RegistryChange::Updated)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PriceRegistry {
    entries: HashMap<String, PriceEntry>,
}

impl PriceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or update the price for `key` on behalf of `owner`.
    ///
    /// Fails with `DuplicateKey` when a different row already owns the key;
    /// the registry is left exactly as it was.
    pub fn set(&mut self, owner: RowId, key: &str, value: f64) -> Result<RegistryChange, LaudoError> {
        let key = normalize_key(key);
        if key.is_empty() {
            return Ok(RegistryChange::Ignored);
        }
        let value = if value.is_finite() && value > 0.0 { value } else { 0.0 };

        match self.entries.get_mut(&key) {
            Some(entry) if entry.owner != owner => {
                warn!("Refusing price for {}: already owned by row {}", key, entry.owner);
                Err(LaudoError::duplicate_key(key))
            }
            Some(entry) => {
                if entry.value == value {
                    Ok(RegistryChange::Unchanged)
                } else {
                    debug!("Price for {} updated: {} -> {}", key, entry.value, value);
                    entry.value = value;
                    Ok(RegistryChange::Updated)
                }
            }
            None => {
                debug!("Price for {} registered at {} by row {}", key, value, owner);
                self.entries.insert(key.clone(), PriceEntry { key, value, owner });
                Ok(RegistryChange::Inserted)
            }
        }
    }

    /// Unit price for `key`; absent keys price at zero
    pub fn get(&self, key: &str) -> f64 {
        self.entries
            .get(&normalize_key(key))
            .map(|entry| entry.value)
            .unwrap_or(0.0)
    }

    pub fn entry(&self, key: &str) -> Option<&PriceEntry> {
        self.entries.get(&normalize_key(key))
    }

    pub fn owner_of(&self, key: &str) -> Option<RowId> {
        self.entry(key).map(|entry| entry.owner)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    /// Remove the entry for `key` regardless of owner
    pub fn remove(&mut self, key: &str) -> Option<PriceEntry> {
        let removed = self.entries.remove(&normalize_key(key));
        if let Some(entry) = &removed {
            debug!("Price for {} removed", entry.key);
        }
        removed
    }

    /// Remove the entry for `key` only if `owner` holds it
    pub fn release(&mut self, owner: RowId, key: &str) -> Option<PriceEntry> {
        match self.owner_of(key) {
            Some(current) if current == owner => self.remove(key),
            _ => None,
        }
    }

    /// Keys currently owned by `owner` (at most one in practice)
    pub fn keys_owned_by(&self, owner: RowId) -> Vec<String> {
        self.entries
            .values()
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Entries sorted by key
    pub fn entries(&self) -> Vec<&PriceEntry> {
        let mut entries: Vec<&PriceEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
