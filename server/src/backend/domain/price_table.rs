//! Price table: the rows that feed the price registry.
//!
//! Each row carries a key, a unit price and quote metadata. A row either owns
//! the registry entry for its key (`Registered`), has no key yet (`Unkeyed`),
//! or lost the key to an earlier row (`Rejected`).
//!
//! ## Key Responsibilities
//! - Refuse up front any add or key edit that collides with another row's
//!   current key; nothing is mutated in that case. Rows are checked rather
//!   than the registry, which lags behind pending edits until the next sync.
//! - `sync` reconciles the registry with the rows: stale keys (renamed rows,
//!   removed owners) are released first, then every row claims its key in
//!   insertion order.

use log::{debug, info, warn};
use shared::{
    PriceRowInput, PriceRowStatus, PriceRowView, PriceTableView, RowId, TableKind, ValidationWarning,
};

use super::errors::LaudoError;
use super::numeric::format_currency;
use super::price_registry::{normalize_key, PriceRegistry, RegistryChange};
use super::rows::EditableRow;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub id: RowId,
    pub input: PriceRowInput,
    pub status: PriceRowStatus,
}

/// Result of reconciling the registry with the price rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSync {
    /// Whether any registry entry was inserted, updated or removed
    pub registry_changed: bool,
    /// Messages for rows whose key is held by another row
    pub rejections: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a price row and register its key.
    ///
    /// A key already carried by another row fails with `DuplicateKey`;
    /// neither the table nor the registry change.
    pub fn add_row(
        &mut self,
        registry: &mut PriceRegistry,
        mut input: PriceRowInput,
    ) -> Result<(RowId, Vec<ValidationWarning>), LaudoError> {
        let warnings = input.normalize();
        if let Some(holder) = self.holder_of(&input.key, None) {
            warn!("Price row for {} rejected: key carried by row {}", input.key, holder);
            return Err(LaudoError::duplicate_key(input.key));
        }

        // A pending rename may still hold this key in the registry
        self.release_stale(registry);

        let id = RowId::new();
        let change = registry.set(id, &input.key, input.value)?;
        let status = if change == RegistryChange::Ignored {
            PriceRowStatus::Unkeyed
        } else {
            PriceRowStatus::Registered
        };
        info!("Added price row {} for '{}' at {}", id, input.key, input.value);
        self.rows.push(PriceRow { id, input, status });
        Ok((id, warnings))
    }

    /// Apply a raw field edit. A key edit that collides with another row's
    /// current key is refused before the row is touched.
    pub fn edit(&mut self, id: RowId, field: &str, raw: &str) -> Result<Option<ValidationWarning>, LaudoError> {
        if field == "key" {
            let key = normalize_key(raw);
            if let Some(holder) = self.holder_of(&key, Some(id)) {
                warn!("Key edit on price row {} refused: {} carried by row {}", id, key, holder);
                return Err(LaudoError::duplicate_key(key));
            }
        }

        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(LaudoError::RowNotFound { kind: TableKind::Prices, id })?;
        row.input.apply_edit(field, raw)
    }

    /// Row other than `except` whose current key is `key`
    fn holder_of(&self, key: &str, except: Option<RowId>) -> Option<RowId> {
        if key.is_empty() {
            return None;
        }
        self.rows
            .iter()
            .find(|row| Some(row.id) != except && row.input.key == key)
            .map(|row| row.id)
    }

    /// Release registry entries whose owner is gone or now carries another key
    fn release_stale(&self, registry: &mut PriceRegistry) -> bool {
        let stale: Vec<String> = registry
            .entries()
            .into_iter()
            .filter(|entry| match self.rows.iter().find(|row| row.id == entry.owner) {
                Some(row) => row.input.key != entry.key,
                None => true,
            })
            .map(|entry| entry.key.clone())
            .collect();
        let released = !stale.is_empty();
        for key in stale {
            debug!("Releasing stale price key {}", key);
            registry.remove(&key);
        }
        released
    }

    /// Remove a row and release the registry entry it owns, if any
    pub fn remove_row(&mut self, registry: &mut PriceRegistry, id: RowId) -> Result<PriceRow, LaudoError> {
        let position = self
            .rows
            .iter()
            .position(|row| row.id == id)
            .ok_or(LaudoError::RowNotFound { kind: TableKind::Prices, id })?;
        let row = self.rows.remove(position);

        for key in registry.keys_owned_by(id) {
            registry.remove(&key);
            info!("Released price key {} after removing row {}", key, id);
        }
        Ok(row)
    }

    /// Reconcile the registry with the current rows
    pub fn sync(&mut self, registry: &mut PriceRegistry) -> PriceSync {
        let mut outcome = PriceSync {
            registry_changed: self.release_stale(registry),
            ..Default::default()
        };

        for row in &mut self.rows {
            row.status = match registry.set(row.id, &row.input.key, row.input.value) {
                Ok(RegistryChange::Ignored) => PriceRowStatus::Unkeyed,
                Ok(change) => {
                    outcome.registry_changed |= change.is_mutation();
                    PriceRowStatus::Registered
                }
                Err(error) => {
                    let reason = error.to_string();
                    outcome.rejections.push(reason.clone());
                    PriceRowStatus::Rejected { reason }
                }
            };
        }

        outcome
    }

    pub fn row(&self, id: RowId) -> Option<&PriceRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.row(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn view(&self, registry: &PriceRegistry) -> PriceTableView {
        PriceTableView {
            rows: self
                .rows
                .iter()
                .map(|row| PriceRowView {
                    id: row.id,
                    input: row.input.clone(),
                    status: row.status.clone(),
                    formatted_value: format_currency(row.input.value),
                })
                .collect(),
            registered_keys: registry.len(),
        }
    }
}
