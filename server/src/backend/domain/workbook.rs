//! The appraisal workbook: single owner of the price registry, every table
//! and the producer / property records.
//!
//! ## Key Responsibilities
//! - **Row lifecycle**: add and remove rows in any table, each followed by a
//!   full recalculation pass.
//! - **Debounced edits**: field edits are applied to the row inputs right
//!   away, while the recompute they require is scheduled per row and only
//!   runs once the row has been quiet for the debounce window.
//! - **Consistency**: every read that leaves the engine (`totals`,
//!   `table_view`, `snapshot`) reflects a completed pass.
//!
//! The workbook is synchronous. The server wraps it in a mutex and drives the
//! debounce timers with tokio; tests drive them with explicit `Instant`s.

use chrono::Utc;
use log::{debug, info, warn};
use shared::{
    AggregateTotals, AnyTableView, HerdTableView, PhotoSummary, ProducerRecord, PropertyRecord,
    PropertyView, RecordView, ReportSnapshot, RowId, RowInput, TableKind, ValidationWarning,
};
use std::time::{Duration, Instant};

use super::debounce::{DebounceToken, Debouncer, DEFAULT_DEBOUNCE_WINDOW};
use super::errors::LaudoError;
use super::price_registry::PriceRegistry;
use super::price_table::PriceTable;
use super::recalculation::{run_full_pass, PassReport, ProductionTables};
use super::records::{property_views, RecordList};
use super::rows::DEFAULT_DAIRY_PRICE_KEY;
use super::seed::seed_rows;
use super::totals::format_totals;

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookConfig {
    pub debounce_window: Duration,
    /// Registry key that prices every dairy row
    pub dairy_price_key: String,
}

impl Default for WorkbookConfig {
    fn default() -> Self {
        Self {
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            dairy_price_key: DEFAULT_DAIRY_PRICE_KEY.to_string(),
        }
    }
}

/// Debounce key: one pending recompute per row
pub type EditKey = (TableKind, RowId);

#[derive(Debug, Clone, PartialEq)]
pub struct EditReceipt {
    pub key: EditKey,
    pub token: DebounceToken,
    pub warning: Option<ValidationWarning>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddedRow {
    pub id: RowId,
    pub warnings: Vec<ValidationWarning>,
    pub report: PassReport,
}

pub struct LaudoWorkbook {
    config: WorkbookConfig,
    registry: PriceRegistry,
    prices: PriceTable,
    tables: ProductionTables,
    debouncer: Debouncer<EditKey>,
    totals: AggregateTotals,
    rejections: Vec<String>,
    producers: RecordList<ProducerRecord>,
    properties: RecordList<PropertyRecord>,
}

impl LaudoWorkbook {
    /// An empty workbook: no rows, one blank producer and property
    pub fn new(config: WorkbookConfig) -> Self {
        let debouncer = Debouncer::new(config.debounce_window);
        let mut workbook = Self {
            config,
            registry: PriceRegistry::new(),
            prices: PriceTable::new(),
            tables: ProductionTables::new(),
            debouncer,
            totals: AggregateTotals::default(),
            rejections: Vec::new(),
            producers: RecordList::new(),
            properties: RecordList::new(),
        };
        workbook.run_pass();
        workbook
    }

    /// A workbook preloaded with the default sheet rows
    pub fn with_seed_data(config: WorkbookConfig) -> Result<Self, LaudoError> {
        let mut workbook = Self::new(config);
        let rows = seed_rows();
        let count = rows.len();
        for input in rows {
            workbook.insert_row(input)?;
        }
        let report = workbook.run_pass();
        info!(
            "Seeded workbook with {} rows, grand total {:.2}",
            count, report.totals.grand
        );
        Ok(workbook)
    }

    pub fn config(&self) -> &WorkbookConfig {
        &self.config
    }

    fn run_pass(&mut self) -> PassReport {
        let report = run_full_pass(
            &mut self.registry,
            &mut self.prices,
            &mut self.tables,
            &self.config.dairy_price_key,
        );
        self.totals = report.totals;
        self.rejections = report.rejections.clone();
        report
    }

    fn insert_row(&mut self, input: RowInput) -> Result<(RowId, Vec<ValidationWarning>), LaudoError> {
        match input {
            RowInput::Prices(row) => self.prices.add_row(&mut self.registry, row),
            other => {
                let kind = other.kind();
                let table = self.tables.table_mut(kind).ok_or(LaudoError::InvalidRowInput {
                    kind,
                    reason: "no production table for this kind".to_string(),
                })?;
                table.add_input(other)
            }
        }
    }

    /// Add a row and recalculate. A price row whose key is already owned is
    /// refused with `DuplicateKey` and nothing changes.
    pub fn add_row(&mut self, input: RowInput) -> Result<AddedRow, LaudoError> {
        let kind = input.kind();
        let (id, warnings) = self.insert_row(input)?;
        info!("Added row {} to table {}", id, kind);
        let report = self.run_pass();
        Ok(AddedRow { id, warnings, report })
    }

    /// Apply a raw field edit and schedule the row's recompute.
    ///
    /// The returned token must be passed to `fire_debounced` once the debounce
    /// window has elapsed; a newer edit to the same row invalidates it.
    pub fn edit_field(
        &mut self,
        kind: TableKind,
        id: RowId,
        field: &str,
        raw: &str,
        now: Instant,
    ) -> Result<EditReceipt, LaudoError> {
        let warning = match kind {
            TableKind::Prices => self.prices.edit(id, field, raw)?,
            _ => self
                .tables
                .table_mut(kind)
                .ok_or(LaudoError::RowNotFound { kind, id })?
                .edit_field(id, field, raw)?,
        };
        if let Some(warning) = &warning {
            warn!("Edit {}.{} on row {}: {}", kind, field, id, warning.message);
        }

        let key = (kind, id);
        let token = self.debouncer.schedule(key, now);
        debug!("Scheduled recompute for {} row {}", kind, id);
        Ok(EditReceipt { key, token, warning })
    }

    /// Run the pending recompute for `key` if `token` is still current
    pub fn fire_debounced(&mut self, key: &EditKey, token: DebounceToken) -> Option<PassReport> {
        if self.debouncer.fire(key, token) {
            Some(self.run_pass())
        } else {
            None
        }
    }

    /// Run one pass covering every recompute whose window has elapsed
    pub fn flush_due(&mut self, now: Instant) -> Option<PassReport> {
        if self.debouncer.take_due(now).is_empty() {
            None
        } else {
            Some(self.run_pass())
        }
    }

    /// Settle every pending edit and run a full pass
    pub fn flush_all(&mut self) -> PassReport {
        let drained = self.debouncer.drain_all();
        if !drained.is_empty() {
            debug!("Flushing {} pending edits", drained.len());
        }
        self.run_pass()
    }

    /// Explicit recalculation request
    pub fn recalculate_all(&mut self) -> PassReport {
        info!("Recalculating all tables");
        self.flush_all()
    }

    pub fn remove_row(&mut self, kind: TableKind, id: RowId) -> Result<PassReport, LaudoError> {
        match kind {
            TableKind::Prices => {
                self.prices.remove_row(&mut self.registry, id)?;
            }
            _ => {
                self.tables
                    .table_mut(kind)
                    .ok_or(LaudoError::RowNotFound { kind, id })?
                    .remove(id)?;
            }
        }
        self.debouncer.cancel(&(kind, id));
        info!("Removed row {} from table {}", id, kind);
        Ok(self.run_pass())
    }

    pub fn totals(&self) -> AggregateTotals {
        self.totals
    }

    /// Rejections reported by the most recent pass
    pub fn rejections(&self) -> &[String] {
        &self.rejections
    }

    pub fn is_pending(&self, key: &EditKey) -> bool {
        self.debouncer.is_pending(key)
    }

    pub fn has_pending_edits(&self) -> bool {
        self.debouncer.pending_count() > 0
    }

    pub fn registry(&self) -> &PriceRegistry {
        &self.registry
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn tables(&self) -> &ProductionTables {
        &self.tables
    }

    pub fn contains_row(&self, kind: TableKind, id: RowId) -> bool {
        match kind {
            TableKind::Prices => self.prices.contains(id),
            _ => self.tables.table(kind).map(|table| table.contains(id)).unwrap_or(false),
        }
    }

    fn herd_view(&self) -> HerdTableView {
        HerdTableView {
            table: self.tables.herd.view(),
            head_count: self.tables.herd.head_count(),
        }
    }

    pub fn table_view(&self, kind: TableKind) -> AnyTableView {
        match kind {
            TableKind::Prices => AnyTableView::Prices(self.prices.view(&self.registry)),
            TableKind::Agricultural => AnyTableView::Agricultural(self.tables.agricultural.view()),
            TableKind::Beef => AnyTableView::Beef(self.tables.beef.view()),
            TableKind::Dairy => AnyTableView::Dairy(self.tables.dairy.view()),
            TableKind::DiverseCrop => AnyTableView::DiverseCrop(self.tables.diverse_crop.view()),
            TableKind::Historical => AnyTableView::Historical(self.tables.historical.view()),
            TableKind::Herd => AnyTableView::Herd(self.herd_view()),
            TableKind::Assets => AnyTableView::Assets(self.tables.assets.view()),
        }
    }

    /// Settle pending edits and capture a consistent view of the whole workbook
    pub fn snapshot(&mut self, photos: Vec<PhotoSummary>, photos_available: bool) -> ReportSnapshot {
        self.flush_all();
        ReportSnapshot {
            generated_at: Utc::now().to_rfc3339(),
            producers: self.producers.views(),
            properties: property_views(&self.properties),
            prices: self.prices.view(&self.registry),
            agricultural: self.tables.agricultural.view(),
            beef: self.tables.beef.view(),
            dairy: self.tables.dairy.view(),
            diverse_crop: self.tables.diverse_crop.view(),
            historical: self.tables.historical.view(),
            herd: self.herd_view(),
            assets: self.tables.assets.view(),
            totals: self.totals,
            formatted_totals: format_totals(&self.totals),
            photos,
            photos_available,
        }
    }

    pub fn producer_views(&self) -> Vec<RecordView<ProducerRecord>> {
        self.producers.views()
    }

    pub fn add_producer(&mut self, record: ProducerRecord) -> (usize, Vec<ValidationWarning>) {
        self.producers.add(record)
    }

    pub fn update_producer(
        &mut self,
        index: usize,
        record: ProducerRecord,
    ) -> Result<Vec<ValidationWarning>, LaudoError> {
        self.producers.update(index, record)
    }

    pub fn remove_last_producer(&mut self) -> Result<(), LaudoError> {
        self.producers.remove_last().map(|_| ())
    }

    pub fn property_views(&self) -> Vec<PropertyView> {
        property_views(&self.properties)
    }

    pub fn add_property(&mut self, record: PropertyRecord) -> (usize, Vec<ValidationWarning>) {
        self.properties.add(record)
    }

    pub fn update_property(
        &mut self,
        index: usize,
        record: PropertyRecord,
    ) -> Result<Vec<ValidationWarning>, LaudoError> {
        self.properties.update(index, record)
    }

    pub fn remove_last_property(&mut self) -> Result<(), LaudoError> {
        self.properties.remove_last().map(|_| ())
    }
}

impl Default for LaudoWorkbook {
    fn default() -> Self {
        Self::new(WorkbookConfig::default())
    }
}
