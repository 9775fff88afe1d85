//! Shared handle to the session workbook.
//!
//! The workbook itself is synchronous; this service owns it behind a mutex
//! and turns debounce tokens into tokio timers. Every mutation runs under the
//! lock from start to finish, which is what makes the registry's
//! check-and-set atomic and keeps passes from interleaving.

use log::debug;
use shared::{
    AggregateTotals, AnyTableView, PhotoSummary, ProducerRecord, PropertyRecord, PropertyView,
    RecordView, ReportSnapshot, RowId, RowInput, TableKind, ValidationWarning,
};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::errors::LaudoError;
use super::recalculation::PassReport;
use super::workbook::{AddedRow, EditReceipt, LaudoWorkbook};

#[derive(Clone)]
pub struct WorkbookService {
    workbook: Arc<Mutex<LaudoWorkbook>>,
    debounce_window: Duration,
}

impl WorkbookService {
    pub fn new(workbook: LaudoWorkbook) -> Self {
        let debounce_window = workbook.config().debounce_window;
        Self {
            workbook: Arc::new(Mutex::new(workbook)),
            debounce_window,
        }
    }

    /// Run `f` with exclusive access to the workbook
    pub fn with<R>(&self, f: impl FnOnce(&mut LaudoWorkbook) -> R) -> R {
        let mut workbook = self.workbook.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut workbook)
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    pub fn add_row(&self, input: RowInput) -> Result<AddedRow, LaudoError> {
        self.with(|workbook| workbook.add_row(input))
    }

    /// Apply an edit now and recompute once the row has been quiet for the
    /// debounce window. Must be called from within a tokio runtime.
    pub fn edit_field(
        &self,
        kind: TableKind,
        id: RowId,
        field: &str,
        raw: &str,
    ) -> Result<EditReceipt, LaudoError> {
        let receipt = self.with(|workbook| workbook.edit_field(kind, id, field, raw, Instant::now()))?;

        let service = self.clone();
        let key = receipt.key;
        let token = receipt.token;
        tokio::spawn(async move {
            tokio::time::sleep(service.debounce_window).await;
            if service.with(|workbook| workbook.fire_debounced(&key, token)).is_some() {
                debug!("Debounced recompute ran for {} row {}", key.0, key.1);
            }
        });

        Ok(receipt)
    }

    pub fn remove_row(&self, kind: TableKind, id: RowId) -> Result<PassReport, LaudoError> {
        self.with(|workbook| workbook.remove_row(kind, id))
    }

    pub fn recalculate(&self) -> PassReport {
        self.with(|workbook| workbook.recalculate_all())
    }

    pub fn totals(&self) -> AggregateTotals {
        self.with(|workbook| workbook.totals())
    }

    pub fn table_view(&self, kind: TableKind) -> AnyTableView {
        self.with(|workbook| workbook.table_view(kind))
    }

    pub fn is_pending(&self, kind: TableKind, id: RowId) -> bool {
        self.with(|workbook| workbook.is_pending(&(kind, id)))
    }

    pub fn snapshot(&self, photos: Vec<PhotoSummary>, photos_available: bool) -> ReportSnapshot {
        self.with(|workbook| workbook.snapshot(photos, photos_available))
    }

    pub fn producers(&self) -> Vec<RecordView<ProducerRecord>> {
        self.with(|workbook| workbook.producer_views())
    }

    pub fn add_producer(&self, record: ProducerRecord) -> (usize, Vec<ValidationWarning>) {
        self.with(|workbook| workbook.add_producer(record))
    }

    pub fn update_producer(&self, index: usize, record: ProducerRecord) -> Result<Vec<ValidationWarning>, LaudoError> {
        self.with(|workbook| workbook.update_producer(index, record))
    }

    pub fn remove_last_producer(&self) -> Result<(), LaudoError> {
        self.with(|workbook| workbook.remove_last_producer())
    }

    pub fn properties(&self) -> Vec<PropertyView> {
        self.with(|workbook| workbook.property_views())
    }

    pub fn add_property(&self, record: PropertyRecord) -> (usize, Vec<ValidationWarning>) {
        self.with(|workbook| workbook.add_property(record))
    }

    pub fn update_property(&self, index: usize, record: PropertyRecord) -> Result<Vec<ValidationWarning>, LaudoError> {
        self.with(|workbook| workbook.update_property(index, record))
    }

    pub fn remove_last_property(&self) -> Result<(), LaudoError> {
        self.with(|workbook| workbook.remove_last_property())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::workbook::WorkbookConfig;
    use shared::{AgriculturalRowInput, PriceRowInput};

    fn service_with_window(window: Duration) -> WorkbookService {
        WorkbookService::new(LaudoWorkbook::new(WorkbookConfig {
            debounce_window: window,
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn test_debounced_edit_settles_after_window() {
        let service = service_with_window(Duration::from_millis(20));
        service
            .add_row(RowInput::Prices(PriceRowInput {
                key: "MILHO".to_string(),
                value: 63.0,
                ..Default::default()
            }))
            .unwrap();
        let row = service
            .add_row(RowInput::Agricultural(AgriculturalRowInput {
                activity_key: "MILHO".to_string(),
                area: 2.0,
                yield_per_area: 50.0,
                ..Default::default()
            }))
            .unwrap();

        service.edit_field(TableKind::Agricultural, row.id, "area", "3").unwrap();
        service.edit_field(TableKind::Agricultural, row.id, "area", "4").unwrap();
        assert!(service.is_pending(TableKind::Agricultural, row.id));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!service.is_pending(TableKind::Agricultural, row.id));
        assert_eq!(service.totals().agricultural, 4.0 * 50.0 * 63.0);
    }

    #[tokio::test]
    async fn test_explicit_recalculate_settles_immediately() {
        let service = service_with_window(Duration::from_secs(60));
        let row = service
            .add_row(RowInput::Agricultural(AgriculturalRowInput {
                area: 1.0,
                yield_per_area: 1.0,
                ..Default::default()
            }))
            .unwrap();

        service.edit_field(TableKind::Agricultural, row.id, "yield_per_area", "5").unwrap();
        service.recalculate();

        assert!(!service.is_pending(TableKind::Agricultural, row.id));
    }
}
