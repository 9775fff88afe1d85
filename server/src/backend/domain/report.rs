//! Report export: a fully recomputed snapshot plus the stored photos, handed
//! to a renderer.
//!
//! PDF layout is not produced here; `JsonReportRenderer` serializes the
//! snapshot so an external renderer can lay it out.

use anyhow::Result;
use log::info;
use shared::ReportSnapshot;
use std::sync::Arc;

use super::gallery::GalleryService;
use super::workbook_service::WorkbookService;
use crate::backend::storage::StoredPhoto;

/// Everything a renderer needs, read-only
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBundle {
    pub snapshot: ReportSnapshot,
    pub photos: Vec<StoredPhoto>,
}

pub trait ReportRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn render(&self, bundle: &ReportBundle) -> Result<Vec<u8>>;
}

/// Renders the snapshot as pretty printed JSON; photo bytes are left out
pub struct JsonReportRenderer;

impl ReportRenderer for JsonReportRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, bundle: &ReportBundle) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&bundle.snapshot)?)
    }
}

#[derive(Clone)]
pub struct ReportService {
    renderer: Arc<dyn ReportRenderer>,
}

impl Default for ReportService {
    fn default() -> Self {
        Self::new(Arc::new(JsonReportRenderer))
    }
}

impl ReportService {
    pub fn new(renderer: Arc<dyn ReportRenderer>) -> Self {
        Self { renderer }
    }

    pub fn content_type(&self) -> &'static str {
        self.renderer.content_type()
    }

    /// Collect photos, then settle the workbook and capture its snapshot
    pub async fn build(&self, workbook: &WorkbookService, gallery: &GalleryService) -> ReportBundle {
        let photos = gallery.all_photos().await;
        let photos_available = photos.is_some();
        let photos = photos.unwrap_or_default();
        let summaries = photos.iter().map(|photo| photo.summary.clone()).collect();

        let snapshot = workbook.snapshot(summaries, photos_available);
        info!(
            "Report snapshot built: grand total {:.2}, {} photos",
            snapshot.totals.grand,
            photos.len()
        );
        ReportBundle { snapshot, photos }
    }

    pub async fn render(&self, workbook: &WorkbookService, gallery: &GalleryService) -> Result<Vec<u8>> {
        let bundle = self.build(workbook, gallery).await;
        self.renderer.render(&bundle)
    }
}
