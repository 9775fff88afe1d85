//! # Domain Layer
//!
//! The appraisal workbook engine and the services around it.
//!
//! Computation flows one way: row inputs → row outputs → table subtotals →
//! aggregate totals, with the price registry feeding every priced row. All
//! of it runs synchronously inside `LaudoWorkbook`; `WorkbookService` shares
//! the workbook with the REST layer and drives debounce timers.
//!
//! ## Modules
//! - `numeric` - pt-BR decimal parsing and currency formatting
//! - `price_registry`, `price_table` - keyed unit prices and the rows that own them
//! - `rows`, `table` - per-variant row controllers and table coordination
//! - `totals`, `recalculation` - aggregation and the full recalculation pass
//! - `debounce`, `workbook`, `workbook_service` - edit settling and ownership
//! - `records`, `validation`, `seed` - producer/property data and defaults
//! - `gallery`, `geography`, `report` - collaborator-facing services

pub mod debounce;
pub mod errors;
pub mod gallery;
pub mod geography;
pub mod numeric;
pub mod price_registry;
pub mod price_table;
pub mod recalculation;
pub mod records;
pub mod report;
pub mod rows;
pub mod seed;
pub mod table;
pub mod totals;
pub mod validation;
pub mod workbook;
pub mod workbook_service;

pub use errors::LaudoError;
pub use gallery::{GalleryError, GalleryService, PhotoPolicy};
pub use geography::GeographyService;
pub use price_registry::PriceRegistry;
pub use recalculation::PassReport;
pub use report::{JsonReportRenderer, ReportRenderer, ReportService};
pub use workbook::{LaudoWorkbook, WorkbookConfig};
pub use workbook_service::WorkbookService;
