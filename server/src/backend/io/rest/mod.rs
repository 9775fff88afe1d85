//! # REST API Module
//!
//! HTTP handlers for the laudo service, grouped by area. Areas with several
//! routes expose a `router()` that `create_router` nests under `/api`.
//!
//! ## Routes
//!
//! - `GET    /api/tables/:kind` - rows, outputs and subtotal of one table
//! - `POST   /api/tables/:kind/rows` - add a row (optional JSON body)
//! - `PATCH  /api/tables/:kind/rows/:id` - raw field edit, settles after the debounce window
//! - `DELETE /api/tables/:kind/rows/:id` - remove a row
//! - `POST   /api/recalculate`, `GET /api/totals`
//! - `/api/producers`, `/api/properties` - record lists
//! - `/api/geography/states[/:code/municipalities]`
//! - `/api/photos[/:id]`
//! - `GET    /api/report`

pub mod errors;
pub mod gallery_apis;
pub mod geography_apis;
pub mod recalculation_apis;
pub mod record_apis;
pub mod report_apis;
pub mod table_apis;

pub use recalculation_apis::{get_totals, recalculate};
pub use report_apis::get_report;
