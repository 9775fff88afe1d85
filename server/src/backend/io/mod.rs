//! # IO Layer
//!
//! The interface between the workbook engine and its clients.
//!
//! ## Key Responsibilities
//!
//! - **REST Endpoints**: HTTP handlers for tables, records, totals,
//!   geography, photos and report export
//! - **Request Parsing**: Turning path segments and JSON bodies into domain
//!   inputs, rejecting malformed ones with `400`
//! - **Error Translation**: Mapping `LaudoError` and `GalleryError` onto
//!   status codes with a JSON error body
//!
//! Handlers never compute anything themselves; every mutation goes through
//! `WorkbookService` or `GalleryService`.

pub mod rest;

pub use rest::*;
