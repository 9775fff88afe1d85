//! # Backend Module
//!
//! Contains all non-UI logic for the laudo appraisal service.
//!
//! This module serves as the orchestration layer that brings together:
//! - **Domain**: The workbook engine, record validation and collaborator services
//! - **Storage**: Photo persistence and geography data sources
//! - **IO**: The REST surface that exposes the domain to clients
//!
//! ## Architecture
//!
//! ```text
//! Client (form UI)
//!     ↓
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (workbook, services)
//!     ↓
//! Storage Layer (photo store, geography sources)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Initialize the application state from `LaudoConfig`
//! - Set up the REST API router with CORS and optional static files
//! - Pick fallbacks when a collaborator cannot be set up

pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use log::{info, warn};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::backend::domain::{
    GalleryService, GeographyService, LaudoWorkbook, PhotoPolicy, ReportService, WorkbookService,
};
use crate::backend::storage::{
    BlobStore, BrasilApiMunicipalitiesSource, BundledGeography, FsPhotoStore, GeographySource,
    IbgeStatesSource, MemoryPhotoStore,
};
use crate::config::{GeographySettings, LaudoConfig, ServerConfig};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub workbook_service: WorkbookService,
    pub gallery_service: GalleryService,
    pub geography_service: GeographyService,
    pub report_service: ReportService,
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &LaudoConfig) -> Result<AppState> {
    info!("Setting up workbook");
    let workbook_config = config.workbook.to_workbook_config();
    let workbook = if config.workbook.seed_defaults {
        LaudoWorkbook::with_seed_data(workbook_config)?
    } else {
        LaudoWorkbook::new(workbook_config)
    };
    let workbook_service = WorkbookService::new(workbook);

    info!("Setting up photo store in {:?}", config.data_directory);
    let store: Arc<dyn BlobStore> = match FsPhotoStore::new(&config.data_directory) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Photo directory unavailable ({}); keeping photos in memory", e);
            Arc::new(MemoryPhotoStore::new())
        }
    };
    let policy = PhotoPolicy::new(config.gallery.allowed_types.clone(), config.gallery.max_size_mb);
    let gallery_service = GalleryService::new(store, policy);

    info!("Setting up geography sources");
    let geography_service = GeographyService::new(geography_sources(&config.geography));
    info!("Geography fallback chain: {:?}", geography_service.source_names());

    info!("Setting up application state");
    Ok(AppState {
        workbook_service,
        gallery_service,
        geography_service,
        report_service: ReportService::default(),
    })
}

fn geography_sources(settings: &GeographySettings) -> Vec<Arc<dyn GeographySource>> {
    let mut sources: Vec<Arc<dyn GeographySource>> = Vec::new();
    if settings.enable_remote {
        sources.push(Arc::new(IbgeStatesSource::new(
            settings.states_url.clone(),
            settings.request_timeout(),
        )));
        sources.push(Arc::new(BrasilApiMunicipalitiesSource::new(
            settings.municipalities_url.clone(),
            settings.request_timeout(),
        )));
    }

    let bundled = match &settings.bundled_dataset {
        Some(path) => BundledGeography::from_file(path).unwrap_or_else(|e| {
            warn!("Could not load geography dataset {:?}: {}", path, e);
            BundledGeography::minimal()
        }),
        None => BundledGeography::minimal(),
    };
    sources.push(Arc::new(bundled));
    sources
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, server: &ServerConfig) -> Router {
    // CORS setup to allow the form UI to make requests
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any);
    let cors = match server.allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            warn!("Invalid allowed_origin {:?}; allowing any origin", server.allowed_origin);
            cors.allow_origin(Any)
        }
    };

    let max_upload_bytes = app_state.gallery_service.policy().max_bytes();

    // Set up our application routes
    let api_routes = Router::new()
        .nest("/tables", io::table_apis::router())
        .route("/recalculate", post(io::recalculate))
        .route("/totals", get(io::get_totals))
        .nest("/producers", io::record_apis::producer_router())
        .nest("/properties", io::record_apis::property_router())
        .nest("/geography", io::geography_apis::router())
        .nest("/photos", io::gallery_apis::router(max_upload_bytes))
        .route("/report", get(io::get_report));

    // Define our main application router
    let router = Router::new().nest("/api", api_routes);
    let router = match &server.static_dir {
        Some(dir) => {
            info!("Serving static files from {:?}", dir);
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    };

    router.layer(cors).with_state(app_state)
}
