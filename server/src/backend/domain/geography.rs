//! Geography lookup over a fallback chain of sources.
//!
//! Sources are tried in order. A source that errors, declines the request or
//! returns nothing hands over to the next one; when every source is
//! exhausted the lookup reports `Unavailable` instead of failing.

use log::{info, warn};
use shared::{GeographyListing, StateInfo};
use std::sync::Arc;

use crate::backend::storage::GeographySource;

#[derive(Clone)]
pub struct GeographyService {
    sources: Vec<Arc<dyn GeographySource>>,
}

impl GeographyService {
    pub fn new(sources: Vec<Arc<dyn GeographySource>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// States sorted by code
    pub async fn list_states(&self) -> GeographyListing<StateInfo> {
        for source in &self.sources {
            match source.list_states().await {
                Ok(Some(mut states)) if !states.is_empty() => {
                    states.sort_by(|a, b| a.code.cmp(&b.code));
                    info!("Loaded {} states from {}", states.len(), source.name());
                    return GeographyListing::Available {
                        source: source.name().to_string(),
                        items: states,
                    };
                }
                Ok(_) => continue,
                Err(e) => warn!("State source {} failed: {}", source.name(), e),
            }
        }
        warn!("No geography source could list states");
        GeographyListing::Unavailable
    }

    /// Municipalities of a state sorted alphabetically, ignoring accents
    pub async fn list_municipalities(&self, state_code: &str) -> GeographyListing<String> {
        let code = state_code.trim().to_uppercase();
        if code.is_empty() {
            return GeographyListing::Unavailable;
        }

        for source in &self.sources {
            match source.list_municipalities(&code).await {
                Ok(Some(mut names)) if !names.is_empty() => {
                    names.sort_by_cached_key(|name| (fold_accents(name), name.clone()));
                    info!(
                        "Loaded {} municipalities of {} from {}",
                        names.len(),
                        code,
                        source.name()
                    );
                    return GeographyListing::Available {
                        source: source.name().to_string(),
                        items: names,
                    };
                }
                Ok(_) => continue,
                Err(e) => warn!("Municipality source {} failed for {}: {}", source.name(), code, e),
            }
        }
        warn!("No geography source could list municipalities of {}", code);
        GeographyListing::Unavailable
    }
}

/// Lower-case and strip Portuguese diacritics for collation
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .flat_map(|c| c.to_lowercase())
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
