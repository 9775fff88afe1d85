//! Static states/municipalities dataset shipped with the service.
//!
//! File format: `{"estados": [{"sigla": "MG", "nome": "Minas Gerais", "cidades": [...]}]}`

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use shared::StateInfo;
use std::path::Path;

use crate::backend::storage::traits::GeographySource;

#[derive(Debug, Clone, Deserialize)]
struct Dataset {
    #[serde(default)]
    estados: Vec<DatasetState>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatasetState {
    sigla: String,
    nome: String,
    #[serde(default)]
    cidades: Vec<String>,
}

pub struct BundledGeography {
    states: Vec<DatasetState>,
}

impl BundledGeography {
    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json).context("Invalid geography dataset")?;
        Ok(Self {
            states: dataset.estados,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read geography dataset {}", path.display()))?;
        let dataset = Self::from_json(&json)?;
        info!(
            "Loaded geography dataset {} with {} states",
            path.display(),
            dataset.states.len()
        );
        Ok(dataset)
    }

    /// Minimal dataset used when no file is configured
    pub fn minimal() -> Self {
        Self {
            states: vec![DatasetState {
                sigla: "MG".to_string(),
                nome: "Minas Gerais".to_string(),
                cidades: vec![
                    "Guaranésia".to_string(),
                    "Guaxupé".to_string(),
                    "Belo Horizonte".to_string(),
                ],
            }],
        }
    }
}

#[async_trait]
impl GeographySource for BundledGeography {
    fn name(&self) -> &str {
        "bundled"
    }

    async fn list_states(&self) -> Result<Option<Vec<StateInfo>>> {
        Ok(Some(
            self.states
                .iter()
                .map(|state| StateInfo {
                    code: state.sigla.clone(),
                    name: state.nome.clone(),
                })
                .collect(),
        ))
    }

    async fn list_municipalities(&self, state_code: &str) -> Result<Option<Vec<String>>> {
        Ok(self
            .states
            .iter()
            .find(|state| state.sigla.eq_ignore_ascii_case(state_code))
            .map(|state| state.cidades.clone()))
    }
}
