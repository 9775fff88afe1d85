//! Remote geography sources: IBGE for states, BrasilAPI for municipalities.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use shared::StateInfo;
use std::time::Duration;

use crate::backend::storage::traits::GeographySource;

/// Placeholder replaced by the state code in the municipalities URL
pub const STATE_CODE_PLACEHOLDER: &str = "{uf}";

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent("laudo-server/0.1")
        .build()
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct IbgeState {
    sigla: String,
    nome: String,
}

#[derive(Debug, Deserialize)]
struct BrasilApiMunicipality {
    nome: String,
}

/// IBGE localidades API, states only
pub struct IbgeStatesSource {
    client: reqwest::Client,
    url: String,
}

impl IbgeStatesSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            url: url.into(),
        }
    }
}

#[async_trait]
impl GeographySource for IbgeStatesSource {
    fn name(&self) -> &str {
        "ibge"
    }

    async fn list_states(&self) -> Result<Option<Vec<StateInfo>>> {
        debug!("GET {}", self.url);
        let states: Vec<IbgeState> = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(Some(
            states
                .into_iter()
                .map(|state| StateInfo {
                    code: state.sigla,
                    name: state.nome,
                })
                .collect(),
        ))
    }

    async fn list_municipalities(&self, _state_code: &str) -> Result<Option<Vec<String>>> {
        Ok(None)
    }
}

/// BrasilAPI IBGE mirror, municipalities by state code
pub struct BrasilApiMunicipalitiesSource {
    client: reqwest::Client,
    url_template: String,
}

impl BrasilApiMunicipalitiesSource {
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            url_template: url_template.into(),
        }
    }

    fn url_for(&self, state_code: &str) -> String {
        self.url_template
            .replace(STATE_CODE_PLACEHOLDER, &state_code.trim().to_uppercase())
    }
}

#[async_trait]
impl GeographySource for BrasilApiMunicipalitiesSource {
    fn name(&self) -> &str {
        "brasilapi"
    }

    async fn list_states(&self) -> Result<Option<Vec<StateInfo>>> {
        Ok(None)
    }

    async fn list_municipalities(&self, state_code: &str) -> Result<Option<Vec<String>>> {
        let url = self.url_for(state_code);
        debug!("GET {}", url);
        let municipalities: Vec<BrasilApiMunicipality> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(Some(municipalities.into_iter().map(|m| m.nome).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_municipalities_url_substitutes_state_code() {
        let source = BrasilApiMunicipalitiesSource::new(
            "https://brasilapi.com.br/api/ibge/municipios/v1/{uf}",
            Duration::from_secs(5),
        );
        assert_eq!(
            source.url_for(" mg"),
            "https://brasilapi.com.br/api/ibge/municipios/v1/MG"
        );
    }

    #[tokio::test]
    async fn test_sources_decline_what_they_do_not_serve() {
        let ibge = IbgeStatesSource::new("http://127.0.0.1:9/estados", Duration::from_millis(200));
        let brasil = BrasilApiMunicipalitiesSource::new("http://127.0.0.1:9/{uf}", Duration::from_millis(200));

        assert!(ibge.list_municipalities("MG").await.unwrap().is_none());
        assert!(brasil.list_states().await.unwrap().is_none());
    }
}
