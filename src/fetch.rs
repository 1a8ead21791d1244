use rand::Rng;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::config::Settings;
use crate::error::FetchError;
use crate::identifier::Identifier;
use crate::models::{DisplayModel, PrimaryRecord, SpeciesRecord};
use crate::projector::project;

/// Thin async client over the two PokéAPI endpoints the card needs.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    base_url: String,
    language: String,
    client: reqwest::Client,
}

impl PokeApiClient {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            language: settings.language.clone(),
            client,
        })
    }

    /// Runs one fetch cycle. `None` picks a random identifier.
    pub async fn fetch(&self, id: Option<Identifier>) -> Result<DisplayModel, FetchError> {
        let id = id.unwrap_or_else(|| Identifier::random(&mut rand::rng()));
        self.fetch_id(id).await
    }

    /// Random-identifier path with a caller-supplied random source.
    pub async fn fetch_random_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<DisplayModel, FetchError> {
        let id = Identifier::random(rng);
        self.fetch_id(id).await
    }

    async fn fetch_id(&self, id: Identifier) -> Result<DisplayModel, FetchError> {
        let result = self.fetch_and_project(id).await;
        match &result {
            Ok(model) => info!(id = %id, name = %model.name, "fetched pokemon"),
            Err(e) => error!(id = %id, error = %e, "error fetching pokemon data"),
        }
        result
    }

    async fn fetch_and_project(&self, id: Identifier) -> Result<DisplayModel, FetchError> {
        let primary: PrimaryRecord = self.get_json(&format!("pokemon/{}", id)).await?;
        // The species lives under the id the provider answered with, which
        // is not always the one we asked for.
        let species: SpeciesRecord = self
            .get_json(&format!("pokemon-species/{}", primary.id))
            .await?;
        project(&primary, &species, &self.language)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "GET");
        let bytes = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Downloads the raw bytes behind a sprite URL.
    pub async fn fetch_sprite(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}
