//! Prediction provider client.
//!
//! Every provider is queried the same way, `GET {base}/?name={name}`, and
//! answers with a small JSON document whose shape depends on what is being
//! predicted. The shape and its interpretation live in a [`Prediction`]
//! implementation; the transport lives in [`LookupClient::predict`].
//!
//! Example bodies:
//! ```json
//! {"count": 1021, "name": "michael", "age": 62}
//! {"count": 1094417, "name": "michael", "gender": "male", "probability": 1.0}
//! {"count": 2, "name": "michael", "country": [{"country_id": "US", "probability": 0.09}]}
//! ```

use serde::Deserialize;
use serde::de::DeserializeOwned;
use strum_macros::{Display, EnumString};
use tracing::debug;

use super::{EnrichmentError, EnrichmentResult};
use crate::config::LookupConfig;

/// Longest slice of an error body kept in [`EnrichmentError::Status`]
const ERROR_BODY_LIMIT: usize = 200;

/// Which attribute a provider predicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LookupKind {
    Age,
    Gender,
    Nationality,
}

/// Response shape and decoding rule for one kind of lookup
pub trait Prediction {
    const KIND: LookupKind;

    /// Body exactly as the provider sends it
    type Body: DeserializeOwned;

    /// What callers get back
    type Output;

    fn decode(body: Self::Body) -> EnrichmentResult<Self::Output>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgeBody {
    #[serde(default)]
    pub age: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenderBody {
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NationalityBody {
    #[serde(default)]
    pub country: Vec<CountryCandidate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountryCandidate {
    pub country_id: String,
    pub probability: f64,
}

/// Best-guess age; `None` when the provider has no match
pub struct AgePrediction;

impl Prediction for AgePrediction {
    const KIND: LookupKind = LookupKind::Age;
    type Body = AgeBody;
    type Output = Option<u32>;

    fn decode(body: AgeBody) -> EnrichmentResult<Option<u32>> {
        Ok(body.age)
    }
}

/// Gender label; `None` when the provider has no prediction
pub struct GenderPrediction;

impl Prediction for GenderPrediction {
    const KIND: LookupKind = LookupKind::Gender;
    type Body = GenderBody;
    type Output = Option<String>;

    fn decode(body: GenderBody) -> EnrichmentResult<Option<String>> {
        Ok(body.gender.filter(|g| !g.trim().is_empty()))
    }
}

/// Most probable country code, lower-cased.
///
/// An empty candidate list is an error rather than an empty answer.
pub struct NationalityPrediction;

impl Prediction for NationalityPrediction {
    const KIND: LookupKind = LookupKind::Nationality;
    type Body = NationalityBody;
    type Output = String;

    fn decode(body: NationalityBody) -> EnrichmentResult<String> {
        pick_nationality(&body.country)
            .map(|c| c.country_id.trim().to_lowercase())
            .filter(|code| !code.is_empty())
            .ok_or(EnrichmentError::NoNationality)
    }
}

/// Highest-probability candidate. Scans in provider order and only replaces
/// the running best on a strictly greater probability, so the earliest entry
/// wins a tie.
pub fn pick_nationality(candidates: &[CountryCandidate]) -> Option<&CountryCandidate> {
    let mut best: Option<&CountryCandidate> = None;
    for candidate in candidates {
        if best.is_none_or(|b| candidate.probability > b.probability) {
            best = Some(candidate);
        }
    }
    best
}

/// HTTP client for the three prediction providers
#[derive(Clone)]
pub struct LookupClient {
    http_client: reqwest::Client,
    config: LookupConfig,
}

impl LookupClient {
    /// Create a client identifying itself with the crate name and version
    pub fn new(config: LookupConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self::with_client(config, http_client))
    }

    /// Create a client around an existing reqwest client
    pub fn with_client(config: LookupConfig, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            config,
        }
    }

    fn base_url(&self, kind: LookupKind) -> &str {
        match kind {
            LookupKind::Age => &self.config.agify_url,
            LookupKind::Gender => &self.config.genderize_url,
            LookupKind::Nationality => &self.config.nationalize_url,
        }
    }

    /// Query the provider for `P` and decode its answer
    pub async fn predict<P: Prediction>(&self, name: &str) -> EnrichmentResult<P::Output> {
        let kind = P::KIND;
        let url = format!("{}/", self.base_url(kind).trim_end_matches('/'));
        debug!(%kind, %url, person = name, "Sending lookup request");

        let response = self
            .http_client
            .get(&url)
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| EnrichmentError::Network {
                kind,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichmentError::Status {
                kind,
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EnrichmentError::Network {
                kind,
                message: e.to_string(),
            })?;

        let body: P::Body = serde_json::from_slice(&bytes).map_err(|e| EnrichmentError::Parse {
            kind,
            message: e.to_string(),
        })?;

        P::decode(body)
    }

    pub async fn age(&self, name: &str) -> EnrichmentResult<Option<u32>> {
        self.predict::<AgePrediction>(name).await
    }

    pub async fn gender(&self, name: &str) -> EnrichmentResult<Option<String>> {
        self.predict::<GenderPrediction>(name).await
    }

    pub async fn nationality(&self, name: &str) -> EnrichmentResult<String> {
        self.predict::<NationalityPrediction>(name).await
    }
}
