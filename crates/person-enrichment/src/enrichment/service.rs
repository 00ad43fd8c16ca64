use async_trait::async_trait;
use tracing::{debug, warn};

use super::{EnrichmentError, LookupClient};
use crate::person::PersonDraft;

/// Something that can fill in predicted attributes for a first name.
///
/// Implementations never fail: a lookup that cannot be resolved leaves its
/// field unset on the returned draft.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Draft with `name` set and whichever attributes could be resolved
    async fn enrich(&self, name: &str) -> PersonDraft;
}

/// Runs the age, gender and nationality lookups for a name
#[derive(Clone)]
pub struct EnrichmentService {
    client: LookupClient,
}

impl EnrichmentService {
    pub fn new(client: LookupClient) -> Self {
        Self { client }
    }
}

fn absorb<T>(name: &str, result: Result<T, EnrichmentError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(person = name, error = %e, "Enrichment lookup failed");
            None
        }
    }
}

#[async_trait]
impl Enricher for EnrichmentService {
    async fn enrich(&self, name: &str) -> PersonDraft {
        // Independent lookups; one failing never cancels the others.
        let (age, gender, nationality) = tokio::join!(
            self.client.age(name),
            self.client.gender(name),
            self.client.nationality(name),
        );

        let draft = PersonDraft {
            name: name.to_string(),
            age: absorb(name, age).flatten(),
            gender: absorb(name, gender).flatten(),
            nationality: absorb(name, nationality),
            ..Default::default()
        };

        debug!(
            person = name,
            age = ?draft.age,
            gender = ?draft.gender,
            nationality = ?draft.nationality,
            "Enrichment finished"
        );

        draft
    }
}
