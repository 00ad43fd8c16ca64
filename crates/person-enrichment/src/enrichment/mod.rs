//! Name-based demographic enrichment.
//!
//! [`LookupClient`] performs one typed JSON GET against a prediction provider,
//! and [`EnrichmentService`] runs the age, gender and nationality lookups for
//! a name and folds whatever succeeded onto a [`PersonDraft`](crate::person::PersonDraft).

pub mod error;
pub mod lookup;
pub mod service;

pub use error::{EnrichmentError, EnrichmentResult};
pub use lookup::{
    AgePrediction, CountryCandidate, GenderPrediction, LookupClient, LookupKind,
    NationalityPrediction, Prediction, pick_nationality,
};
pub use service::{Enricher, EnrichmentService};
