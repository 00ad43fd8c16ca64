//! Person records enriched with predicted demographics.
//!
//! New persons are created from a name/surname pair; the first name is sent to
//! age, gender and nationality prediction providers and whatever they answer
//! is stored alongside the record. Lookup failures never fail the create.

pub mod config;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod person;

pub use config::{DatabaseConfig, LookupConfig, PersonConfig};
pub use enrichment::{Enricher, EnrichmentError, EnrichmentService, LookupClient, LookupKind};
pub use error::{Error, Result};
pub use person::{
    InMemoryPersonRepository, Person, PersonChanges, PersonDraft, PersonError, PersonFilter,
    PersonId, PersonPage, PersonRepository, PersonService, PostgresPersonRepository,
};
