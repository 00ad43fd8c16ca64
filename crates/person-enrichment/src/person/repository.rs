use async_trait::async_trait;

use super::{Person, PersonChanges, PersonDraft, PersonFilter, PersonId, PersonPage, PersonResult};

#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Persist a draft, assigning identity and timestamps
    async fn create(&self, draft: PersonDraft) -> PersonResult<Person>;

    /// Get a person by ID
    async fn get(&self, id: PersonId) -> PersonResult<Person>;

    /// Get one page of persons matching the filter, ordered by ID
    async fn list(&self, filter: &PersonFilter) -> PersonResult<PersonPage>;

    /// Apply a partial update and return the stored result
    async fn update(&self, id: PersonId, changes: PersonChanges) -> PersonResult<Person>;

    /// Permanently remove a person
    async fn delete(&self, id: PersonId) -> PersonResult<()>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> PersonResult<()>;
}
