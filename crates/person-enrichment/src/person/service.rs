use std::sync::Arc;

use tracing::info;

use super::{
    Person, PersonChanges, PersonError, PersonFilter, PersonId, PersonPage, PersonRepository,
    PersonResult,
};
use crate::enrichment::Enricher;

/// Service layer for Person operations
#[derive(Clone)]
pub struct PersonService {
    repository: Arc<dyn PersonRepository>,
    enricher: Arc<dyn Enricher>,
}

fn required(field: &str, value: &str) -> PersonResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PersonError::InvalidData(format!("{} cannot be empty", field)));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl PersonService {
    /// Create a new PersonService
    pub fn new(repository: Arc<dyn PersonRepository>, enricher: Arc<dyn Enricher>) -> Self {
        Self {
            repository,
            enricher,
        }
    }

    /// Enrich a new person from their first name and persist it
    pub async fn create_person(&self, name: &str, surname: &str) -> PersonResult<Person> {
        let name = required("name", name)?;
        let surname = required("surname", surname)?;

        let mut draft = self.enricher.enrich(&name).await;
        draft.name = name;
        draft.surname = surname;

        let person = self.repository.create(draft).await?;
        info!(id = %person.id, "Person created");
        Ok(person)
    }

    /// Get a specific person by ID
    pub async fn get_person(&self, id: PersonId) -> PersonResult<Person> {
        self.repository.get(id).await
    }

    /// List persons matching the filter, one page at a time
    pub async fn list_persons(&self, filter: PersonFilter) -> PersonResult<PersonPage> {
        self.repository.list(&filter.normalized()).await
    }

    /// Change only the supplied fields. Enrichment is not re-run.
    pub async fn update_person(
        &self,
        id: PersonId,
        changes: PersonChanges,
    ) -> PersonResult<Person> {
        let changes = PersonChanges {
            name: changes.name.as_deref().map(|n| required("name", n)).transpose()?,
            surname: changes
                .surname
                .as_deref()
                .map(|s| required("surname", s))
                .transpose()?,
            age: changes.age,
            gender: changes.gender.map(optional),
            nationality: changes
                .nationality
                .map(|n| optional(n).map(|code| code.to_lowercase())),
        };

        let person = self.repository.update(id, changes).await?;
        info!(id = %person.id, "Person updated");
        Ok(person)
    }

    /// Permanently delete a person
    pub async fn delete_person(&self, id: PersonId) -> PersonResult<()> {
        self.repository.delete(id).await?;
        info!(%id, "Person deleted");
        Ok(())
    }

    /// Check that the store is reachable
    pub async fn health_check(&self) -> PersonResult<()> {
        self.repository.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::{InMemoryPersonRepository, PersonDraft};
    use async_trait::async_trait;

    /// Enricher returning canned values regardless of the name
    struct FixedEnricher {
        draft: PersonDraft,
    }

    #[async_trait]
    impl Enricher for FixedEnricher {
        async fn enrich(&self, name: &str) -> PersonDraft {
            PersonDraft {
                name: name.to_string(),
                ..self.draft.clone()
            }
        }
    }

    fn service_with(draft: PersonDraft) -> PersonService {
        PersonService::new(
            Arc::new(InMemoryPersonRepository::new()),
            Arc::new(FixedEnricher { draft }),
        )
    }

    fn fully_enriched() -> PersonService {
        service_with(PersonDraft {
            age: Some(45),
            gender: Some("male".to_string()),
            nationality: Some("ru".to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_create_merges_enrichment() {
        let service = fully_enriched();

        let person = service.create_person("Dmitriy", "Ushakov").await.unwrap();

        assert_eq!(person.name, "Dmitriy");
        assert_eq!(person.surname, "Ushakov");
        assert_eq!(person.age, Some(45));
        assert_eq!(person.gender.as_deref(), Some("male"));
        assert_eq!(person.nationality.as_deref(), Some("ru"));
    }

    #[tokio::test]
    async fn test_create_with_nothing_resolved() {
        let service = service_with(PersonDraft::default());

        let person = service.create_person("Zyx", "Unknown").await.unwrap();

        assert_eq!(person.name, "Zyx");
        assert_eq!(person.age, None);
        assert_eq!(person.gender, None);
        assert_eq!(person.nationality, None);
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let service = fully_enriched();

        let a = service.create_person("Anna", "A").await.unwrap();
        let b = service.create_person("Anna", "A").await.unwrap();

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_create_requires_name_and_surname() {
        let service = fully_enriched();

        assert!(matches!(
            service.create_person("  ", "Ushakov").await,
            Err(PersonError::InvalidData(_))
        ));
        assert!(matches!(
            service.create_person("Dmitriy", "").await,
            Err(PersonError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_update_only_age() {
        let service = fully_enriched();
        let created = service.create_person("Dmitriy", "Ushakov").await.unwrap();

        let changes = PersonChanges {
            age: Some(42),
            ..Default::default()
        };
        let updated = service.update_person(created.id, changes).await.unwrap();

        assert_eq!(updated.age, Some(42));
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.surname, created.surname);
        assert_eq!(updated.gender, created.gender);
        assert_eq!(updated.nationality, created.nationality);
    }

    #[tokio::test]
    async fn test_update_normalizes_fields() {
        let service = fully_enriched();
        let created = service.create_person("Dmitriy", "Ushakov").await.unwrap();

        let changes = PersonChanges {
            nationality: Some(Some("UA".to_string())),
            gender: Some(Some(" ".to_string())),
            ..Default::default()
        };
        let updated = service.update_person(created.id, changes).await.unwrap();

        assert_eq!(updated.nationality.as_deref(), Some("ua"));
        assert_eq!(updated.gender, None);

        let blank_name = PersonChanges {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_person(created.id, blank_name).await,
            Err(PersonError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_are_not_found() {
        let service = fully_enriched();
        let missing = PersonId::new(404);

        assert!(matches!(
            service.update_person(missing, PersonChanges::default()).await,
            Err(PersonError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_person(missing).await,
            Err(PersonError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_normalizes_paging() {
        let service = fully_enriched();
        for i in 0..3 {
            service
                .create_person(&format!("Name{}", i), "Surname")
                .await
                .unwrap();
        }

        let page = service
            .list_persons(PersonFilter {
                page: 0,
                page_size: 0,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, crate::person::DEFAULT_PAGE_SIZE);
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 3);
    }
}
