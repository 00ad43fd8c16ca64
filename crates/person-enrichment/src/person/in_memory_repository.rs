use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{
    Person, PersonChanges, PersonDraft, PersonError, PersonFilter, PersonId, PersonPage,
    PersonRepository, PersonResult,
};

#[derive(Default)]
struct Table {
    rows: BTreeMap<PersonId, Person>,
    last_id: i64,
}

/// In-memory implementation of PersonRepository for testing and development
pub struct InMemoryPersonRepository {
    table: RwLock<Table>,
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
        }
    }
}

impl Default for InMemoryPersonRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersonRepository {
    async fn create(&self, draft: PersonDraft) -> PersonResult<Person> {
        let mut table = self.table.write().map_err(|e| {
            PersonError::RepositoryError(format!("Failed to acquire write lock: {}", e))
        })?;

        table.last_id += 1;
        let now = Utc::now();
        let person = Person {
            id: PersonId::new(table.last_id),
            name: draft.name,
            surname: draft.surname,
            age: draft.age,
            gender: draft.gender,
            nationality: draft.nationality,
            created_at: now,
            updated_at: now,
        };

        table.rows.insert(person.id, person.clone());
        Ok(person)
    }

    async fn get(&self, id: PersonId) -> PersonResult<Person> {
        let table = self.table.read().map_err(|e| {
            PersonError::RepositoryError(format!("Failed to acquire read lock: {}", e))
        })?;
        table
            .rows
            .get(&id)
            .cloned()
            .ok_or(PersonError::NotFound(id))
    }

    async fn list(&self, filter: &PersonFilter) -> PersonResult<PersonPage> {
        let table = self.table.read().map_err(|e| {
            PersonError::RepositoryError(format!("Failed to acquire read lock: {}", e))
        })?;

        let matching: Vec<&Person> = table.rows.values().filter(|p| filter.matches(p)).collect();
        let items = matching
            .iter()
            .skip(filter.offset() as usize)
            .take(filter.page_size as usize)
            .map(|p| (*p).clone())
            .collect();

        Ok(PersonPage {
            items,
            total: matching.len() as u64,
            page: filter.page,
            page_size: filter.page_size,
        })
    }

    async fn update(&self, id: PersonId, changes: PersonChanges) -> PersonResult<Person> {
        let mut table = self.table.write().map_err(|e| {
            PersonError::RepositoryError(format!("Failed to acquire write lock: {}", e))
        })?;

        let person = table.rows.get_mut(&id).ok_or(PersonError::NotFound(id))?;
        changes.apply_to(person);
        person.updated_at = Utc::now();
        Ok(person.clone())
    }

    async fn delete(&self, id: PersonId) -> PersonResult<()> {
        let mut table = self.table.write().map_err(|e| {
            PersonError::RepositoryError(format!("Failed to acquire write lock: {}", e))
        })?;

        table
            .rows
            .remove(&id)
            .ok_or(PersonError::NotFound(id))?;
        Ok(())
    }

    async fn ping(&self) -> PersonResult<()> {
        self.table
            .read()
            .map(|_| ())
            .map_err(|e| PersonError::RepositoryError(format!("Store is poisoned: {}", e)))
    }
}
