pub mod error;
pub mod in_memory_repository;
pub mod model;
pub mod postgres_repository;
pub mod repository;
pub mod service;

pub use error::{PersonError, PersonResult};
pub use in_memory_repository::InMemoryPersonRepository;
pub use model::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Person, PersonChanges, PersonDraft, PersonFilter, PersonId,
    PersonPage,
};
pub use postgres_repository::PostgresPersonRepository;
pub use repository::PersonRepository;
pub use service::PersonService;
