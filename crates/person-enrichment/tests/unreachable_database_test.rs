//! Store behaviour when PostgreSQL is not listening. Needs no database.

use person_enrichment::DatabaseConfig;
use person_enrichment::db;
use person_enrichment::person::{
    PersonError, PersonFilter, PersonRepository, PostgresPersonRepository,
};
use std::time::Duration;

/// Settings for a port nothing listens on
fn closed_port_config() -> DatabaseConfig {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    DatabaseConfig {
        host: "127.0.0.1".to_string(),
        port,
        acquire_timeout_secs: 1,
        startup_timeout_secs: 1,
        ..Default::default()
    }
}

fn lazy_repository(config: &DatabaseConfig) -> PostgresPersonRepository {
    let pool = db::pool_options(config).connect_lazy_with(config.connect_options().unwrap());
    PostgresPersonRepository::new(pool)
}

#[tokio::test]
async fn test_ping_fails_fast_when_database_is_down() {
    let repo = lazy_repository(&closed_port_config());

    let result = tokio::time::timeout(Duration::from_secs(15), repo.ping())
        .await
        .expect("ping should give up within the acquire timeout");

    assert!(matches!(result, Err(PersonError::DatabaseError(_))));
}

#[tokio::test]
async fn test_queries_fail_fast_when_database_is_down() {
    let repo = lazy_repository(&closed_port_config());

    let result = tokio::time::timeout(
        Duration::from_secs(15),
        repo.list(&PersonFilter::default()),
    )
    .await
    .expect("list should give up within the acquire timeout");

    assert!(matches!(result, Err(PersonError::DatabaseError(_))));
}

#[tokio::test]
async fn test_default_acquire_timeout_is_short() {
    let config = DatabaseConfig {
        acquire_timeout_secs: DatabaseConfig::default().acquire_timeout_secs,
        ..closed_port_config()
    };
    let repo = lazy_repository(&config);

    let result = tokio::time::timeout(Duration::from_secs(15), repo.ping())
        .await
        .expect("ping should give up within the default acquire timeout");

    assert!(result.is_err());
}

#[tokio::test]
async fn test_connect_gives_up_after_startup_budget() {
    let config = closed_port_config();

    let result = tokio::time::timeout(Duration::from_secs(15), db::connect(&config))
        .await
        .expect("connect should give up after the startup budget");

    assert!(result.is_err());
}
