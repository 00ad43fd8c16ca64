use async_trait::async_trait;
use sqlx::{
    Postgres, QueryBuilder, Row,
    postgres::{PgPool, PgRow},
};

use super::{
    Person, PersonChanges, PersonDraft, PersonError, PersonFilter, PersonId, PersonPage,
    PersonRepository, PersonResult,
};

const COLUMNS: &str = "id, name, surname, age, gender, nationality, created_at, updated_at";

/// PostgreSQL implementation of PersonRepository
pub struct PostgresPersonRepository {
    pool: PgPool,
}

impl PostgresPersonRepository {
    /// Create a new PostgresPersonRepository over a shared pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: sqlx::Error) -> PersonError {
    PersonError::DatabaseError(e.to_string())
}

fn to_column_age(age: u32) -> PersonResult<i32> {
    i32::try_from(age).map_err(|_| PersonError::InvalidData(format!("Age out of range: {}", age)))
}

fn row_to_person(row: &PgRow) -> PersonResult<Person> {
    let age = row
        .try_get::<Option<i32>, _>("age")
        .map_err(db_error)?
        .map(u32::try_from)
        .transpose()
        .map_err(|e| PersonError::DatabaseError(format!("Stored age is invalid: {}", e)))?;

    Ok(Person {
        id: PersonId::new(row.try_get("id").map_err(db_error)?),
        name: row.try_get("name").map_err(db_error)?,
        surname: row.try_get("surname").map_err(db_error)?,
        age,
        gender: row.try_get("gender").map_err(db_error)?,
        nationality: row.try_get("nationality").map_err(db_error)?,
        created_at: row.try_get("created_at").map_err(db_error)?,
        updated_at: row.try_get("updated_at").map_err(db_error)?,
    })
}

/// Escape LIKE metacharacters and wrap for substring search
fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &PersonFilter) -> PersonResult<()> {
    builder.push(" WHERE TRUE");

    if let Some(name) = &filter.name {
        builder.push(" AND name ILIKE ").push_bind(like_pattern(name));
    }
    if let Some(surname) = &filter.surname {
        builder
            .push(" AND surname ILIKE ")
            .push_bind(like_pattern(surname));
    }
    if let Some(age) = filter.age {
        builder.push(" AND age = ").push_bind(to_column_age(age)?);
    }
    if let Some(gender) = &filter.gender {
        builder
            .push(" AND LOWER(gender) = LOWER(")
            .push_bind(gender.clone())
            .push(")");
    }
    if let Some(nationality) = &filter.nationality {
        builder
            .push(" AND LOWER(nationality) = LOWER(")
            .push_bind(nationality.clone())
            .push(")");
    }

    Ok(())
}

#[async_trait]
impl PersonRepository for PostgresPersonRepository {
    async fn create(&self, draft: PersonDraft) -> PersonResult<Person> {
        let age = draft.age.map(to_column_age).transpose()?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO persons (name, surname, age, gender, nationality)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&draft.name)
        .bind(&draft.surname)
        .bind(age)
        .bind(&draft.gender)
        .bind(&draft.nationality)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row_to_person(&row)
    }

    async fn get(&self, id: PersonId) -> PersonResult<Person> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM persons WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(PersonError::NotFound(id))?;

        row_to_person(&row)
    }

    async fn list(&self, filter: &PersonFilter) -> PersonResult<PersonPage> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM persons");
        push_filters(&mut count, filter)?;
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM persons"));
        push_filters(&mut select, filter)?;
        select
            .push(" ORDER BY id LIMIT ")
            .push_bind(i64::from(filter.page_size))
            .push(" OFFSET ")
            .push_bind(filter.offset() as i64);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let items = rows
            .iter()
            .map(row_to_person)
            .collect::<PersonResult<Vec<_>>>()?;

        Ok(PersonPage {
            items,
            total: total.max(0) as u64,
            page: filter.page,
            page_size: filter.page_size,
        })
    }

    async fn update(&self, id: PersonId, changes: PersonChanges) -> PersonResult<Person> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE persons SET updated_at = NOW()");

        if let Some(name) = changes.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(surname) = changes.surname {
            builder.push(", surname = ").push_bind(surname);
        }
        if let Some(age) = changes.age {
            builder.push(", age = ").push_bind(to_column_age(age)?);
        }
        if let Some(gender) = changes.gender {
            builder.push(", gender = ").push_bind(gender);
        }
        if let Some(nationality) = changes.nationality {
            builder.push(", nationality = ").push_bind(nationality);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id.value())
            .push(" RETURNING ")
            .push(COLUMNS);

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(PersonError::NotFound(id))?;

        row_to_person(&row)
    }

    async fn delete(&self, id: PersonId) -> PersonResult<()> {
        let result = sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(PersonError::NotFound(id));
        }

        Ok(())
    }

    async fn ping(&self) -> PersonResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ann"), "%ann%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_filter_sql() {
        let filter = PersonFilter {
            name: Some("ann".to_string()),
            age: Some(30),
            nationality: Some("fr".to_string()),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM persons");
        push_filters(&mut builder, &filter).unwrap();

        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM persons WHERE TRUE AND name ILIKE $1 AND age = $2 \
             AND LOWER(nationality) = LOWER($3)"
        );
    }
}
