use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::PersonError;

/// Default number of records per page when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on a single page
pub const MAX_PAGE_SIZE: u32 = 100;

/// NewType pattern for a store-assigned person identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(i64);

impl PersonId {
    /// Wrap an identity handed out by a store
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PersonId {
    type Err = PersonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(PersonError::InvalidData(format!("Invalid person ID: {}", s))),
        }
    }
}

/// A persisted person record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub surname: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub nationality: Option<String>, // lower-cased country code
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A person that has not been handed to a store yet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonDraft {
    pub name: String,
    pub surname: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
}

impl PersonDraft {
    /// Draft carrying only the required fields
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            ..Default::default()
        }
    }
}

/// Partial update. `None` leaves the stored value untouched.
///
/// For `gender` and `nationality`, `Some(None)` clears the stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersonChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Option<String>>,
    pub nationality: Option<Option<String>>,
}

impl PersonChanges {
    /// True when no field was supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.nationality.is_none()
    }

    /// Apply these changes onto a record in place
    pub fn apply_to(&self, person: &mut Person) {
        if let Some(name) = &self.name {
            person.name = name.clone();
        }
        if let Some(surname) = &self.surname {
            person.surname = surname.clone();
        }
        if let Some(age) = self.age {
            person.age = Some(age);
        }
        if let Some(gender) = &self.gender {
            person.gender = gender.clone();
        }
        if let Some(nationality) = &self.nationality {
            person.nationality = nationality.clone();
        }
    }
}

/// Listing criteria. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonFilter {
    /// Case-insensitive substring match
    pub name: Option<String>,
    /// Case-insensitive substring match
    pub surname: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    /// 1-based
    pub page: u32,
    pub page_size: u32,
}

impl Default for PersonFilter {
    fn default() -> Self {
        Self {
            name: None,
            surname: None,
            age: None,
            gender: None,
            nationality: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PersonFilter {
    /// Clamp paging into range and drop blank predicates. An age of 0 is no filter.
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.age = self.age.filter(|age| *age > 0);
        self.page_size = match self.page_size {
            0 => DEFAULT_PAGE_SIZE,
            size => size.min(MAX_PAGE_SIZE),
        };
        self.name = non_blank(self.name);
        self.surname = non_blank(self.surname);
        self.gender = non_blank(self.gender);
        self.nationality = non_blank(self.nationality);
        self
    }

    /// Number of records to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Check a record against every predicate
    pub fn matches(&self, person: &Person) -> bool {
        fn contains(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
        fn equals(value: &Option<String>, expected: &str) -> bool {
            value
                .as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case(expected))
        }

        self.name.as_deref().is_none_or(|n| contains(&person.name, n))
            && self
                .surname
                .as_deref()
                .is_none_or(|s| contains(&person.surname, s))
            && self.age.is_none_or(|a| person.age == Some(a))
            && self.gender.as_deref().is_none_or(|g| equals(&person.gender, g))
            && self
                .nationality
                .as_deref()
                .is_none_or(|n| equals(&person.nationality, n))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// One page of a filtered listing
#[derive(Debug, Clone, PartialEq)]
pub struct PersonPage {
    pub items: Vec<Person>,
    /// Count of all matching records, independent of paging
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}
