//! Domain types for labsite

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

// === Admin accounts ===

/// A row of the `admins` table
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

// === Publications ===

/// Normalized author list.
///
/// Accepts a JSON array, a JSON-encoded array inside a string, or a
/// comma-separated string. Always serializes as an array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Authors(Vec<String>);

impl Authors {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .map(|n| n.as_ref().trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        )
    }

    /// Parse a stored or submitted author string.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with('[')
            && let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed)
        {
            return Self::new(list);
        }
        Self::new(trimmed.split(','))
    }

    /// Database representation: a JSON array string.
    pub fn to_storage(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display form: `A, B, C`
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

impl<'de> Deserialize<'de> for Authors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            List(Vec<String>),
            Text(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::List(list) => Authors::new(list),
            Repr::Text(text) => Authors::parse(&text),
        })
    }
}

/// A publication listed on the papers page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Publication {
    pub id: i64,
    pub title: String,
    pub authors: Authors,
    pub journal: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Validated input for creating or replacing a publication
#[derive(Debug, Clone, PartialEq)]
pub struct NewPublication {
    pub title: String,
    pub authors: Authors,
    pub journal: String,
    pub year: i32,
    pub link: Option<String>,
}

/// A year submitted as a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum YearInput {
    Number(i64),
    Text(String),
}

impl YearInput {
    fn value(&self) -> Option<i32> {
        let year = match self {
            YearInput::Number(n) => i32::try_from(*n).ok()?,
            YearInput::Text(s) => s.trim().parse::<i32>().ok()?,
        };
        (year > 0).then_some(year)
    }
}

/// Raw request body for publication writes, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicationInput {
    pub title: Option<String>,
    pub authors: Option<Authors>,
    pub journal: Option<String>,
    pub year: Option<YearInput>,
    pub link: Option<String>,
}

impl PublicationInput {
    pub fn validate(self) -> Result<NewPublication> {
        let missing = || Error::Validation("Missing required fields".to_string());

        let title = non_empty(self.title).ok_or_else(missing)?;
        let journal = non_empty(self.journal).ok_or_else(missing)?;
        let authors = self.authors.filter(|a| !a.is_empty()).ok_or_else(missing)?;
        let year = self.year.as_ref().and_then(YearInput::value).ok_or_else(missing)?;

        Ok(NewPublication {
            title,
            authors,
            journal,
            year,
            link: non_empty(self.link),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// === Listing ===

/// Default page size for paginated reads
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Upper bound on page size
pub const MAX_PAGE_SIZE: usize = 100;

/// Options for listing content
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListOptions {
    /// Options for 1-based page `page` of `per_page` items.
    pub fn page(page: usize, per_page: usize) -> Self {
        let per_page = per_page.clamp(1, MAX_PAGE_SIZE);
        Self {
            limit: Some(per_page),
            offset: Some(page.max(1).saturating_sub(1).saturating_mul(per_page)),
        }
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// Paginated list result
#[derive(Debug, Clone, Serialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> ListResult<T> {
    /// 1-based number of the page this result represents.
    pub fn page(&self) -> usize {
        (self.offset / self.limit.max(1)).saturating_add(1)
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.limit.max(1)).max(1)
    }
}
