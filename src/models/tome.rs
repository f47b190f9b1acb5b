//! Tome (catalogued book) model and related types

use std::fmt;
use std::hash::{Hash, Hasher};

use validator::Validate;

use super::first_violation;
use crate::{
    archive::storage::{escape_field, RowError, TableRow},
    error::AppResult,
};

/// A catalogued book. Identity is the book ID alone.
#[derive(Debug, Clone)]
pub struct Tome {
    id: i32,
    title: String,
    author: String,
    category: String,
    issued: bool,
}

impl Tome {
    pub fn new(id: i32, title: &str, author: &str, category: &str, issued: bool) -> Self {
        Self {
            id,
            title: title.trim().to_string(),
            author: author.trim().to_string(),
            category: category.trim().to_string(),
            issued,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Empty when uncategorized
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_issued(&self) -> bool {
        self.issued
    }

    pub(crate) fn mark_issued(&mut self) {
        self.issued = true;
    }

    pub(crate) fn mark_returned(&mut self) {
        self.issued = false;
    }
}

impl PartialEq for Tome {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tome {}

impl Hash for Tome {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Tome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID:{} | Title:{} | Author:{} | Cat:{} | Issued:{}",
            self.id,
            self.title,
            self.author,
            self.category,
            if self.issued { "YES" } else { "NO" }
        )
    }
}

impl TableRow for Tome {
    const HEADER: &'static str = "bookId,title,author,category,issued";
    const MIN_FIELDS: usize = 5;

    fn to_row(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.id,
            escape_field(&self.title),
            escape_field(&self.author),
            escape_field(&self.category),
            self.issued
        )
    }

    fn from_fields(fields: &[&str]) -> Result<Self, RowError> {
        let id = fields[0]
            .trim()
            .parse()
            .map_err(|_| RowError::InvalidId(fields[0].trim().to_string()))?;
        let issued = fields[4].trim().eq_ignore_ascii_case("true");
        Ok(Tome::new(id, fields[1], fields[2], fields[3], issued))
    }
}

/// Input for adding a book, trimmed on construction
#[derive(Debug, Validate)]
pub struct NewTome {
    #[validate(length(min = 1, message = "Title required."))]
    pub title: String,
    #[validate(length(min = 1, message = "Author required."))]
    pub author: String,
    pub category: String,
}

impl NewTome {
    pub fn new(title: &str, author: &str, category: Option<&str>) -> Self {
        Self {
            title: title.trim().to_string(),
            author: author.trim().to_string(),
            category: category.unwrap_or_default().trim().to_string(),
        }
    }

    /// Validate, reporting the first failing field in declaration order
    pub fn validated(self) -> AppResult<Self> {
        self.validate()
            .map_err(|errors| first_violation(&errors, &["title", "author"]))?;
        Ok(self)
    }
}
