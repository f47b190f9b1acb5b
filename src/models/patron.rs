//! Patron (library member) model and related types

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use validator::Validate;

use super::first_violation;
use crate::{
    archive::storage::{escape_field, RowError, TableRow},
    error::AppResult,
};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+@[A-Za-z0-9_.-]+\.[A-Za-z]{2,}$").unwrap());

/// A registered member and the books they currently hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patron {
    id: i32,
    name: String,
    email: String,
    issued_books: Vec<i32>,
}

impl Patron {
    pub fn new(id: i32, name: &str, email: &str) -> Self {
        Self {
            id,
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            issued_books: Vec::new(),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Copy of the held book IDs, in issue order
    pub fn issued_books(&self) -> Vec<i32> {
        self.issued_books.clone()
    }

    pub(crate) fn add_issued_book(&mut self, book_id: i32) {
        self.issued_books.push(book_id);
    }

    /// Remove the first occurrence of `book_id`; false if it was not held
    pub(crate) fn return_issued_book(&mut self, book_id: i32) -> bool {
        match self.issued_books.iter().position(|&id| id == book_id) {
            Some(index) => {
                self.issued_books.remove(index);
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for Patron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let issued = self
            .issued_books
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "MemberID:{} | Name:{} | Email:{} | Issued:[{}]",
            self.id, self.name, self.email, issued
        )
    }
}

impl TableRow for Patron {
    const HEADER: &'static str = "memberId,name,email,issuedBooks";
    const MIN_FIELDS: usize = 3;

    fn to_row(&self) -> String {
        let issued = self
            .issued_books
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{},{},{},{}",
            self.id,
            escape_field(&self.name),
            escape_field(&self.email),
            issued
        )
    }

    fn from_fields(fields: &[&str]) -> Result<Self, RowError> {
        let id = fields[0]
            .trim()
            .parse()
            .map_err(|_| RowError::InvalidId(fields[0].trim().to_string()))?;
        let mut patron = Patron::new(id, fields[1], fields[2]);

        // Unparseable tokens in the issued list are dropped
        if let Some(issued) = fields.get(3).map(|f| f.trim()).filter(|f| !f.is_empty()) {
            patron.issued_books = issued
                .split(';')
                .filter_map(|token| token.trim().parse().ok())
                .collect();
        }

        Ok(patron)
    }
}

/// Input for registering a member, trimmed on construction
#[derive(Debug, Validate)]
pub struct NewPatron {
    #[validate(length(min = 1, message = "Name required."))]
    pub name: String,
    #[validate(regex(path = *EMAIL_RE, message = "Invalid email."))]
    pub email: String,
}

impl NewPatron {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
        }
    }

    /// Validate, reporting the first failing field in declaration order
    pub fn validated(self) -> AppResult<Self> {
        self.validate()
            .map_err(|errors| first_violation(&errors, &["name", "email"]))?;
        Ok(self)
    }
}
