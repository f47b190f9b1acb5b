//! The archive: owner of all catalogue and membership state.
//!
//! Every mutation is written through to the affected table immediately by
//! rewriting it in full. Storage failures are logged and never surface to
//! callers; the in-memory state stays authoritative.

pub mod ids;
pub mod ordering;
pub mod storage;

use std::collections::BTreeSet;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::{
    config::{StorageConfig, DEFAULT_CATALOGUE_PATH, DEFAULT_REGISTRY_PATH},
    error::{AppError, AppResult},
    models::{NewPatron, NewTome, Patron, Tome},
};

use ids::{IdAllocator, FIRST_BOOK_ID, FIRST_MEMBER_ID};
pub use ordering::TomeField;
use ordering::{contains_lowercase, sort_ignore_case};
use storage::{TableFile, TableRow};

pub struct Archive {
    tomes: IndexMap<i32, Tome>,
    patrons: IndexMap<i32, Patron>,
    categories: BTreeSet<String>,
    book_ids: IdAllocator,
    member_ids: IdAllocator,
    catalogue: TableFile,
    registry: TableFile,
}

impl Archive {
    /// Open (creating if needed) the two tables and load them into memory
    pub fn open(catalogue_path: impl Into<PathBuf>, registry_path: impl Into<PathBuf>) -> Self {
        let catalogue = TableFile::new(catalogue_path);
        let registry = TableFile::new(registry_path);

        ensure_table::<Tome>(&catalogue);
        ensure_table::<Patron>(&registry);

        let mut tomes = IndexMap::new();
        let mut categories = BTreeSet::new();
        for tome in catalogue.load::<Tome>() {
            if !tome.category().is_empty() {
                categories.insert(tome.category().to_string());
            }
            tomes.insert(tome.id(), tome);
        }

        let patrons: IndexMap<i32, Patron> = registry
            .load::<Patron>()
            .into_iter()
            .map(|patron| (patron.id(), patron))
            .collect();

        let book_ids = IdAllocator::seeded("book", FIRST_BOOK_ID, tomes.keys().copied());
        let member_ids = IdAllocator::seeded("member", FIRST_MEMBER_ID, patrons.keys().copied());

        tracing::info!(
            "Loaded {} books from {} and {} members from {}",
            tomes.len(),
            catalogue.path().display(),
            patrons.len(),
            registry.path().display()
        );

        Self {
            tomes,
            patrons,
            categories,
            book_ids,
            member_ids,
            catalogue,
            registry,
        }
    }

    /// Open the tables at their default locations in the working directory
    pub fn open_default() -> Self {
        Self::open(DEFAULT_CATALOGUE_PATH, DEFAULT_REGISTRY_PATH)
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::open(&config.catalogue_path, &config.registry_path)
    }

    /// Add a book and return its new ID
    pub fn add_book(&mut self, title: &str, author: &str, category: Option<&str>) -> AppResult<i32> {
        let new = NewTome::new(title, author, category).validated()?;

        let id = self.book_ids.allocate()?;
        let tome = Tome::new(id, &new.title, &new.author, &new.category, false);
        if !tome.category().is_empty() {
            self.categories.insert(tome.category().to_string());
        }
        self.tomes.insert(id, tome);
        self.save_tomes();

        tracing::info!("Book added: id={} title={:?}", id, new.title);
        Ok(id)
    }

    /// Register a member and return their new ID
    pub fn add_member(&mut self, name: &str, email: &str) -> AppResult<i32> {
        let new = NewPatron::new(name, email).validated()?;

        let id = self.member_ids.allocate()?;
        self.patrons.insert(id, Patron::new(id, &new.name, &new.email));
        self.save_patrons();

        tracing::info!("Member added: id={} name={:?}", id, new.name);
        Ok(id)
    }

    /// Lend a book to a member. Returns false if the book is already out.
    pub fn issue_book(&mut self, book_id: i32, member_id: i32) -> AppResult<bool> {
        let tome = self
            .tomes
            .get_mut(&book_id)
            .ok_or_else(|| AppError::NotFound("Book not found.".to_string()))?;
        let patron = self
            .patrons
            .get_mut(&member_id)
            .ok_or_else(|| AppError::NotFound("Member not found.".to_string()))?;

        if tome.is_issued() {
            tracing::debug!("Book {} is already issued", book_id);
            return Ok(false);
        }

        tome.mark_issued();
        patron.add_issued_book(book_id);
        self.save_all();

        tracing::info!("Book {} issued to member {}", book_id, member_id);
        Ok(true)
    }

    /// Take a book back from a member. Returns false if the member does not hold it.
    ///
    /// The member's list is trusted: the book flag is cleared whenever the ID
    /// was in the list, whatever its previous value.
    pub fn return_book(&mut self, book_id: i32, member_id: i32) -> AppResult<bool> {
        let tome = self
            .tomes
            .get_mut(&book_id)
            .ok_or_else(|| AppError::NotFound("Book not found.".to_string()))?;
        let patron = self
            .patrons
            .get_mut(&member_id)
            .ok_or_else(|| AppError::NotFound("Member not found.".to_string()))?;

        if !patron.return_issued_book(book_id) {
            tracing::debug!("Member {} does not hold book {}", member_id, book_id);
            return Ok(false);
        }

        if !tome.is_issued() {
            tracing::warn!(
                "Book {} was held by member {} but not flagged as issued",
                book_id,
                member_id
            );
        }
        tome.mark_returned();
        self.save_all();

        tracing::info!("Book {} returned by member {}", book_id, member_id);
        Ok(true)
    }

    /// Books whose `field` contains `fragment`, ignoring case, in natural order
    pub fn search_books(&self, field: TomeField, fragment: &str) -> Vec<Tome> {
        let fragment = fragment.to_lowercase();
        self.tomes
            .values()
            .filter(|tome| contains_lowercase(field.key(tome), &fragment))
            .cloned()
            .collect()
    }

    pub fn search_books_by_title(&self, fragment: &str) -> Vec<Tome> {
        self.search_books(TomeField::Title, fragment)
    }

    pub fn search_books_by_author(&self, fragment: &str) -> Vec<Tome> {
        self.search_books(TomeField::Author, fragment)
    }

    pub fn search_books_by_category(&self, fragment: &str) -> Vec<Tome> {
        self.search_books(TomeField::Category, fragment)
    }

    /// All books, stable-sorted case-insensitively on `field`
    pub fn sort_books(&self, field: TomeField) -> Vec<Tome> {
        let mut tomes = self.books();
        sort_ignore_case(&mut tomes, field);
        tracing::debug!("Sorted {} books by {}", tomes.len(), field);
        tomes
    }

    pub fn sort_books_by_title(&self) -> Vec<Tome> {
        self.sort_books(TomeField::Title)
    }

    pub fn sort_books_by_author(&self) -> Vec<Tome> {
        self.sort_books(TomeField::Author)
    }

    pub fn sort_books_by_category(&self) -> Vec<Tome> {
        self.sort_books(TomeField::Category)
    }

    /// Every non-empty category ever recorded, ascending
    pub fn categories(&self) -> BTreeSet<String> {
        self.categories.clone()
    }

    pub fn book(&self, book_id: i32) -> Option<Tome> {
        self.tomes.get(&book_id).cloned()
    }

    pub fn member(&self, member_id: i32) -> Option<Patron> {
        self.patrons.get(&member_id).cloned()
    }

    /// All books in natural order
    pub fn books(&self) -> Vec<Tome> {
        self.tomes.values().cloned().collect()
    }

    /// All members in natural order
    pub fn members(&self) -> Vec<Patron> {
        self.patrons.values().cloned().collect()
    }

    pub fn book_count(&self) -> usize {
        self.tomes.len()
    }

    pub fn member_count(&self) -> usize {
        self.patrons.len()
    }

    /// Rewrite both tables unconditionally
    pub fn save_all(&self) {
        self.save_tomes();
        self.save_patrons();
    }

    fn save_tomes(&self) {
        self.catalogue.save(self.tomes.values());
    }

    fn save_patrons(&self) {
        self.registry.save(self.patrons.values());
    }
}

fn ensure_table<T: TableRow>(table: &TableFile) {
    if let Err(e) = table.ensure_exists::<T>() {
        tracing::warn!("Could not create {}: {}", table.path().display(), e);
    }
}
