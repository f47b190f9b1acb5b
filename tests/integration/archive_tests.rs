//! Archive integration tests

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use tome_archive::{AppError, Archive};

struct Tables {
    _dir: TempDir,
    catalogue: PathBuf,
    registry: PathBuf,
}

impl Tables {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        Self {
            catalogue: dir.path().join("catalogue.txt"),
            registry: dir.path().join("registry.txt"),
            _dir: dir,
        }
    }

    fn open(&self) -> Archive {
        Archive::open(&self.catalogue, &self.registry)
    }
}

#[test]
fn test_example_scenario() {
    let tables = Tables::new();
    let mut archive = tables.open();

    assert_eq!(archive.add_book("Dune", "Herbert", Some("SciFi")).unwrap(), 100);
    assert_eq!(archive.add_member("Ann", "ann@x.co").unwrap(), 200);

    assert!(archive.issue_book(100, 200).unwrap());
    assert!(archive.book(100).unwrap().is_issued());
    assert_eq!(archive.member(200).unwrap().issued_books(), vec![100]);

    assert!(!archive.issue_book(100, 200).unwrap());
    assert_eq!(archive.member(200).unwrap().issued_books(), vec![100]);

    assert!(archive.return_book(100, 200).unwrap());
    assert!(!archive.book(100).unwrap().is_issued());
    assert!(archive.member(200).unwrap().issued_books().is_empty());
}

#[test]
fn test_ids_strictly_increase() {
    let tables = Tables::new();
    let mut archive = tables.open();

    let books: Vec<i32> = (0..5)
        .map(|i| archive.add_book(&format!("Book {}", i), "Author", None).unwrap())
        .collect();
    assert_eq!(books, vec![100, 101, 102, 103, 104]);

    let members: Vec<i32> = ["a", "b", "c"]
        .iter()
        .map(|n| archive.add_member(n, &format!("{}@mail.org", n)).unwrap())
        .collect();
    assert_eq!(members, vec![200, 201, 202]);
}

#[test]
fn test_ids_continue_after_reload() {
    let tables = Tables::new();
    {
        let mut archive = tables.open();
        archive.add_book("A", "X", None).unwrap();
        archive.add_book("B", "X", None).unwrap();
        archive.add_member("Ann", "ann@x.co").unwrap();
    }

    let mut archive = tables.open();
    assert_eq!(archive.add_book("C", "X", None).unwrap(), 102);
    assert_eq!(archive.add_member("Bob", "bob@x.co").unwrap(), 201);
}

#[test]
fn test_ids_seeded_from_existing_max() {
    let tables = Tables::new();
    fs::write(
        &tables.catalogue,
        "bookId,title,author,category,issued\n150,A,X,,false\n120,B,X,,false\n",
    )
    .unwrap();
    fs::write(
        &tables.registry,
        "memberId,name,email,issuedBooks\n310,Ann,ann@x.co,\n",
    )
    .unwrap();

    let mut archive = tables.open();
    assert_eq!(archive.add_book("C", "X", None).unwrap(), 151);
    assert_eq!(archive.add_member("Bob", "bob@x.co").unwrap(), 311);
}

#[test]
fn test_invalid_emails_rejected() {
    let tables = Tables::new();
    let mut archive = tables.open();

    for email in ["a@b", "noatsign", "a@b.c", ""] {
        let err = archive.add_member("Ann", email).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{} accepted", email);
    }
    assert!(matches!(
        archive.add_member("   ", "ann@x.co"),
        Err(AppError::Validation(_))
    ));
    assert_eq!(archive.member_count(), 0);
    assert_eq!(archive.add_member("Ann", "ANN@X.CO").unwrap(), 200);
}

#[test]
fn test_already_issued_to_other_member() {
    let tables = Tables::new();
    let mut archive = tables.open();
    let book = archive.add_book("Dune", "Herbert", None).unwrap();
    let ann = archive.add_member("Ann", "ann@x.co").unwrap();
    let bob = archive.add_member("Bob", "bob@x.co").unwrap();

    assert!(archive.issue_book(book, ann).unwrap());
    assert!(!archive.issue_book(book, bob).unwrap());
    assert!(archive.member(bob).unwrap().issued_books().is_empty());
}

#[test]
fn test_return_not_held_leaves_state() {
    let tables = Tables::new();
    let mut archive = tables.open();
    let book = archive.add_book("Dune", "Herbert", None).unwrap();
    let ann = archive.add_member("Ann", "ann@x.co").unwrap();
    let bob = archive.add_member("Bob", "bob@x.co").unwrap();
    archive.issue_book(book, ann).unwrap();

    let before = fs::read_to_string(&tables.registry).unwrap();
    assert!(!archive.return_book(book, bob).unwrap());
    assert!(archive.book(book).unwrap().is_issued());
    assert_eq!(archive.member(ann).unwrap().issued_books(), vec![book]);
    assert_eq!(fs::read_to_string(&tables.registry).unwrap(), before);
}

#[test]
fn test_round_trip() {
    let tables = Tables::new();
    {
        let mut archive = tables.open();
        archive.add_book("Dune", "Herbert", Some("SciFi")).unwrap();
        archive.add_book("War, and Peace", "Tolstoy, Leo", Some("Classic")).unwrap();
        archive.add_book("Emma", "Austen", None).unwrap();
        archive.add_member("Ann", "ann@x.co").unwrap();
        archive.add_member("Smith, John", "john@x.co").unwrap();
        archive.issue_book(100, 200).unwrap();
        archive.issue_book(101, 200).unwrap();
        archive.issue_book(102, 201).unwrap();
        archive.return_book(100, 200).unwrap();
        archive.save_all();
    }

    let archive = tables.open();
    assert_eq!(archive.book_count(), 3);
    assert_eq!(archive.member_count(), 2);

    let dune = archive.book(100).unwrap();
    assert_eq!((dune.title(), dune.author(), dune.category()), ("Dune", "Herbert", "SciFi"));
    assert!(!dune.is_issued());

    // Commas are replaced by spaces on write
    let war = archive.book(101).unwrap();
    assert_eq!(war.title(), "War  and Peace");
    assert_eq!(war.author(), "Tolstoy  Leo");
    assert!(war.is_issued());

    let emma = archive.book(102).unwrap();
    assert_eq!(emma.category(), "");
    assert!(emma.is_issued());

    let ann = archive.member(200).unwrap();
    assert_eq!(ann.email(), "ann@x.co");
    assert_eq!(ann.issued_books(), vec![101]);

    let john = archive.member(201).unwrap();
    assert_eq!(john.name(), "Smith  John");
    assert_eq!(john.issued_books(), vec![102]);

    let expected: BTreeSet<String> = ["Classic", "SciFi"].iter().map(|s| s.to_string()).collect();
    assert_eq!(archive.categories(), expected);
}

#[test]
fn test_sorts_cover_whole_catalogue() {
    let tables = Tables::new();
    let mut archive = tables.open();
    archive.add_book("zen", "Pirsig", Some("philosophy")).unwrap();
    archive.add_book("Anna Karenina", "tolstoy", Some("Classic")).unwrap();
    archive.add_book("beloved", "Morrison", None).unwrap();
    archive.add_book("Dune", "herbert", Some("SciFi")).unwrap();

    let all: BTreeSet<i32> = archive.books().iter().map(|t| t.id()).collect();

    let by_title: Vec<i32> = archive.sort_books_by_title().iter().map(|t| t.id()).collect();
    assert_eq!(by_title, vec![101, 102, 103, 100]);

    let by_author: Vec<i32> = archive.sort_books_by_author().iter().map(|t| t.id()).collect();
    assert_eq!(by_author, vec![103, 102, 100, 101]);

    let by_category: Vec<i32> = archive.sort_books_by_category().iter().map(|t| t.id()).collect();
    assert_eq!(by_category, vec![102, 101, 100, 103]);

    for sorted in [&by_title, &by_author, &by_category] {
        assert_eq!(sorted.iter().copied().collect::<BTreeSet<_>>(), all);
    }
}

#[test]
fn test_search_is_case_insensitive_substring() {
    let tables = Tables::new();
    let mut archive = tables.open();
    archive.add_book("Dune", "Frank Herbert", Some("SciFi")).unwrap();
    archive.add_book("Dune Messiah", "Frank Herbert", Some("SciFi")).unwrap();
    archive.add_book("Emma", "Jane Austen", Some("Classic")).unwrap();

    let ids = |tomes: Vec<tome_archive::models::Tome>| -> BTreeSet<i32> {
        tomes.iter().map(|t| t.id()).collect()
    };

    assert_eq!(ids(archive.search_books_by_title("dUNE")), BTreeSet::from([100, 101]));
    assert_eq!(ids(archive.search_books_by_author("austen")), BTreeSet::from([102]));
    assert_eq!(ids(archive.search_books_by_category("sci")), BTreeSet::from([100, 101]));
    assert_eq!(archive.search_books_by_title("").len(), 3);
    assert!(archive.search_books_by_title("Ulysses").is_empty());
}

#[test]
fn test_categories_sorted_and_deduplicated() {
    let tables = Tables::new();
    let mut archive = tables.open();
    archive.add_book("A", "X", Some("SciFi")).unwrap();
    archive.add_book("B", "X", Some("Classic")).unwrap();
    archive.add_book("C", "X", Some("SciFi")).unwrap();
    archive.add_book("D", "X", Some("  ")).unwrap();

    let categories: Vec<String> = archive.categories().into_iter().collect();
    assert_eq!(categories, vec!["Classic".to_string(), "SciFi".to_string()]);
}

#[test]
fn test_load_tolerates_malformed_rows() {
    let tables = Tables::new();
    fs::write(
        &tables.catalogue,
        "bookId,title,author,category,issued\n100,Dune,Herbert,SciFi,maybe\n\n101,Broken\n102,Emma,Austen,Classic,true\n",
    )
    .unwrap();
    fs::write(
        &tables.registry,
        "memberId,name,email,issuedBooks\n200,Ann\n201,Bob,bob@x.co,102;oops\n",
    )
    .unwrap();

    let archive = tables.open();
    assert_eq!(archive.book_count(), 2);
    assert!(!archive.book(100).unwrap().is_issued());
    assert!(archive.book(101).is_none());
    assert_eq!(archive.member_count(), 1);
    assert_eq!(archive.member(201).unwrap().issued_books(), vec![102]);
}

#[test]
fn test_max_id_in_table_loads_and_refuses_new_ids() {
    let tables = Tables::new();
    fs::write(
        &tables.catalogue,
        "bookId,title,author,category,issued\n2147483647,A,B,,false\n",
    )
    .unwrap();

    let mut archive = tables.open();
    assert_eq!(archive.book_count(), 1);
    assert!(archive.book(i32::MAX).is_some());

    let err = archive.add_book("C", "D", None).unwrap_err();
    assert!(matches!(err, AppError::IdsExhausted(_)));
    assert_eq!(archive.book_count(), 1);

    // Member IDs are unaffected
    assert_eq!(archive.add_member("Ann", "ann@x.co").unwrap(), 200);
}

#[test]
fn test_issue_already_issued_writes_nothing() {
    let tables = Tables::new();
    let mut archive = tables.open();
    let book = archive.add_book("Dune", "Herbert", None).unwrap();
    let ann = archive.add_member("Ann", "ann@x.co").unwrap();
    let bob = archive.add_member("Bob", "bob@x.co").unwrap();
    assert!(archive.issue_book(book, ann).unwrap());

    // Sentinel contents would be overwritten by any table rewrite
    fs::write(&tables.catalogue, "untouched catalogue\n").unwrap();
    fs::write(&tables.registry, "untouched registry\n").unwrap();

    assert!(!archive.issue_book(book, bob).unwrap());
    assert!(!archive.issue_book(book, ann).unwrap());
    assert_eq!(fs::read_to_string(&tables.catalogue).unwrap(), "untouched catalogue\n");
    assert_eq!(fs::read_to_string(&tables.registry).unwrap(), "untouched registry\n");
}

#[test]
fn test_failed_saves_keep_memory_state() {
    let dir = tempfile::tempdir().unwrap();
    let gone = dir.path().join("gone");
    let mut archive = Archive::open(gone.join("catalogue.txt"), gone.join("registry.txt"));
    assert!(!gone.exists());

    let book = archive.add_book("Dune", "Herbert", Some("SciFi")).unwrap();
    let member = archive.add_member("Ann", "ann@x.co").unwrap();
    assert_eq!((book, member), (100, 200));
    assert!(archive.issue_book(book, member).unwrap());
    archive.save_all();

    assert_eq!(archive.book(book).unwrap().title(), "Dune");
    assert!(archive.book(book).unwrap().is_issued());
    assert_eq!(archive.member(member).unwrap().issued_books(), vec![book]);
    assert!(archive.categories().contains("SciFi"));
    assert!(!gone.exists());
}
