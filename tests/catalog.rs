mod common;

use lms::catalog::Catalog;
use lms::circulation::{Circulation, DEFAULT_LOAN_DAYS};
use lms::types::NewBook;
use lms::LmsError;

fn gatsby() -> NewBook {
	NewBook {
		title: "The Great Gatsby".to_string(),
		author: "F. Scott Fitzgerald".to_string(),
		publisher: "Charles Scribner's Sons".to_string(),
		isbn: "9780743273565".to_string(),
		year_published: 1925,
		total_copies: 4,
	}
}

#[tokio::test]
async fn add_book_starts_fully_available() {
	let pool = common::memory_pool().await;
	let catalog = Catalog::new(pool.clone());

	let book_id = catalog.add_book(&gatsby()).await.expect("add");
	let book = catalog.book(book_id).await.expect("lookup");
	assert_eq!(book.title, "The Great Gatsby");
	assert_eq!(book.total_copies, 4);
	assert_eq!(book.available_copies, 4);

	assert!(matches!(catalog.book(9999).await, Err(LmsError::NotFound)));
}

#[tokio::test]
async fn duplicate_isbn_leaves_catalog_unchanged() {
	let pool = common::memory_pool().await;
	let catalog = Catalog::new(pool.clone());

	catalog.add_book(&gatsby()).await.expect("add");
	let mut rival = gatsby();
	rival.title = "A Different Binding".to_string();
	let second = catalog.add_book(&rival).await;
	assert!(matches!(second, Err(LmsError::DuplicateIsbn)));
	assert_eq!(common::table_count(&pool, "books").await, 1);
}

#[tokio::test]
async fn search_matches_title_and_author_case_insensitively() {
	let pool = common::memory_pool().await;
	let catalog = Catalog::new(pool.clone());
	catalog.add_book(&gatsby()).await.expect("add");
	common::seed_book(&pool, "Moby Dick", "9781503280786", 2).await;

	let by_title = catalog.search("GATSBY").await.expect("search");
	assert_eq!(by_title.len(), 1);
	assert_eq!(by_title[0].title, "The Great Gatsby");

	let by_author = catalog.search("fitzgerald").await.expect("search");
	assert_eq!(by_author.len(), 1);

	let none = catalog.search("tolstoy").await.expect("search");
	assert!(none.is_empty());
}

#[tokio::test]
async fn list_available_hides_exhausted_books() {
	let pool = common::memory_pool().await;
	let catalog = Catalog::new(pool.clone());
	let scarce = common::seed_book(&pool, "Scarce", "9780000000019", 1).await;
	common::seed_book(&pool, "Plentiful", "9780000000026", 3).await;
	let member = common::seed_member(&pool, "reader@example.com", "reader").await;

	assert_eq!(catalog.list_all().await.expect("all").len(), 2);
	assert_eq!(catalog.list_available().await.expect("available").len(), 2);

	Circulation::new(pool.clone())
		.issue_book(scarce, member, DEFAULT_LOAN_DAYS)
		.await
		.expect("issue last copy");

	let available = catalog.list_available().await.expect("available");
	assert_eq!(available.len(), 1);
	assert_eq!(available[0].title, "Plentiful");
	// the exhausted title is still in the full catalog
	assert_eq!(catalog.list_all().await.expect("all").len(), 2);
}
