use crate::error::{unique_violation, LmsError};
use crate::types::{Bid, Book, NewBook};
use sqlx::SqlitePool;

const BOOK_COLUMNS: &str =
	"book_id, title, author, publisher, isbn, year_published, total_copies, available_copies";

/// Read and insert operations on the book catalog. Copy counters are only
/// ever mutated by the circulation engine.
#[derive(Clone)]
pub struct Catalog {
	db: SqlitePool,
}

impl Catalog {
	pub fn new(db: SqlitePool) -> Self {
		Self { db }
	}

	pub async fn list_all(&self) -> Result<Vec<Book>, LmsError> {
		let books = sqlx::query_as::<_, Book>(&format!(
			"SELECT {BOOK_COLUMNS} FROM books ORDER BY book_id"
		))
		.fetch_all(&self.db)
		.await?;
		Ok(books)
	}

	// substring match on title or author; LIKE is already case-insensitive
	// for ascii in sqlite
	pub async fn search(&self, keyword: &str) -> Result<Vec<Book>, LmsError> {
		let pattern = format!("%{keyword}%");
		let books = sqlx::query_as::<_, Book>(&format!(
			"SELECT {BOOK_COLUMNS} FROM books
			WHERE title LIKE ? OR author LIKE ?
			ORDER BY book_id"
		))
		.bind(&pattern)
		.bind(&pattern)
		.fetch_all(&self.db)
		.await?;
		Ok(books)
	}

	pub async fn list_available(&self) -> Result<Vec<Book>, LmsError> {
		let books = sqlx::query_as::<_, Book>(&format!(
			"SELECT {BOOK_COLUMNS} FROM books
			WHERE available_copies > 0
			ORDER BY book_id"
		))
		.fetch_all(&self.db)
		.await?;
		Ok(books)
	}

	// a new title starts with every copy on the shelf
	pub async fn add_book(&self, book: &NewBook) -> Result<Bid, LmsError> {
		let book_id = sqlx::query(
			"INSERT INTO books
				(title, author, publisher, isbn, year_published, total_copies, available_copies)
			VALUES (?, ?, ?, ?, ?, ?, ?)",
		)
		.bind(&book.title)
		.bind(&book.author)
		.bind(&book.publisher)
		.bind(&book.isbn)
		.bind(book.year_published)
		.bind(book.total_copies)
		.bind(book.total_copies)
		.execute(&self.db)
		.await
		.map_err(|e| {
			if unique_violation(&e) {
				LmsError::DuplicateIsbn
			} else {
				e.into()
			}
		})?
		.last_insert_rowid();
		tracing::info!(book_id, isbn = %book.isbn, "added book to catalog");
		Ok(book_id)
	}

	pub async fn book(&self, book_id: Bid) -> Result<Book, LmsError> {
		sqlx::query_as::<_, Book>(&format!(
			"SELECT {BOOK_COLUMNS} FROM books WHERE book_id = ?"
		))
		.bind(book_id)
		.fetch_optional(&self.db)
		.await?
		.ok_or(LmsError::NotFound)
	}
}
