use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

// applied statement by statement; the CHECKs keep the copy counter inside
// [0, total_copies] even if a buggy writer slips past the engine
pub const TABLE_SCHEMA: &[&str] = &[
	r#"
CREATE TABLE IF NOT EXISTS books (
	book_id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	title TEXT NOT NULL,
	author TEXT NOT NULL,
	publisher TEXT NOT NULL,
	isbn TEXT NOT NULL UNIQUE,
	year_published INTEGER NOT NULL,
	total_copies INTEGER NOT NULL DEFAULT 1,
	available_copies INTEGER NOT NULL DEFAULT 1,
	created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
	CHECK(total_copies >= 1),
	CHECK(available_copies >= 0),
	CHECK(available_copies <= total_copies)
);
	"#,
	r#"
CREATE TABLE IF NOT EXISTS members (
	member_id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	full_name TEXT NOT NULL,
	email TEXT NOT NULL UNIQUE,
	phone TEXT NOT NULL DEFAULT '',
	join_date DATE NOT NULL DEFAULT CURRENT_DATE,
	status TEXT NOT NULL DEFAULT 'active'
		CHECK(status IN ('active', 'suspended', 'alumni'))
);
	"#,
	r#"
CREATE TABLE IF NOT EXISTS users (
	user_id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	member_id INTEGER,
	username TEXT NOT NULL UNIQUE,
	password_hash TEXT NOT NULL,
	role TEXT NOT NULL DEFAULT 'member'
		CHECK(role IN ('member', 'librarian', 'admin')),
	created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
	FOREIGN KEY(member_id) REFERENCES members(member_id)
		ON DELETE SET NULL
		ON UPDATE CASCADE
);
	"#,
	r#"
CREATE TABLE IF NOT EXISTS loans (
	loan_id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	book_id INTEGER NOT NULL,
	member_id INTEGER NOT NULL,
	issue_date DATE NOT NULL,
	due_date DATE NOT NULL,
	return_date DATE DEFAULT NULL,
	FOREIGN KEY(book_id) REFERENCES books(book_id)
		ON DELETE CASCADE
		ON UPDATE CASCADE,
	FOREIGN KEY(member_id) REFERENCES members(member_id)
		ON DELETE CASCADE
		ON UPDATE CASCADE
);
	"#,
	"CREATE INDEX IF NOT EXISTS loans_book_idx ON loans(book_id);",
	"CREATE INDEX IF NOT EXISTS loans_member_idx ON loans(member_id);",
];

// set up connection pool and make sure the tables exist
pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
	let opts = SqliteConnectOptions::from_str(url)?
		.create_if_missing(true)
		.foreign_keys(true)
		.busy_timeout(Duration::from_secs(5));
	let pool = SqlitePoolOptions::new()
		.max_connections(5)
		.acquire_timeout(Duration::from_secs(3))
		.connect_with(opts)
		.await?;
	migrate(&pool).await?;
	Ok(pool)
}

pub async fn migrate(db: &SqlitePool) -> Result<(), sqlx::Error> {
	for stmt in TABLE_SCHEMA {
		sqlx::query(stmt).execute(db).await?;
	}
	Ok(())
}

// ten well-known titles so a fresh install has something to circulate
const SAMPLE_BOOKS: &[(&str, &str, &str, &str, i64, i64)] = &[
	("1984", "George Orwell", "Secker & Warburg", "9780451524935", 1949, 5),
	("Pride and Prejudice", "Jane Austen", "T. Egerton", "9781503290563", 1813, 3),
	("To Kill a Mockingbird", "Harper Lee", "J.B. Lippincott & Co.", "9780061120084", 1960, 4),
	("The Great Gatsby", "F. Scott Fitzgerald", "Charles Scribner's Sons", "9780743273565", 1925, 4),
	("Moby Dick", "Herman Melville", "Richard Bentley", "9781503280786", 1851, 2),
	("War and Peace", "Leo Tolstoy", "The Russian Messenger", "9780199232765", 1869, 2),
	("Hamlet", "William Shakespeare", "N/A", "9780451526922", 1603, 3),
	("The Catcher in the Rye", "J.D. Salinger", "Little, Brown and Company", "9780316769488", 1951, 3),
	("The Hobbit", "J.R.R. Tolkien", "George Allen & Unwin", "9780547928227", 1937, 5),
	("Fahrenheit 451", "Ray Bradbury", "Ballantine Books", "9781451673319", 1953, 4),
];

pub async fn seed_sample_books(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
		.fetch_one(db)
		.await?;
	if count > 0 {
		return Ok(());
	}
	for &(title, author, publisher, isbn, year, copies) in SAMPLE_BOOKS {
		sqlx::query(
			"INSERT INTO books
				(title, author, publisher, isbn, year_published, total_copies, available_copies)
			VALUES (?, ?, ?, ?, ?, ?, ?)",
		)
		.bind(title)
		.bind(author)
		.bind(publisher)
		.bind(isbn)
		.bind(year)
		.bind(copies)
		.bind(copies)
		.execute(db)
		.await?;
	}
	tracing::info!(count = SAMPLE_BOOKS.len(), "seeded empty catalog");
	Ok(())
}
