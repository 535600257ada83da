#![allow(dead_code)]

use lms::accounts::Accounts;
use lms::catalog::Catalog;
use lms::types::{Bid, Mid, NewBook};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

// one connection so every query sees the same in-memory database
pub async fn memory_pool() -> SqlitePool {
	let opts = SqliteConnectOptions::from_str("sqlite::memory:")
		.expect("memory url")
		.foreign_keys(true);
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(opts)
		.await
		.expect("in-memory sqlite");
	lms::sql::migrate(&pool).await.expect("schema");
	pool
}

pub async fn seed_book(pool: &SqlitePool, title: &str, isbn: &str, copies: i64) -> Bid {
	Catalog::new(pool.clone())
		.add_book(&NewBook {
			title: title.to_string(),
			author: "Test Author".to_string(),
			publisher: "Test House".to_string(),
			isbn: isbn.to_string(),
			year_published: 2001,
			total_copies: copies,
		})
		.await
		.expect("seed book")
}

pub async fn seed_member(pool: &SqlitePool, email: &str, username: &str) -> Mid {
	Accounts::new(pool.clone())
		.register("Test Member", email, "555-0100", username, "secret")
		.await
		.expect("seed member")
}

pub async fn available_copies(pool: &SqlitePool, book_id: Bid) -> i64 {
	sqlx::query_scalar("SELECT available_copies FROM books WHERE book_id = ?")
		.bind(book_id)
		.fetch_one(pool)
		.await
		.expect("available_copies")
}

pub async fn open_loans_on(pool: &SqlitePool, book_id: Bid) -> i64 {
	sqlx::query_scalar(
		"SELECT COUNT(*) FROM loans WHERE book_id = ? AND return_date IS NULL",
	)
	.bind(book_id)
	.fetch_one(pool)
	.await
	.expect("open loan count")
}

pub async fn table_count(pool: &SqlitePool, table: &str) -> i64 {
	sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
		.fetch_one(pool)
		.await
		.expect("row count")
}
