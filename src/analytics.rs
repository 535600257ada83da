use crate::error::LmsError;
use crate::types::TopBook;
use sqlx::SqlitePool;

// counts every loan ever made, open or closed; ties keep the store's
// group order
#[derive(Clone)]
pub struct Analytics {
	db: SqlitePool,
}

impl Analytics {
	pub fn new(db: SqlitePool) -> Self {
		Self { db }
	}

	pub async fn top_issued(&self, limit: i64) -> Result<Vec<TopBook>, LmsError> {
		let rows = sqlx::query_as::<_, TopBook>(
			"SELECT b.title AS title, COUNT(*) AS issue_count
			FROM loans l JOIN books b ON l.book_id = b.book_id
			GROUP BY l.book_id
			ORDER BY issue_count DESC
			LIMIT ?",
		)
		.bind(limit)
		.fetch_all(&self.db)
		.await?;
		Ok(rows)
	}
}
