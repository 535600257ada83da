use crate::error::LmsError;
use crate::types::{Bid, Lid, Loan, Mid, OpenLoan};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

pub const DEFAULT_LOAN_DAYS: i64 = 14;

/// Issues and returns loans. Both mutations run as one store transaction;
/// the affected-row count of a conditional UPDATE is the only success
/// signal, so two racers on the last copy cannot both get it.
#[derive(Clone)]
pub struct Circulation {
	db: SqlitePool,
}

impl Circulation {
	pub fn new(db: SqlitePool) -> Self {
		Self { db }
	}

	pub async fn issue_book(
		&self,
		book_id: Bid,
		member_id: Mid,
		days: i64,
	) -> Result<Lid, LmsError> {
		let today = Utc::now().date_naive();
		let due = today + Duration::days(days);

		let mut tx = self.db.begin().await?;

		// test-and-decrement in one statement, first in the transaction; a
		// plain read followed by a write would let two issues of the last
		// copy both pass the check
		let hit = sqlx::query(
			"UPDATE books SET available_copies = available_copies - 1
			WHERE book_id = ? AND available_copies > 0",
		)
		.bind(book_id)
		.execute(&mut *tx)
		.await?;
		if hit.rows_affected() == 0 {
			// unknown book and exhausted shelf both land here
			let known: Option<(Bid,)> =
				sqlx::query_as("SELECT book_id FROM books WHERE book_id = ?")
					.bind(book_id)
					.fetch_optional(&mut *tx)
					.await?;
			return Err(match known {
				Some(_) => LmsError::NoCopiesAvailable,
				None => LmsError::NotFound,
			});
		}

		let member: Option<(Mid,)> =
			sqlx::query_as("SELECT member_id FROM members WHERE member_id = ?")
				.bind(member_id)
				.fetch_optional(&mut *tx)
				.await?;
		if member.is_none() {
			return Err(LmsError::NotFound);
		}

		let loan_id = sqlx::query(
			"INSERT INTO loans (book_id, member_id, issue_date, due_date)
			VALUES (?, ?, ?, ?)",
		)
		.bind(book_id)
		.bind(member_id)
		.bind(today)
		.bind(due)
		.execute(&mut *tx)
		.await?
		.last_insert_rowid();

		tx.commit().await?;
		tracing::info!(loan_id, book_id, member_id, %due, "issued book");
		Ok(loan_id)
	}

	pub async fn return_book(&self, loan_id: Lid) -> Result<(), LmsError> {
		let today = Utc::now().date_naive();

		let mut tx = self.db.begin().await?;

		// closing is conditional on the loan still being open, so a double
		// return can never increment the shelf twice
		let closed: Option<(Bid,)> = sqlx::query_as(
			"UPDATE loans SET return_date = ?
			WHERE loan_id = ? AND return_date IS NULL
			RETURNING book_id",
		)
		.bind(today)
		.bind(loan_id)
		.fetch_optional(&mut *tx)
		.await?;
		let Some((book_id,)) = closed else {
			return Err(LmsError::LoanNotOpen);
		};

		sqlx::query(
			"UPDATE books SET available_copies = available_copies + 1
			WHERE book_id = ?",
		)
		.bind(book_id)
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;
		tracing::info!(loan_id, book_id, "returned book");
		Ok(())
	}

	pub async fn open_loans(&self, member_id: Mid) -> Result<Vec<OpenLoan>, LmsError> {
		let loans = sqlx::query_as::<_, OpenLoan>(
			"SELECT l.loan_id, l.book_id, b.title, l.issue_date, l.due_date
			FROM loans l JOIN books b ON l.book_id = b.book_id
			WHERE l.member_id = ? AND l.return_date IS NULL
			ORDER BY l.loan_id",
		)
		.bind(member_id)
		.fetch_all(&self.db)
		.await?;
		Ok(loans)
	}

	pub async fn loan(&self, loan_id: Lid) -> Result<Loan, LmsError> {
		sqlx::query_as::<_, Loan>(
			"SELECT loan_id, book_id, member_id, issue_date, due_date, return_date
			FROM loans WHERE loan_id = ?",
		)
		.bind(loan_id)
		.fetch_optional(&self.db)
		.await?
		.ok_or(LmsError::NotFound)
	}
}
