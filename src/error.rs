use thiserror::Error;

// every mutating operation rolls its transaction back before surfacing one
// of these; Display strings are what the shell shows the user
#[derive(Debug, Error)]
pub enum LmsError {
	#[error("email already registered")]
	DuplicateEmail,
	#[error("username already taken")]
	DuplicateUsername,
	#[error("a book with that ISBN is already in the catalog")]
	DuplicateIsbn,
	#[error("no copies available")]
	NoCopiesAvailable,
	#[error("loan is not open")]
	LoanNotOpen,
	#[error("no such record")]
	NotFound,
	#[error("store error: {0}")]
	Store(#[from] sqlx::Error),
}

// unique-constraint failures are mapped to a domain variant at the call
// site that knows which column was in play
pub(crate) fn unique_violation(err: &sqlx::Error) -> bool {
	matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
