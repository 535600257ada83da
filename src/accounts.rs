use crate::error::{unique_violation, LmsError};
use crate::types::{Identity, Member, Mid, Role, Uid};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

/// Member registration and credential checks.
#[derive(Clone)]
pub struct Accounts {
	db: SqlitePool,
}

impl Accounts {
	pub fn new(db: SqlitePool) -> Self {
		Self { db }
	}

	// member and user rows are created in one transaction: a taken username
	// must not leave an orphan member behind
	pub async fn register(
		&self,
		full_name: &str,
		email: &str,
		phone: &str,
		username: &str,
		password: &str,
	) -> Result<Mid, LmsError> {
		let digest = hash_password(password);
		let mut tx = self.db.begin().await?;
		let member_id = sqlx::query(
			"INSERT INTO members (full_name, email, phone) VALUES (?, ?, ?)",
		)
		.bind(full_name)
		.bind(email)
		.bind(phone)
		.execute(&mut *tx)
		.await
		.map_err(|e| {
			if unique_violation(&e) {
				LmsError::DuplicateEmail
			} else {
				e.into()
			}
		})?
		.last_insert_rowid();

		sqlx::query(
			"INSERT INTO users (member_id, username, password_hash, role)
			VALUES (?, ?, ?, ?)",
		)
		.bind(member_id)
		.bind(username)
		.bind(&digest)
		.bind(Role::Member)
		.execute(&mut *tx)
		.await
		.map_err(|e| {
			if unique_violation(&e) {
				LmsError::DuplicateUsername
			} else {
				e.into()
			}
		})?;

		tx.commit().await?;
		tracing::info!(member_id, username, "registered member account");
		Ok(member_id)
	}

	// None covers both an unknown username and a wrong password; the caller
	// can't tell which, on purpose
	pub async fn authenticate(
		&self,
		username: &str,
		password: &str,
	) -> Result<Option<Identity>, LmsError> {
		let row: Option<(Uid, Option<Mid>, String, Role)> = sqlx::query_as(
			"SELECT user_id, member_id, password_hash, role
			FROM users WHERE username = ?",
		)
		.bind(username)
		.fetch_optional(&self.db)
		.await?;

		let Some((user_id, member_id, stored, role)) = row else {
			return Ok(None);
		};
		if !digest_matches(&stored, password) {
			tracing::warn!(username, "failed login attempt");
			return Ok(None);
		}
		Ok(Some(Identity {
			user_id,
			member_id,
			username: username.to_string(),
			role,
		}))
	}

	pub async fn member(&self, member_id: Mid) -> Result<Member, LmsError> {
		sqlx::query_as::<_, Member>(
			"SELECT member_id, full_name, email, phone, join_date, status
			FROM members WHERE member_id = ?",
		)
		.bind(member_id)
		.fetch_optional(&self.db)
		.await?
		.ok_or(LmsError::NotFound)
	}
}

fn hash_password(plain: &str) -> String {
	format!("{:x}", Sha256::digest(plain.as_bytes()))
}

// constant-time compare so response timing leaks nothing about the digest
fn digest_matches(stored: &str, supplied: &str) -> bool {
	let computed = hash_password(supplied);
	constant_time_eq::constant_time_eq(stored.as_bytes(), computed.as_bytes())
}
