use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::FromRow;

pub type Bid = i64;
pub type Mid = i64;
pub type Uid = i64;
pub type Lid = i64;

#[derive(Debug, Clone, FromRow)]
pub struct Book {
	pub book_id: Bid,
	pub title: String,
	pub author: String,
	pub publisher: String,
	pub isbn: String,
	pub year_published: i64,
	pub total_copies: i64,
	pub available_copies: i64,
}

// payload for catalog inserts; doubles as the add-book form
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
	pub title: String,
	pub author: String,
	pub publisher: String,
	pub isbn: String,
	pub year_published: i64,
	pub total_copies: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum MemberStatus {
	Active,
	Suspended,
	Alumni,
}

#[derive(Debug, Clone, FromRow)]
pub struct Member {
	pub member_id: Mid,
	pub full_name: String,
	pub email: String,
	pub phone: String,
	pub join_date: NaiveDate,
	pub status: MemberStatus,
}

// who may do what is decided by the calling layer; the core only records it
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
	Member,
	Librarian,
	Admin,
}

// what a successful login hands back to the caller; librarian and admin
// accounts may carry no member link
#[derive(Debug, Clone)]
pub struct Identity {
	pub user_id: Uid,
	pub member_id: Option<Mid>,
	pub username: String,
	pub role: Role,
}

// a loan is open while return_date is NULL
#[derive(Debug, Clone, FromRow)]
pub struct Loan {
	pub loan_id: Lid,
	pub book_id: Bid,
	pub member_id: Mid,
	pub issue_date: NaiveDate,
	pub due_date: NaiveDate,
	pub return_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OpenLoan {
	pub loan_id: Lid,
	pub book_id: Bid,
	pub title: String,
	pub issue_date: NaiveDate,
	pub due_date: NaiveDate,
}

#[derive(Debug, Clone, FromRow)]
pub struct TopBook {
	pub title: String,
	pub issue_count: i64,
}
