mod common;

use chrono::Duration;
use lms::circulation::{Circulation, DEFAULT_LOAN_DAYS};
use lms::LmsError;

#[tokio::test]
async fn issue_then_return_restores_copies() {
	let pool = common::memory_pool().await;
	let book = common::seed_book(&pool, "Dune", "9780441013593", 5).await;
	let member = common::seed_member(&pool, "paul@arrakis.example", "muaddib").await;
	let circ = Circulation::new(pool.clone());

	let loan = circ
		.issue_book(book, member, DEFAULT_LOAN_DAYS)
		.await
		.expect("issue");
	assert_eq!(common::available_copies(&pool, book).await, 4);
	assert_eq!(common::open_loans_on(&pool, book).await, 1);

	circ.return_book(loan).await.expect("return");
	assert_eq!(common::available_copies(&pool, book).await, 5);
	assert_eq!(common::open_loans_on(&pool, book).await, 0);

	let closed = circ.loan(loan).await.expect("loan row");
	assert!(closed.return_date.is_some());
	assert_eq!(closed.due_date, closed.issue_date + Duration::days(DEFAULT_LOAN_DAYS));
	assert_eq!(common::table_count(&pool, "loans").await, 1);
}

#[tokio::test]
async fn concurrent_issues_race_for_last_copy() {
	let pool = common::memory_pool().await;
	let book = common::seed_book(&pool, "Neuromancer", "9780441569595", 1).await;
	let case = common::seed_member(&pool, "case@sprawl.example", "case").await;
	let molly = common::seed_member(&pool, "molly@sprawl.example", "molly").await;
	let circ = Circulation::new(pool.clone());

	let (first, second) = tokio::join!(
		circ.issue_book(book, case, DEFAULT_LOAN_DAYS),
		circ.issue_book(book, molly, DEFAULT_LOAN_DAYS),
	);

	// exactly one racer gets the copy, the other observes the typed failure
	let winners = [&first, &second].iter().filter(|r| r.is_ok()).count();
	assert_eq!(winners, 1);
	let loser = if first.is_ok() { second } else { first };
	assert!(matches!(loser, Err(LmsError::NoCopiesAvailable)));

	assert_eq!(common::available_copies(&pool, book).await, 0);
	assert_eq!(common::open_loans_on(&pool, book).await, 1);
}

#[tokio::test]
async fn double_return_is_rejected() {
	let pool = common::memory_pool().await;
	let book = common::seed_book(&pool, "Solaris", "9780156027601", 3).await;
	let member = common::seed_member(&pool, "kelvin@station.example", "kelvin").await;
	let circ = Circulation::new(pool.clone());

	let loan = circ
		.issue_book(book, member, DEFAULT_LOAN_DAYS)
		.await
		.expect("issue");
	circ.return_book(loan).await.expect("first return");

	let again = circ.return_book(loan).await;
	assert!(matches!(again, Err(LmsError::LoanNotOpen)));
	// the shelf was incremented exactly once
	assert_eq!(common::available_copies(&pool, book).await, 3);
}

#[tokio::test]
async fn copy_exhaustion_and_recovery() {
	let pool = common::memory_pool().await;
	let book = common::seed_book(&pool, "Hyperion", "9780553283686", 2).await;
	let member = common::seed_member(&pool, "sol@hegemony.example", "sol").await;
	let circ = Circulation::new(pool.clone());

	let first = circ
		.issue_book(book, member, DEFAULT_LOAN_DAYS)
		.await
		.expect("first issue");
	circ.issue_book(book, member, DEFAULT_LOAN_DAYS)
		.await
		.expect("second issue");

	let third = circ.issue_book(book, member, DEFAULT_LOAN_DAYS).await;
	assert!(matches!(third, Err(LmsError::NoCopiesAvailable)));
	// the aborted attempt left the counter alone
	assert_eq!(common::available_copies(&pool, book).await, 0);
	assert_eq!(common::open_loans_on(&pool, book).await, 2);

	circ.return_book(first).await.expect("return");
	assert_eq!(common::available_copies(&pool, book).await, 1);

	circ.issue_book(book, member, DEFAULT_LOAN_DAYS)
		.await
		.expect("issue after return");
	assert_eq!(common::available_copies(&pool, book).await, 0);
}

#[tokio::test]
async fn unknown_ids_are_typed_failures() {
	let pool = common::memory_pool().await;
	let book = common::seed_book(&pool, "Ubik", "9780547572291", 1).await;
	let member = common::seed_member(&pool, "joe@runciter.example", "joechip").await;
	let circ = Circulation::new(pool.clone());

	assert!(matches!(
		circ.issue_book(9999, member, DEFAULT_LOAN_DAYS).await,
		Err(LmsError::NotFound)
	));
	assert!(matches!(
		circ.issue_book(book, 9999, DEFAULT_LOAN_DAYS).await,
		Err(LmsError::NotFound)
	));
	assert!(matches!(circ.return_book(9999).await, Err(LmsError::LoanNotOpen)));
	assert!(matches!(circ.loan(9999).await, Err(LmsError::NotFound)));

	// none of the failed calls touched the shelf
	assert_eq!(common::available_copies(&pool, book).await, 1);
	assert_eq!(common::table_count(&pool, "loans").await, 0);
}

#[tokio::test]
async fn open_loans_lists_only_that_members_open_loans() {
	let pool = common::memory_pool().await;
	let dune = common::seed_book(&pool, "Dune", "9780441013593", 2).await;
	let ubik = common::seed_book(&pool, "Ubik", "9780547572291", 2).await;
	let paul = common::seed_member(&pool, "paul@arrakis.example", "muaddib").await;
	let joe = common::seed_member(&pool, "joe@runciter.example", "joechip").await;
	let circ = Circulation::new(pool.clone());

	let returned = circ.issue_book(dune, paul, 7).await.expect("issue");
	circ.return_book(returned).await.expect("return");
	circ.issue_book(ubik, paul, 7).await.expect("issue");
	circ.issue_book(dune, joe, 7).await.expect("issue");

	let loans = circ.open_loans(paul).await.expect("open loans");
	assert_eq!(loans.len(), 1);
	assert_eq!(loans[0].book_id, ubik);
	assert_eq!(loans[0].title, "Ubik");
	assert_eq!(loans[0].due_date, loans[0].issue_date + Duration::days(7));
}
