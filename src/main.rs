// library management system -- web shell over the lms core

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Form, Router};
use lms::accounts::Accounts;
use lms::analytics::Analytics;
use lms::catalog::Catalog;
use lms::circulation::{Circulation, DEFAULT_LOAN_DAYS};
use lms::types::{Book, Identity, NewBook};
use maud::{html, Markup};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};
use uuid::Uuid;

const SESSION_COOKIE: &str = "lms_session";

type Sessions = Arc<Mutex<HashMap<Uuid, Identity>>>;

#[derive(Clone)]
struct ServerState {
	accounts: Accounts,
	catalog: Catalog,
	circulation: Circulation,
	analytics: Analytics,
	sessions: Sessions,
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "info".into()),
		)
		.init();

	let db_connection_str = std::env::var("DATABASE_URL")
		.expect("DATABASE_URL not set in env");

	let pool = lms::sql::connect(&db_connection_str)
		.await
		.expect("can't connect to database");
	lms::sql::seed_sample_books(&pool)
		.await
		.expect("can't seed catalog");

	let state = ServerState {
		accounts: Accounts::new(pool.clone()),
		catalog: Catalog::new(pool.clone()),
		circulation: Circulation::new(pool.clone()),
		analytics: Analytics::new(pool),
		sessions: Arc::new(Mutex::new(HashMap::new())),
	};

	let app = Router::new()
		.route("/", get(display_all))
		.route("/available", get(display_available))
		.route("/search", get(perform_search))
		.route("/login", get(display_login).post(perform_login))
		.route("/register", get(display_register).post(perform_register))
		.route("/books/new", get(display_add_book).post(perform_add_book))
		.route("/loans", get(display_loans))
		.route("/issue", post(perform_issue))
		.route("/return", post(perform_return))
		.route("/top", get(display_top))
		.route("/logout", get(perform_logout))
		.layer(CookieManagerLayer::new())
		.with_state(state);

	let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
	tracing::info!("listening on 0.0.0.0:8080");
	axum::serve(listener, app).await.unwrap();
}

async fn session_identity(state: &ServerState, cookies: &Cookies) -> Option<Identity> {
	let token = cookies.get(SESSION_COOKIE)?.value().parse::<Uuid>().ok()?;
	state.sessions.lock().await.get(&token).cloned()
}

// ---------- pages ----------

fn page(title: &str, identity: Option<&Identity>, content: Markup) -> Markup {
	html! { body {
		h1 { (title) }
		nav {
			a href="/" { "All Books" } " | "
			a href="/available" { "Available" } " | "
			a href="/top" { "Top Issued" } " | "
			@if let Some(id) = identity {
				a href="/loans" { "My Loans" } " | "
				a href="/books/new" { "Add Book" } " | "
				a href="/logout" { "Logout (" (id.username) ")" }
			} @else {
				a href="/login" { "Login" } " | "
				a href="/register" { "Register" }
			}
		}
		hr {}
		(content)
	} }
}

fn message(identity: Option<&Identity>, msg: &str) -> Markup {
	page("LMS", identity, html! { p { (msg) } })
}

fn book_table(books: &[Book], identity: Option<&Identity>) -> Markup {
	html! { table {
		thead { tr {
			td { "Title" }
			td { "Author" }
			td { "Publisher" }
			td { "ISBN" }
			td { "Year" }
			td { "Available" }
			@if identity.is_some_and(|id| id.member_id.is_some()) {
				td {}
			}
		} }
		tbody {
			@for book in books {
				tr {
					th { (book.title) }
					td { (book.author) }
					td { (book.publisher) }
					td { (book.isbn) }
					td { (book.year_published) }
					td { (book.available_copies) "/" (book.total_copies) }
					@if identity.is_some_and(|id| id.member_id.is_some()) {
						td { form method="POST" action="/issue" {
							input type="hidden" name="book_id" value=(book.book_id) {}
							button { "Issue" }
						} }
					}
				}
			}
		}
	} }
}

async fn display_all(State(stt): State<ServerState>, cookies: Cookies) -> Markup {
	let identity = session_identity(&stt, &cookies).await;
	match stt.catalog.list_all().await {
		Ok(books) => page("All Books", identity.as_ref(), html! {
			form method="GET" action="/search" {
				input name="q" type="text" placeholder="title or author" {}
				button { "Search" }
			}
			(book_table(&books, identity.as_ref()))
		}),
		Err(e) => message(identity.as_ref(), &e.to_string()),
	}
}

async fn display_available(State(stt): State<ServerState>, cookies: Cookies) -> Markup {
	let identity = session_identity(&stt, &cookies).await;
	match stt.catalog.list_available().await {
		Ok(books) => page("Available Books", identity.as_ref(), book_table(&books, identity.as_ref())),
		Err(e) => message(identity.as_ref(), &e.to_string()),
	}
}

#[derive(Deserialize, Debug)]
struct FormSearch {
	q: String,
}

async fn perform_search(
	State(stt): State<ServerState>,
	cookies: Cookies,
	Query(search): Query<FormSearch>,
) -> Markup {
	let identity = session_identity(&stt, &cookies).await;
	match stt.catalog.search(&search.q).await {
		Ok(books) => page("Search Results", identity.as_ref(), book_table(&books, identity.as_ref())),
		Err(e) => message(identity.as_ref(), &e.to_string()),
	}
}

// ---------- login / register ----------

#[derive(Deserialize, Debug)]
struct FormLogin {
	username: String,
	pass: String,
}

async fn display_login() -> Markup {
	page("Login", None, html! {
		form method="POST" action="/login" {
			input name="username" type="text" placeholder="username" {}
			input name="pass" type="password" placeholder="password" {}
			button { "Login" }
		}
	})
}

async fn perform_login(
	State(stt): State<ServerState>,
	cookies: Cookies,
	Form(login): Form<FormLogin>,
) -> Result<Redirect, Markup> {
	if login.username.is_empty() || login.pass.is_empty() {
		return Err(message(None, "please enter both username and password"));
	}
	match stt.accounts.authenticate(&login.username, &login.pass).await {
		Ok(Some(identity)) => {
			let token = Uuid::new_v4();
			stt.sessions.lock().await.insert(token, identity);
			cookies.add(Cookie::new(SESSION_COOKIE, token.to_string()));
			Ok(Redirect::to("/"))
		}
		Ok(None) => Err(message(None, "invalid username or password")),
		Err(e) => Err(message(None, &e.to_string())),
	}
}

#[derive(Deserialize, Debug)]
struct FormRegister {
	full_name: String,
	email: String,
	phone: String,
	username: String,
	pass: String,
	confirm: String,
}

async fn display_register() -> Markup {
	page("Register", None, html! {
		form method="POST" action="/register" {
			input name="full_name" type="text" placeholder="full name" {}
			input name="email" type="email" placeholder="email" {}
			input name="phone" type="text" placeholder="phone" {}
			input name="username" type="text" placeholder="username" {}
			input name="pass" type="password" placeholder="password" {}
			input name="confirm" type="password" placeholder="confirm password" {}
			button { "Create Account" }
		}
	})
}

async fn perform_register(
	State(stt): State<ServerState>,
	Form(reg): Form<FormRegister>,
) -> Markup {
	// field checks live here, not in the core
	if reg.full_name.is_empty()
		|| reg.email.is_empty()
		|| reg.username.is_empty()
		|| reg.pass.is_empty()
	{
		return message(None, "please fill in all required fields");
	}
	if reg.pass != reg.confirm {
		return message(None, "passwords do not match");
	}
	match stt
		.accounts
		.register(&reg.full_name, &reg.email, &reg.phone, &reg.username, &reg.pass)
		.await
	{
		Ok(_) => message(None, "account created, you can now login"),
		Err(e) => message(None, &e.to_string()),
	}
}

async fn perform_logout(State(stt): State<ServerState>, cookies: Cookies) -> Redirect {
	if let Some(cookie) = cookies.get(SESSION_COOKIE) {
		if let Ok(token) = cookie.value().parse::<Uuid>() {
			stt.sessions.lock().await.remove(&token);
		}
		cookies.remove(Cookie::new(SESSION_COOKIE, ""));
	}
	Redirect::to("/")
}

// ---------- catalog management ----------

async fn display_add_book(State(stt): State<ServerState>, cookies: Cookies) -> Markup {
	let identity = session_identity(&stt, &cookies).await;
	if identity.is_none() {
		return message(None, "login to add books");
	}
	page("Add Book", identity.as_ref(), html! {
		form method="POST" action="/books/new" {
			input name="title" type="text" placeholder="title" {}
			input name="author" type="text" placeholder="author" {}
			input name="publisher" type="text" placeholder="publisher" {}
			input name="isbn" type="text" placeholder="isbn" {}
			input name="year_published" type="number" placeholder="year" {}
			input name="total_copies" type="number" placeholder="copies" value="1" {}
			button { "Add Book" }
		}
	})
}

async fn perform_add_book(
	State(stt): State<ServerState>,
	cookies: Cookies,
	Form(book): Form<NewBook>,
) -> Markup {
	let identity = session_identity(&stt, &cookies).await;
	if identity.is_none() {
		return message(None, "login to add books");
	}
	if book.title.is_empty() || book.isbn.is_empty() || book.total_copies < 1 {
		return message(identity.as_ref(), "title, isbn and a positive copy count are required");
	}
	match stt.catalog.add_book(&book).await {
		Ok(_) => message(identity.as_ref(), "book added"),
		Err(e) => message(identity.as_ref(), &e.to_string()),
	}
}

// ---------- circulation ----------

#[derive(Deserialize, Debug)]
struct FormIssue {
	book_id: i64,
}

#[derive(Deserialize, Debug)]
struct FormReturn {
	loan_id: i64,
}

async fn display_loans(State(stt): State<ServerState>, cookies: Cookies) -> Markup {
	let identity = session_identity(&stt, &cookies).await;
	let Some(member_id) = identity.as_ref().and_then(|id| id.member_id) else {
		return message(identity.as_ref(), "login with a member account to see loans");
	};
	let greeting = match stt.accounts.member(member_id).await {
		Ok(member) => member.full_name,
		Err(_) => String::new(),
	};
	match stt.circulation.open_loans(member_id).await {
		Ok(loans) => page("My Loans", identity.as_ref(), html! {
			p { "Borrowed by " (greeting) }
			table {
				thead { tr {
					td { "Title" }
					td { "Issued" }
					td { "Due" }
					td {}
				} }
				tbody {
					@for loan in &loans {
						tr {
							th { (loan.title) }
							td { (loan.issue_date) }
							td { (loan.due_date) }
							td { form method="POST" action="/return" {
								input type="hidden" name="loan_id" value=(loan.loan_id) {}
								button { "Return" }
							} }
						}
					}
				}
			}
		}),
		Err(e) => message(identity.as_ref(), &e.to_string()),
	}
}

async fn perform_issue(
	State(stt): State<ServerState>,
	cookies: Cookies,
	Form(issue): Form<FormIssue>,
) -> Result<Redirect, Markup> {
	let identity = session_identity(&stt, &cookies).await;
	let Some(member_id) = identity.as_ref().and_then(|id| id.member_id) else {
		return Err(message(identity.as_ref(), "login with a member account to issue books"));
	};
	match stt
		.circulation
		.issue_book(issue.book_id, member_id, DEFAULT_LOAN_DAYS)
		.await
	{
		Ok(_) => Ok(Redirect::to("/loans")),
		Err(e) => Err(message(identity.as_ref(), &e.to_string())),
	}
}

async fn perform_return(
	State(stt): State<ServerState>,
	cookies: Cookies,
	Form(ret): Form<FormReturn>,
) -> Result<Redirect, Markup> {
	let identity = session_identity(&stt, &cookies).await;
	if identity.as_ref().and_then(|id| id.member_id).is_none() {
		return Err(message(identity.as_ref(), "login with a member account to return books"));
	}
	match stt.circulation.return_book(ret.loan_id).await {
		Ok(()) => Ok(Redirect::to("/loans")),
		Err(e) => Err(message(identity.as_ref(), &e.to_string())),
	}
}

// ---------- reports ----------

async fn display_top(State(stt): State<ServerState>, cookies: Cookies) -> Markup {
	let identity = session_identity(&stt, &cookies).await;
	match stt.analytics.top_issued(10).await {
		Ok(rows) => page("Top Issued Books", identity.as_ref(), html! {
			@if rows.is_empty() {
				p { "No issues yet" }
			} @else {
				table {
					thead { tr {
						td { "Title" }
						td { "Issue Count" }
					} }
					tbody {
						@for row in &rows {
							tr {
								th { (row.title) }
								td { (row.issue_count) }
							}
						}
					}
				}
			}
		}),
		Err(e) => message(identity.as_ref(), &e.to_string()),
	}
}
