// library management core: accounts, catalog, circulation, analytics
//
// every service holds its own pool handle; the binary in main.rs is one
// possible shell over this library

pub mod accounts;
pub mod analytics;
pub mod catalog;
pub mod circulation;
pub mod error;
pub mod sql;
pub mod types;

pub use error::LmsError;
