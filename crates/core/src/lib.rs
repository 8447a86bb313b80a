//! AmlWatch Core - Domain types
//!
//! This crate contains the fundamental types shared by every screening stage:
//! - `Amount`: Strictly positive decimal wrapper for transaction amounts
//! - `Currency`: Normalized 3-letter currency code
//! - `Transaction` / `NewTransaction`: screened records and the ingestion contract
//! - `Account`: Read-only subject reference data
//! - `window`: Rule window parsing (`"12h"`, `"1h30m"`, ...)

pub mod account;
pub mod amount;
pub mod currency;
pub mod transaction;
pub mod window;

pub use account::Account;
pub use amount::{Amount, AmountError};
pub use currency::{Currency, CurrencyError};
pub use transaction::{NewTransaction, Transaction, ValidationError};
pub use window::{parse_window, within_window, WindowError};
