//! Client-side core of the eshop storefront.
//!
//! - `storage`: durable and tab-scoped key-value backends
//! - `auth`: `TokenStore` and `SessionManager`
//! - `api`: `ApiClient` for the remote storefront API
//! - `catalog`: filtering, search and sort for the products view
//! - `checkout`: the pending order and its placement
//! - `config`: on-disk configuration

pub mod api;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod models;
pub mod storage;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{Credential, SessionManager, SessionState, TokenStore};
pub use checkout::{Checkout, CheckoutError, PendingOrder};
pub use config::Config;
