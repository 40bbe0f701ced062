//! REST API client module for the remote storefront service.
//!
//! This module provides the `ApiClient` for the catalog, address book
//! and order endpoints. Every protected call carries the stored
//! credential in the `x-auth-token` header; a 401 answer clears the
//! session and surfaces as `ApiError::SessionExpired`.

pub mod client;
pub mod error;

pub use client::{build_http_client, ApiClient};
pub use error::ApiError;

/// Request header carrying the credential
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Base URL used when neither config nor environment names one
pub const DEFAULT_API_BASE_URL: &str = "https://dev-project-ecommerce.upgrad.dev/api";
