//! Authentication module for the storefront session.
//!
//! This module provides:
//! - `TokenStore`: the credential mirrored across durable and tab-scoped storage
//! - `SessionManager`: sign-in, logout and background re-validation
//!
//! A session is "authenticated" while a stored, unexpired credential exists.
//! The client never inspects the token itself; the remote API decides.

pub mod session;
pub mod token_store;

pub use session::{RevalidationHandle, SessionManager, SessionState};
pub use token_store::{Credential, TokenStore};
