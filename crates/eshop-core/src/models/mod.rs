//! Data models for the remote storefront API.
//!
//! - `Product`, `NewProduct`: catalog entries
//! - `Address`, `NewAddress`: shipping address book
//! - `OrderRequest`: order placement payload
//! - Sign-in and sign-up request/response bodies

pub mod address;
pub mod order;
pub mod product;
pub mod user;

pub use address::{Address, NewAddress};
pub use order::OrderRequest;
pub use product::{NewProduct, Product};
pub use user::{SignInRequest, SignInResponse, SignupRequest, SignupResponse};
