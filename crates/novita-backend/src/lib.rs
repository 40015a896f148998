//! REST client for the hosted products table.
//!
//! The backend is a PostgREST-style API in front of Postgres. This crate
//! speaks its plain HTTP dialect: table rows as JSON, filters as query
//! parameters, credentials as the `apikey` header plus a bearer token.

pub mod client;
pub mod credential;
pub mod error;
pub(crate) mod retry;
pub mod schema;

pub use client::BackendClient;
pub use credential::Credential;
pub use error::BackendError;
pub use schema::{products_table_ddl, PRODUCTS_TABLE_DDL};
