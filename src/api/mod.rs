//! HTTP access to the HR backend
//!
//! JSON over HTTP with bearer-token authentication. Failed requests surface as
//! [`ApiError`] carrying the most useful message the backend provided.

mod client;
mod error;

pub use client::ApiClient;
pub use error::{extract_error_message, status_error, ApiError};
