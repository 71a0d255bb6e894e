//! Remote API collaborator: credentials and the HTTP client

pub mod client;
pub mod credentials;

pub use client::{error_message, ApiClient, ApiError, ApiResponse};
pub use credentials::{Credentials, UserConfig, API_SECRET_ENV, API_URL_ENV, BEARER_TOKEN_ENV};
