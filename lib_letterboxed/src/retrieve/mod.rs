//! # Data Retrieval Module
//!
//! This module provides a centralized location for the HTTP plumbing used to
//! pull the puzzle page from its publisher.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: A generic HTTP `ApiClient` built on `reqwest` and
//!   `reqwest-middleware`, featuring automatic retries with exponential
//!   backoff. The puzzle fetch collaborator is built on top of it.
//!
//! By using the components within this module, the puzzle code can focus on
//! page extraction and validation, delegating the complexities of network
//! communication to this layer.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Generic HTTP API client with retry middleware for resilient network requests.
pub mod ky_http;

pub use ky_http::{ApiClient, ApiClientOptions, ApiResponse};
