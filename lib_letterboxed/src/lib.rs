//! # lib_letterboxed
//!
//! Building blocks for the Letter Boxed solutions service. Each folder is gated
//! behind a cargo feature of the same name so that consumers only pay for what
//! they use.
//!
//! - **`retrieve`**: resilient HTTP client with retry middleware.
//! - **`puzzle`**: puzzle data model, validation, page extraction and the
//!   dictionary matcher that produces the classified solution sets.
//! - **`cache`**: the single-snapshot store, the single-flight refresher, the
//!   background refresh scheduler and the query handler.
//! - **`utils`**: timing helpers.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

#[cfg(feature = "cache")]
pub mod cache;
#[cfg(feature = "puzzle")]
pub mod puzzle;
#[cfg(feature = "retrieve")]
pub mod retrieve;
#[cfg(feature = "utils")]
pub mod utils;
