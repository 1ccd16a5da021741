//! # Utilities Module
//!
//! General-purpose helpers shared by the `puzzle` and `cache` folders.
//!
//! ## Contained Modules:
//!
//! - **`timing`**: wall-clock helpers. Measures pipeline stages and logs how
//!   long they took, and exposes the current Unix time in seconds.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Stage timing and Unix-time helpers.
pub mod timing;

pub use timing::{now_unix, timed, timed_async};
