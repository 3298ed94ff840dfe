//! Core types shared by every stage of the generator.
//!
//! # Modules
//!
//! ## `error` - Error Handling System
//!
//! - [`DepgenError`] - Enumerated error types covering all failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//! - [`ExitCode`] - Stable process outcome codes
//!
//! # Design Principles
//!
//! Every operation that can fail returns a `Result`. Recoverable conditions
//! (cache misses, a single repository not serving an artifact, rejected optional
//! dependencies) are absorbed by the component that meets them; only conditions
//! that end the run become a [`DepgenError`].

pub mod error;

pub use error::{DepgenError, ErrorContext, ExitCode, user_friendly_error};
