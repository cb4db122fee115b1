//! # Middleware
//!
//! - [`tracing_layer`]: request spans.
//!
//! The tenant gate lives in [`crate::auth`].

pub mod tracing_layer;
