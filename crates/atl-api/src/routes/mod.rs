//! # API Route Modules
//!
//! - [`translation`]: the six `/translation` routes.

pub mod translation;
