//! Shared types and pure computations for the wellness dashboard
//!
//! This crate contains the canonical environmental models and the I/O-free
//! parts of the stress pipeline, shared between the pipeline crate and the
//! browser (via WASM).

pub mod models;
pub mod normalization;
pub mod scoring;
pub mod suggestions;
pub mod types;
pub mod validation;

pub use models::*;
pub use normalization::*;
pub use scoring::*;
pub use suggestions::*;
pub use types::*;
pub use validation::*;
