//! Domain models for the wellness pipeline

mod environment;
mod stress;
mod suggestion;

pub use environment::*;
pub use stress::*;
pub use suggestion::*;
