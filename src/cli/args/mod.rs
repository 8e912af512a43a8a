//! Shared CLI argument types

pub mod common;
pub mod global;

pub use common::OutputFormat;
pub use global::GlobalOptions;
