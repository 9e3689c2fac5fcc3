//! Input/output helpers.
//!
//! - constant-set presets and JSON loading (`config`)
//! - Pantheon table ingest + validation (`ingest`)
//! - CSV exports (`export`)
//! - curve JSON read/write (`curve`)

pub mod config;
pub mod curve;
pub mod export;
pub mod ingest;

pub use config::*;
pub use curve::*;
pub use export::*;
pub use ingest::*;
