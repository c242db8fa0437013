//! # Core Module
//!
//! Stateless building blocks: structure models, chemical composition rules, and file I/O.
//!
//! - **Structure Representation** ([`models`]) - Configurations, atoms, and their properties
//! - **Composition Rules** ([`composition`]) - Element sets and the category classification rule
//! - **File I/O** ([`io`]) - Reading and writing multi-frame structure files
//! - **Utilities** ([`utils`]) - Periodic-table lookups

pub mod composition;
pub mod io;
pub mod models;
pub mod utils;
