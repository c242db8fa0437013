//! # Engine Module
//!
//! The stateful machinery shared by the workflows: run configuration, file discovery and
//! classification, reference annotation, per-category accumulation, output handling and
//! progress reporting.
//!
//! - **Configuration** ([`config`]) - Validated run settings built through builders
//! - **Loading** ([`loader`]) - Input discovery, per-file classification and the worker pool
//! - **Annotation** ([`annotate`]) - Reference energy, forces and stress keys
//! - **Accumulation** ([`accumulator`]) - Ordered per-category data and element vocabularies
//! - **Output** ([`output`]) - Overwrite policy and append-only output containers
//! - **Reporting** ([`report`], [`progress`]) - CSV classification report and progress events
//! - **Error Handling** ([`error`]) - Engine-level errors carrying the path they concern

pub mod accumulator;
pub mod annotate;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod progress;
pub mod report;
