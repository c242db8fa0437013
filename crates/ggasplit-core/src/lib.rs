//! # ggasplit
//!
//! Splits a directory of Extended XYZ structure files into two datasets by chemical
//! composition, annotates every configuration with reference energy, forces and stress, and
//! writes one merged file per dataset.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Configuration`), the periodic table,
//!   the composition rule that assigns a [`Category`](core::composition::Category), and
//!   structure-file I/O.
//!
//! - **[`engine`]: The Machinery.** Run configuration, file discovery and the parallel
//!   load-and-classify pool, the reference-property annotator, per-category accumulation,
//!   output policies and reports.
//!
//! - **[`workflows`]: The Public API.** `merge` and `copy`, each a single call that takes a
//!   validated configuration and a progress reporter.

pub mod core;
pub mod engine;
pub mod workflows;
