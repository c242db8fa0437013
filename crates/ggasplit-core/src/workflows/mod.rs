//! # Workflows Module
//!
//! The two end-to-end entry points of the library.
//!
//! - **Merge** ([`merge`]) - Classifies every input file, annotates its configurations with
//!   reference properties, and writes one merged structure file per category followed by the
//!   matching isolated-atom records.
//! - **Copy** ([`copy`]) - Classifies every input file from its first configuration and copies
//!   the file unchanged into its category's destination directory.
//!
//! Both workflows report progress through a [`ProgressReporter`](crate::engine::progress::ProgressReporter)
//! and fail fast on the first file that cannot be processed.

pub mod copy;
pub mod merge;
