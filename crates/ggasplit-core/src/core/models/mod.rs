//! # Core Models Module
//!
//! Data structures for atomic-structure snapshots.
//!
//! - [`configuration`] - A single structure: atoms, cell, periodicity, and its property stores
//! - [`properties`] - Typed per-structure metadata values and per-atom columns
//!
//! ```ignore
//! use ggasplit::core::models::configuration::{Atom, Configuration};
//! use ggasplit::core::models::properties::InfoValue;
//!
//! let mut config = Configuration::new(vec![Atom::new("Fe", Point3::origin())]);
//! config.set_info("energy", InfoValue::Real(-8.3));
//! assert!(config.element_set().contains("Fe"));
//! ```

pub mod configuration;
pub mod properties;
