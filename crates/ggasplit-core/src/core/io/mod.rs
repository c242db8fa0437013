//! Provides input/output functionality for structure file formats.
//!
//! A structure file is an ordered sequence of configurations. The [`traits::StructureFile`]
//! trait gives every format the same whole-file and first-frame read modes plus
//! create and append write modes; [`extxyz`] implements it for Extended XYZ.

pub mod extxyz;
pub mod traits;
