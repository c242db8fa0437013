use super::properties::{InfoValue, PerAtomColumn};
use crate::core::composition::ElementSet;
use nalgebra::{Matrix3, Point3};
use std::collections::BTreeMap;
use thiserror::Error;

/// Column names that are stored structurally on [`Configuration`] rather than as generic columns.
pub const RESERVED_COLUMNS: [&str; 2] = ["species", "pos"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Column '{name}' has {found} entries, expected {expected} ({atoms} atoms x width {width})")]
    ColumnLength {
        name: String,
        atoms: usize,
        width: usize,
        expected: usize,
        found: usize,
    },
    #[error("Column '{0}' is reserved and cannot be set directly")]
    ReservedColumn(String),
    #[error("Column '{0}' must have a width of at least 1")]
    ZeroWidth(String),
}

/// A single atom: its element symbol and Cartesian position in Angstroms.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub symbol: String,
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(symbol: &str, position: Point3<f64>) -> Self {
        Self {
            symbol: symbol.to_string(),
            position,
        }
    }
}

/// One atomic-structure snapshot.
///
/// Besides atoms, cell and periodicity, a configuration carries two open-ended property
/// stores: per-structure metadata (`info`, e.g. total energy or stress) and per-atom
/// columns (e.g. forces). Every per-atom column always describes exactly `len()` atoms.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Configuration {
    atoms: Vec<Atom>,
    /// Cell vectors as matrix rows.
    pub cell: Option<Matrix3<f64>>,
    pub pbc: [bool; 3],
    info: BTreeMap<String, InfoValue>,
    columns: Vec<PerAtomColumn>,
}

impl Configuration {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self {
            atoms,
            ..Default::default()
        }
    }

    /// Sets the cell and marks all three directions periodic.
    pub fn with_cell(mut self, cell: Matrix3<f64>) -> Self {
        self.cell = Some(cell);
        self.pbc = [true; 3];
        self
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Mutable access to the atoms. The atom count is fixed once constructed.
    pub fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.atoms.iter().map(|a| a.symbol.as_str())
    }

    /// The distinct element symbols of this configuration.
    pub fn element_set(&self) -> ElementSet {
        self.symbols().map(str::to_string).collect()
    }

    pub fn info(&self) -> &BTreeMap<String, InfoValue> {
        &self.info
    }

    pub fn get_info(&self, key: &str) -> Option<&InfoValue> {
        self.info.get(key)
    }

    /// Inserts or replaces a metadata entry.
    pub fn set_info(&mut self, key: impl Into<String>, value: InfoValue) {
        self.info.insert(key.into(), value);
    }

    pub fn columns(&self) -> &[PerAtomColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&PerAtomColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Inserts a per-atom column, replacing an existing one of the same name in place.
    ///
    /// # Errors
    ///
    /// Fails if the column length does not match the atom count, the width is zero, or the
    /// name is one of [`RESERVED_COLUMNS`].
    pub fn set_column(&mut self, column: PerAtomColumn) -> Result<(), ModelError> {
        if RESERVED_COLUMNS.contains(&column.name.as_str()) {
            return Err(ModelError::ReservedColumn(column.name));
        }
        if column.width == 0 {
            return Err(ModelError::ZeroWidth(column.name));
        }
        let expected = self.atoms.len() * column.width;
        if column.values.len() != expected {
            return Err(ModelError::ColumnLength {
                atoms: self.atoms.len(),
                width: column.width,
                expected,
                found: column.values.len(),
                name: column.name,
            });
        }

        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }
}
