use nalgebra::Vector3;

/// A per-structure metadata value, as carried on the comment line of a structure frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    Int(i64),
    Real(f64),
    Bool(bool),
    Str(String),
    IntArray(Vec<i64>),
    RealArray(Vec<f64>),
    BoolArray(Vec<bool>),
}

impl InfoValue {
    /// Returns the value as a real scalar, widening integers.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            InfoValue::Real(v) => Some(*v),
            InfoValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the value as a real array, widening integer arrays.
    pub fn as_real_array(&self) -> Option<Vec<f64>> {
        match self {
            InfoValue::RealArray(v) => Some(v.clone()),
            InfoValue::IntArray(v) => Some(v.iter().map(|&x| x as f64).collect()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            InfoValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            InfoValue::Int(_) => "integer",
            InfoValue::Real(_) => "real",
            InfoValue::Bool(_) => "logical",
            InfoValue::Str(_) => "string",
            InfoValue::IntArray(_) => "integer array",
            InfoValue::RealArray(_) => "real array",
            InfoValue::BoolArray(_) => "logical array",
        }
    }
}

/// The element type of a per-atom column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Str,
    Real,
    Int,
    Bool,
}

impl ColumnKind {
    /// The single-letter type code used in a `Properties` schema.
    pub fn code(self) -> char {
        match self {
            ColumnKind::Str => 'S',
            ColumnKind::Real => 'R',
            ColumnKind::Int => 'I',
            ColumnKind::Bool => 'L',
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(ColumnKind::Str),
            "R" => Some(ColumnKind::Real),
            "I" => Some(ColumnKind::Int),
            "L" => Some(ColumnKind::Bool),
            _ => None,
        }
    }
}

/// Flat, row-major storage for a per-atom column (`rows * width` entries).
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Str(Vec<String>),
    Real(Vec<f64>),
    Int(Vec<i64>),
    Bool(Vec<bool>),
}

impl ColumnValues {
    pub fn empty(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Str => ColumnValues::Str(Vec::new()),
            ColumnKind::Real => ColumnValues::Real(Vec::new()),
            ColumnKind::Int => ColumnValues::Int(Vec::new()),
            ColumnKind::Bool => ColumnValues::Bool(Vec::new()),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnValues::Str(_) => ColumnKind::Str,
            ColumnValues::Real(_) => ColumnKind::Real,
            ColumnValues::Int(_) => ColumnKind::Int,
            ColumnValues::Bool(_) => ColumnKind::Bool,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Str(v) => v.len(),
            ColumnValues::Real(v) => v.len(),
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named per-atom array such as `forces:R:3`.
#[derive(Debug, Clone, PartialEq)]
pub struct PerAtomColumn {
    pub name: String,
    pub width: usize,
    pub values: ColumnValues,
}

impl PerAtomColumn {
    pub fn new(name: impl Into<String>, width: usize, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            width,
            values,
        }
    }

    /// Builds a real, width-3 column from a list of vectors.
    pub fn from_vectors(name: impl Into<String>, vectors: &[Vector3<f64>]) -> Self {
        let flat = vectors.iter().flat_map(|v| [v.x, v.y, v.z]).collect();
        Self::new(name, 3, ColumnValues::Real(flat))
    }

    pub fn kind(&self) -> ColumnKind {
        self.values.kind()
    }

    /// Number of atoms this column describes.
    pub fn rows(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.values.len() / self.width
        }
    }

    /// Interprets the column as one 3-vector per atom. `None` unless it is a real, width-3 column.
    pub fn as_vectors(&self) -> Option<Vec<Vector3<f64>>> {
        match &self.values {
            ColumnValues::Real(v) if self.width == 3 => Some(
                v.chunks_exact(3)
                    .map(|c| Vector3::new(c[0], c[1], c[2]))
                    .collect(),
            ),
            _ => None,
        }
    }
}
