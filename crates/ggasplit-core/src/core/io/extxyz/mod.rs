//! Extended XYZ reading and writing.
//!
//! Each frame is an atom-count line, a comment line of `key=value` pairs (cell, per-atom
//! column schema and per-structure properties), and one line per atom whose columns are
//! described by the `Properties` key.

mod header;
mod reader;
mod writer;

pub use reader::FrameReader;

use crate::core::io::traits::StructureFile;
use crate::core::models::configuration::Configuration;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtXyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ExtXyzParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ExtXyzParseErrorKind {
    #[error("Invalid atom count '{0}'")]
    InvalidAtomCount(String),
    #[error("Unexpected end of file inside a frame")]
    UnexpectedEof,
    #[error("Malformed comment line: {0}")]
    MalformedHeader(String),
    #[error("Malformed Properties schema '{0}'")]
    InvalidProperties(String),
    #[error("Unsupported column type '{kind}' for column '{column}'")]
    UnsupportedColumnType { column: String, kind: String },
    #[error("Column '{0}' is declared more than once")]
    DuplicateColumn(String),
    #[error("Required column '{0}' is missing from Properties")]
    MissingColumn(&'static str),
    #[error("Expected {expected} values on atom line, found {found}")]
    ColumnCount { expected: usize, found: usize },
    #[error("Invalid integer in column '{column}' (value: '{value}')")]
    InvalidInt { column: String, value: String },
    #[error("Invalid real in column '{column}' (value: '{value}')")]
    InvalidFloat { column: String, value: String },
    #[error("Invalid logical in column '{column}' (value: '{value}')")]
    InvalidLogical { column: String, value: String },
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("Lattice must have 9 components, found {0}")]
    InvalidLattice(usize),
    #[error("pbc must be three logical values (value: '{0}')")]
    InvalidPbc(String),
}

/// The Extended XYZ structure format.
pub struct ExtXyzFile;

impl StructureFile for ExtXyzFile {
    type Error = ExtXyzError;

    fn read_all_from(reader: &mut impl BufRead) -> Result<Vec<Configuration>, Self::Error> {
        let configurations = FrameReader::new(reader).collect::<Result<Vec<_>, _>>()?;
        if configurations.is_empty() {
            return Err(ExtXyzError::MissingRecord("structure frame".into()));
        }
        Ok(configurations)
    }

    fn read_first_from(reader: &mut impl BufRead) -> Result<Configuration, Self::Error> {
        FrameReader::new(reader)
            .next()
            .unwrap_or_else(|| Err(ExtXyzError::MissingRecord("structure frame".into())))
    }

    fn write_to(
        configurations: &[Configuration],
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for configuration in configurations {
            writer::write_frame(configuration, writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::properties::{ColumnValues, InfoValue};
    use nalgebra::{Matrix3, Vector3};
    use std::io::Cursor;
    use tempfile::tempdir;

    const TWO_FRAMES: &str = r#"2
Lattice="4.0 0.0 0.0 0.0 4.0 0.0 0.0 0.0 4.0" Properties=species:S:1:pos:R:3:forces:R:3 energy=-12.5 stress="0.1 0.0 0.0 0.0 0.2 0.0 0.0 0.0 0.3" mp_id=mp-19770 pbc="T T T"
Fe 0.0 0.0 0.0 0.1 -0.2 0.3
O 2.0 2.0 2.0 -0.1 0.2 -0.3
2
Lattice="4.1 0.0 0.0 0.0 4.1 0.0 0.0 0.0 4.1" Properties=species:S:1:pos:R:3:forces:R:3 energy=-12.25 stress="0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.0" mp_id=mp-19770 pbc="T T T"
Fe 0.0 0.0 0.0 0.0 0.0 0.0
O 2.05 2.05 2.05 0.0 0.0 0.0
"#;

    fn read_all(text: &str) -> Result<Vec<Configuration>, ExtXyzError> {
        ExtXyzFile::read_all_from(&mut Cursor::new(text))
    }

    #[test]
    fn read_all_returns_frames_in_order() {
        let frames = read_all(TWO_FRAMES).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].get_info("energy"), Some(&InfoValue::Real(-12.5)));
        assert_eq!(frames[1].get_info("energy"), Some(&InfoValue::Real(-12.25)));
        assert_eq!(frames[1].atoms()[1].position.x, 2.05);
    }

    #[test]
    fn read_all_parses_cell_pbc_and_columns() {
        let frame = &read_all(TWO_FRAMES).unwrap()[0];
        assert_eq!(frame.cell, Some(Matrix3::identity() * 4.0));
        assert_eq!(frame.pbc, [true; 3]);
        assert_eq!(
            frame.get_info("mp_id"),
            Some(&InfoValue::Str("mp-19770".into()))
        );
        assert_eq!(
            frame.column("forces").unwrap().as_vectors().unwrap()[0],
            Vector3::new(0.1, -0.2, 0.3)
        );
        let symbols: Vec<_> = frame.symbols().collect();
        assert_eq!(symbols, ["Fe", "O"]);
    }

    #[test]
    fn read_first_ignores_later_frames() {
        let text = format!("{TWO_FRAMES}garbage that would not parse\n");
        let first = ExtXyzFile::read_first_from(&mut Cursor::new(text.as_str())).unwrap();
        assert_eq!(first.get_info("energy"), Some(&InfoValue::Real(-12.5)));
        assert!(read_all(&text).is_err());
    }

    #[test]
    fn empty_input_is_missing_record() {
        assert!(matches!(read_all(""), Err(ExtXyzError::MissingRecord(_))));
        assert!(matches!(
            ExtXyzFile::read_first_from(&mut Cursor::new("\n\n")),
            Err(ExtXyzError::MissingRecord(_))
        ));
    }

    #[test]
    fn truncated_frame_is_a_parse_error() {
        let text = "3\nProperties=species:S:1:pos:R:3\nFe 0 0 0\nO 1 1 1\n";
        let err = read_all(text).unwrap_err();
        assert!(matches!(
            err,
            ExtXyzError::Parse {
                line: 5,
                kind: ExtXyzParseErrorKind::UnexpectedEof
            }
        ));
    }

    #[test]
    fn invalid_atom_count_is_reported_with_line() {
        let err = read_all("two\n\n").unwrap_err();
        assert!(matches!(
            err,
            ExtXyzError::Parse {
                line: 1,
                kind: ExtXyzParseErrorKind::InvalidAtomCount(_)
            }
        ));
    }

    #[test]
    fn unknown_element_is_rejected() {
        let err = read_all("1\nProperties=species:S:1:pos:R:3\nQq 0 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            ExtXyzError::Parse {
                line: 3,
                kind: ExtXyzParseErrorKind::UnknownElement(_)
            }
        ));
    }

    #[test]
    fn wrong_number_of_atom_columns_is_rejected() {
        let err = read_all("1\nProperties=species:S:1:pos:R:3\nFe 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            ExtXyzError::Parse {
                kind: ExtXyzParseErrorKind::ColumnCount {
                    expected: 4,
                    found: 3
                },
                ..
            }
        ));
    }

    #[test]
    fn written_frames_read_back_identically() {
        let frames = read_all(TWO_FRAMES).unwrap();
        let mut buffer = Vec::new();
        ExtXyzFile::write_to(&frames, &mut buffer).unwrap();

        let reread = read_all(std::str::from_utf8(&buffer).unwrap()).unwrap();
        assert_eq!(reread, frames);
    }

    #[test]
    fn append_to_path_extends_existing_container() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.extxyz");
        let frames = read_all(TWO_FRAMES).unwrap();

        ExtXyzFile::append_to_path(&frames[..1], &path).unwrap();
        ExtXyzFile::append_to_path(&frames[1..], &path).unwrap();

        let reread = ExtXyzFile::read_all_from_path(&path).unwrap();
        assert_eq!(reread, frames);
    }

    #[test]
    fn write_to_path_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.extxyz");
        let frames = read_all(TWO_FRAMES).unwrap();

        ExtXyzFile::write_to_path(&frames, &path).unwrap();
        ExtXyzFile::write_to_path(&frames[..1], &path).unwrap();

        assert_eq!(ExtXyzFile::read_all_from_path(&path).unwrap().len(), 1);
    }

    #[test]
    fn non_periodic_frame_without_properties_uses_default_schema() {
        let frames = read_all("1\nenergy=-0.5\nFe 0.0 0.0 0.0\n").unwrap();
        assert_eq!(frames[0].cell, None);
        assert_eq!(frames[0].pbc, [false; 3]);
        assert!(frames[0].columns().is_empty());
    }

    #[test]
    fn extra_integer_and_logical_columns_are_preserved() {
        let text = "2\nProperties=species:S:1:pos:R:3:tags:I:1:fixed:L:1\nLi 0 0 0 3 T\nC 1 1 1 -1 F\n";
        let frame = &read_all(text).unwrap()[0];
        assert_eq!(
            frame.column("tags").unwrap().values,
            ColumnValues::Int(vec![3, -1])
        );
        assert_eq!(
            frame.column("fixed").unwrap().values,
            ColumnValues::Bool(vec![true, false])
        );
    }
}
