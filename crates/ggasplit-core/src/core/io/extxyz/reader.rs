use super::header::{self, ColumnSpec, FrameHeader, POSITIONS_COLUMN, SPECIES_COLUMN};
use super::{ExtXyzError, ExtXyzParseErrorKind};
use crate::core::models::configuration::{Atom, Configuration};
use crate::core::models::properties::{ColumnValues, PerAtomColumn};
use crate::core::utils::elements::is_known_element;
use nalgebra::Point3;
use std::io::{BufRead, Lines};

/// Streams configurations out of an Extended XYZ source, one frame at a time.
///
/// Iteration stops after the first error.
pub struct FrameReader<R> {
    lines: Lines<R>,
    line_num: usize,
    finished: bool,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
            finished: false,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>, ExtXyzError> {
        match self.lines.next() {
            Some(line) => {
                self.line_num += 1;
                let mut line = line?;
                if line.ends_with('\r') {
                    line.pop();
                }
                Ok(Some(line))
            }
            None => Ok(None),
        }
    }

    fn require_line(&mut self) -> Result<String, ExtXyzError> {
        self.next_line()?.ok_or(ExtXyzError::Parse {
            line: self.line_num + 1,
            kind: ExtXyzParseErrorKind::UnexpectedEof,
        })
    }

    fn parse_error(&self, kind: ExtXyzParseErrorKind) -> ExtXyzError {
        ExtXyzError::Parse {
            line: self.line_num,
            kind,
        }
    }

    fn read_frame(&mut self) -> Result<Option<Configuration>, ExtXyzError> {
        let count_line = loop {
            match self.next_line()? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line,
                None => return Ok(None),
            }
        };
        let atom_count: usize = count_line.trim().parse().map_err(|_| {
            self.parse_error(ExtXyzParseErrorKind::InvalidAtomCount(
                count_line.trim().to_string(),
            ))
        })?;

        let comment = self.require_line()?;
        let FrameHeader {
            cell,
            pbc,
            schema,
            info,
        } = header::parse_header(&comment).map_err(|kind| self.parse_error(kind))?;

        let mut builder = FrameBuilder::new(&schema, atom_count);
        for _ in 0..atom_count {
            let line = self.require_line()?;
            builder
                .push_row(&line)
                .map_err(|kind| self.parse_error(kind))?;
        }

        let mut configuration = builder.finish()?;
        configuration.cell = cell;
        configuration.pbc = pbc;
        for (key, value) in info {
            configuration.set_info(key, value);
        }
        Ok(Some(configuration))
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<Configuration, ExtXyzError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_frame() {
            Ok(Some(configuration)) => Some(Ok(configuration)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Upper bound on rows preallocated from an atom count line, which is untrusted input.
const RESERVED_ROW_LIMIT: usize = 4096;

struct FrameBuilder<'a> {
    schema: &'a [ColumnSpec],
    expected_tokens: usize,
    columns: Vec<ColumnValues>,
}

impl<'a> FrameBuilder<'a> {
    fn new(schema: &'a [ColumnSpec], atom_count: usize) -> Self {
        let columns = schema
            .iter()
            .map(|spec| {
                let mut values = ColumnValues::empty(spec.kind);
                let rows = atom_count.min(RESERVED_ROW_LIMIT);
                reserve(&mut values, rows.saturating_mul(spec.width));
                values
            })
            .collect();
        Self {
            schema,
            expected_tokens: schema.iter().map(|c| c.width).sum(),
            columns,
        }
    }

    fn push_row(&mut self, line: &str) -> Result<(), ExtXyzParseErrorKind> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != self.expected_tokens {
            return Err(ExtXyzParseErrorKind::ColumnCount {
                expected: self.expected_tokens,
                found: tokens.len(),
            });
        }

        let mut offset = 0;
        for (spec, values) in self.schema.iter().zip(self.columns.iter_mut()) {
            for &token in &tokens[offset..offset + spec.width] {
                push_token(spec, values, token)?;
            }
            offset += spec.width;
        }
        Ok(())
    }

    fn finish(self) -> Result<Configuration, ExtXyzError> {
        let mut species = None;
        let mut positions = None;
        let mut extra = Vec::new();

        for (spec, values) in self.schema.iter().zip(self.columns) {
            match (spec.name.as_str(), values) {
                (SPECIES_COLUMN, ColumnValues::Str(v)) => species = Some(v),
                (POSITIONS_COLUMN, ColumnValues::Real(v)) => positions = Some(v),
                (_, values) => extra.push(PerAtomColumn::new(&spec.name, spec.width, values)),
            }
        }

        let (Some(species), Some(positions)) = (species, positions) else {
            return Err(ExtXyzError::Inconsistency(
                "frame is missing species or positions".into(),
            ));
        };

        let atoms = species
            .into_iter()
            .zip(positions.chunks_exact(3))
            .map(|(symbol, p)| Atom {
                symbol,
                position: Point3::new(p[0], p[1], p[2]),
            })
            .collect();

        let mut configuration = Configuration::new(atoms);
        for column in extra {
            configuration
                .set_column(column)
                .map_err(|e| ExtXyzError::Inconsistency(e.to_string()))?;
        }
        Ok(configuration)
    }
}

fn reserve(values: &mut ColumnValues, additional: usize) {
    match values {
        ColumnValues::Str(v) => v.reserve(additional),
        ColumnValues::Real(v) => v.reserve(additional),
        ColumnValues::Int(v) => v.reserve(additional),
        ColumnValues::Bool(v) => v.reserve(additional),
    }
}

fn push_token(
    spec: &ColumnSpec,
    values: &mut ColumnValues,
    token: &str,
) -> Result<(), ExtXyzParseErrorKind> {
    match values {
        ColumnValues::Str(v) => {
            if spec.name == SPECIES_COLUMN && !is_known_element(token) {
                return Err(ExtXyzParseErrorKind::UnknownElement(token.to_string()));
            }
            v.push(token.to_string());
        }
        ColumnValues::Real(v) => {
            let x = token
                .parse::<f64>()
                .map_err(|_| ExtXyzParseErrorKind::InvalidFloat {
                    column: spec.name.clone(),
                    value: token.to_string(),
                })?;
            v.push(x);
        }
        ColumnValues::Int(v) => {
            let x = token
                .parse::<i64>()
                .map_err(|_| ExtXyzParseErrorKind::InvalidInt {
                    column: spec.name.clone(),
                    value: token.to_string(),
                })?;
            v.push(x);
        }
        ColumnValues::Bool(v) => {
            let x = header::parse_bool(token).ok_or_else(|| {
                ExtXyzParseErrorKind::InvalidLogical {
                    column: spec.name.clone(),
                    value: token.to_string(),
                }
            })?;
            v.push(x);
        }
    }
    debug_assert_eq!(values.kind(), spec.kind);
    Ok(())
}
