use super::ExtXyzParseErrorKind;
use crate::core::models::properties::{ColumnKind, InfoValue};
use nalgebra::Matrix3;
use std::collections::{BTreeMap, HashSet};

pub(super) const LATTICE_KEY: &str = "Lattice";
pub(super) const PROPERTIES_KEY: &str = "Properties";
pub(super) const PBC_KEY: &str = "pbc";
pub(super) const SPECIES_COLUMN: &str = "species";
pub(super) const POSITIONS_COLUMN: &str = "pos";

/// One entry of a `Properties` schema, e.g. `forces:R:3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
    pub width: usize,
}

/// The parsed comment line of a frame.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct FrameHeader {
    pub cell: Option<Matrix3<f64>>,
    pub pbc: [bool; 3],
    pub schema: Vec<ColumnSpec>,
    pub info: BTreeMap<String, InfoValue>,
}

/// A raw header value and whether it was written inside double quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RawValue {
    pub text: String,
    pub quoted: bool,
}

impl RawValue {
    fn new(text: &str, quoted: bool) -> Self {
        Self {
            text: text.to_string(),
            quoted,
        }
    }
}

/// Splits a comment line into `(key, value)` pairs. Quoted values may contain whitespace and
/// `\"` escapes; `{...}` values run to the closing brace; a bare key has no value.
pub(super) fn tokenize(line: &str) -> Result<Vec<(String, Option<RawValue>)>, ExtXyzParseErrorKind> {
    let mut pairs = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != '=') {
            key.push(c);
        }
        if key.is_empty() {
            return Err(ExtXyzParseErrorKind::MalformedHeader(
                "found '=' without a key".into(),
            ));
        }

        if chars.next_if_eq(&'=').is_none() {
            pairs.push((key, None));
            continue;
        }

        let value = match chars.peek() {
            Some('"') => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some(escaped) => value.push(escaped),
                            None => break,
                        },
                        '"' => {
                            closed = true;
                            break;
                        }
                        _ => value.push(c),
                    }
                }
                if !closed {
                    return Err(ExtXyzParseErrorKind::MalformedHeader(format!(
                        "unterminated quote in value of '{}'",
                        key
                    )));
                }
                RawValue::new(&value, true)
            }
            Some('{') => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    value.push(if c == ',' { ' ' } else { c });
                }
                if !closed {
                    return Err(ExtXyzParseErrorKind::MalformedHeader(format!(
                        "unterminated brace in value of '{}'",
                        key
                    )));
                }
                RawValue::new(&value, false)
            }
            _ => {
                let mut value = String::new();
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    value.push(c);
                }
                RawValue::new(&value, false)
            }
        };
        pairs.push((key, Some(value)));
    }

    Ok(pairs)
}

pub(super) fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "T" | "True" | "true" => Some(true),
        "F" | "False" | "false" => Some(false),
        _ => None,
    }
}

/// Infers the type of a metadata value: integer, then real, then logical, then string.
/// Whitespace-separated values become arrays when every token has the same scalar type.
/// A quoted single token is always a string.
pub(super) fn parse_info_value(raw: &str, quoted: bool) -> InfoValue {
    let tokens: Vec<&str> = raw.split_whitespace().collect();

    if tokens.len() == 1 && tokens[0] == raw && !quoted {
        let token = tokens[0];
        if let Ok(v) = token.parse::<i64>() {
            return InfoValue::Int(v);
        }
        if let Ok(v) = token.parse::<f64>() {
            return InfoValue::Real(v);
        }
        if let Some(v) = parse_bool(token) {
            return InfoValue::Bool(v);
        }
        return InfoValue::Str(raw.to_string());
    }

    if tokens.len() > 1 {
        if let Ok(v) = tokens.iter().map(|t| t.parse::<i64>()).collect::<Result<Vec<_>, _>>() {
            return InfoValue::IntArray(v);
        }
        if let Ok(v) = tokens.iter().map(|t| t.parse::<f64>()).collect::<Result<Vec<_>, _>>() {
            return InfoValue::RealArray(v);
        }
        if let Some(v) = tokens.iter().map(|t| parse_bool(t)).collect::<Option<Vec<_>>>() {
            return InfoValue::BoolArray(v);
        }
    }

    InfoValue::Str(raw.to_string())
}

pub(super) fn parse_schema(raw: &str) -> Result<Vec<ColumnSpec>, ExtXyzParseErrorKind> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() % 3 != 0 || parts.iter().any(|p| p.is_empty()) {
        return Err(ExtXyzParseErrorKind::InvalidProperties(raw.to_string()));
    }

    let mut seen = HashSet::new();
    let mut schema = Vec::with_capacity(parts.len() / 3);
    for triple in parts.chunks_exact(3) {
        let name = triple[0].to_string();
        let kind = ColumnKind::from_code(triple[1]).ok_or_else(|| {
            ExtXyzParseErrorKind::UnsupportedColumnType {
                column: name.clone(),
                kind: triple[1].to_string(),
            }
        })?;
        let width: usize = triple[2]
            .parse()
            .ok()
            .filter(|&w| w > 0)
            .ok_or_else(|| ExtXyzParseErrorKind::InvalidProperties(raw.to_string()))?;
        if !seen.insert(name.clone()) {
            return Err(ExtXyzParseErrorKind::DuplicateColumn(name));
        }
        schema.push(ColumnSpec { name, kind, width });
    }

    require_column(&schema, SPECIES_COLUMN, ColumnKind::Str, 1)?;
    require_column(&schema, POSITIONS_COLUMN, ColumnKind::Real, 3)?;
    Ok(schema)
}

fn require_column(
    schema: &[ColumnSpec],
    name: &'static str,
    kind: ColumnKind,
    width: usize,
) -> Result<(), ExtXyzParseErrorKind> {
    match schema.iter().find(|c| c.name == name) {
        Some(c) if c.kind == kind && c.width == width => Ok(()),
        Some(c) => Err(ExtXyzParseErrorKind::InvalidProperties(format!(
            "{}:{}:{}",
            c.name,
            c.kind.code(),
            c.width
        ))),
        None => Err(ExtXyzParseErrorKind::MissingColumn(name)),
    }
}

fn default_schema() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec {
            name: SPECIES_COLUMN.to_string(),
            kind: ColumnKind::Str,
            width: 1,
        },
        ColumnSpec {
            name: POSITIONS_COLUMN.to_string(),
            kind: ColumnKind::Real,
            width: 3,
        },
    ]
}

fn parse_lattice(raw: &str) -> Result<Matrix3<f64>, ExtXyzParseErrorKind> {
    let values: Vec<f64> = raw
        .split_whitespace()
        .map(|t| {
            t.parse::<f64>()
                .map_err(|_| ExtXyzParseErrorKind::InvalidFloat {
                    column: LATTICE_KEY.to_string(),
                    value: t.to_string(),
                })
        })
        .collect::<Result<_, _>>()?;
    if values.len() != 9 {
        return Err(ExtXyzParseErrorKind::InvalidLattice(values.len()));
    }
    Ok(Matrix3::from_row_slice(&values))
}

fn parse_pbc(raw: &str) -> Result<[bool; 3], ExtXyzParseErrorKind> {
    let flags: Option<Vec<bool>> = raw.split_whitespace().map(parse_bool).collect();
    match flags.as_deref() {
        Some(&[a, b, c]) => Ok([a, b, c]),
        _ => Err(ExtXyzParseErrorKind::InvalidPbc(raw.to_string())),
    }
}

pub(super) fn parse_header(line: &str) -> Result<FrameHeader, ExtXyzParseErrorKind> {
    let mut cell = None;
    let mut pbc = None;
    let mut schema = None;
    let mut info = BTreeMap::new();

    for (key, value) in tokenize(line)? {
        match (key.as_str(), value) {
            (LATTICE_KEY, Some(v)) => cell = Some(parse_lattice(&v.text)?),
            (PROPERTIES_KEY, Some(v)) => schema = Some(parse_schema(&v.text)?),
            (PBC_KEY, Some(v)) => pbc = Some(parse_pbc(&v.text)?),
            (LATTICE_KEY | PROPERTIES_KEY | PBC_KEY, None) => {
                return Err(ExtXyzParseErrorKind::MalformedHeader(format!(
                    "'{}' requires a value",
                    key
                )));
            }
            (_, Some(v)) => {
                info.insert(key, parse_info_value(&v.text, v.quoted));
            }
            (_, None) => {
                info.insert(key, InfoValue::Bool(true));
            }
        }
    }

    let periodic = cell.is_some();
    Ok(FrameHeader {
        cell,
        pbc: pbc.unwrap_or([periodic; 3]),
        schema: schema.unwrap_or_else(default_schema),
        info,
    })
}
