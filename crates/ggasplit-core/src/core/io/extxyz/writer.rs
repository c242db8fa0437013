use super::ExtXyzError;
use super::header::{self, LATTICE_KEY, PBC_KEY, POSITIONS_COLUMN, PROPERTIES_KEY, SPECIES_COLUMN};
use crate::core::models::configuration::Configuration;
use crate::core::models::properties::{ColumnKind, ColumnValues, InfoValue};
use std::io::Write;

const STRUCTURAL_KEYS: [&str; 3] = [LATTICE_KEY, PROPERTIES_KEY, PBC_KEY];

pub(super) fn write_frame(
    configuration: &Configuration,
    writer: &mut impl Write,
) -> Result<(), ExtXyzError> {
    writeln!(writer, "{}", configuration.len())?;
    writeln!(writer, "{}", comment_line(configuration)?)?;

    for (i, atom) in configuration.atoms().iter().enumerate() {
        let mut line = format!("{:<2}", atom.symbol);
        let p = &atom.position;
        for x in [p.x, p.y, p.z] {
            line.push_str(&format!(" {:>16}", format_real(x)));
        }
        for column in configuration.columns() {
            for k in i * column.width..(i + 1) * column.width {
                line.push(' ');
                line.push_str(&format_cell(&column.name, &column.values, k)?);
            }
        }
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

fn comment_line(configuration: &Configuration) -> Result<String, ExtXyzError> {
    let mut fields = Vec::new();

    if let Some(cell) = &configuration.cell {
        let values: Vec<String> = (0..3)
            .flat_map(|i| (0..3).map(move |j| format_real(cell[(i, j)])))
            .collect();
        fields.push(format!("{}=\"{}\"", LATTICE_KEY, values.join(" ")));
    }

    let mut schema = vec![
        format!("{}:{}:1", SPECIES_COLUMN, ColumnKind::Str.code()),
        format!("{}:{}:3", POSITIONS_COLUMN, ColumnKind::Real.code()),
    ];
    for column in configuration.columns() {
        schema.push(format!(
            "{}:{}:{}",
            column.name,
            column.kind().code(),
            column.width
        ));
    }
    fields.push(format!("{}={}", PROPERTIES_KEY, schema.join(":")));

    for (key, value) in configuration.info() {
        if STRUCTURAL_KEYS.contains(&key.as_str()) {
            continue;
        }
        if key.is_empty() || key.contains(|c: char| c.is_whitespace() || c == '=' || c == '"') {
            return Err(ExtXyzError::Inconsistency(format!(
                "metadata key '{}' cannot be written",
                key
            )));
        }
        fields.push(format!("{}={}", key, format_info_value(value)));
    }

    let pbc: Vec<&str> = configuration.pbc.iter().map(|&p| bool_token(p)).collect();
    fields.push(format!("{}=\"{}\"", PBC_KEY, pbc.join(" ")));

    Ok(fields.join(" "))
}

/// Shortest representation that re-reads to the identical `f64` and never looks like an integer.
fn format_real(x: f64) -> String {
    format!("{:?}", x)
}

fn bool_token(b: bool) -> &'static str {
    if b { "T" } else { "F" }
}

fn quote(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

fn join<T>(values: &[T], f: impl Fn(&T) -> String) -> String {
    values.iter().map(f).collect::<Vec<_>>().join(" ")
}

fn format_info_value(value: &InfoValue) -> String {
    match value {
        InfoValue::Int(v) => v.to_string(),
        InfoValue::Real(v) => format_real(*v),
        InfoValue::Bool(v) => bool_token(*v).to_string(),
        InfoValue::Str(s) => {
            let special = s.contains(|c: char| c.is_whitespace() || "\"\\={}".contains(c));
            let typed = !matches!(header::parse_info_value(s, false), InfoValue::Str(_));
            if s.is_empty() || special || typed {
                quote(s)
            } else {
                s.clone()
            }
        }
        InfoValue::IntArray(v) => quote(&join(v, |x| x.to_string())),
        InfoValue::RealArray(v) => quote(&join(v, |x| format_real(*x))),
        InfoValue::BoolArray(v) => quote(&join(v, |x| bool_token(*x).to_string())),
    }
}

fn format_cell(name: &str, values: &ColumnValues, k: usize) -> Result<String, ExtXyzError> {
    let missing = || ExtXyzError::Inconsistency(format!("column '{}' is too short", name));
    Ok(match values {
        ColumnValues::Real(v) => format!("{:>16}", format_real(*v.get(k).ok_or_else(missing)?)),
        ColumnValues::Int(v) => format!("{:>6}", v.get(k).ok_or_else(missing)?),
        ColumnValues::Bool(v) => bool_token(*v.get(k).ok_or_else(missing)?).to_string(),
        ColumnValues::Str(v) => {
            let s = v.get(k).ok_or_else(missing)?;
            if s.is_empty() || s.contains(char::is_whitespace) {
                return Err(ExtXyzError::Inconsistency(format!(
                    "column '{}' holds a value with whitespace: '{}'",
                    name, s
                )));
            }
            s.clone()
        }
    })
}
