use super::config::CategoryLabels;
use super::error::EngineError;
use super::loader::FileSummary;
use super::output::{OutputPolicy, open_output};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub file: String,
    pub category: String,
    pub label: String,
    /// Empty when only the first frame of the file was read.
    pub configurations: Option<usize>,
    pub elements: String,
}

/// Per-file classification outcome, one row per input file in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationReport {
    rows: Vec<ReportRow>,
}

impl ClassificationReport {
    pub fn from_files<'a>(
        files: impl IntoIterator<Item = &'a FileSummary>,
        labels: &CategoryLabels,
    ) -> Self {
        let rows = files
            .into_iter()
            .map(|file| ReportRow {
                file: file.file_name(),
                category: file.category.to_string(),
                label: labels.get(file.category).to_string(),
                configurations: file.configurations,
                elements: file
                    .elements
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Writes the report as CSV; an existing file is only replaced under [`OutputPolicy::Truncate`].
    pub fn write_csv(&self, path: &Path, policy: OutputPolicy) -> Result<(), EngineError> {
        let to_report_error = |source: csv::Error| EngineError::Report {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = csv::Writer::from_writer(open_output(path, policy)?);
        for row in &self.rows {
            writer.serialize(row).map_err(to_report_error)?;
        }
        writer
            .flush()
            .map_err(|e| EngineError::io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::composition::Category;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn classified(
        name: &str,
        category: Category,
        elements: &[&str],
        configurations: Option<usize>,
    ) -> FileSummary {
        FileSummary {
            path: PathBuf::from("input").join(name),
            category,
            elements: elements.iter().map(|s| s.to_string()).collect(),
            configurations,
        }
    }

    #[test]
    fn rows_follow_file_order_and_labels() {
        let files = [
            classified("b.extxyz", Category::A, &["O", "Fe"], Some(0)),
            classified("a.extxyz", Category::B, &["Li"], Some(4)),
        ];
        let report = ClassificationReport::from_files(&files, &CategoryLabels::default());
        assert_eq!(report.rows()[0].file, "b.extxyz");
        assert_eq!(report.rows()[0].label, "ggapu");
        assert_eq!(report.rows()[0].elements, "Fe O");
        assert_eq!(report.rows()[0].configurations, Some(0));
        assert_eq!(report.rows()[1].category, "B");
        assert_eq!(report.rows()[1].configurations, Some(4));
    }

    #[test]
    fn csv_has_header_and_empty_counts_when_unknown() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports/classification.csv");
        let files = [classified("x.extxyz", Category::B, &["C", "Li"], None)];

        ClassificationReport::from_files(&files, &CategoryLabels::default())
            .write_csv(&path, OutputPolicy::Fail)
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "file,category,label,configurations,elements");
        assert_eq!(lines[1], "x.extxyz,B,gga,,C Li");
    }

    #[test]
    fn existing_report_is_kept_unless_truncating() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("classification.csv");
        fs::write(&path, "previous run").unwrap();
        let report = ClassificationReport::from_files(
            &[classified("x.extxyz", Category::A, &["Fe", "O"], Some(1))],
            &CategoryLabels::default(),
        );

        assert!(matches!(
            report.write_csv(&path, OutputPolicy::Fail),
            Err(EngineError::OutputExists { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous run");

        report.write_csv(&path, OutputPolicy::Truncate).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("file,category"));
    }
}
