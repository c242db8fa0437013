use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::composition::{Category, ClassificationRule, ElementSet};
use crate::core::io::extxyz::ExtXyzFile;
use crate::core::io::traits::StructureFile;
use crate::core::models::configuration::Configuration;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One input file after classification.
///
/// `configurations` holds every frame of the file when it was loaded with [`load_and_classify`]
/// and is empty when only the first frame was read ([`classify_first`]).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedFile {
    pub path: PathBuf,
    pub category: Category,
    /// Element set of the first configuration, the one the category was derived from.
    pub elements: ElementSet,
    pub configurations: Vec<Configuration>,
}

impl ClassifiedFile {
    /// Drops the loaded configurations, keeping their count when the whole file was read.
    pub fn summarize(&self, whole_file: bool) -> FileSummary {
        FileSummary {
            path: self.path.clone(),
            category: self.category,
            elements: self.elements.clone(),
            configurations: whole_file.then_some(self.configurations.len()),
        }
    }
}

/// Classification outcome of one input file, without its configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub category: Category,
    pub elements: ElementSet,
    pub configurations: Option<usize>,
}

impl FileSummary {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Lists the regular files directly inside `dir`, sorted by file name.
pub fn discover_input_files(dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
    let entries = fs::read_dir(dir).map_err(|e| EngineError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| EngineError::io(dir, e))?;
        let path = entry.path();
        let metadata = fs::metadata(&path).map_err(|e| EngineError::io(&path, e))?;
        if metadata.is_file() {
            files.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-file directory entry.");
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Reads every configuration of `path` and classifies the file by its first one.
pub fn load_and_classify(
    path: &Path,
    rule: &ClassificationRule,
) -> Result<ClassifiedFile, EngineError> {
    let configurations =
        ExtXyzFile::read_all_from_path(path).map_err(|source| EngineError::Load {
            path: path.to_path_buf(),
            source,
        })?;
    // read_all never returns an empty sequence.
    let elements = configurations
        .first()
        .map(Configuration::element_set)
        .unwrap_or_default();
    let category = rule.classify(&elements);
    debug!(
        path = %path.display(),
        %category,
        configurations = configurations.len(),
        "Classified file."
    );

    Ok(ClassifiedFile {
        path: path.to_path_buf(),
        category,
        elements,
        configurations,
    })
}

/// Classifies `path` from its first configuration without parsing the rest of the file.
pub fn classify_first(
    path: &Path,
    rule: &ClassificationRule,
) -> Result<ClassifiedFile, EngineError> {
    let first = ExtXyzFile::read_first_from_path(path).map_err(|source| EngineError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let elements = first.element_set();
    let category = rule.classify(&elements);
    debug!(path = %path.display(), %category, "Classified file from first frame.");

    Ok(ClassifiedFile {
        path: path.to_path_buf(),
        category,
        elements,
        configurations: Vec::new(),
    })
}

/// Runs `task` over every item in the worker pool and joins the results in input order.
///
/// The first error aborts the join; one `TaskIncrement` is reported per finished item.
pub fn process_files<I, T, F>(
    items: &[I],
    reporter: &ProgressReporter,
    task: F,
) -> Result<Vec<T>, EngineError>
where
    I: Sync,
    T: Send,
    F: Fn(&I) -> Result<T, EngineError> + Sync + Send,
{
    reporter.report(Progress::TaskStart {
        total_steps: items.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = items.iter();

    #[cfg(feature = "parallel")]
    let iterator = items.par_iter();

    let results = iterator
        .map(|item| {
            let result = task(item);
            reporter.report(Progress::TaskIncrement);
            result
        })
        .collect::<Result<Vec<_>, _>>();

    reporter.report(Progress::TaskFinish);
    results
}
