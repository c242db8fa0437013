use crate::core::composition::Category;
use crate::engine::config::CopyConfig;
use crate::engine::error::EngineError;
use crate::engine::loader::{self, ClassifiedFile, FileSummary};
use crate::engine::output;
use crate::engine::progress::ProgressReporter;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct CopySummary {
    pub copied_a: usize,
    pub copied_b: usize,
    pub bytes: u64,
    /// Per-file classification in discovery order; configuration counts are unknown.
    pub files: Vec<FileSummary>,
}

impl CopySummary {
    pub fn copied(&self, category: Category) -> usize {
        match category {
            Category::A => self.copied_a,
            Category::B => self.copied_b,
        }
    }
}

#[instrument(skip_all, name = "copy_workflow")]
pub fn run(config: &CopyConfig, reporter: &ProgressReporter) -> Result<CopySummary, EngineError> {
    // === Phase 1: Classify from first frames ===
    reporter.phase_start("Classifying");
    let inputs = loader::discover_input_files(&config.input_dir)?;
    info!(
        files = inputs.len(),
        input = %config.input_dir.display(),
        "Discovered input files."
    );
    if inputs.is_empty() {
        warn!("Input directory contains no files; nothing to copy.");
    }
    let classified = loader::process_files(&inputs, reporter, |path| {
        let file = loader::classify_first(path, &config.rule)?;
        reporter.file_classified(file.category);
        Ok(file)
    })?;
    reporter.phase_finish();

    // === Phase 2: Destinations ===
    for category in Category::ALL {
        let dir = config.destination(category);
        fs::create_dir_all(dir).map_err(|e| EngineError::io(dir, e))?;
        output::check_outside_input(&config.input_dir, dir)?;
    }
    let plan: Vec<(&ClassifiedFile, PathBuf)> = classified
        .iter()
        .map(|file| destination_for(config, file).map(|dest| (file, dest)))
        .collect::<Result<_, _>>()?;
    for (_, dest) in &plan {
        config.output_policy.check(dest)?;
    }

    // === Phase 3: Copy ===
    reporter.phase_start("Copying");
    let sizes = loader::process_files(&plan, reporter, |(file, dest)| {
        copy_file(&file.path, dest)
    })?;
    reporter.phase_finish();

    let copied_a = classified
        .iter()
        .filter(|f| f.category == Category::A)
        .count();
    let summary = CopySummary {
        copied_a,
        copied_b: classified.len() - copied_a,
        bytes: sizes.iter().sum(),
        files: classified.iter().map(|f| f.summarize(false)).collect(),
    };
    for category in Category::ALL {
        reporter.message(format!(
            "{}: {} files copied to {}",
            config.labels.get(category),
            summary.copied(category),
            config.destination(category).display()
        ));
    }
    info!(
        a_label = config.labels.get(Category::A),
        copied_a = summary.copied_a,
        b_label = config.labels.get(Category::B),
        copied_b = summary.copied_b,
        bytes = summary.bytes,
        "Copy complete."
    );
    Ok(summary)
}

fn destination_for(config: &CopyConfig, file: &ClassifiedFile) -> Result<PathBuf, EngineError> {
    let name = file.path.file_name().ok_or_else(|| {
        EngineError::io(
            &file.path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    Ok(config.destination(file.category).join(name))
}

/// Copies contents and permissions, then carries over the source's access and modification times.
fn copy_file(source: &Path, dest: &Path) -> Result<u64, EngineError> {
    let bytes = fs::copy(source, dest).map_err(|e| EngineError::io(dest, e))?;
    let metadata = fs::metadata(source).map_err(|e| EngineError::io(source, e))?;
    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    File::options()
        .write(true)
        .open(dest)
        .and_then(|file| file.set_times(times))
        .map_err(|e| EngineError::io(dest, e))?;
    debug!(
        source = %source.display(),
        dest = %dest.display(),
        bytes,
        "Copied file."
    );
    Ok(bytes)
}
