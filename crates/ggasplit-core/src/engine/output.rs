use super::error::EngineError;
use crate::core::io::extxyz::ExtXyzFile;
use crate::core::io::traits::StructureFile;
use crate::core::models::configuration::Configuration;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::slice;
use tracing::warn;

/// What to do when an output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputPolicy {
    /// Refuse to touch an existing output.
    #[default]
    Fail,
    /// Replace existing outputs.
    Truncate,
}

impl OutputPolicy {
    /// Fails with [`EngineError::OutputExists`] if `path` exists and the policy is `Fail`.
    pub fn check(self, path: &Path) -> Result<(), EngineError> {
        if self == OutputPolicy::Fail && path.exists() {
            return Err(EngineError::OutputExists {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// Fails with [`EngineError::OutputInInputDir`] if `output_dir` resolves to `input_dir`.
///
/// Directories that do not exist yet cannot be the input directory and pass.
pub fn check_outside_input(input_dir: &Path, output_dir: &Path) -> Result<(), EngineError> {
    let input = fs::canonicalize(input_dir).map_err(|e| EngineError::io(input_dir, e))?;
    match fs::canonicalize(output_dir) {
        Ok(resolved) if resolved == input => Err(EngineError::OutputInInputDir {
            path: output_dir.to_path_buf(),
            input_dir: input_dir.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

/// The directory a file path lives in, `.` for a bare file name.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// A freshly opened output structure file that configurations are appended to in order.
///
/// A container dropped before [`finish`](Self::finish) removes its file, so a failed run
/// leaves no partial output behind.
pub struct OutputContainer {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
    kept: bool,
}

impl OutputContainer {
    pub fn create(path: &Path, policy: OutputPolicy) -> Result<Self, EngineError> {
        let file = open_output(path, policy)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: 0,
            kept: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn append<'c>(
        &mut self,
        configurations: impl IntoIterator<Item = &'c Configuration>,
    ) -> Result<(), EngineError> {
        for configuration in configurations {
            ExtXyzFile::write_to(slice::from_ref(configuration), &mut self.writer).map_err(
                |source| EngineError::Write {
                    path: self.path.clone(),
                    source,
                },
            )?;
            self.written += 1;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EngineError> {
        self.writer
            .flush()
            .map_err(|e| EngineError::io(&self.path, e))
    }

    /// Flushes buffered data and returns the number of configurations written.
    pub fn finish(mut self) -> Result<usize, EngineError> {
        self.flush()?;
        self.kept = true;
        Ok(self.written)
    }

    /// Finishes every container or none of them.
    ///
    /// On the first flush failure all containers are dropped, which removes their files.
    pub fn finish_all(mut containers: Vec<Self>) -> Result<Vec<usize>, EngineError> {
        for container in &mut containers {
            container.flush()?;
        }
        Ok(containers
            .into_iter()
            .map(|mut container| {
                container.kept = true;
                container.written
            })
            .collect())
    }
}

impl Drop for OutputContainer {
    fn drop(&mut self) {
        if self.kept {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove unfinished output."
            );
        }
    }
}

/// Creates `path` (and its parent directories) for writing under `policy`.
pub(crate) fn open_output(path: &Path, policy: OutputPolicy) -> Result<File, EngineError> {
    ensure_parent_dir(path)?;
    match policy {
        OutputPolicy::Fail => OpenOptions::new().write(true).create_new(true).open(path),
        OutputPolicy::Truncate => File::create(path),
    }
    .map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => EngineError::OutputExists {
            path: path.to_path_buf(),
        },
        _ => EngineError::io(path, e),
    })
}

fn ensure_parent_dir(path: &Path) -> Result<(), EngineError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))
        }
        _ => Ok(()),
    }
}
