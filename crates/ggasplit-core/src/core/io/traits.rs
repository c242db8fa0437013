use crate::core::models::configuration::Configuration;
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing multi-frame structure file formats.
///
/// A structure file holds an ordered sequence of one or more [`Configuration`]s.
/// Implementors handle format-specific parsing and serialization; the provided
/// path-based methods wrap them with buffered file handles.
pub trait StructureFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads every configuration from a buffered reader, preserving file order.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails, I/O fails, or the input contains no configuration.
    fn read_all_from(reader: &mut impl BufRead) -> Result<Vec<Configuration>, Self::Error>;

    /// Reads only the first configuration; the remainder of the input is not parsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the first frame cannot be parsed or the input is empty.
    fn read_first_from(reader: &mut impl BufRead) -> Result<Configuration, Self::Error>;

    /// Writes configurations, in order, to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(configurations: &[Configuration], writer: &mut impl Write)
    -> Result<(), Self::Error>;

    /// Reads every configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_all_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Configuration>, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_all_from(&mut reader)
    }

    /// Reads the first configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the first frame cannot be parsed.
    fn read_first_from_path<P: AsRef<Path>>(path: P) -> Result<Configuration, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_first_from(&mut reader)
    }

    /// Creates (or truncates) a file and writes the configurations to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        configurations: &[Configuration],
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(configurations, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Appends configurations to the end of a file, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or writing fails.
    fn append_to_path<P: AsRef<Path>>(
        configurations: &[Configuration],
        path: P,
    ) -> Result<(), Self::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(configurations, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
