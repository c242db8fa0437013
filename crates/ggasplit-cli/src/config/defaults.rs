use std::path::PathBuf;

/// Built-in paths, relative to the working directory, used when neither the command line nor
/// the config file provides one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultsConfig {
    pub input_dir: PathBuf,
    pub output_a: PathBuf,
    pub output_b: PathBuf,
    /// Only used when the file actually exists.
    pub isolated_atoms: PathBuf,
    pub dest_a: PathBuf,
    pub dest_b: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("mptrj-gga-ggapu"),
            output_a: PathBuf::from("mptrj-ggapu.extxyz"),
            output_b: PathBuf::from("mptrj-gga.extxyz"),
            isolated_atoms: PathBuf::from("isolated-atoms.extxyz"),
            dest_a: PathBuf::from("mptrj-ggapu"),
            dest_b: PathBuf::from("mptrj-gga"),
        }
    }
}
