use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "ggasplit - Split an MPtrj-style Extended XYZ corpus into GGA and GGA+U datasets by composition.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of worker threads used to load and classify files.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify, annotate and merge every input file into one structure file per category.
    Merge(MergeArgs),
    /// Classify every input file and copy it unchanged into its category's directory.
    Copy(CopyArgs),
}

/// Options shared by both subcommands.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory holding the input structure files.
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S annotation.prefix=DFT_
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,

    /// Replace existing outputs instead of refusing to run.
    #[arg(long)]
    pub overwrite: bool,

    /// Write a per-file classification report in CSV format.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

/// Arguments for the `merge` subcommand.
#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Extended XYZ file of single-atom reference records appended to matching outputs.
    #[arg(long, value_name = "PATH")]
    pub isolated_atoms: Option<PathBuf>,

    /// Output file for category A (transition metal with an oxide or fluoride anion).
    #[arg(long, value_name = "PATH")]
    pub output_a: Option<PathBuf>,

    /// Output file for category B (everything else).
    #[arg(long, value_name = "PATH")]
    pub output_b: Option<PathBuf>,
}

/// Arguments for the `copy` subcommand.
#[derive(Args, Debug)]
pub struct CopyArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Destination directory for category A files.
    #[arg(long, value_name = "DIR")]
    pub dest_a: Option<PathBuf>,

    /// Destination directory for category B files.
    #[arg(long, value_name = "DIR")]
    pub dest_b: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_arguments_parse_with_global_flags() {
        let cli = Cli::parse_from([
            "ggasplit",
            "-vv",
            "-j",
            "4",
            "merge",
            "-i",
            "data",
            "--output-a",
            "a.extxyz",
            "-S",
            "annotation.prefix=DFT_",
            "--overwrite",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(4));
        let Commands::Merge(args) = cli.command else {
            panic!("expected merge subcommand");
        };
        assert_eq!(args.common.input, Some(PathBuf::from("data")));
        assert_eq!(args.output_a, Some(PathBuf::from("a.extxyz")));
        assert_eq!(args.output_b, None);
        assert_eq!(args.common.set_values, ["annotation.prefix=DFT_"]);
        assert!(args.common.overwrite);
    }

    #[test]
    fn copy_arguments_parse() {
        let cli = Cli::parse_from(["ggasplit", "copy", "--dest-a", "x", "--report", "r.csv"]);
        let Commands::Copy(args) = cli.command else {
            panic!("expected copy subcommand");
        };
        assert_eq!(args.dest_a, Some(PathBuf::from("x")));
        assert_eq!(args.common.report, Some(PathBuf::from("r.csv")));
        assert!(!args.common.overwrite);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["ggasplit", "-q", "-v", "copy"]).is_err());
    }
}
