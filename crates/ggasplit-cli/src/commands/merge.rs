use crate::cli::MergeArgs;
use crate::config::PartialRunConfig;
use crate::config::defaults::DefaultsConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use ggasplit::core::composition::Category;
use ggasplit::engine::config::SplitConfig;
use ggasplit::engine::progress::ProgressReporter;
use ggasplit::engine::report::ClassificationReport;
use ggasplit::workflows::merge::{self, MergeSummary};
use tracing::info;

pub fn run(args: MergeArgs) -> Result<()> {
    let partial_config = PartialRunConfig::load(&args.common)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_merge_args(&args, &DefaultsConfig::default())?;

    let progress_handler = CliProgressHandler::new(&config.labels);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Merging structure files from {}...",
        config.input_dir.display()
    );
    if let Some(report_path) = &args.common.report {
        config.output_policy.check(report_path)?;
    }
    let summary = merge::run(&config, &reporter)?;

    if let Some(report_path) = &args.common.report {
        ClassificationReport::from_files(&summary.files, &config.labels)
            .write_csv(report_path, config.output_policy)?;
        info!("Classification report written to {:?}", report_path);
    }

    print_summary(&config, &summary);
    Ok(())
}

fn print_summary(config: &SplitConfig, summary: &MergeSummary) {
    println!(
        "{:<10} {:>7} {:>15} {:>15}  output",
        "category", "files", "configurations", "isolated atoms"
    );
    for category in Category::ALL {
        let s = summary.category(category);
        println!(
            "{:<10} {:>7} {:>15} {:>15}  {}",
            config.labels.get(category),
            s.files,
            s.configurations,
            s.isolated_atoms,
            s.output.display()
        );
    }
}
