use crate::cli::CopyArgs;
use crate::config::PartialRunConfig;
use crate::config::defaults::DefaultsConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use ggasplit::core::composition::Category;
use ggasplit::engine::progress::ProgressReporter;
use ggasplit::engine::report::ClassificationReport;
use ggasplit::workflows::copy;
use tracing::info;

pub fn run(args: CopyArgs) -> Result<()> {
    let partial_config = PartialRunConfig::load(&args.common)?;
    let config = partial_config.merge_with_copy_args(&args, &DefaultsConfig::default())?;

    let progress_handler = CliProgressHandler::new(&config.labels);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Copying structure files from {}...",
        config.input_dir.display()
    );
    if let Some(report_path) = &args.common.report {
        config.output_policy.check(report_path)?;
    }
    let summary = copy::run(&config, &reporter)?;

    if let Some(report_path) = &args.common.report {
        ClassificationReport::from_files(&summary.files, &config.labels)
            .write_csv(report_path, config.output_policy)?;
        info!("Classification report written to {:?}", report_path);
    }

    println!("{:<10} {:>7}  destination", "category", "files");
    for category in Category::ALL {
        println!(
            "{:<10} {:>7}  {}",
            config.labels.get(category),
            summary.copied(category),
            config.destination(category).display()
        );
    }
    Ok(())
}
