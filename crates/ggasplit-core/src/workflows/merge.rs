use crate::core::composition::{Category, ElementSet};
use crate::core::io::extxyz::ExtXyzFile;
use crate::core::io::traits::StructureFile;
use crate::core::models::configuration::Configuration;
use crate::engine::accumulator::{Partition, select_isolated_atoms};
use crate::engine::annotate::Annotator;
use crate::engine::config::SplitConfig;
use crate::engine::error::EngineError;
use crate::engine::loader::{self, FileSummary};
use crate::engine::output::{self, OutputContainer};
use crate::engine::progress::ProgressReporter;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Totals for one category of a merge run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategorySummary {
    pub output: PathBuf,
    pub files: usize,
    pub configurations: usize,
    pub vocabulary: ElementSet,
    pub isolated_atoms: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeSummary {
    pub a: CategorySummary,
    pub b: CategorySummary,
    /// Per-file classification in discovery order.
    pub files: Vec<FileSummary>,
}

impl MergeSummary {
    pub fn category(&self, category: Category) -> &CategorySummary {
        match category {
            Category::A => &self.a,
            Category::B => &self.b,
        }
    }
}

#[instrument(skip_all, name = "merge_workflow")]
pub fn run(config: &SplitConfig, reporter: &ProgressReporter) -> Result<MergeSummary, EngineError> {
    // === Phase 0: Output policy ===
    for category in Category::ALL {
        let path = config.output_path(category);
        config.output_policy.check(path)?;
        output::check_outside_input(&config.input_dir, output::parent_dir(path))?;
    }

    // === Phase 1: Discover, load and classify ===
    reporter.phase_start("Loading");
    let inputs = loader::discover_input_files(&config.input_dir)?;
    info!(
        files = inputs.len(),
        input = %config.input_dir.display(),
        "Discovered input files."
    );
    if inputs.is_empty() {
        warn!("Input directory contains no files; outputs will be empty.");
    }
    let classified = loader::process_files(&inputs, reporter, |path| {
        let file = loader::load_and_classify(path, &config.rule)?;
        reporter.file_classified(file.category);
        Ok(file)
    })?;
    reporter.phase_finish();

    // === Phase 2: Annotate and partition ===
    reporter.phase_start("Annotating");
    let annotator = Annotator::new(config.annotation.clone());
    let mut partition = Partition::new();
    let mut files = Vec::with_capacity(classified.len());
    for mut file in classified {
        annotator
            .annotate_all(&mut file.configurations)
            .map_err(|(index, source)| EngineError::Annotation {
                path: file.path.clone(),
                index,
                source,
            })?;
        debug!(
            path = %file.path.display(),
            label = config.labels.get(file.category),
            configurations = file.configurations.len(),
            "Annotated file."
        );
        files.push(file.summarize(true));
        partition
            .get_mut(file.category)
            .push_file(file.configurations);
    }
    reporter.phase_finish();

    // === Phase 3: Isolated atoms ===
    reporter.phase_start("Loading isolated atoms");
    let isolated = load_isolated_atoms(config)?;
    reporter.phase_finish();

    // === Phase 4: Write outputs ===
    // Both containers are open before either is written; an early return drops and removes them.
    reporter.phase_start("Writing");
    let mut output_a = OutputContainer::create(&config.output_a, config.output_policy)?;
    let mut output_b = OutputContainer::create(&config.output_b, config.output_policy)?;
    let a = write_category(config, &partition, Category::A, &isolated, &mut output_a)?;
    let b = write_category(config, &partition, Category::B, &isolated, &mut output_b)?;
    OutputContainer::finish_all(vec![output_a, output_b])?;
    reporter.phase_finish();

    for (category, summary) in [(Category::A, &a), (Category::B, &b)] {
        reporter.message(format!(
            "{}: {} files, {} configurations, {} isolated atoms -> {}",
            config.labels.get(category),
            summary.files,
            summary.configurations,
            summary.isolated_atoms,
            summary.output.display()
        ));
    }

    info!(
        a_label = config.labels.get(Category::A),
        a_configurations = a.configurations,
        b_label = config.labels.get(Category::B),
        b_configurations = b.configurations,
        "Merge complete."
    );
    Ok(MergeSummary { a, b, files })
}

fn load_isolated_atoms(config: &SplitConfig) -> Result<Vec<Configuration>, EngineError> {
    let Some(path) = &config.isolated_atoms_path else {
        warn!("No isolated-atom file given; no reference atoms will be appended.");
        return Ok(Vec::new());
    };
    let records = ExtXyzFile::read_all_from_path(path).map_err(|source| EngineError::Load {
        path: path.clone(),
        source,
    })?;
    info!(
        records = records.len(),
        path = %path.display(),
        "Loaded isolated-atom records."
    );
    Ok(records)
}

fn write_category(
    config: &SplitConfig,
    partition: &Partition,
    category: Category,
    isolated: &[Configuration],
    container: &mut OutputContainer,
) -> Result<CategorySummary, EngineError> {
    let accumulator = partition.get(category);
    let path = container.path().to_path_buf();
    let selected = select_isolated_atoms(isolated, accumulator.vocabulary());

    container.append(accumulator.configurations())?;
    container.append(selected.iter().copied())?;
    info!(
        label = config.labels.get(category),
        path = %path.display(),
        written = container.written(),
        isolated_atoms = selected.len(),
        "Wrote output."
    );

    Ok(CategorySummary {
        output: path,
        files: accumulator.file_count(),
        configurations: accumulator.configurations().len(),
        vocabulary: accumulator.vocabulary().clone(),
        isolated_atoms: selected.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::properties::InfoValue;
    use crate::engine::annotate::AnnotateError;
    use crate::engine::config::SplitConfigBuilder;
    use crate::engine::output::OutputPolicy;
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    fn frame(symbols: &[&str], energy: f64) -> String {
        let mut text = format!(
            "{}\nLattice=\"5.0 0.0 0.0 0.0 5.0 0.0 0.0 0.0 5.0\" Properties=species:S:1:pos:R:3:forces:R:3 energy={energy:?} stress=\"1.0 2.0 3.0 2.0 4.0 5.0 3.0 5.0 6.0\" pbc=\"T T T\"\n",
            symbols.len()
        );
        for (i, symbol) in symbols.iter().enumerate() {
            text.push_str(&format!("{symbol} {i}.0 0.0 0.0 0.5 -0.5 {i}.0\n"));
        }
        text
    }

    fn isolated(symbol: &str, energy: f64) -> String {
        format!("1\nenergy={energy:?} pbc=\"F F F\"\n{symbol} 0.0 0.0 0.0\n")
    }

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            fs::create_dir(dir.path().join("input")).unwrap();
            Self { dir }
        }

        fn input(&self, name: &str, frames: &[String]) {
            fs::write(self.dir.path().join("input").join(name), frames.concat()).unwrap();
        }

        fn isolated_atoms(&self, records: &[String]) -> PathBuf {
            let path = self.dir.path().join("isolated.extxyz");
            fs::write(&path, records.concat()).unwrap();
            path
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn config(&self, isolated: Option<PathBuf>) -> SplitConfig {
            SplitConfigBuilder::new()
                .input_dir(self.path("input"))
                .isolated_atoms_path(isolated)
                .output_a(self.path("out/ggapu.extxyz"))
                .output_b(self.path("out/gga.extxyz"))
                .build()
                .unwrap()
        }
    }

    fn read(path: &Path) -> Vec<Configuration> {
        if fs::read_to_string(path).unwrap().trim().is_empty() {
            return Vec::new();
        }
        ExtXyzFile::read_all_from_path(path).unwrap()
    }

    fn energies(configurations: &[Configuration]) -> Vec<f64> {
        configurations
            .iter()
            .map(|c| c.get_info("energy").unwrap().as_real().unwrap())
            .collect()
    }

    #[test]
    fn transition_metal_oxide_file_lands_in_category_a_with_annotations() {
        let fx = Fixture::new();
        fx.input(
            "fe_o_li.extxyz",
            &[frame(&["Fe", "O", "Li"], -1.0), frame(&["Fe", "O", "Li"], -2.0)],
        );
        let config = fx.config(None);

        let summary = run(&config, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.a.files, 1);
        assert_eq!(summary.a.configurations, 2);
        assert_eq!(summary.b.configurations, 0);
        assert_eq!(summary.files[0].category, Category::A);

        let written = read(&config.output_a);
        assert_eq!(energies(&written), [-1.0, -2.0]);
        for configuration in &written {
            assert_eq!(
                configuration.get_info("REF_energy"),
                configuration.get_info("energy")
            );
            assert_eq!(
                configuration.column("REF_forces").unwrap().values,
                configuration.column("forces").unwrap().values
            );
            assert_eq!(
                configuration.get_info("REF_stress"),
                Some(&InfoValue::RealArray(vec![
                    1.0, 2.0, 3.0, 2.0, 4.0, 5.0, 3.0, 5.0, 6.0
                ]))
            );
        }
        assert!(read(&config.output_b).is_empty());
    }

    #[test]
    fn files_without_a_qualifying_pair_land_in_category_b() {
        let fx = Fixture::new();
        fx.input("li_c_o.extxyz", &[frame(&["Li", "C", "O"], -3.0)]);
        fx.input("fe_cl.extxyz", &[frame(&["Fe", "Cl"], -4.0)]);
        let config = fx.config(None);

        let summary = run(&config, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.b.files, 2);
        assert!(summary.files.iter().all(|f| f.category == Category::B));
        // Discovery is by file name: fe_cl before li_c_o.
        assert_eq!(energies(&read(&config.output_b)), [-4.0, -3.0]);
    }

    #[test]
    fn isolated_atoms_follow_each_category_vocabulary() {
        let fx = Fixture::new();
        fx.input("a.extxyz", &[frame(&["Fe", "O"], -1.0)]);
        fx.input("b.extxyz", &[frame(&["Li", "C", "O"], -2.0)]);
        let atoms = fx.isolated_atoms(&[
            isolated("Fe", -0.1),
            isolated("Li", -0.2),
            isolated("O", -0.3),
            isolated("Cl", -0.4),
        ]);
        let config = fx.config(Some(atoms));

        let summary = run(&config, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.a.isolated_atoms, 2);
        assert_eq!(summary.b.isolated_atoms, 2);

        let a = read(&config.output_a);
        assert_eq!(energies(&a), [-1.0, -0.1, -0.3]);
        assert!(a[1].get_info("REF_energy").is_none());

        let b = read(&config.output_b);
        assert_eq!(energies(&b), [-2.0, -0.2, -0.3]);
    }

    #[test]
    fn every_configuration_lands_in_exactly_one_output_in_discovery_order() {
        let fx = Fixture::new();
        let layout: [(&str, &[&str], usize); 4] = [
            ("03.extxyz", &["Mn", "F"], 3),
            ("01.extxyz", &["Na", "Cl"], 2),
            ("02.extxyz", &["V", "O"], 1),
            ("00.extxyz", &["Si", "O"], 2),
        ];
        let mut energy = 0.0;
        for (name, symbols, count) in layout {
            let frames: Vec<String> = (0..count)
                .map(|_| {
                    energy -= 1.0;
                    frame(symbols, energy)
                })
                .collect();
            fx.input(name, &frames);
        }
        let config = fx.config(None);
        let summary = run(&config, &ProgressReporter::new()).unwrap();

        let a = energies(&read(&config.output_a));
        let b = energies(&read(&config.output_b));
        assert_eq!(a.len() + b.len(), 8);
        assert_eq!(summary.a.configurations + summary.b.configurations, 8);
        // 02 (V-O) then 03 (Mn-F); 00 (Si-O) then 01 (Na-Cl).
        assert_eq!(a, [-6.0, -1.0, -2.0, -3.0]);
        assert_eq!(b, [-7.0, -8.0, -4.0, -5.0]);
        assert_eq!(
            summary.a.vocabulary,
            ["F", "Mn", "O", "V"]
                .iter()
                .map(|s| s.to_string())
                .collect::<ElementSet>()
        );
    }

    #[test]
    fn missing_property_aborts_before_any_output_is_written() {
        let fx = Fixture::new();
        fx.input("good.extxyz", &[frame(&["Fe", "O"], -1.0)]);
        fx.input(
            "no_forces.extxyz",
            &["1\nenergy=-1.0 stress=\"0 0 0 0 0 0\"\nLi 0.0 0.0 0.0\n".to_string()],
        );
        let config = fx.config(None);

        let err = run(&config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Annotation {
                index: 0,
                source: AnnotateError::MissingProperty { .. },
                ..
            }
        ));
        assert!(!config.output_a.exists());
        assert!(!config.output_b.exists());
    }

    #[test]
    fn corrupt_input_file_fails_the_run() {
        let fx = Fixture::new();
        fx.input("ok.extxyz", &[frame(&["Fe", "O"], -1.0)]);
        fx.input("bad.extxyz", &["2\n\nFe 0 0 0\n".to_string()]);
        let err = run(&fx.config(None), &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, EngineError::Load { .. }));
    }

    #[test]
    fn existing_outputs_are_rejected_unless_truncating() {
        let fx = Fixture::new();
        fx.input("a.extxyz", &[frame(&["Fe", "O"], -1.0)]);
        let mut config = fx.config(None);
        run(&config, &ProgressReporter::new()).unwrap();

        let err = run(&config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, EngineError::OutputExists { .. }));

        config.output_policy = OutputPolicy::Truncate;
        run(&config, &ProgressReporter::new()).unwrap();
        assert_eq!(read(&config.output_a).len(), 1);
    }

    #[test]
    fn failure_to_open_second_output_leaves_no_first_output() {
        let fx = Fixture::new();
        fx.input("a.extxyz", &[frame(&["Fe", "O"], -1.0)]);
        fs::write(fx.path("blocker"), "not a directory").unwrap();
        let config = SplitConfigBuilder::new()
            .input_dir(fx.path("input"))
            .output_a(fx.path("ggapu.extxyz"))
            .output_b(fx.path("blocker/gga.extxyz"))
            .build()
            .unwrap();

        assert!(run(&config, &ProgressReporter::new()).is_err());
        assert!(!config.output_a.exists());

        let retry = SplitConfigBuilder::new()
            .input_dir(fx.path("input"))
            .output_a(fx.path("ggapu.extxyz"))
            .output_b(fx.path("gga.extxyz"))
            .build()
            .unwrap();
        run(&retry, &ProgressReporter::new()).unwrap();
        assert_eq!(read(&retry.output_a).len(), 1);
    }

    #[test]
    fn output_inside_input_directory_is_rejected() {
        let fx = Fixture::new();
        fx.input("a.extxyz", &[frame(&["Fe", "O"], -1.0)]);
        let mut config = SplitConfigBuilder::new()
            .input_dir(fx.path("input"))
            .output_a(fx.path("input/ggapu.extxyz"))
            .output_b(fx.path("gga.extxyz"))
            .build()
            .unwrap();
        config.output_policy = OutputPolicy::Truncate;

        let err = run(&config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, EngineError::OutputInInputDir { .. }));
        assert!(!config.output_a.exists());
        assert!(!config.output_b.exists());
    }

    #[test]
    fn category_totals_are_reported_as_messages() {
        use crate::engine::progress::Progress;
        use std::sync::Mutex;

        let fx = Fixture::new();
        fx.input("a.extxyz", &[frame(&["Fe", "O"], -1.0)]);
        let config = fx.config(None);
        let messages = Mutex::new(Vec::new());
        let callback = |event: Progress| {
            if let Progress::Message(text) = event {
                messages.lock().unwrap().push(text);
            }
        };
        run(&config, &ProgressReporter::with_callback(Box::new(callback))).unwrap();

        let messages = messages.into_inner().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("ggapu: 1 files, 1 configurations, 0 isolated atoms"));
        assert!(messages[1].starts_with("gga: 0 files"));
    }

    #[test]
    fn empty_input_directory_produces_empty_outputs() {
        let fx = Fixture::new();
        let atoms = fx.isolated_atoms(&[isolated("Fe", -0.1)]);
        let config = fx.config(Some(atoms));

        let summary = run(&config, &ProgressReporter::new()).unwrap();
        assert!(summary.files.is_empty());
        assert_eq!(summary.a.isolated_atoms, 0);
        assert!(read(&config.output_a).is_empty());
        assert!(read(&config.output_b).is_empty());
    }
}
