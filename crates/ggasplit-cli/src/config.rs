pub mod defaults;

use crate::cli::{CommonArgs, CopyArgs, MergeArgs};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use ggasplit::core::composition::{ClassificationRule, ElementSet};
use ggasplit::engine::config::{
    AnnotationConfig, CategoryLabels, CopyConfig, CopyConfigBuilder, SplitConfig,
    SplitConfigBuilder,
};
use ggasplit::engine::output::OutputPolicy;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialClassificationConfig {
    #[serde(rename = "category-a-label")]
    category_a_label: Option<String>,
    #[serde(rename = "category-b-label")]
    category_b_label: Option<String>,
    groups: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialAnnotationConfig {
    prefix: Option<String>,
    #[serde(rename = "energy-key")]
    energy_key: Option<String>,
    #[serde(rename = "forces-key")]
    forces_key: Option<String>,
    #[serde(rename = "stress-key")]
    stress_key: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    classification: Option<PartialClassificationConfig>,
    annotation: Option<PartialAnnotationConfig>,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the config file named on the command line, or starts from an empty one.
    pub fn load(common: &CommonArgs) -> Result<Self> {
        match &common.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_merge_args(
        mut self,
        args: &MergeArgs,
        defaults: &DefaultsConfig,
    ) -> Result<SplitConfig> {
        self.apply_set_values(&args.common.set_values)?;

        let isolated_atoms = match &args.isolated_atoms {
            Some(path) => Some(path.clone()),
            None if defaults.isolated_atoms.is_file() => {
                info!(
                    "Using isolated-atom records from {:?}",
                    defaults.isolated_atoms
                );
                Some(defaults.isolated_atoms.clone())
            }
            None => None,
        };

        SplitConfigBuilder::new()
            .input_dir(
                args.common
                    .input
                    .clone()
                    .unwrap_or_else(|| defaults.input_dir.clone()),
            )
            .isolated_atoms_path(isolated_atoms)
            .output_a(
                args.output_a
                    .clone()
                    .unwrap_or_else(|| defaults.output_a.clone()),
            )
            .output_b(
                args.output_b
                    .clone()
                    .unwrap_or_else(|| defaults.output_b.clone()),
            )
            .rule(self.rule()?)
            .labels(self.labels())
            .annotation(self.annotation())
            .output_policy(output_policy(&args.common))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn merge_with_copy_args(
        mut self,
        args: &CopyArgs,
        defaults: &DefaultsConfig,
    ) -> Result<CopyConfig> {
        self.apply_set_values(&args.common.set_values)?;

        CopyConfigBuilder::new()
            .input_dir(
                args.common
                    .input
                    .clone()
                    .unwrap_or_else(|| defaults.input_dir.clone()),
            )
            .dest_a(args.dest_a.clone().unwrap_or_else(|| defaults.dest_a.clone()))
            .dest_b(args.dest_b.clone().unwrap_or_else(|| defaults.dest_b.clone()))
            .rule(self.rule()?)
            .labels(self.labels())
            .output_policy(output_policy(&args.common))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn rule(&self) -> Result<ClassificationRule> {
        let groups = self
            .classification
            .as_ref()
            .and_then(|c| c.groups.as_ref());
        let Some(groups) = groups else {
            return Ok(ClassificationRule::default());
        };
        let groups = groups.iter().map(|(name, symbols)| {
            (
                name.clone(),
                symbols.iter().cloned().collect::<ElementSet>(),
            )
        });
        ClassificationRule::new(groups).map_err(|e| CliError::Config(e.to_string()))
    }

    fn labels(&self) -> CategoryLabels {
        let defaults = CategoryLabels::default();
        let Some(c) = &self.classification else {
            return defaults;
        };
        CategoryLabels {
            a: c.category_a_label.clone().unwrap_or(defaults.a),
            b: c.category_b_label.clone().unwrap_or(defaults.b),
        }
    }

    fn annotation(&self) -> AnnotationConfig {
        let defaults = AnnotationConfig::default();
        let Some(a) = &self.annotation else {
            return defaults;
        };
        AnnotationConfig {
            prefix: a.prefix.clone().unwrap_or(defaults.prefix),
            energy_key: a.energy_key.clone().unwrap_or(defaults.energy_key),
            forces_key: a.forces_key.clone().unwrap_or(defaults.forces_key),
            stress_key: a.stress_key.clone().unwrap_or(defaults.stress_key),
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let value = Some(value.to_string());

            match key {
                "classification.category-a-label" => {
                    self.classification
                        .get_or_insert_with(Default::default)
                        .category_a_label = value;
                }
                "classification.category-b-label" => {
                    self.classification
                        .get_or_insert_with(Default::default)
                        .category_b_label = value;
                }
                "annotation.prefix" => {
                    self.annotation.get_or_insert_with(Default::default).prefix = value;
                }
                "annotation.energy-key" => {
                    self.annotation
                        .get_or_insert_with(Default::default)
                        .energy_key = value;
                }
                "annotation.forces-key" => {
                    self.annotation
                        .get_or_insert_with(Default::default)
                        .forces_key = value;
                }
                "annotation.stress-key" => {
                    self.annotation
                        .get_or_insert_with(Default::default)
                        .stress_key = value;
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn output_policy(common: &CommonArgs) -> OutputPolicy {
    if common.overwrite {
        OutputPolicy::Truncate
    } else {
        OutputPolicy::Fail
    }
}
