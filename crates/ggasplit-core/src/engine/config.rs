use super::output::OutputPolicy;
use crate::core::composition::{Category, ClassificationRule, RuleError};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CATEGORY_A_LABEL: &str = "ggapu";
pub const DEFAULT_CATEGORY_B_LABEL: &str = "gga";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Both categories are routed to the same destination: {0}")]
    ConflictingOutputs(PathBuf),
    #[error("Category label cannot be empty")]
    EmptyLabel,
    #[error("Invalid classification rule: {0}")]
    Rule(#[from] RuleError),
}

/// Human-readable names for the two categories, used in logs, reports and summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLabels {
    pub a: String,
    pub b: String,
}

impl CategoryLabels {
    pub fn get(&self, category: Category) -> &str {
        match category {
            Category::A => &self.a,
            Category::B => &self.b,
        }
    }
}

impl Default for CategoryLabels {
    fn default() -> Self {
        Self {
            a: DEFAULT_CATEGORY_A_LABEL.to_string(),
            b: DEFAULT_CATEGORY_B_LABEL.to_string(),
        }
    }
}

/// Source keys read by the annotator and the prefix of the keys it writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationConfig {
    pub prefix: String,
    pub energy_key: String,
    pub forces_key: String,
    pub stress_key: String,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            prefix: "REF_".to_string(),
            energy_key: "energy".to_string(),
            forces_key: "forces".to_string(),
            stress_key: "stress".to_string(),
        }
    }
}

/// Settings for the classify-annotate-merge workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    pub input_dir: PathBuf,
    pub isolated_atoms_path: Option<PathBuf>,
    pub output_a: PathBuf,
    pub output_b: PathBuf,
    pub rule: ClassificationRule,
    pub labels: CategoryLabels,
    pub annotation: AnnotationConfig,
    pub output_policy: OutputPolicy,
}

impl SplitConfig {
    pub fn output_path(&self, category: Category) -> &Path {
        match category {
            Category::A => &self.output_a,
            Category::B => &self.output_b,
        }
    }
}

/// Settings for the byte-preserving copy workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyConfig {
    pub input_dir: PathBuf,
    pub dest_a: PathBuf,
    pub dest_b: PathBuf,
    pub rule: ClassificationRule,
    pub labels: CategoryLabels,
    pub output_policy: OutputPolicy,
}

impl CopyConfig {
    pub fn destination(&self, category: Category) -> &Path {
        match category {
            Category::A => &self.dest_a,
            Category::B => &self.dest_b,
        }
    }
}

fn validate_labels(labels: &CategoryLabels) -> Result<(), ConfigError> {
    if labels.a.trim().is_empty() || labels.b.trim().is_empty() {
        return Err(ConfigError::EmptyLabel);
    }
    Ok(())
}

#[derive(Default)]
pub struct SplitConfigBuilder {
    input_dir: Option<PathBuf>,
    isolated_atoms_path: Option<PathBuf>,
    output_a: Option<PathBuf>,
    output_b: Option<PathBuf>,
    rule: Option<ClassificationRule>,
    labels: Option<CategoryLabels>,
    annotation: Option<AnnotationConfig>,
    output_policy: Option<OutputPolicy>,
}

impl SplitConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_dir(mut self, path: PathBuf) -> Self {
        self.input_dir = Some(path);
        self
    }
    pub fn isolated_atoms_path(mut self, path: Option<PathBuf>) -> Self {
        self.isolated_atoms_path = path;
        self
    }
    pub fn output_a(mut self, path: PathBuf) -> Self {
        self.output_a = Some(path);
        self
    }
    pub fn output_b(mut self, path: PathBuf) -> Self {
        self.output_b = Some(path);
        self
    }
    pub fn rule(mut self, rule: ClassificationRule) -> Self {
        self.rule = Some(rule);
        self
    }
    pub fn labels(mut self, labels: CategoryLabels) -> Self {
        self.labels = Some(labels);
        self
    }
    pub fn annotation(mut self, annotation: AnnotationConfig) -> Self {
        self.annotation = Some(annotation);
        self
    }
    pub fn output_policy(mut self, policy: OutputPolicy) -> Self {
        self.output_policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<SplitConfig, ConfigError> {
        let output_a = self
            .output_a
            .ok_or(ConfigError::MissingParameter("output_a"))?;
        let output_b = self
            .output_b
            .ok_or(ConfigError::MissingParameter("output_b"))?;
        if output_a == output_b {
            return Err(ConfigError::ConflictingOutputs(output_a));
        }
        let labels = self.labels.unwrap_or_default();
        validate_labels(&labels)?;

        Ok(SplitConfig {
            input_dir: self
                .input_dir
                .ok_or(ConfigError::MissingParameter("input_dir"))?,
            isolated_atoms_path: self.isolated_atoms_path,
            output_a,
            output_b,
            rule: self.rule.unwrap_or_default(),
            labels,
            annotation: self.annotation.unwrap_or_default(),
            output_policy: self.output_policy.unwrap_or_default(),
        })
    }
}

#[derive(Default)]
pub struct CopyConfigBuilder {
    input_dir: Option<PathBuf>,
    dest_a: Option<PathBuf>,
    dest_b: Option<PathBuf>,
    rule: Option<ClassificationRule>,
    labels: Option<CategoryLabels>,
    output_policy: Option<OutputPolicy>,
}

impl CopyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_dir(mut self, path: PathBuf) -> Self {
        self.input_dir = Some(path);
        self
    }
    pub fn dest_a(mut self, path: PathBuf) -> Self {
        self.dest_a = Some(path);
        self
    }
    pub fn dest_b(mut self, path: PathBuf) -> Self {
        self.dest_b = Some(path);
        self
    }
    pub fn rule(mut self, rule: ClassificationRule) -> Self {
        self.rule = Some(rule);
        self
    }
    pub fn labels(mut self, labels: CategoryLabels) -> Self {
        self.labels = Some(labels);
        self
    }
    pub fn output_policy(mut self, policy: OutputPolicy) -> Self {
        self.output_policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<CopyConfig, ConfigError> {
        let dest_a = self.dest_a.ok_or(ConfigError::MissingParameter("dest_a"))?;
        let dest_b = self.dest_b.ok_or(ConfigError::MissingParameter("dest_b"))?;
        if dest_a == dest_b {
            return Err(ConfigError::ConflictingOutputs(dest_a));
        }
        let labels = self.labels.unwrap_or_default();
        validate_labels(&labels)?;

        Ok(CopyConfig {
            input_dir: self
                .input_dir
                .ok_or(ConfigError::MissingParameter("input_dir"))?,
            dest_a,
            dest_b,
            rule: self.rule.unwrap_or_default(),
            labels,
            output_policy: self.output_policy.unwrap_or_default(),
        })
    }
}
