use super::config::AnnotationConfig;
use crate::core::models::configuration::Configuration;
use crate::core::models::properties::{ColumnKind, InfoValue, PerAtomColumn};
use nalgebra::Matrix3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AnnotateError {
    #[error("Required property '{property}' is missing")]
    MissingProperty { property: String },
    #[error("Property '{property}' is invalid: {reason}")]
    InvalidProperty { property: String, reason: String },
}

/// Copies a configuration's computed energy, forces and stress into the reference keys.
///
/// With the default settings the written keys are `REF_energy` (real), `REF_forces`
/// (per-atom real column of width 3) and `REF_stress` (nine reals, row-major).
#[derive(Debug, Clone)]
pub struct Annotator {
    config: AnnotationConfig,
}

struct Annotation {
    energy: f64,
    forces: PerAtomColumn,
    stress: Vec<f64>,
}

impl Annotator {
    pub fn new(config: AnnotationConfig) -> Self {
        Self { config }
    }

    pub fn energy_key(&self) -> String {
        format!("{}{}", self.config.prefix, self.config.energy_key)
    }

    pub fn forces_key(&self) -> String {
        format!("{}{}", self.config.prefix, self.config.forces_key)
    }

    pub fn stress_key(&self) -> String {
        format!("{}{}", self.config.prefix, self.config.stress_key)
    }

    /// Annotates a single configuration. On error the configuration is left untouched.
    pub fn annotate(&self, configuration: &mut Configuration) -> Result<(), AnnotateError> {
        let annotation = self.compute(configuration)?;
        self.apply(configuration, annotation)
    }

    /// Annotates every configuration or none of them.
    ///
    /// On failure, returns the index of the first offending configuration together with the
    /// error; the slice is not modified in that case.
    pub fn annotate_all(
        &self,
        configurations: &mut [Configuration],
    ) -> Result<(), (usize, AnnotateError)> {
        let annotations = configurations
            .iter()
            .enumerate()
            .map(|(i, c)| self.compute(c).map_err(|e| (i, e)))
            .collect::<Result<Vec<_>, _>>()?;

        for (i, (configuration, annotation)) in
            configurations.iter_mut().zip(annotations).enumerate()
        {
            self.apply(configuration, annotation).map_err(|e| (i, e))?;
        }
        Ok(())
    }

    fn compute(&self, configuration: &Configuration) -> Result<Annotation, AnnotateError> {
        let energy_key = &self.config.energy_key;
        let energy = configuration
            .get_info(energy_key)
            .ok_or_else(|| missing(energy_key))?
            .as_real()
            .ok_or_else(|| invalid(energy_key, "expected a real number"))?;

        let forces_key = &self.config.forces_key;
        let forces = configuration
            .column(forces_key)
            .ok_or_else(|| missing(forces_key))?;
        if forces.kind() != ColumnKind::Real || forces.width != 3 {
            return Err(invalid(
                forces_key,
                &format!(
                    "expected a real column of width 3, found {}:{}",
                    forces.kind().code(),
                    forces.width
                ),
            ));
        }
        let forces = PerAtomColumn::new(self.forces_key(), forces.width, forces.values.clone());

        let stress_key = &self.config.stress_key;
        let raw = configuration
            .get_info(stress_key)
            .ok_or_else(|| missing(stress_key))?;
        let values = raw.as_real_array().ok_or_else(|| {
            invalid(
                stress_key,
                &format!("expected real values, found {}", raw.type_name()),
            )
        })?;
        let stress = flatten_stress(&values).ok_or_else(|| {
            invalid(
                stress_key,
                &format!("expected 9 or 6 components, found {}", values.len()),
            )
        })?;

        Ok(Annotation {
            energy,
            forces,
            stress,
        })
    }

    fn apply(
        &self,
        configuration: &mut Configuration,
        annotation: Annotation,
    ) -> Result<(), AnnotateError> {
        configuration
            .set_column(annotation.forces)
            .map_err(|e| invalid(&self.config.forces_key, &e.to_string()))?;
        configuration.set_info(self.energy_key(), InfoValue::Real(annotation.energy));
        configuration.set_info(self.stress_key(), InfoValue::RealArray(annotation.stress));
        Ok(())
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(AnnotationConfig::default())
    }
}

/// Expands a stress given as 9 row-major or 6 Voigt (`xx yy zz yz xz xy`) components into a
/// full tensor and flattens it row-major.
pub fn flatten_stress(values: &[f64]) -> Option<Vec<f64>> {
    let tensor = match *values {
        [_, _, _, _, _, _, _, _, _] => Matrix3::from_row_slice(values),
        [xx, yy, zz, yz, xz, xy] => Matrix3::new(xx, xy, xz, xy, yy, yz, xz, yz, zz),
        _ => return None,
    };
    // nalgebra stores column-major, so the transpose iterates in row-major order.
    Some(tensor.transpose().iter().copied().collect())
}

fn missing(property: &str) -> AnnotateError {
    AnnotateError::MissingProperty {
        property: property.to_string(),
    }
}

fn invalid(property: &str, reason: &str) -> AnnotateError {
    AnnotateError::InvalidProperty {
        property: property.to_string(),
        reason: reason.to_string(),
    }
}
