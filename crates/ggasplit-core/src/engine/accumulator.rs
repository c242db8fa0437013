use crate::core::composition::{Category, ElementSet};
use crate::core::models::configuration::Configuration;

/// Ordered configurations of one category, plus the element vocabulary they span.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryAccumulator {
    configurations: Vec<Configuration>,
    files: usize,
    vocabulary: ElementSet,
}

impl CategoryAccumulator {
    /// Appends a file's configurations after everything accumulated so far.
    pub fn push_file(&mut self, configurations: Vec<Configuration>) {
        for configuration in &configurations {
            self.vocabulary
                .extend(configuration.symbols().map(str::to_string));
        }
        self.configurations.extend(configurations);
        self.files += 1;
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    pub fn file_count(&self) -> usize {
        self.files
    }

    /// Every element symbol appearing in any accumulated configuration.
    pub fn vocabulary(&self) -> &ElementSet {
        &self.vocabulary
    }
}

/// The two category accumulators of a merge run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    a: CategoryAccumulator,
    b: CategoryAccumulator,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> &CategoryAccumulator {
        match category {
            Category::A => &self.a,
            Category::B => &self.b,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut CategoryAccumulator {
        match category {
            Category::A => &mut self.a,
            Category::B => &mut self.b,
        }
    }
}

/// Keeps the isolated-atom records whose elements all belong to `vocabulary`, in input order.
///
/// Records without atoms are never selected.
pub fn select_isolated_atoms<'a>(
    records: &'a [Configuration],
    vocabulary: &ElementSet,
) -> Vec<&'a Configuration> {
    records
        .iter()
        .filter(|record| {
            !record.is_empty() && record.symbols().all(|s| vocabulary.contains(s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::configuration::Atom;
    use nalgebra::Point3;

    fn structure(symbols: &[&str]) -> Configuration {
        Configuration::new(
            symbols
                .iter()
                .map(|s| Atom::new(s, Point3::origin()))
                .collect(),
        )
    }

    fn vocabulary(symbols: &[&str]) -> ElementSet {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn push_file_preserves_order_and_grows_vocabulary() {
        let mut acc = CategoryAccumulator::default();
        acc.push_file(vec![structure(&["Fe", "O"]), structure(&["Fe", "O", "Li"])]);
        acc.push_file(vec![structure(&["Mn", "F"])]);

        assert_eq!(acc.file_count(), 2);
        assert_eq!(acc.configurations().len(), 3);
        assert_eq!(acc.configurations()[2], structure(&["Mn", "F"]));
        assert_eq!(acc.vocabulary(), &vocabulary(&["F", "Fe", "Li", "Mn", "O"]));
    }

    #[test]
    fn partition_routes_by_category() {
        let mut partition = Partition::new();
        partition
            .get_mut(Category::B)
            .push_file(vec![structure(&["Li", "C"])]);
        assert!(partition.get(Category::A).configurations().is_empty());
        assert_eq!(partition.get(Category::B).configurations().len(), 1);
    }

    #[test]
    fn isolated_atoms_are_selected_by_vocabulary_membership() {
        let records = vec![
            structure(&["Fe"]),
            structure(&["Cl"]),
            structure(&["O"]),
            structure(&[]),
        ];
        let selected = select_isolated_atoms(&records, &vocabulary(&["Fe", "O", "Li"]));
        assert_eq!(selected, vec![&records[0], &records[2]]);

        assert!(select_isolated_atoms(&records, &ElementSet::new()).is_empty());
    }

    #[test]
    fn multi_atom_record_requires_every_element() {
        let records = vec![structure(&["Fe", "Cl"])];
        assert!(select_isolated_atoms(&records, &vocabulary(&["Fe"])).is_empty());
        assert_eq!(
            select_isolated_atoms(&records, &vocabulary(&["Fe", "Cl"])).len(),
            1
        );
    }
}
