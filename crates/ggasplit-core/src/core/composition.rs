use crate::core::utils::elements::is_known_element;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// The distinct element symbols of a structure (or of a whole dataset).
pub type ElementSet = BTreeSet<String>;

pub const TRANSITION_METALS_GROUP: &str = "transition-metals";
pub const ANIONS_GROUP: &str = "anions";

const DEFAULT_TRANSITION_METALS: [&str; 8] = ["Co", "Cr", "Fe", "Mn", "Mo", "Ni", "V", "W"];
const DEFAULT_ANIONS: [&str; 2] = ["O", "F"];

/// The two dataset categories a structure file can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// The composition intersects every element group of the rule.
    A,
    /// Everything else.
    B,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::A, Category::B];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::A => write!(f, "A"),
            Category::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RuleError {
    #[error("Classification rule must define at least one element group")]
    Empty,
    #[error("Element group '{0}' is empty")]
    EmptyGroup(String),
    #[error("Element group '{group}' contains unknown element symbol '{symbol}'")]
    UnknownElement { group: String, symbol: String },
}

/// A composition rule: a structure is category A iff its element set intersects every group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    groups: BTreeMap<String, ElementSet>,
}

impl ClassificationRule {
    /// Builds a rule from named element groups.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if there are no groups, a group is empty, or a group contains a
    /// symbol that is not a chemical element.
    pub fn new<I, S>(groups: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (S, ElementSet)>,
        S: Into<String>,
    {
        let groups: BTreeMap<String, ElementSet> =
            groups.into_iter().map(|(k, v)| (k.into(), v)).collect();
        if groups.is_empty() {
            return Err(RuleError::Empty);
        }
        for (name, elements) in &groups {
            if elements.is_empty() {
                return Err(RuleError::EmptyGroup(name.clone()));
            }
            if let Some(symbol) = elements.iter().find(|s| !is_known_element(s)) {
                return Err(RuleError::UnknownElement {
                    group: name.clone(),
                    symbol: symbol.clone(),
                });
            }
        }
        Ok(Self { groups })
    }

    pub fn groups(&self) -> &BTreeMap<String, ElementSet> {
        &self.groups
    }

    pub fn classify(&self, elements: &ElementSet) -> Category {
        let qualifies = self
            .groups
            .values()
            .all(|group| !group.is_disjoint(elements));
        if qualifies { Category::A } else { Category::B }
    }
}

impl Default for ClassificationRule {
    /// Transition metal (Co, Cr, Fe, Mn, Mo, Ni, V, W) together with an oxide or fluoride anion.
    fn default() -> Self {
        let to_set = |symbols: &[&str]| symbols.iter().map(|s| s.to_string()).collect();
        let mut groups = BTreeMap::new();
        groups.insert(
            TRANSITION_METALS_GROUP.to_string(),
            to_set(&DEFAULT_TRANSITION_METALS),
        );
        groups.insert(ANIONS_GROUP.to_string(), to_set(&DEFAULT_ANIONS));
        Self { groups }
    }
}
