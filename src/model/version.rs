use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParamsError;

/// Dotted numeric version of a parameters schema (`1.2`, `2.0.1`).
///
/// Components compare left to right and the shorter tuple is zero-padded, so
/// `1.2 < 1.10` and `1.0 == 1`. The default value is the zero version that
/// legacy data without a stored version maps to.
#[derive(Clone, Debug)]
pub struct SchemaVersion {
    components: Vec<u32>,
}

impl SchemaVersion {
    pub fn new(components: &[u32]) -> Self {
        Self {
            components: components.to_vec(),
        }
    }

    pub fn zero() -> Self {
        Self::new(&[0, 0])
    }

    pub fn components(&self) -> &[u32] {
        &self.components
    }

    pub fn is_zero(&self) -> bool {
        self.significant().is_empty()
    }

    // Trailing zero components never affect ordering.
    fn significant(&self) -> &[u32] {
        let len = self
            .components
            .iter()
            .rposition(|component| *component != 0)
            .map_or(0, |index| index + 1);
        &self.components[..len]
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for SchemaVersion {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for SchemaVersion {}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.significant().cmp(other.significant())
    }
}

impl Hash for SchemaVersion {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.significant().hash(state);
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.components.is_empty() {
            return write!(f, "0.0");
        }

        let mut first = true;
        for component in &self.components {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }

        Ok(())
    }
}

impl FromStr for SchemaVersion {
    type Err = ParamsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ParamsError::InvalidVersion {
                value: value.to_string(),
            });
        }

        let components = trimmed
            .split('.')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParamsError::InvalidVersion {
                value: value.to_string(),
            })?;

        Ok(Self { components })
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
