use std::collections::BTreeMap;

use crate::error::ParamsError;
use crate::host::HostTypes;
use crate::model::feature::RawParameters;
use crate::model::version::SchemaVersion;

type Converter<H> = dyn Fn(&mut RawParameters<H>) -> Result<(), ParamsError> + Send + Sync;

/// Converters of one parameters type, keyed by the version each converter
/// upgrades the data *to*.
///
/// A registry is filled while the parser is built and is read-only afterwards.
pub struct ConverterRegistry<H: HostTypes> {
    converters: BTreeMap<SchemaVersion, Box<Converter<H>>>,
}

impl<H: HostTypes> ConverterRegistry<H> {
    pub fn new() -> Self {
        Self {
            converters: BTreeMap::new(),
        }
    }

    /// Registers the converter producing `version`; a later registration for
    /// the same version replaces the earlier one.
    pub fn register<F>(mut self, version: SchemaVersion, converter: F) -> Self
    where
        F: Fn(&mut RawParameters<H>) -> Result<(), ParamsError> + Send + Sync + 'static,
    {
        self.converters.insert(version, Box::new(converter));
        self
    }

    pub fn contains(&self, version: &SchemaVersion) -> bool {
        self.converters.contains_key(version)
    }

    pub fn versions(&self) -> impl Iterator<Item = &SchemaVersion> {
        self.converters.keys()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl<H: HostTypes> Default for ConverterRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostTypes> std::fmt::Debug for ConverterRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("versions", &self.converters.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Brings stored parameters up to the current schema version of one type.
#[derive(Debug)]
pub struct VersionMigrator<'a, H: HostTypes> {
    type_name: &'a str,
    current: Option<&'a SchemaVersion>,
    registry: Option<&'a ConverterRegistry<H>>,
}

impl<'a, H: HostTypes> VersionMigrator<'a, H> {
    pub fn new(
        type_name: &'a str,
        current: Option<&'a SchemaVersion>,
        registry: Option<&'a ConverterRegistry<H>>,
    ) -> Self {
        Self {
            type_name,
            current,
            registry,
        }
    }

    /// Versions of the converters that would run for data stored at `stored`,
    /// in application order.
    pub fn plan(&self, stored: &SchemaVersion) -> Result<Vec<SchemaVersion>, ParamsError> {
        let Some(current) = self.current else {
            if !stored.is_zero() {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    type_name = self.type_name,
                    %stored,
                    "ignoring stored version of unversioned parameters"
                );
            }
            return Ok(Vec::new());
        };

        if stored == current {
            return Ok(Vec::new());
        }

        if stored > current {
            return Err(ParamsError::ForwardIncompatible {
                type_name: self.type_name.to_string(),
                stored: stored.clone(),
                current: current.clone(),
            });
        }

        let missing = |reason: &str| ParamsError::MissingMigration {
            type_name: self.type_name.to_string(),
            stored: stored.clone(),
            current: current.clone(),
            reason: reason.to_string(),
        };

        let registry = self
            .registry
            .ok_or_else(|| missing("no version converters are registered"))?;

        if !registry.contains(current) {
            return Err(missing("the current version has no registered converter"));
        }

        Ok(registry
            .converters
            .range::<SchemaVersion, _>((
                std::ops::Bound::Excluded(stored),
                std::ops::Bound::Included(current),
            ))
            .map(|(version, _)| version.clone())
            .collect())
    }

    /// Applies the planned converters to `raw` in ascending order and returns
    /// how many ran. Nothing is mutated when planning fails.
    pub fn migrate(
        &self,
        stored: &SchemaVersion,
        raw: &mut RawParameters<H>,
    ) -> Result<usize, ParamsError> {
        let plan = self.plan(stored)?;
        let Some(registry) = self.registry else {
            return Ok(0);
        };

        for version in &plan {
            if let Some(converter) = registry.converters.get(version) {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    type_name = self.type_name,
                    %stored,
                    %version,
                    "converting custom feature parameters"
                );
                converter(raw)?;
            }
        }

        Ok(plan.len())
    }
}
