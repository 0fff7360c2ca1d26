use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::host::HostTypes;
use crate::model::value::FlatParameterStore;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum DimensionType {
    Linear,
    Angular,
    Radial,
}

impl std::fmt::Display for DimensionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Linear => "linear",
            Self::Angular => "angular",
            Self::Radial => "radial",
        };

        write!(f, "{value}")
    }
}

impl FromStr for DimensionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "linear" => Ok(Self::Linear),
            "angular" => Ok(Self::Angular),
            "radial" => Ok(Self::Radial),
            _ => Err(format!(
                "unknown dimension type `{value}`; expected one of: linear, angular, radial"
            )),
        }
    }
}

/// One driving dimension of a feature. A `NaN` value means the host could not
/// evaluate the dimension and the parameter keeps its current value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DimensionSlot {
    pub kind: DimensionType,
    pub value: f64,
}

impl DimensionSlot {
    pub fn new(kind: DimensionType, value: f64) -> Self {
        Self { kind, value }
    }

    pub fn undefined(kind: DimensionType) -> Self {
        Self {
            kind,
            value: f64::NAN,
        }
    }

    pub fn is_defined(&self) -> bool {
        !self.value.is_nan()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutdateState {
    UpToDate,
    DimensionsOutdated,
    IconsOutdated,
}

impl std::fmt::Display for OutdateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::UpToDate => "up-to-date",
            Self::DimensionsOutdated => "dimensions-outdated",
            Self::IconsOutdated => "icons-outdated",
        };

        write!(f, "{value}")
    }
}

/// Data read back from a feature: the flat store plus the three reference
/// arrays. `None` slots mark references the host can no longer resolve.
///
/// Version converters receive a private copy of this tuple and mutate it in
/// place.
pub struct RawParameters<H: HostTypes> {
    pub store: FlatParameterStore,
    pub selections: Vec<Option<H::Selection>>,
    pub dimensions: Vec<DimensionSlot>,
    pub bodies: Vec<Option<H::Body>>,
}

impl<H: HostTypes> RawParameters<H> {
    pub fn new(store: FlatParameterStore) -> Self {
        Self {
            store,
            selections: Vec::new(),
            dimensions: Vec::new(),
            bodies: Vec::new(),
        }
    }

    pub fn with_selections(mut self, selections: Vec<Option<H::Selection>>) -> Self {
        self.selections = selections;
        self
    }

    pub fn with_dimensions(mut self, dimensions: Vec<DimensionSlot>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_bodies(mut self, bodies: Vec<Option<H::Body>>) -> Self {
        self.bodies = bodies;
        self
    }
}

impl<H: HostTypes> Clone for RawParameters<H> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            selections: self.selections.clone(),
            dimensions: self.dimensions.clone(),
            bodies: self.bodies.clone(),
        }
    }
}

impl<H: HostTypes> std::fmt::Debug for RawParameters<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawParameters")
            .field("store", &self.store)
            .field("selections", &self.selections)
            .field("dimensions", &self.dimensions)
            .field("bodies", &self.bodies)
            .finish()
    }
}

/// Output of serializing a parameters object, ready to be written to a feature.
/// The selection and body arrays are deduplicated in first-seen order.
pub struct SerializedParameters<H: HostTypes> {
    pub store: FlatParameterStore,
    pub selections: Vec<H::Selection>,
    pub dimensions: Vec<DimensionSlot>,
    pub bodies: Vec<H::Body>,
}

impl<H: HostTypes> SerializedParameters<H> {
    /// Re-reads the serialized data as if the host returned it unchanged.
    pub fn to_raw(&self) -> RawParameters<H> {
        RawParameters {
            store: self.store.clone(),
            selections: self.selections.iter().cloned().map(Some).collect(),
            dimensions: self.dimensions.clone(),
            bodies: self.bodies.iter().cloned().map(Some).collect(),
        }
    }

    pub fn dimension_values(&self) -> Vec<f64> {
        self.dimensions.iter().map(|slot| slot.value).collect()
    }
}

impl<H: HostTypes> Clone for SerializedParameters<H> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            selections: self.selections.clone(),
            dimensions: self.dimensions.clone(),
            bodies: self.bodies.clone(),
        }
    }
}

impl<H: HostTypes> std::fmt::Debug for SerializedParameters<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializedParameters")
            .field("store", &self.store)
            .field("selections", &self.selections)
            .field("dimensions", &self.dimensions)
            .field("bodies", &self.bodies)
            .finish()
    }
}
