use std::collections::BTreeMap;

use crate::error::ParamsError;
use crate::host::{FaultObjectFactory, HostTypes, OutdateClassifier};
use crate::migration::{ConverterRegistry, VersionMigrator};
use crate::model::feature::{DimensionSlot, OutdateState, RawParameters};
use crate::model::value::{PropertyValue, DIMS_VERSION_KEY, PARAMS_VERSION_KEY};
use crate::model::version::SchemaVersion;
use crate::reference::{self, DimensionSlotAllocator, IndexList};
use crate::schema::{FeatureParameters, ParameterSchema, PropertyDescriptor, PropertyKind};

/// Collaborators consulted while materializing parameters.
pub struct DeserializeContext<'a, H: HostTypes> {
    pub fault_factory: &'a dyn FaultObjectFactory<H>,
    pub classifier: &'a dyn OutdateClassifier<H>,
    pub registry: Option<&'a ConverterRegistry<H>>,
}

/// Parameters rebuilt from a feature, with the migrated reference arrays they
/// were resolved against.
pub struct DeserializedParameters<P, H: HostTypes> {
    pub parameters: P,
    pub state: OutdateState,
    /// Dimension property names ordered by the slot they occupy.
    pub dimension_parameters: Vec<String>,
    pub selections: Vec<Option<H::Selection>>,
    pub dimensions: Vec<DimensionSlot>,
    pub bodies: Vec<Option<H::Body>>,
    pub parameters_version: SchemaVersion,
    pub dimensions_version: SchemaVersion,
}

impl<P: std::fmt::Debug, H: HostTypes> std::fmt::Debug for DeserializedParameters<P, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeserializedParameters")
            .field("parameters", &self.parameters)
            .field("state", &self.state)
            .field("dimension_parameters", &self.dimension_parameters)
            .field("selections", &self.selections)
            .field("dimensions", &self.dimensions)
            .field("bodies", &self.bodies)
            .field("parameters_version", &self.parameters_version)
            .field("dimensions_version", &self.dimensions_version)
            .finish()
    }
}

/// Rebuilds a parameters object from the data read back from `feature`.
///
/// `raw` is never modified: reserved version keys are stripped from a private
/// copy, which is migrated to the schema's current version before any
/// property is assigned.
pub fn deserialize<H, P>(
    schema: &ParameterSchema,
    raw: &RawParameters<H>,
    feature: &H::Feature,
    context: &DeserializeContext<'_, H>,
) -> Result<DeserializedParameters<P, H>, ParamsError>
where
    H: HostTypes,
    P: FeatureParameters<H>,
{
    let mut working = raw.clone();
    let parameters_version = working.store.take_version(PARAMS_VERSION_KEY)?;
    let dimensions_version = working.store.take_version(DIMS_VERSION_KEY)?;

    VersionMigrator::new(schema.type_name(), schema.version(), context.registry)
        .migrate(&parameters_version, &mut working)?;

    let mut parameters = P::default();
    let mut occupied = BTreeMap::new();
    let mut slots = DimensionSlotAllocator::new();

    for property in schema.properties() {
        let name = property.name();
        match property.kind() {
            PropertyKind::Excluded => continue,
            PropertyKind::Selection => {
                let indices = index_list(property, &working)?;
                let element_type = property.declared_type().element_type().unwrap_or(name);
                let references = reference::resolve(
                    name,
                    &indices,
                    &working.selections,
                    property.declared_type().is_list(),
                    || context.fault_factory.fault_selection(element_type),
                )?;
                parameters.write(name, PropertyValue::Selection(references))?;
            }
            PropertyKind::EditBody => {
                let indices = index_list(property, &working)?;
                let element_type = property.declared_type().element_type().unwrap_or(name);
                let references = reference::resolve(
                    name,
                    &indices,
                    &working.bodies,
                    property.declared_type().is_list(),
                    || context.fault_factory.fault_body(element_type),
                )?;
                parameters.write(name, PropertyValue::Body(references))?;
            }
            PropertyKind::Dimension(_) => {
                let slot = slots.next_slot();
                let dimension = working.dimensions.get(slot).ok_or_else(|| ParamsError::Index {
                    property: name.to_string(),
                    index: slot,
                    bound: working.dimensions.len(),
                })?;

                if dimension.is_defined() {
                    parameters.write(name, PropertyValue::Dimension(dimension.value))?;
                } else {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        property = name,
                        slot,
                        "dimension value is undefined; keeping current value"
                    );
                }

                occupied.insert(slot, name.to_string());
            }
            PropertyKind::Data => {
                if let Some(stored) = working.store.get(name) {
                    let value = stored.convert_to(&property.declared_type(), name)?;
                    parameters.write(name, PropertyValue::Data(value))?;
                } else {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(property = name, "no stored value; keeping default");
                }
            }
        }
    }

    let state = context.classifier.classify(feature, &working.dimensions);

    Ok(DeserializedParameters {
        parameters,
        state,
        dimension_parameters: occupied.into_values().collect(),
        selections: working.selections,
        dimensions: working.dimensions,
        bodies: working.bodies,
        parameters_version,
        dimensions_version,
    })
}

fn index_list<H: HostTypes>(
    property: &PropertyDescriptor,
    working: &RawParameters<H>,
) -> Result<IndexList, ParamsError> {
    let name = property.name();
    let stored = working
        .store
        .get(name)
        .ok_or_else(|| ParamsError::MissingIndices {
            property: name.to_string(),
        })?;

    IndexList::parse(name, &stored.to_string())
}
