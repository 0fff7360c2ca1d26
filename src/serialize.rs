use crate::error::ParamsError;
use crate::host::HostTypes;
use crate::model::feature::{DimensionSlot, SerializedParameters};
use crate::model::value::{
    FlatParameterStore, ParamValue, PropertyValue, References, DIMS_VERSION_KEY, PARAMS_VERSION_KEY,
};
use crate::reference::{self, DimensionSlotAllocator};
use crate::schema::{FeatureParameters, ParameterSchema, PropertyDescriptor, PropertyKind};

/// Flattens `parameters` into the store and reference arrays persisted by the
/// host.
///
/// Data properties are stored verbatim, selections and edit bodies as index
/// lists into their deduplicated arrays, and dimensions only through the
/// dimension array. The schema version, when declared, is written under both
/// reserved version keys.
pub fn serialize<H, P>(
    schema: &ParameterSchema,
    parameters: Option<&P>,
) -> Result<SerializedParameters<H>, ParamsError>
where
    H: HostTypes,
    P: FeatureParameters<H>,
{
    let parameters = parameters.ok_or_else(|| ParamsError::InvalidArgument {
        argument: "parameters".to_string(),
        reason: "parameters object is not set".to_string(),
    })?;

    let mut store = FlatParameterStore::new();
    let mut selection_groups = Vec::new();
    let mut body_groups = Vec::new();
    let mut dimensions = Vec::new();
    let mut slots = DimensionSlotAllocator::new();

    for property in schema.properties() {
        let name = property.name();
        match property.kind() {
            PropertyKind::Excluded => continue,
            PropertyKind::Data => {
                let value = read(parameters, name)?.into_data(name)?;
                store.insert(name, value);
            }
            PropertyKind::Selection => {
                let references = read(parameters, name)?.into_selection(name)?;
                selection_groups.push((name, elements(property, references)?));
            }
            PropertyKind::EditBody => {
                let references = read(parameters, name)?.into_body(name)?;
                body_groups.push((name, elements(property, references)?));
            }
            PropertyKind::Dimension(kind) => {
                let value = read(parameters, name)?.into_f64(name)?;
                let slot = slots.next_slot();
                #[cfg(feature = "tracing")]
                tracing::trace!(property = name, slot, value, "writing dimension slot");
                dimensions.push(DimensionSlot::new(kind, value));
                debug_assert_eq!(slot + 1, dimensions.len());
            }
        }
    }

    let (selection_indices, selections) = reference::assign(selection_groups);
    let (body_indices, bodies) = reference::assign(body_groups);

    for (name, indices) in selection_indices.into_iter().chain(body_indices) {
        store.insert(name, ParamValue::Text(indices.encode()));
    }

    if let Some(version) = schema.version() {
        store.set_version(PARAMS_VERSION_KEY, version);
        store.set_version(DIMS_VERSION_KEY, version);
    }

    Ok(SerializedParameters {
        store,
        selections,
        dimensions,
        bodies,
    })
}

fn read<H: HostTypes, P: FeatureParameters<H>>(
    parameters: &P,
    name: &str,
) -> Result<PropertyValue<H>, ParamsError> {
    parameters
        .read(name)
        .ok_or_else(|| ParamsError::PropertyAccess {
            property: name.to_string(),
            reason: "parameters object does not expose this property".to_string(),
        })
}

fn elements<T>(
    property: &PropertyDescriptor,
    references: References<T>,
) -> Result<Vec<Option<T>>, ParamsError> {
    let elements = references.into_elements();
    if !property.declared_type().is_list() && elements.len() > 1 {
        return Err(ParamsError::Multiplicity {
            property: property.name().to_string(),
            count: elements.len(),
        });
    }

    Ok(elements)
}
