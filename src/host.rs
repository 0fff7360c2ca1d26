use crate::error::ParamsError;
use crate::model::feature::{DimensionSlot, OutdateState, RawParameters, SerializedParameters};

/// Object types of a host CAD binding.
///
/// Selections and bodies are compared with `PartialEq` when reference arrays
/// are deduplicated, so equality must follow the host's notion of "same
/// entity" rather than structural equality of cached data.
pub trait HostTypes: 'static {
    type Selection: Clone + PartialEq + std::fmt::Debug;
    type Body: Clone + PartialEq + std::fmt::Debug;
    type Feature: ?Sized;
}

/// Manufactures stand-ins for references that no longer resolve.
pub trait FaultObjectFactory<H: HostTypes> {
    fn fault_selection(&self, entity_type: &str) -> H::Selection;

    fn fault_body(&self, entity_type: &str) -> H::Body;
}

/// Compares a feature's declared dimensions against its live driving dimensions.
pub trait OutdateClassifier<H: HostTypes> {
    fn classify(&self, feature: &H::Feature, dimensions: &[DimensionSlot]) -> OutdateState;
}

/// Reads and writes the persisted parameters of a feature.
pub trait FeatureAccess<H: HostTypes> {
    fn read_parameters(&self, feature: &H::Feature) -> Result<RawParameters<H>, ParamsError>;

    /// Live driving dimensions, or `None` when the feature has none attached.
    fn dimensions(&self, feature: &H::Feature) -> Option<Vec<DimensionSlot>>;

    fn write_parameters(
        &mut self,
        feature: &H::Feature,
        parameters: &SerializedParameters<H>,
    ) -> Result<(), ParamsError>;
}
