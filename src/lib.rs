//! # custom-feature-params
//!
//! **Typed parameters for CAD custom features, persisted as flat host data.**
//! Converts a strongly-typed parameters object to and from the representation a
//! CAD host stores on a custom feature: primitive key/value pairs plus three
//! positional reference arrays (selections, driving dimensions, edit bodies).
//!
//! - References are deduplicated by equality and stored as index lists.
//! - Dimensions occupy one slot each, in declaration order.
//! - References the host can no longer resolve load as fault objects.
//! - Saved data is upgraded through registered version converters; data from
//!   a newer schema is refused.
//!
//! ## Quickstart
//!
//! ```
//! use custom_feature_params::{
//!     DeclaredType, DimensionSlot, DimensionType, FaultObjectFactory, FeatureParameters,
//!     HostTypes, OutdateClassifier, OutdateState, ParamValue, ParametersParser, ParamsError,
//!     PropertySpec, PropertyValue, References,
//! };
//!
//! struct Host;
//!
//! impl HostTypes for Host {
//!     type Selection = String;
//!     type Body = String;
//!     type Feature = ();
//! }
//!
//! struct Faults;
//!
//! impl FaultObjectFactory<Host> for Faults {
//!     fn fault_selection(&self, entity_type: &str) -> String {
//!         format!("<missing {entity_type}>")
//!     }
//!
//!     fn fault_body(&self, entity_type: &str) -> String {
//!         format!("<missing {entity_type}>")
//!     }
//! }
//!
//! struct AlwaysUpToDate;
//!
//! impl OutdateClassifier<Host> for AlwaysUpToDate {
//!     fn classify(&self, _feature: &(), _dimensions: &[DimensionSlot]) -> OutdateState {
//!         OutdateState::UpToDate
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Fillet {
//!     radius: f64,
//!     edge: Option<String>,
//! }
//!
//! impl FeatureParameters<Host> for Fillet {
//!     fn properties() -> Vec<PropertySpec> {
//!         vec![
//!             PropertySpec::new("Radius", DeclaredType::Float).dimension(DimensionType::Radial),
//!             PropertySpec::new("Edge", DeclaredType::Entity("Edge")),
//!         ]
//!     }
//!
//!     fn read(&self, name: &str) -> Option<PropertyValue<Host>> {
//!         match name {
//!             "Radius" => Some(PropertyValue::Dimension(self.radius)),
//!             "Edge" => Some(PropertyValue::Selection(References::Single(self.edge.clone()))),
//!             _ => None,
//!         }
//!     }
//!
//!     fn write(&mut self, name: &str, value: PropertyValue<Host>) -> Result<(), ParamsError> {
//!         match name {
//!             "Radius" => self.radius = value.into_f64(name)?,
//!             "Edge" => self.edge = value.into_selection(name)?.into_single(),
//!             _ => {}
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), ParamsError> {
//! let parser = ParametersParser::<Host>::builder()
//!     .fault_factory(Faults)
//!     .outdate_classifier(AlwaysUpToDate)
//!     .build()?;
//!
//! let fillet = Fillet {
//!     radius: 2.5,
//!     edge: Some("edge-1".to_string()),
//! };
//! let serialized = parser.parse(&fillet)?;
//! assert_eq!(serialized.store.get("Edge"), Some(&ParamValue::from("0")));
//!
//! let restored = parser.deserialize::<Fillet>(&serialized.to_raw(), &())?;
//! assert_eq!(restored.parameters.radius, 2.5);
//! assert_eq!(restored.parameters.edge.as_deref(), Some("edge-1"));
//! # Ok(())
//! # }
//! ```
//!
//! Architecture layers:
//! - schema introspection
//! - reference indexing
//! - version migration
//! - serializer / deserializer
//! - parser facade

#![warn(missing_docs)]

/// Rebuilding typed parameters from feature data.
pub mod deserialize;
/// Error types returned by this crate.
pub mod error;
/// Collaborator traits implemented by a host CAD binding.
pub mod host;
/// Versioned converter registries and the migration state machine.
pub mod migration;
/// Stable data models shared by the engine and host bindings.
pub mod model;
/// High-level parser wiring collaborators, converters and cached schemas.
pub mod parser;
/// Index lists, deduplicating reference arenas and dimension slots.
pub mod reference;
/// Property metadata and schema introspection.
pub mod schema;
/// Flattening typed parameters into feature data.
pub mod serialize;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::deserialize::{DeserializeContext, DeserializedParameters};
pub use crate::error::ParamsError;
pub use crate::host::{FaultObjectFactory, FeatureAccess, HostTypes, OutdateClassifier};
pub use crate::migration::{ConverterRegistry, VersionMigrator};
pub use crate::model::feature::{
    DimensionSlot, DimensionType, OutdateState, RawParameters, SerializedParameters,
};
pub use crate::model::value::{
    FlatParameterStore, ParamValue, PropertyValue, References, DIMS_VERSION_KEY,
    PARAMS_VERSION_KEY,
};
pub use crate::model::version::SchemaVersion;
pub use crate::parser::{ParametersParser, ParserBuilder};
pub use crate::reference::{IndexList, ABSENT_INDEX};
pub use crate::schema::{
    DeclaredType, FeatureParameters, ParameterSchema, PropertyDescriptor, PropertyKind,
    PropertySpec,
};
