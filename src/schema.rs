use std::collections::BTreeSet;

use crate::error::ParamsError;
use crate::host::HostTypes;
use crate::model::feature::DimensionType;
use crate::model::value::{PropertyValue, DIMS_VERSION_KEY, PARAMS_VERSION_KEY};
use crate::model::version::SchemaVersion;

/// Declared Rust-side type of a parameters property.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeclaredType {
    Bool,
    Int,
    Float,
    Text,
    /// Enumeration persisted by variant name.
    Enum {
        name: &'static str,
        variants: &'static [&'static str],
    },
    /// Single selectable entity of the named entity type.
    Entity(&'static str),
    EntityList(&'static str),
    Body(&'static str),
    BodyList(&'static str),
    /// Any other type; only valid on excluded properties.
    Unsupported(&'static str),
}

impl DeclaredType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Int | Self::Float | Self::Text | Self::Enum { .. }
        )
    }

    pub fn is_selection(&self) -> bool {
        matches!(self, Self::Entity(_) | Self::EntityList(_))
    }

    pub fn is_body(&self) -> bool {
        matches!(self, Self::Body(_) | Self::BodyList(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::EntityList(_) | Self::BodyList(_))
    }

    /// Element type handed to the fault factory for reference properties.
    pub fn element_type(&self) -> Option<&'static str> {
        match self {
            Self::Entity(entity)
            | Self::EntityList(entity)
            | Self::Body(entity)
            | Self::BodyList(entity) => Some(entity),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Text => write!(f, "text"),
            Self::Enum { name, .. } => write!(f, "enum {name}"),
            Self::Entity(entity) => write!(f, "{entity}"),
            Self::EntityList(entity) => write!(f, "list of {entity}"),
            Self::Body(entity) => write!(f, "{entity}"),
            Self::BodyList(entity) => write!(f, "list of {entity}"),
            Self::Unsupported(name) => write!(f, "{name}"),
        }
    }
}

/// Metadata a parameters type declares for one property.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub declared_type: DeclaredType,
    pub dimension: Option<DimensionType>,
    pub edit_body: bool,
    pub excluded: bool,
}

impl PropertySpec {
    pub const fn new(name: &'static str, declared_type: DeclaredType) -> Self {
        Self {
            name,
            declared_type,
            dimension: None,
            edit_body: false,
            excluded: false,
        }
    }

    pub const fn dimension(self, kind: DimensionType) -> Self {
        Self {
            dimension: Some(kind),
            ..self
        }
    }

    pub const fn edit_body(self) -> Self {
        Self {
            edit_body: true,
            ..self
        }
    }

    pub const fn excluded(self) -> Self {
        Self {
            excluded: true,
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PropertyKind {
    Data,
    Selection,
    EditBody,
    Dimension(DimensionType),
    Excluded,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyDescriptor {
    name: &'static str,
    declared_type: DeclaredType,
    kind: PropertyKind,
}

impl PropertyDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared_type(&self) -> DeclaredType {
        self.declared_type
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }
}

/// A typed parameters object of a custom feature.
///
/// Implementors describe their properties once through [`Self::properties`]
/// and move values in and out by property name. Values handed to
/// [`Self::write`] replace the previous value, including any list container.
pub trait FeatureParameters<H: HostTypes>: Default + 'static {
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Current schema version; `None` marks an unversioned parameters type.
    fn version() -> Option<SchemaVersion> {
        None
    }

    /// Properties in declaration order.
    fn properties() -> Vec<PropertySpec>;

    fn read(&self, name: &str) -> Option<PropertyValue<H>>;

    fn write(&mut self, name: &str, value: PropertyValue<H>) -> Result<(), ParamsError>;
}

/// Ordered property descriptors of a parameters type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParameterSchema {
    type_name: &'static str,
    version: Option<SchemaVersion>,
    properties: Vec<PropertyDescriptor>,
}

impl ParameterSchema {
    pub fn describe<H: HostTypes, P: FeatureParameters<H>>() -> Result<Self, ParamsError> {
        Self::from_specs(P::type_name(), P::version(), P::properties())
    }

    pub fn from_specs(
        type_name: &'static str,
        version: Option<SchemaVersion>,
        specs: Vec<PropertySpec>,
    ) -> Result<Self, ParamsError> {
        let mut seen = BTreeSet::new();
        let mut properties = Vec::with_capacity(specs.len());

        for spec in specs {
            if spec.name == PARAMS_VERSION_KEY || spec.name == DIMS_VERSION_KEY {
                return Err(ParamsError::Schema {
                    property: spec.name.to_string(),
                    reason: "name is reserved for the stored schema version".to_string(),
                });
            }

            if !seen.insert(spec.name) {
                return Err(ParamsError::Schema {
                    property: spec.name.to_string(),
                    reason: format!("property is declared more than once in `{type_name}`"),
                });
            }

            properties.push(PropertyDescriptor {
                name: spec.name,
                declared_type: spec.declared_type,
                kind: classify(&spec)?,
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            type_name,
            properties = properties.len(),
            version = ?version,
            "described custom feature parameters"
        );

        Ok(Self {
            type_name,
            version,
            properties,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn version(&self) -> Option<&SchemaVersion> {
        self.version.as_ref()
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn dimension_count(&self) -> usize {
        self.properties
            .iter()
            .filter(|property| matches!(property.kind, PropertyKind::Dimension(_)))
            .count()
    }
}

// Excluded > Dimension > EditBody > Selection-by-type > Data
fn classify(spec: &PropertySpec) -> Result<PropertyKind, ParamsError> {
    let declared = spec.declared_type;
    let unsupported = |reason: String| ParamsError::Schema {
        property: spec.name.to_string(),
        reason,
    };

    if spec.excluded {
        return Ok(PropertyKind::Excluded);
    }

    if let Some(kind) = spec.dimension {
        if !declared.is_numeric() {
            return Err(unsupported(format!(
                "dimension parameters must be numeric, found {declared}"
            )));
        }
        return Ok(PropertyKind::Dimension(kind));
    }

    if spec.edit_body {
        if !declared.is_body() {
            return Err(unsupported(format!(
                "edit body parameters must hold bodies, found {declared}"
            )));
        }
        return Ok(PropertyKind::EditBody);
    }

    if declared.is_selection() {
        return Ok(PropertyKind::Selection);
    }

    if declared.is_body() {
        return Err(unsupported(format!(
            "{declared} must be marked as an edit body"
        )));
    }

    if declared.is_primitive() {
        return Ok(PropertyKind::Data);
    }

    Err(unsupported(format!(
        "{declared} is neither a primitive, an enumeration nor a selectable entity"
    )))
}

#[cfg(test)]
mod tests {
    use super::{DeclaredType, ParameterSchema, PropertyKind, PropertySpec};
    use crate::error::ParamsError;
    use crate::model::feature::DimensionType;
    use crate::model::value::{DIMS_VERSION_KEY, PARAMS_VERSION_KEY};
    use crate::test_support::{ExtrudeParams, SlotParams, TestHost};

    #[test]
    fn describe_keeps_declaration_order_and_kinds() {
        let schema = ParameterSchema::describe::<TestHost, SlotParams>()
            .expect("slot parameters should be describable");

        let kinds: Vec<_> = schema
            .properties()
            .iter()
            .map(|property| (property.name(), property.kind()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("Width", PropertyKind::Dimension(DimensionType::Linear)),
                ("Height", PropertyKind::Dimension(DimensionType::Linear)),
                ("Name", PropertyKind::Data),
                ("Target", PropertyKind::Selection),
            ]
        );
        assert_eq!(schema.dimension_count(), 2);
        assert!(schema.version().is_none());
    }

    #[test]
    fn describe_classifies_every_kind() {
        let schema = ParameterSchema::describe::<TestHost, ExtrudeParams>()
            .expect("extrude parameters should be describable");

        let kind_of = |name: &str| {
            schema
                .get(name)
                .map(|property| property.kind())
                .expect("property should be described")
        };
        assert_eq!(kind_of("Edges"), PropertyKind::Selection);
        assert_eq!(kind_of("Tools"), PropertyKind::EditBody);
        assert_eq!(kind_of("Mode"), PropertyKind::Data);
        assert_eq!(kind_of("Cache"), PropertyKind::Excluded);
        assert_eq!(kind_of("Depth"), PropertyKind::Dimension(DimensionType::Linear));
    }

    #[test]
    fn excluded_wins_over_every_other_tag() {
        let spec = PropertySpec::new("Preview", DeclaredType::Unsupported("Mesh"))
            .dimension(DimensionType::Angular)
            .edit_body()
            .excluded();

        let schema = ParameterSchema::from_specs("Preview", None, vec![spec])
            .expect("excluded property should never be rejected");
        assert_eq!(schema.properties()[0].kind(), PropertyKind::Excluded);
    }

    #[test]
    fn dimension_wins_over_edit_body() {
        let spec = PropertySpec::new("Offset", DeclaredType::Float)
            .edit_body()
            .dimension(DimensionType::Linear);

        let schema = ParameterSchema::from_specs("Offset", None, vec![spec])
            .expect("numeric dimension should be accepted");
        assert_eq!(
            schema.properties()[0].kind(),
            PropertyKind::Dimension(DimensionType::Linear)
        );
    }

    #[test]
    fn rejects_unsupported_types() {
        let specs = vec![PropertySpec::new("Preview", DeclaredType::Unsupported("Mesh"))];
        let result = ParameterSchema::from_specs("Preview", None, specs);
        match result {
            Err(ParamsError::Schema { property, .. }) => assert_eq!(property, "Preview"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_untagged_bodies_and_mistyped_tags() {
        let untagged = ParameterSchema::from_specs(
            "Bodies",
            None,
            vec![PropertySpec::new("Body", DeclaredType::Body("SolidBody"))],
        );
        assert!(matches!(untagged, Err(ParamsError::Schema { .. })));

        let mistyped = ParameterSchema::from_specs(
            "Dims",
            None,
            vec![PropertySpec::new("Label", DeclaredType::Text).dimension(DimensionType::Linear)],
        );
        assert!(matches!(mistyped, Err(ParamsError::Schema { .. })));

        let not_a_body = ParameterSchema::from_specs(
            "Bodies",
            None,
            vec![PropertySpec::new("Face", DeclaredType::Entity("Face")).edit_body()],
        );
        assert!(matches!(not_a_body, Err(ParamsError::Schema { .. })));
    }

    #[test]
    fn rejects_reserved_version_keys_as_names() {
        for reserved in [PARAMS_VERSION_KEY, DIMS_VERSION_KEY] {
            let specs = vec![
                PropertySpec::new("Name", DeclaredType::Text),
                PropertySpec::new(reserved, DeclaredType::Text),
            ];
            match ParameterSchema::from_specs("Reserved", None, specs) {
                Err(ParamsError::Schema { property, .. }) => assert_eq!(property, reserved),
                other => panic!("`{reserved}` should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_duplicate_names() {
        let specs = vec![
            PropertySpec::new("Name", DeclaredType::Text),
            PropertySpec::new("Name", DeclaredType::Int),
        ];
        let result = ParameterSchema::from_specs("Duplicate", None, specs);
        assert!(matches!(result, Err(ParamsError::Schema { .. })));
    }
}
