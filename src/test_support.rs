//! Fixture host and parameters types shared by the unit tests.

use crate::error::ParamsError;
use crate::host::{FaultObjectFactory, FeatureAccess, HostTypes, OutdateClassifier};
use crate::migration::ConverterRegistry;
use crate::model::feature::{
    DimensionSlot, DimensionType, OutdateState, RawParameters, SerializedParameters,
};
use crate::model::value::{ParamValue, PropertyValue, References};
use crate::model::version::SchemaVersion;
use crate::parser::ParametersParser;
use crate::schema::{DeclaredType, FeatureParameters, PropertySpec};

#[derive(Debug)]
pub(crate) struct TestHost;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Entity {
    Face(u32),
    Edge(u32),
    Fault(String),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Solid {
    Body(u32),
    Fault,
}

#[derive(Debug)]
pub(crate) struct TestFeature {
    pub declared_dimensions: usize,
}

impl TestFeature {
    pub(crate) fn with_dimensions(declared_dimensions: usize) -> Self {
        Self {
            declared_dimensions,
        }
    }
}

impl HostTypes for TestHost {
    type Selection = Entity;
    type Body = Solid;
    type Feature = TestFeature;
}

pub(crate) struct TestFaults;

impl FaultObjectFactory<TestHost> for TestFaults {
    fn fault_selection(&self, entity_type: &str) -> Entity {
        Entity::Fault(entity_type.to_string())
    }

    fn fault_body(&self, _entity_type: &str) -> Solid {
        Solid::Fault
    }
}

/// Outdated whenever the live dimension count differs from the declared one.
pub(crate) struct CountingClassifier;

impl OutdateClassifier<TestHost> for CountingClassifier {
    fn classify(&self, feature: &TestFeature, dimensions: &[DimensionSlot]) -> OutdateState {
        if feature.declared_dimensions == dimensions.len() {
            OutdateState::UpToDate
        } else {
            OutdateState::DimensionsOutdated
        }
    }
}

#[derive(Default)]
pub(crate) struct TestDocument {
    pub live_dimensions: Option<Vec<DimensionSlot>>,
    pub written: Option<SerializedParameters<TestHost>>,
}

impl FeatureAccess<TestHost> for TestDocument {
    fn read_parameters(&self, _feature: &TestFeature) -> Result<RawParameters<TestHost>, ParamsError> {
        self.written
            .as_ref()
            .map(SerializedParameters::to_raw)
            .ok_or_else(|| ParamsError::InvalidArgument {
                argument: "feature".to_string(),
                reason: "no parameters were written".to_string(),
            })
    }

    fn dimensions(&self, _feature: &TestFeature) -> Option<Vec<DimensionSlot>> {
        self.live_dimensions.clone()
    }

    fn write_parameters(
        &mut self,
        _feature: &TestFeature,
        parameters: &SerializedParameters<TestHost>,
    ) -> Result<(), ParamsError> {
        self.written = Some(parameters.clone());
        Ok(())
    }
}

pub(crate) fn test_parser() -> ParametersParser<TestHost> {
    ParametersParser::builder()
        .fault_factory(TestFaults)
        .outdate_classifier(CountingClassifier)
        .converters::<VersionedParams>(VersionedParams::converters())
        .build()
        .expect("test parser should build")
}

fn unknown(name: &str) -> ParamsError {
    ParamsError::PropertyAccess {
        property: name.to_string(),
        reason: "unknown property".to_string(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SlotParams {
    pub width: f64,
    pub height: f64,
    pub name: String,
    pub target: Option<Entity>,
}

impl Default for SlotParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 5.0,
            name: "default".to_string(),
            target: None,
        }
    }
}

impl FeatureParameters<TestHost> for SlotParams {
    fn properties() -> Vec<PropertySpec> {
        vec![
            PropertySpec::new("Width", DeclaredType::Float).dimension(DimensionType::Linear),
            PropertySpec::new("Height", DeclaredType::Float).dimension(DimensionType::Linear),
            PropertySpec::new("Name", DeclaredType::Text),
            PropertySpec::new("Target", DeclaredType::Entity("Face")),
        ]
    }

    fn read(&self, name: &str) -> Option<PropertyValue<TestHost>> {
        match name {
            "Width" => Some(PropertyValue::Dimension(self.width)),
            "Height" => Some(PropertyValue::Dimension(self.height)),
            "Name" => Some(PropertyValue::Data(ParamValue::from(self.name.as_str()))),
            "Target" => Some(PropertyValue::Selection(References::Single(
                self.target.clone(),
            ))),
            _ => None,
        }
    }

    fn write(&mut self, name: &str, value: PropertyValue<TestHost>) -> Result<(), ParamsError> {
        match name {
            "Width" => self.width = value.into_f64(name)?,
            "Height" => self.height = value.into_f64(name)?,
            "Name" => self.name = value.into_text(name)?,
            "Target" => self.target = value.into_selection(name)?.into_single(),
            _ => return Err(unknown(name)),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct DedupParams {
    pub a: Option<Entity>,
    pub b: Option<Entity>,
}

impl FeatureParameters<TestHost> for DedupParams {
    fn properties() -> Vec<PropertySpec> {
        vec![
            PropertySpec::new("A", DeclaredType::Entity("Face")),
            PropertySpec::new("B", DeclaredType::Entity("Face")),
        ]
    }

    fn read(&self, name: &str) -> Option<PropertyValue<TestHost>> {
        let value = match name {
            "A" => self.a.clone(),
            "B" => self.b.clone(),
            _ => return None,
        };
        Some(PropertyValue::Selection(References::Single(value)))
    }

    fn write(&mut self, name: &str, value: PropertyValue<TestHost>) -> Result<(), ParamsError> {
        let value = value.into_selection(name)?.into_single();
        match name {
            "A" => self.a = value,
            "B" => self.b = value,
            _ => return Err(unknown(name)),
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum Mode {
    #[default]
    Cut,
    Join,
}

const MODES: &[&str] = &["Cut", "Join"];

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Cut => "Cut",
            Self::Join => "Join",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Cut" => Some(Self::Cut),
            "Join" => Some(Self::Join),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExtrudeParams {
    pub edges: Option<Vec<Option<Entity>>>,
    pub profile: Option<Entity>,
    pub tools: Option<Vec<Option<Solid>>>,
    pub depth: f64,
    pub draft: f64,
    pub mode: Mode,
    pub count: i64,
    pub enabled: bool,
    pub cache: Vec<u8>,
}

impl FeatureParameters<TestHost> for ExtrudeParams {
    fn properties() -> Vec<PropertySpec> {
        vec![
            PropertySpec::new("Edges", DeclaredType::EntityList("Edge")),
            PropertySpec::new("Profile", DeclaredType::Entity("Edge")),
            PropertySpec::new("Tools", DeclaredType::BodyList("SolidBody")).edit_body(),
            PropertySpec::new("Depth", DeclaredType::Float).dimension(DimensionType::Linear),
            PropertySpec::new("Draft", DeclaredType::Float).dimension(DimensionType::Angular),
            PropertySpec::new(
                "Mode",
                DeclaredType::Enum {
                    name: "Mode",
                    variants: MODES,
                },
            ),
            PropertySpec::new("Count", DeclaredType::Int),
            PropertySpec::new("Enabled", DeclaredType::Bool),
            PropertySpec::new("Cache", DeclaredType::Unsupported("Vec<u8>")).excluded(),
        ]
    }

    fn read(&self, name: &str) -> Option<PropertyValue<TestHost>> {
        match name {
            "Edges" => Some(PropertyValue::Selection(References::List(self.edges.clone()))),
            "Profile" => Some(PropertyValue::Selection(References::Single(
                self.profile.clone(),
            ))),
            "Tools" => Some(PropertyValue::Body(References::List(self.tools.clone()))),
            "Depth" => Some(PropertyValue::Dimension(self.depth)),
            "Draft" => Some(PropertyValue::Dimension(self.draft)),
            "Mode" => Some(PropertyValue::Data(ParamValue::from(self.mode.as_str()))),
            "Count" => Some(PropertyValue::Data(ParamValue::Int(self.count))),
            "Enabled" => Some(PropertyValue::Data(ParamValue::Bool(self.enabled))),
            _ => None,
        }
    }

    fn write(&mut self, name: &str, value: PropertyValue<TestHost>) -> Result<(), ParamsError> {
        match name {
            "Edges" => self.edges = value.into_selection(name)?.into_list(),
            "Profile" => self.profile = value.into_selection(name)?.into_single(),
            "Tools" => self.tools = value.into_body(name)?.into_list(),
            "Depth" => self.depth = value.into_f64(name)?,
            "Draft" => self.draft = value.into_f64(name)?,
            "Mode" => {
                let text = value.into_text(name)?;
                self.mode = Mode::from_name(&text).ok_or_else(|| unknown(name))?;
            }
            "Count" => self.count = value.into_i64(name)?,
            "Enabled" => self.enabled = value.into_bool(name)?,
            _ => return Err(unknown(name)),
        }
        Ok(())
    }
}

/// Reports a list for a property declared as a single selection.
#[derive(Debug, Default)]
pub(crate) struct MisreportingParams;

impl FeatureParameters<TestHost> for MisreportingParams {
    fn properties() -> Vec<PropertySpec> {
        vec![PropertySpec::new("Target", DeclaredType::Entity("Face"))]
    }

    fn read(&self, _name: &str) -> Option<PropertyValue<TestHost>> {
        Some(PropertyValue::Selection(References::List(Some(vec![
            Some(Entity::Face(1)),
            Some(Entity::Face(2)),
        ]))))
    }

    fn write(&mut self, _name: &str, _value: PropertyValue<TestHost>) -> Result<(), ParamsError> {
        Ok(())
    }
}

/// Version 1.0 renamed `Title` to `Label`; 2.0 introduced `Revision`.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct VersionedParams {
    pub label: String,
    pub revision: i64,
}

impl VersionedParams {
    pub(crate) fn converters() -> ConverterRegistry<TestHost> {
        ConverterRegistry::<TestHost>::new()
            .register(SchemaVersion::new(&[1, 0]), |raw| {
                if let Some(title) = raw.store.remove("Title") {
                    raw.store.insert("Label", title);
                }
                Ok(())
            })
            .register(SchemaVersion::new(&[2, 0]), |raw| {
                if !raw.store.contains_key("Revision") {
                    raw.store.insert("Revision", ParamValue::Int(2));
                }
                Ok(())
            })
    }
}

impl FeatureParameters<TestHost> for VersionedParams {
    fn version() -> Option<SchemaVersion> {
        Some(SchemaVersion::new(&[2, 0]))
    }

    fn properties() -> Vec<PropertySpec> {
        vec![
            PropertySpec::new("Label", DeclaredType::Text),
            PropertySpec::new("Revision", DeclaredType::Int),
        ]
    }

    fn read(&self, name: &str) -> Option<PropertyValue<TestHost>> {
        match name {
            "Label" => Some(PropertyValue::Data(ParamValue::from(self.label.as_str()))),
            "Revision" => Some(PropertyValue::Data(ParamValue::Int(self.revision))),
            _ => None,
        }
    }

    fn write(&mut self, name: &str, value: PropertyValue<TestHost>) -> Result<(), ParamsError> {
        match name {
            "Label" => self.label = value.into_text(name)?,
            "Revision" => self.revision = value.into_i64(name)?,
            _ => return Err(unknown(name)),
        }
        Ok(())
    }
}
