use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;
use crate::host::HostTypes;
use crate::model::version::SchemaVersion;
use crate::schema::DeclaredType;

/// Reserved store key holding the parameters schema version.
pub const PARAMS_VERSION_KEY: &str = "__paramsVersion";
/// Reserved store key holding the dimensions schema version.
pub const DIMS_VERSION_KEY: &str = "__dimsVersion";

/// Primitive value persisted by the host for one flat store entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Converts a stored primitive into the representation of `declared`.
    ///
    /// Enumerations are matched by variant name (or by position when the host
    /// stored a number). Reference and unsupported types never reach the data
    /// path of an introspected schema and are reported as conversion errors.
    pub fn convert_to(&self, declared: &DeclaredType, property: &str) -> Result<Self, ParamsError> {
        let converted = match (declared, self) {
            (DeclaredType::Bool, Self::Bool(value)) => Some(Self::Bool(*value)),
            (DeclaredType::Bool, Self::Int(value)) => Some(Self::Bool(*value != 0)),
            (DeclaredType::Bool, Self::Float(value)) => Some(Self::Bool(*value != 0.0)),
            (DeclaredType::Bool, Self::Text(text)) => parse_bool(text).map(Self::Bool),

            (DeclaredType::Int, Self::Int(value)) => Some(Self::Int(*value)),
            (DeclaredType::Int, Self::Bool(value)) => Some(Self::Int(i64::from(*value))),
            (DeclaredType::Int, Self::Float(value)) => float_to_int(*value).map(Self::Int),
            (DeclaredType::Int, Self::Text(text)) => text.trim().parse().ok().map(Self::Int),

            (DeclaredType::Float, Self::Float(value)) => Some(Self::Float(*value)),
            (DeclaredType::Float, Self::Int(value)) => Some(Self::Float(*value as f64)),
            (DeclaredType::Float, Self::Bool(value)) => {
                Some(Self::Float(if *value { 1.0 } else { 0.0 }))
            }
            (DeclaredType::Float, Self::Text(text)) => text.trim().parse().ok().map(Self::Float),

            (DeclaredType::Text, value) => Some(Self::Text(value.to_string())),

            (DeclaredType::Enum { variants, .. }, Self::Text(text)) => variants
                .iter()
                .find(|variant| **variant == text.as_str())
                .map(|variant| Self::Text((*variant).to_string())),
            (DeclaredType::Enum { variants, .. }, Self::Int(position)) => usize::try_from(*position)
                .ok()
                .and_then(|position| variants.get(position))
                .map(|variant| Self::Text((*variant).to_string())),

            _ => None,
        };

        converted.ok_or_else(|| ParamsError::DataConversion {
            property: property.to_string(),
            value: self.to_string(),
            expected: declared.to_string(),
        })
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn float_to_int(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }

    let rounded = value.round();
    if rounded < i64::MIN as f64 || rounded > i64::MAX as f64 {
        return None;
    }

    Some(rounded as i64)
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Host-persisted key/value pairs of one custom feature.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatParameterStore {
    entries: BTreeMap<String, ParamValue>,
}

impl FlatParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Removes a reserved version key, returning the zero version when absent.
    pub fn take_version(&mut self, key: &str) -> Result<SchemaVersion, ParamsError> {
        match self.entries.remove(key) {
            Some(value) => value.to_string().parse(),
            None => Ok(SchemaVersion::zero()),
        }
    }

    pub fn set_version(&mut self, key: &str, version: &SchemaVersion) {
        self.entries
            .insert(key.to_string(), ParamValue::Text(version.to_string()));
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for FlatParameterStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Value of a selection or edit-body property.
///
/// `List(None)` means "no container", which is distinct from an empty list on
/// the typed side but encodes to the same `-1` index list.
#[derive(Clone, Debug, PartialEq)]
pub enum References<T> {
    Single(Option<T>),
    List(Option<Vec<Option<T>>>),
}

impl<T> References<T> {
    /// Flattens the value into the element sequence that gets indexed.
    pub fn into_elements(self) -> Vec<Option<T>> {
        match self {
            Self::Single(None) | Self::List(None) => Vec::new(),
            Self::Single(Some(object)) => vec![Some(object)],
            Self::List(Some(elements)) => elements,
        }
    }

    pub fn into_single(self) -> Option<T> {
        match self {
            Self::Single(object) => object,
            Self::List(elements) => elements
                .and_then(|elements| elements.into_iter().next())
                .flatten(),
        }
    }

    pub fn into_list(self) -> Option<Vec<Option<T>>> {
        match self {
            Self::Single(object) => object.map(|object| vec![Some(object)]),
            Self::List(elements) => elements,
        }
    }
}

/// Typed value exchanged with a parameters object through
/// [`crate::schema::FeatureParameters`].
pub enum PropertyValue<H: HostTypes> {
    Data(ParamValue),
    Dimension(f64),
    Selection(References<H::Selection>),
    Body(References<H::Body>),
}

impl<H: HostTypes> PropertyValue<H> {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Data(_) => "data",
            Self::Dimension(_) => "dimension",
            Self::Selection(_) => "selection",
            Self::Body(_) => "body",
        }
    }

    fn mismatch(&self, property: &str, expected: &str) -> ParamsError {
        ParamsError::PropertyAccess {
            property: property.to_string(),
            reason: format!("expected a {expected} value, got a {} value", self.kind_name()),
        }
    }

    pub fn into_data(self, property: &str) -> Result<ParamValue, ParamsError> {
        match self {
            Self::Data(value) => Ok(value),
            other => Err(other.mismatch(property, "data")),
        }
    }

    pub fn into_dimension(self, property: &str) -> Result<f64, ParamsError> {
        match self {
            Self::Dimension(value) => Ok(value),
            other => Err(other.mismatch(property, "dimension")),
        }
    }

    pub fn into_selection(self, property: &str) -> Result<References<H::Selection>, ParamsError> {
        match self {
            Self::Selection(references) => Ok(references),
            other => Err(other.mismatch(property, "selection")),
        }
    }

    pub fn into_body(self, property: &str) -> Result<References<H::Body>, ParamsError> {
        match self {
            Self::Body(references) => Ok(references),
            other => Err(other.mismatch(property, "body")),
        }
    }

    pub fn into_text(self, property: &str) -> Result<String, ParamsError> {
        match self.into_data(property)? {
            ParamValue::Text(text) => Ok(text),
            other => Ok(other.to_string()),
        }
    }

    pub fn into_f64(self, property: &str) -> Result<f64, ParamsError> {
        match self {
            Self::Dimension(value) | Self::Data(ParamValue::Float(value)) => Ok(value),
            Self::Data(ParamValue::Int(value)) => Ok(value as f64),
            other => Err(other.mismatch(property, "numeric")),
        }
    }

    pub fn into_i64(self, property: &str) -> Result<i64, ParamsError> {
        match self.into_data(property)? {
            ParamValue::Int(value) => Ok(value),
            other => Err(ParamsError::PropertyAccess {
                property: property.to_string(),
                reason: format!("expected an integer, got `{other}`"),
            }),
        }
    }

    pub fn into_bool(self, property: &str) -> Result<bool, ParamsError> {
        match self.into_data(property)? {
            ParamValue::Bool(value) => Ok(value),
            other => Err(ParamsError::PropertyAccess {
                property: property.to_string(),
                reason: format!("expected a boolean, got `{other}`"),
            }),
        }
    }
}

impl<H: HostTypes> Clone for PropertyValue<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Data(value) => Self::Data(value.clone()),
            Self::Dimension(value) => Self::Dimension(*value),
            Self::Selection(references) => Self::Selection(references.clone()),
            Self::Body(references) => Self::Body(references.clone()),
        }
    }
}

impl<H: HostTypes> PartialEq for PropertyValue<H> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Data(left), Self::Data(right)) => left == right,
            (Self::Dimension(left), Self::Dimension(right)) => left == right,
            (Self::Selection(left), Self::Selection(right)) => left == right,
            (Self::Body(left), Self::Body(right)) => left == right,
            _ => false,
        }
    }
}

impl<H: HostTypes> std::fmt::Debug for PropertyValue<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Data(value) => f.debug_tuple("Data").field(value).finish(),
            Self::Dimension(value) => f.debug_tuple("Dimension").field(value).finish(),
            Self::Selection(references) => f.debug_tuple("Selection").field(references).finish(),
            Self::Body(references) => f.debug_tuple("Body").field(references).finish(),
        }
    }
}
