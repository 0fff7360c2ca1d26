use thiserror::Error;

use crate::model::version::SchemaVersion;

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("`{property}` is not supported as a custom feature parameter: {reason}")]
    Schema { property: String, reason: String },

    #[error("index {index} of `{property}` is out of range (array size: {bound})")]
    Index {
        property: String,
        index: usize,
        bound: usize,
    },

    #[error("`{property}` holds a single reference but {count} indices were supplied")]
    Multiplicity { property: String, count: usize },

    #[error(
        "parameters of `{type_name}` were saved with version {stored}, newer than supported version {current}"
    )]
    ForwardIncompatible {
        type_name: String,
        stored: SchemaVersion,
        current: SchemaVersion,
    },

    #[error("no converter path from version {stored} to {current} for `{type_name}`: {reason}")]
    MissingMigration {
        type_name: String,
        stored: SchemaVersion,
        current: SchemaVersion,
        reason: String,
    },

    #[error("dimensions mismatch: feature has {actual} driving dimensions, parameters expect {expected}")]
    Mismatch { expected: usize, actual: usize },

    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument { argument: String, reason: String },

    #[error("invalid version string `{value}`")]
    InvalidVersion { value: String },

    #[error("invalid index list `{value}` for `{property}`")]
    InvalidIndexList { property: String, value: String },

    #[error("reference indices are not set for `{property}`")]
    MissingIndices { property: String },

    #[error("cannot convert stored value `{value}` of `{property}` to {expected}")]
    DataConversion {
        property: String,
        value: String,
        expected: String,
    },

    #[error("property `{property}` cannot be accessed: {reason}")]
    PropertyAccess { property: String, reason: String },

    #[error("schema cache lock poisoned")]
    InternalPoisoned,
}
