/// Dimension slots, outdate states and the raw/serialized feature data tuples.
pub mod feature;
/// Primitive store values, the flat parameter store and typed property values.
pub mod value;
/// Dotted schema versions.
pub mod version;
