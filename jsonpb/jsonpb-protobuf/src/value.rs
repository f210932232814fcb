use prost_reflect::Value;

/// Result of coercing one property value.
///
/// Arrays are only produced for repeated fields; every element is already
/// typed for the field.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Single(Value),
    Sequence(Vec<Value>),
}
