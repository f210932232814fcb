//! Per-call decoding options.

use std::str::FromStr;

use crate::naming::NamingPolicy;

/// What to do with a property that resolves to no field or extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPropertyPolicy {
    /// Skip the property and its whole value subtree.
    Skip,
    /// Fail the decode call with `DecodeError::UnknownProperty`.
    #[default]
    Fail,
}

impl FromStr for UnknownPropertyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "fail" => Ok(Self::Fail),
            other => Err(format!(
                "unknown property policy '{other}' (expected skip | fail)"
            )),
        }
    }
}

/// Options consulted by a decoder during one decode call.
///
/// The defaults are strict: unknown properties fail, nulls for primitives
/// leave the field unset, numbers are accepted for enums, and property
/// names are expected in lower camel case.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    pub accept_single_value_as_array: bool,
    pub fail_on_null_for_primitives: bool,
    pub accept_empty_string_as_null_for_enum: bool,
    pub fail_on_numbers_for_enums: bool,
    pub ignore_unknown_enum_values: bool,
    pub unknown_property: UnknownPropertyPolicy,
    pub naming: NamingPolicy,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat a bare value for a repeated field as a one-element array.
    pub fn with_accept_single_value_as_array(mut self, enabled: bool) -> Self {
        self.accept_single_value_as_array = enabled;
        self
    }

    /// Fail on `null` for numeric and boolean fields.
    pub fn with_fail_on_null_for_primitives(mut self, enabled: bool) -> Self {
        self.fail_on_null_for_primitives = enabled;
        self
    }

    /// Read an empty string for an enum field as `null`.
    pub fn with_accept_empty_string_as_null_for_enum(mut self, enabled: bool) -> Self {
        self.accept_empty_string_as_null_for_enum = enabled;
        self
    }

    /// Reject numeric tokens for enum fields.
    pub fn with_fail_on_numbers_for_enums(mut self, enabled: bool) -> Self {
        self.fail_on_numbers_for_enums = enabled;
        self
    }

    /// Read unknown enum names and numbers as `null`.
    pub fn with_ignore_unknown_enum_values(mut self, enabled: bool) -> Self {
        self.ignore_unknown_enum_values = enabled;
        self
    }

    pub fn with_unknown_property(mut self, policy: UnknownPropertyPolicy) -> Self {
        self.unknown_property = policy;
        self
    }

    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }
}
