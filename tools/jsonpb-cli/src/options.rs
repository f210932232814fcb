use std::str::FromStr;

use clap::Args;
use jsonpb::core::{DecodeOptions, NamingPolicy, UnknownPropertyPolicy};

#[derive(Args)]
pub struct OptionArgs {
    /// Accept a bare value for a repeated field
    #[arg(long)]
    accept_single_value_as_array: bool,

    /// Fail on null for numeric and boolean fields
    #[arg(long)]
    fail_on_null_for_primitives: bool,

    /// Read a blank string for an enum field as null
    #[arg(long)]
    accept_empty_string_as_null_for_enum: bool,

    /// Reject numbers for enum fields
    #[arg(long)]
    fail_on_numbers_for_enums: bool,

    /// Read unknown enum names and numbers as null
    #[arg(long)]
    ignore_unknown_enum_values: bool,

    /// Unknown properties: skip | fail
    #[arg(long, default_value = "fail", value_parser = UnknownPropertyPolicy::from_str)]
    unknown_property: UnknownPropertyPolicy,

    #[command(flatten)]
    naming: NamingArgs,
}

#[derive(Args)]
pub struct NamingArgs {
    /// Property naming: preserve | lower-camel-case | snake-case | upper-camel-case |
    /// kebab-case | lower-case | json-name
    #[arg(long, default_value = "lower-camel-case", value_parser = NamingPolicy::from_str)]
    naming: NamingPolicy,
}

impl OptionArgs {
    pub fn to_options(&self) -> DecodeOptions {
        DecodeOptions::new()
            .with_accept_single_value_as_array(self.accept_single_value_as_array)
            .with_fail_on_null_for_primitives(self.fail_on_null_for_primitives)
            .with_accept_empty_string_as_null_for_enum(self.accept_empty_string_as_null_for_enum)
            .with_fail_on_numbers_for_enums(self.fail_on_numbers_for_enums)
            .with_ignore_unknown_enum_values(self.ignore_unknown_enum_values)
            .with_unknown_property(self.unknown_property)
            .with_naming(self.naming.policy())
    }
}

impl NamingArgs {
    pub fn policy(&self) -> NamingPolicy {
        self.naming.clone()
    }
}
