//! Translation from declared field names to expected property names.

use std::{fmt, str::FromStr, sync::Arc};

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

type TranslateFn = dyn Fn(&str) -> String + Send + Sync;

/// Policy mapping a declared (snake_case) field name to the property name
/// expected in the document.
#[derive(Clone, Default)]
pub enum NamingPolicy {
    /// Use the declared name unchanged.
    Preserve,
    /// `foo_bar` → `fooBar`.
    #[default]
    LowerCamelCase,
    /// `fooBar` / `foo_bar` → `foo_bar`.
    SnakeCase,
    /// `foo_bar` → `FooBar`.
    UpperCamelCase,
    /// `foo_bar` → `foo-bar`.
    KebabCase,
    /// `foo_bar` → `foobar`.
    LowerCase,
    /// The `json_name` recorded in the schema, falling back to lower camel case.
    JsonName,
    /// Caller-supplied translation.
    Custom(Arc<TranslateFn>),
}

impl NamingPolicy {
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Translate `declared`; `json_name` is the schema-recorded JSON name, if any.
    pub fn translate(&self, declared: &str, json_name: Option<&str>) -> String {
        match self {
            Self::Preserve => declared.to_string(),
            Self::LowerCamelCase => declared.to_lower_camel_case(),
            Self::SnakeCase => declared.to_snake_case(),
            Self::UpperCamelCase => declared.to_upper_camel_case(),
            Self::KebabCase => declared.to_kebab_case(),
            Self::LowerCase => declared.replace('_', "").to_lowercase(),
            Self::JsonName => json_name
                .map(str::to_string)
                .unwrap_or_else(|| declared.to_lower_camel_case()),
            Self::Custom(f) => f(declared),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Preserve => "preserve",
            Self::LowerCamelCase => "lower-camel-case",
            Self::SnakeCase => "snake-case",
            Self::UpperCamelCase => "upper-camel-case",
            Self::KebabCase => "kebab-case",
            Self::LowerCase => "lower-case",
            Self::JsonName => "json-name",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for NamingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preserve" => Ok(Self::Preserve),
            "lower-camel-case" | "camel" => Ok(Self::LowerCamelCase),
            "snake-case" | "snake" => Ok(Self::SnakeCase),
            "upper-camel-case" | "pascal" => Ok(Self::UpperCamelCase),
            "kebab-case" | "kebab" => Ok(Self::KebabCase),
            "lower-case" => Ok(Self::LowerCase),
            "json-name" => Ok(Self::JsonName),
            other => Err(format!(
                "unknown naming policy '{other}' (expected preserve | lower-camel-case | \
                 snake-case | upper-camel-case | kebab-case | lower-case | json-name)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_policies() {
        let name = "display_name_2";
        assert_eq!(NamingPolicy::Preserve.translate(name, None), "display_name_2");
        assert_eq!(NamingPolicy::LowerCamelCase.translate(name, None), "displayName2");
        assert_eq!(NamingPolicy::UpperCamelCase.translate(name, None), "DisplayName2");
        assert_eq!(NamingPolicy::KebabCase.translate(name, None), "display-name-2");
        assert_eq!(NamingPolicy::LowerCase.translate(name, None), "displayname2");
        assert_eq!(NamingPolicy::SnakeCase.translate("displayName", None), "display_name");
    }

    #[test]
    fn json_name_prefers_schema_value() {
        assert_eq!(
            NamingPolicy::JsonName.translate("user_id", Some("uid")),
            "uid"
        );
        assert_eq!(NamingPolicy::JsonName.translate("user_id", None), "userId");
    }

    #[test]
    fn custom_policy() {
        let policy = NamingPolicy::custom(|n| format!("x_{n}"));
        assert_eq!(policy.translate("id", None), "x_id");
        assert_eq!(format!("{policy:?}"), "custom");
    }

    #[test]
    fn parse_from_str() {
        assert!(matches!("snake".parse::<NamingPolicy>(), Ok(NamingPolicy::SnakeCase)));
        assert!("shouty".parse::<NamingPolicy>().is_err());
    }
}
