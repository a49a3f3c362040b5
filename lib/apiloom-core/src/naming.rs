//! Property naming strategies.

use std::str::FromStr;

use cruet::{to_kebab_case, to_screaming_snake_case, to_snake_case};
use indexmap::IndexMap;

use crate::model::{Document, Schema};

/// How schema property names are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum NamingStrategy {
    /// `petName` (names are kept as is)
    #[display("LOWER_CAMEL_CASE")]
    LowerCamelCase,
    /// `PetName`
    #[display("UPPER_CAMEL_CASE")]
    UpperCamelCase,
    /// `pet_name`
    #[display("SNAKE_CASE")]
    SnakeCase,
    /// `PET_NAME`
    #[display("UPPER_SNAKE_CASE")]
    UpperSnakeCase,
    /// `petname`
    #[display("LOWER_CASE")]
    LowerCase,
    /// `pet-name`
    #[display("KEBAB_CASE")]
    KebabCase,
    /// `pet.name`
    #[display("LOWER_DOT_CASE")]
    LowerDotCase,
}

/// An unsupported naming strategy identifier.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown naming strategy '{name}'")]
pub struct UnknownNamingStrategy {
    /// The identifier.
    pub name: String,
}

impl FromStr for NamingStrategy {
    type Err = UnknownNamingStrategy;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let strategy = match name.trim().to_ascii_uppercase().as_str() {
            "LOWER_CAMEL_CASE" => Self::LowerCamelCase,
            "UPPER_CAMEL_CASE" => Self::UpperCamelCase,
            "SNAKE_CASE" => Self::SnakeCase,
            "UPPER_SNAKE_CASE" => Self::UpperSnakeCase,
            "LOWER_CASE" => Self::LowerCase,
            "KEBAB_CASE" => Self::KebabCase,
            "LOWER_DOT_CASE" => Self::LowerDotCase,
            _ => {
                return Err(UnknownNamingStrategy {
                    name: name.to_string(),
                });
            }
        };
        Ok(strategy)
    }
}

impl NamingStrategy {
    /// Translates a property name.
    #[must_use]
    pub fn translate(self, name: &str) -> String {
        match self {
            Self::LowerCamelCase => name.to_string(),
            Self::UpperCamelCase => {
                let mut chars = name.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            }
            Self::SnakeCase => to_snake_case(name),
            Self::UpperSnakeCase => to_screaming_snake_case(name),
            Self::LowerCase => name.to_lowercase(),
            Self::KebabCase => to_kebab_case(name),
            Self::LowerDotCase => to_snake_case(name).replace('_', "."),
        }
    }
}

/// Rewrites the property names and required entries of every component schema.
pub fn apply_naming(doc: &mut Document, translate: impl Fn(&str) -> String) {
    let Some(components) = doc.components.as_mut() else {
        return;
    };
    for schema in components.schemas.values_mut() {
        rename_properties(schema, &translate);
    }
}

fn rename_properties(schema: &mut Schema, translate: &impl Fn(&str) -> String) {
    if !schema.properties.is_empty() {
        let properties = std::mem::take(&mut schema.properties);
        let mut renamed = IndexMap::with_capacity(properties.len());
        for (name, property) in properties {
            renamed.entry(translate(&name)).or_insert(property);
        }
        schema.properties = renamed;
    }
    for required in &mut schema.required {
        *required = translate(required);
    }
}
