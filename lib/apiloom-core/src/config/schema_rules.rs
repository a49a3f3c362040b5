use std::fmt::Debug;

use indexmap::{IndexMap, IndexSet};

use crate::diagnostics::{Diagnostics, Warning};

/// Knows which types exist, to validate custom schema targets.
pub trait TypeCatalog: Debug {
    /// Returns `true` when the type is known.
    fn contains(&self, type_name: &str) -> bool;
}

/// A catalog accepting every type name.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyType;

impl TypeCatalog for AnyType {
    fn contains(&self, _type_name: &str) -> bool {
        true
    }
}

impl TypeCatalog for IndexSet<String> {
    fn contains(&self, type_name: &str) -> bool {
        IndexSet::contains(self, type_name)
    }
}

/// A configured schema substitution: a type documented as another one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSchema {
    /// Type arguments the rule was configured with, e.g. `[String]` for `Page<String>`.
    pub type_args: Vec<String>,
    /// The replacement type.
    pub target: String,
}

/// Name prefix and postfix applied to the schemas of a package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDecorator {
    /// Prepended to schema names.
    pub prefix: Option<String>,
    /// Appended to schema names.
    pub postfix: Option<String>,
}

impl SchemaDecorator {
    /// Applies the decoration to a schema name.
    #[must_use]
    pub fn decorate(&self, name: &str) -> String {
        format!(
            "{}{name}{}",
            self.prefix.as_deref().unwrap_or_default(),
            self.postfix.as_deref().unwrap_or_default()
        )
    }
}

/// The lookup key of a type: `Name` or `Name<Arg1,Arg2>`.
pub(crate) fn type_key(type_name: &str, type_args: &[&str]) -> String {
    if type_args.is_empty() {
        type_name.to_string()
    } else {
        format!("{type_name}<{}>", type_args.join(","))
    }
}

/// Splits a configured type (`Name<A, B>`) into its normalized key and arguments.
fn parse_configured_type(configured: &str) -> (String, Vec<String>) {
    let configured = configured.trim();
    let Some((name, rest)) = configured.split_once('<') else {
        return (configured.to_string(), Vec::new());
    };
    let arguments = rest.trim_end().trim_end_matches('>');
    let type_args = arguments
        .split(',')
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    let name = name.trim();
    let borrowed = type_args.iter().map(String::as_str).collect::<Vec<_>>();
    (type_key(name, &borrowed), type_args)
}

/// Reads `<prefix><type>=<target>` rules.
///
/// `entries` must be in precedence order: the first rule for a type wins. Rules
/// targeting a type unknown to the catalog are dropped with a warning.
pub(crate) fn read_custom_schemas(
    prefix: &str,
    entries: impl IntoIterator<Item = (String, String)>,
    catalog: &dyn TypeCatalog,
    diagnostics: &Diagnostics,
) -> IndexMap<String, CustomSchema> {
    let mut rules = IndexMap::new();
    for (key, target) in entries {
        let Some(configured) = key.strip_prefix(prefix) else {
            continue;
        };
        let (type_name, type_args) = parse_configured_type(configured);
        if type_name.is_empty() || rules.contains_key(&type_name) {
            continue;
        }
        let target = target.trim().to_string();
        if !catalog.contains(&target) {
            diagnostics.report(Warning::UnknownSchemaTarget { type_name, target });
            continue;
        }
        rules.insert(type_name, CustomSchema { type_args, target });
    }
    rules
}

/// Which half of a [`SchemaDecorator`] a key configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecoratorPart {
    Prefix,
    Postfix,
}

/// Reads `(part, package, value)` decorations in precedence order: the first value
/// of a part wins.
pub(crate) fn read_decorators(
    entries: impl IntoIterator<Item = (DecoratorPart, String, String)>,
) -> IndexMap<String, SchemaDecorator> {
    let mut decorators = IndexMap::<String, SchemaDecorator>::new();
    for (part, package, value) in entries {
        if package.is_empty() {
            continue;
        }
        let decorator = decorators.entry(package).or_default();
        let slot = match part {
            DecoratorPart::Prefix => &mut decorator.prefix,
            DecoratorPart::Postfix => &mut decorator.postfix,
        };
        slot.get_or_insert(value);
    }
    decorators
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("com.example.Money", "com.example.Money", 0)]
    #[case("com.example.Page<java.lang.String, java.lang.Long>", "com.example.Page<java.lang.String,java.lang.Long>", 2)]
    #[case(" com.example.Box<T> ", "com.example.Box<T>", 1)]
    fn should_normalize_configured_types(
        #[case] configured: &str,
        #[case] expected: &str,
        #[case] arg_count: usize,
    ) {
        let (key, args) = parse_configured_type(configured);

        assert_eq!(key, expected);
        assert_eq!(args.len(), arg_count);
    }

    #[test]
    fn should_drop_rules_with_unknown_target() {
        let catalog = IndexSet::from(["java.lang.String".to_string()]);
        let diagnostics = Diagnostics::new();
        let entries = [
            ("apiloom.schema.com.example.Money", "java.lang.String"),
            ("apiloom.schema.com.example.Id", "com.example.Missing"),
            ("apiloom.schema.com.example.Money", "java.lang.Long"),
        ]
        .map(|(key, value)| (key.to_string(), value.to_string()));

        let rules = read_custom_schemas("apiloom.schema.", entries, &catalog, &diagnostics);

        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules.get("com.example.Money").map(|rule| rule.target.as_str()),
            Some("java.lang.String")
        );
        assert_eq!(
            diagnostics.warnings(),
            vec![Warning::UnknownSchemaTarget {
                type_name: "com.example.Id".to_string(),
                target: "com.example.Missing".to_string(),
            }]
        );
    }

    #[test]
    fn should_decorate_names() {
        let decorators = read_decorators([
            (DecoratorPart::Prefix, "com.example.v1".to_string(), "V1".to_string()),
            (DecoratorPart::Postfix, "com.example.v1".to_string(), "Dto".to_string()),
            (DecoratorPart::Prefix, "com.example.v1".to_string(), "Ignored".to_string()),
        ]);

        let decorator = decorators.get("com.example.v1").expect("decorator");

        assert_eq!(decorator.decorate("Pet"), "V1PetDto");
    }
}
