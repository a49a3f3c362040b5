//! Configuration resolution.
//!
//! A [`ResolutionContext`] is built once per run. It owns the configuration layers,
//! queried in a fixed precedence order:
//!
//! 1. [`SystemProperties`]: values given explicitly by the caller,
//! 2. [`FileProperties`]: the `apiloom.properties` file of the project,
//! 3. [`EnvironmentProperties`]: `application.*` files and environment variables.
//!
//! Derived settings (groups, custom schemas, schema decorators, expand properties)
//! are computed on first access and then stay unchanged for the rest of the run.
//!
//! # Example
//!
//! ```rust
//! use apiloom_core::ResolutionContext;
//!
//! let context = ResolutionContext::builder()
//!     .system_property("apiloom.groups.admin.display-name", "Admin API")
//!     .system_property("apiloom.json.format", "true")
//!     .environment_variables(Vec::<(String, String)>::new())
//!     .build();
//!
//! assert!(context.json_format());
//! let admin = context.group("admin").expect("configured group");
//! assert_eq!(admin.display_name.as_deref(), Some("Admin API"));
//! ```

mod group;
mod schema_rules;
mod source;

pub use self::group::{GroupConfig, PackageRule};
pub use self::schema_rules::{AnyType, CustomSchema, SchemaDecorator, TypeCatalog};
pub use self::source::{EnvironmentProperties, FileProperties, PropertySource, SystemProperties};

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::debug;

use self::schema_rules::{DecoratorPart, read_custom_schemas, read_decorators, type_key};
use crate::diagnostics::Diagnostics;
use crate::placeholder::LayeredExpander;

/// Common prefix of every configuration key.
pub const PREFIX: &str = "apiloom";

/// `apiloom.enabled`: turns the whole engine on or off (default `true`).
pub const ENABLED: &str = "apiloom.enabled";
/// `apiloom.config.file`: location of the properties file.
pub const CONFIG_FILE: &str = "apiloom.config.file";
/// `apiloom.target.file`: output file of a single document.
pub const TARGET_FILE: &str = "apiloom.target.file";
/// `apiloom.json.format`: emit JSON instead of YAML.
pub const JSON_FORMAT: &str = "apiloom.json.format";
/// `apiloom.filename`: output file name template.
pub const FILENAME: &str = "apiloom.filename";
/// `apiloom.property.naming.strategy`: schema property naming strategy.
pub const NAMING_STRATEGY: &str = "apiloom.property.naming.strategy";
/// `apiloom.server.context.path`: prefix of every output path.
pub const CONTEXT_PATH: &str = "apiloom.server.context.path";
/// `apiloom.additional.files`: directory of documents merged into the base one.
pub const ADDITIONAL_FILES: &str = "apiloom.additional.files";
/// `apiloom.environments`: active environments.
pub const ENVIRONMENTS: &str = "apiloom.environments";
/// `apiloom.environment.enabled`: turns the environment layer on or off.
pub const ENVIRONMENT_ENABLED: &str = "apiloom.environment.enabled";

const DEFAULT_CONFIG_FILE: &str = "apiloom.properties";
const EXPAND_PREFIX: &str = "apiloom.expand.";
const GROUPS_PREFIX: &str = "apiloom.groups.";
const SCHEMA_PREFIX: &str = "apiloom.schema.";
const SCHEMA_NAME_PREFIX: &str = "apiloom.schema-prefix.";
const SCHEMA_NAME_POSTFIX: &str = "apiloom.schema-postfix.";

/// Parses a boolean property: missing or blank gives `default`, anything but
/// `false` (ignoring case) is `true`.
#[must_use]
pub fn parse_bool(value: &str, default: bool) -> bool {
    let value = value.trim();
    if value.is_empty() {
        default
    } else {
        !value.eq_ignore_ascii_case("false")
    }
}

/// Parses a comma separated list, trimming items and dropping blank ones.
#[must_use]
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// The configuration of a run.
#[derive(Debug)]
pub struct ResolutionContext {
    project_dir: PathBuf,
    sources: Vec<Box<dyn PropertySource>>,
    type_catalog: Box<dyn TypeCatalog>,
    diagnostics: Diagnostics,

    groups: OnceCell<IndexMap<String, GroupConfig>>,
    custom_schemas: OnceCell<IndexMap<String, CustomSchema>>,
    decorators: OnceCell<IndexMap<String, SchemaDecorator>>,
    expand_properties: OnceCell<Vec<(String, String)>>,
}

impl ResolutionContext {
    /// Starts building a context.
    #[must_use]
    pub fn builder() -> ResolutionContextBuilder {
        ResolutionContextBuilder::default()
    }

    /// The project directory relative paths resolve against.
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// The configuration layers, in precedence order.
    #[must_use]
    pub fn sources(&self) -> &[Box<dyn PropertySource>] {
        &self.sources
    }

    /// The warnings collector of the run.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The value of a property from the first layer defining it with a non blank value.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<String> {
        self.sources
            .iter()
            .filter_map(|source| source.get(key))
            .find(|value| !value.trim().is_empty())
    }

    /// A boolean property, see [`parse_bool`].
    #[must_use]
    pub fn bool_property(&self, key: &str, default: bool) -> bool {
        self.property(key)
            .map_or(default, |value| parse_bool(&value, default))
    }

    /// A list property, see [`parse_list`].
    #[must_use]
    pub fn list_property(&self, key: &str) -> Vec<String> {
        self.property(key)
            .map(|value| parse_list(&value))
            .unwrap_or_default()
    }

    /// Resolves a path against the project directory.
    #[must_use]
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    /// Whether the engine runs at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.bool_property(ENABLED, true)
    }

    /// Whether output documents are JSON instead of YAML.
    #[must_use]
    pub fn json_format(&self) -> bool {
        self.bool_property(JSON_FORMAT, false)
    }

    /// The configured output file, resolved against the project directory.
    #[must_use]
    pub fn target_file(&self) -> Option<PathBuf> {
        self.property(TARGET_FILE).map(|file| self.resolve_path(file))
    }

    /// The configured output file name template.
    #[must_use]
    pub fn filename(&self) -> Option<String> {
        self.property(FILENAME)
    }

    /// The configured property naming strategy identifier.
    #[must_use]
    pub fn naming_strategy(&self) -> Option<String> {
        self.property(NAMING_STRATEGY)
    }

    /// The server context path.
    #[must_use]
    pub fn context_path(&self) -> Option<String> {
        self.property(CONTEXT_PATH)
    }

    /// The directory of additional documents, resolved against the project directory.
    #[must_use]
    pub fn additional_files(&self) -> Option<PathBuf> {
        self.property(ADDITIONAL_FILES)
            .map(|dir| self.resolve_path(dir))
    }

    /// Every configured group, by name.
    pub fn groups(&self) -> &IndexMap<String, GroupConfig> {
        self.groups.get_or_init(|| {
            let groups = group::read_groups(GROUPS_PREFIX, self.entries_with_prefix(GROUPS_PREFIX));
            debug!(count = groups.len(), "group configurations loaded");
            groups
        })
    }

    /// The settings of a group (exact, case-sensitive name).
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupConfig> {
        self.groups().get(name)
    }

    /// The replacement type configured for a type.
    ///
    /// Looks up `Name<Arg1,Arg2>` first, then the bare `Name`.
    #[must_use]
    pub fn custom_schema(&self, type_name: &str, type_args: &[&str]) -> Option<&str> {
        let rules = self.custom_schemas.get_or_init(|| {
            read_custom_schemas(
                SCHEMA_PREFIX,
                self.entries_with_prefix(SCHEMA_PREFIX),
                self.type_catalog.as_ref(),
                &self.diagnostics,
            )
        });
        rules
            .get(&type_key(type_name, type_args))
            .or_else(|| rules.get(type_name))
            .map(|rule| rule.target.as_str())
    }

    /// The schema name decoration configured for a package.
    #[must_use]
    pub fn schema_decorator(&self, package: &str) -> Option<&SchemaDecorator> {
        let decorators = self.decorators.get_or_init(|| {
            let prefixes = self
                .entries_with_prefix(SCHEMA_NAME_PREFIX)
                .into_iter()
                .map(|(key, value)| {
                    let package = key.trim_start_matches(SCHEMA_NAME_PREFIX).to_string();
                    (DecoratorPart::Prefix, package, value)
                });
            let postfixes = self
                .entries_with_prefix(SCHEMA_NAME_POSTFIX)
                .into_iter()
                .map(|(key, value)| {
                    let package = key.trim_start_matches(SCHEMA_NAME_POSTFIX).to_string();
                    (DecoratorPart::Postfix, package, value)
                });
            read_decorators(prefixes.chain(postfixes))
        });
        decorators.get(package)
    }

    /// The `${key}` aliases configured with `apiloom.expand.<key>`, as `(token, value)`.
    pub fn expand_properties(&self) -> &[(String, String)] {
        self.expand_properties.get_or_init(|| {
            let mut properties = Vec::<(String, String)>::new();
            for (key, value) in self.entries_with_prefix(EXPAND_PREFIX) {
                let token = format!("${{{}}}", key.trim_start_matches(EXPAND_PREFIX));
                if !properties.iter().any(|(known, _)| *known == token) {
                    properties.push((token, value));
                }
            }
            properties
        })
    }

    /// The placeholder expander for document values.
    #[must_use]
    pub fn expander(&self) -> LayeredExpander<'_> {
        LayeredExpander::new(self.expand_properties(), &self.sources)
    }

    /// Every `(key, value)` with the prefix, layer by layer in precedence order.
    fn entries_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        self.sources
            .iter()
            .flat_map(|source| {
                source
                    .keys_with_prefix(prefix)
                    .into_iter()
                    .filter_map(|key| source.get(&key).map(|value| (key, value)))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// Builder of a [`ResolutionContext`].
#[derive(Debug, Default)]
pub struct ResolutionContextBuilder {
    project_dir: Option<PathBuf>,
    system: IndexMap<String, String>,
    variables: Option<Vec<(String, String)>>,
    type_catalog: Option<Box<dyn TypeCatalog>>,
}

impl ResolutionContextBuilder {
    /// Sets the project directory (default: the current directory).
    #[must_use]
    pub fn project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(dir.into());
        self
    }

    /// Adds a system property.
    #[must_use]
    pub fn system_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.system.insert(key.into(), value.into());
        self
    }

    /// Adds system properties.
    #[must_use]
    pub fn system_properties<K, V>(mut self, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.system.extend(
            properties
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        self
    }

    /// Replaces the process environment variables seen by the environment layer.
    #[must_use]
    pub fn environment_variables<K, V>(mut self, variables: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.variables = Some(
            variables
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Sets the catalog validating custom schema targets (default: [`AnyType`]).
    #[must_use]
    pub fn type_catalog(mut self, catalog: impl TypeCatalog + 'static) -> Self {
        self.type_catalog = Some(Box::new(catalog));
        self
    }

    /// Loads the configuration layers.
    ///
    /// Unreadable configuration files are reported to the context diagnostics.
    #[must_use]
    pub fn build(self) -> ResolutionContext {
        let diagnostics = Diagnostics::new();
        let project_dir = self.project_dir.unwrap_or_else(|| PathBuf::from("."));

        let system = SystemProperties::new(self.system);
        let config_file = system
            .get(CONFIG_FILE)
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
        let config_path = if Path::new(&config_file).is_absolute() {
            PathBuf::from(config_file)
        } else {
            project_dir.join(config_file)
        };
        let file = FileProperties::load(&config_path, &diagnostics);

        let first_set = |key: &str| system.get(key).or_else(|| file.get(key));
        let environment_enabled = first_set(ENVIRONMENT_ENABLED)
            .is_none_or(|value| parse_bool(&value, true));
        let environments = first_set(ENVIRONMENTS)
            .map(|value| parse_list(&value))
            .unwrap_or_default();

        let mut sources: Vec<Box<dyn PropertySource>> = vec![Box::new(system), Box::new(file)];
        if environment_enabled {
            let variables = self
                .variables
                .unwrap_or_else(|| std::env::vars().collect());
            let environment =
                EnvironmentProperties::load(&project_dir, &environments, variables, &diagnostics);
            sources.push(Box::new(environment));
        } else {
            debug!("environment properties disabled");
        }

        ResolutionContext {
            project_dir,
            sources,
            type_catalog: self.type_catalog.unwrap_or_else(|| Box::new(AnyType)),
            diagnostics,
            groups: OnceCell::new(),
            custom_schemas: OnceCell::new(),
            decorators: OnceCell::new(),
            expand_properties: OnceCell::new(),
        }
    }
}
