use std::fmt::Debug;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::diagnostics::{Diagnostics, Warning};
use crate::placeholder::PLACEHOLDER;

/// Upper bound of nested `${...}` references followed inside environment values.
const MAX_NESTED_PLACEHOLDERS: usize = 8;

/// A layer of configuration properties.
///
/// Layers are queried in a fixed precedence order by the
/// [`ResolutionContext`](super::ResolutionContext): the first layer that knows a
/// key wins.
pub trait PropertySource: Debug {
    /// A short name for logs.
    fn name(&self) -> &str;

    /// The value of a property.
    fn get(&self, key: &str) -> Option<String>;

    /// All keys of this layer starting with `prefix`, in declaration order.
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;

    /// Resolves the content of a `${...}` token.
    ///
    /// By default the token is a plain property key.
    fn resolve_token(&self, token: &str) -> Option<String> {
        self.get(token)
    }
}

fn keys_with_prefix<'a>(keys: impl Iterator<Item = &'a String>, prefix: &str) -> Vec<String> {
    keys.filter(|key| key.starts_with(prefix))
        .cloned()
        .collect()
}

/// Properties given explicitly by the caller (e.g. `-D key=value` on the command line).
#[derive(Debug, Clone, Default)]
pub struct SystemProperties {
    properties: IndexMap<String, String>,
}

impl SystemProperties {
    /// Creates the layer from key/value pairs.
    pub fn new<K, V>(properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let properties = properties
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self { properties }
    }
}

impl PropertySource for SystemProperties {
    fn name(&self) -> &str {
        "system"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        keys_with_prefix(self.properties.keys(), prefix)
    }
}

/// Properties read from a `key=value` properties file.
#[derive(Debug, Clone, Default)]
pub struct FileProperties {
    properties: IndexMap<String, String>,
}

impl FileProperties {
    /// Parses properties text.
    ///
    /// Supports `#` and `!` comments, `=` or `:` separators and lines continued
    /// with a trailing `\`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut properties = IndexMap::new();
        let mut pending = String::new();

        for line in text.lines() {
            let line = line.trim_start();
            if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
                continue;
            }

            if let Some(continued) = strip_continuation(line) {
                pending.push_str(continued);
                continue;
            }
            pending.push_str(line);

            let entry = std::mem::take(&mut pending);
            let (key, value) = split_entry(&entry);
            if !key.is_empty() {
                properties.insert(key.to_string(), value.to_string());
            }
        }

        if !pending.is_empty() {
            let (key, value) = split_entry(&pending);
            if !key.is_empty() {
                properties.insert(key.to_string(), value.to_string());
            }
        }

        Self { properties }
    }

    /// Reads a properties file.
    ///
    /// A missing file gives an empty layer, an unreadable one also reports a warning.
    pub fn load(path: &Path, diagnostics: &Diagnostics) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no configuration file");
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), "reading configuration file");
                Self::parse(&text)
            }
            Err(err) => {
                diagnostics.report(Warning::UnreadableConfig {
                    origin: path.display().to_string(),
                    reason: err.to_string(),
                });
                Self::default()
            }
        }
    }
}

/// Returns the line without its continuation marker, if it is continued.
fn strip_continuation(line: &str) -> Option<&str> {
    let trailing = line.len() - line.trim_end_matches('\\').len();
    if trailing % 2 == 1 {
        line.strip_suffix('\\')
    } else {
        None
    }
}

fn split_entry(entry: &str) -> (&str, &str) {
    match entry.find(['=', ':']) {
        Some(index) => {
            let (key, value) = entry.split_at(index);
            let value = value.get(1..).unwrap_or_default();
            (key.trim(), value.trim_start())
        }
        None => (entry.trim(), ""),
    }
}

impl PropertySource for FileProperties {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        keys_with_prefix(self.properties.keys(), prefix)
    }
}

/// Application configuration: `application.*` files, then the files of every
/// active environment, overlaid with process environment variables.
///
/// Values may reference other keys with `${key}` or `${key:default}`.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentProperties {
    properties: IndexMap<String, String>,
    variables: IndexMap<String, String>,
}

impl EnvironmentProperties {
    const EXTENSIONS: [&str; 3] = ["yml", "yaml", "json"];

    /// Loads the application files found in `dir`.
    ///
    /// Files are read in order `application.*`, then `application-<env>.*` for every
    /// environment; keys of later files override earlier ones. Unreadable files are
    /// reported and skipped.
    pub fn load<K, V>(
        dir: &Path,
        environments: &[String],
        variables: impl IntoIterator<Item = (K, V)>,
        diagnostics: &Diagnostics,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut properties = IndexMap::new();
        let stems = std::iter::once("application".to_string())
            .chain(environments.iter().map(|env| format!("application-{env}")));

        for stem in stems {
            for extension in Self::EXTENSIONS {
                let path = dir.join(format!("{stem}.{extension}"));
                if !path.is_file() {
                    continue;
                }
                match read_tree(&path, extension) {
                    Ok(tree) => {
                        debug!(path = %path.display(), "reading application configuration");
                        flatten("", &tree, &mut properties);
                    }
                    Err(reason) => diagnostics.report(Warning::UnreadableConfig {
                        origin: path.display().to_string(),
                        reason,
                    }),
                }
            }
        }

        let variables = variables
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        Self {
            properties,
            variables,
        }
    }

    /// Creates the layer from already flattened properties, without variables.
    pub fn from_properties<K, V>(properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let properties = properties
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            properties,
            variables: IndexMap::new(),
        }
    }

    fn raw(&self, key: &str) -> Option<&String> {
        self.variables
            .get(&variable_name(key))
            .or_else(|| self.properties.get(key))
    }

    fn interpolate(&self, value: &str) -> String {
        let mut current = value.to_string();
        for _ in 0..MAX_NESTED_PLACEHOLDERS {
            if !current.contains("${") {
                break;
            }
            let next = PLACEHOLDER
                .replace_all(&current, |captures: &regex::Captures<'_>| {
                    let token = captures.get(1).map_or("", |found| found.as_str());
                    let whole = captures.get(0).map_or("", |found| found.as_str());
                    self.lookup(token)
                        .map_or_else(|| whole.to_string(), ToString::to_string)
                })
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn lookup<'s>(&'s self, token: &'s str) -> Option<&'s str> {
        match token.split_once(':') {
            Some((key, default)) => Some(self.raw(key).map_or(default, String::as_str)),
            None => self.raw(token).map(String::as_str),
        }
    }
}

impl PropertySource for EnvironmentProperties {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.raw(key).map(|value| self.interpolate(value))
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        keys_with_prefix(self.properties.keys(), prefix)
    }

    fn resolve_token(&self, token: &str) -> Option<String> {
        self.lookup(token).map(|value| self.interpolate(value))
    }
}

/// The environment variable holding a property, e.g. `APILOOM_TARGET_FILE` for
/// `apiloom.target.file`.
fn variable_name(key: &str) -> String {
    key.chars()
        .map(|ch| match ch {
            '.' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

fn read_tree(path: &Path, extension: &str) -> Result<Value, String> {
    let text = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
    if extension == "json" {
        serde_json::from_str(&text).map_err(|err| err.to_string())
    } else {
        serde_saphyr::from_str(&text).map_err(|err| err.to_string())
    }
}

/// Flattens a tree into dotted keys.
///
/// Arrays are exposed both indexed (`key[0]`) and comma-joined (`key`).
fn flatten(prefix: &str, value: &Value, into: &mut IndexMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&key, child, into);
            }
        }
        Value::Array(items) => {
            let mut joined = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                flatten(&format!("{prefix}[{index}]"), item, into);
                if let Some(scalar) = scalar_text(item) {
                    joined.push(scalar);
                }
            }
            into.insert(prefix.to_string(), joined.join(","));
        }
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                into.insert(prefix.to_string(), text);
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
