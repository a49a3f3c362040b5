use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use super::{parse_bool, parse_list};

/// A package selector of a group.
///
/// `com.example` only matches that package, `com.example.*` also matches its
/// sub-packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRule {
    package: String,
    include_subpackages: bool,
}

impl PackageRule {
    /// Parses a rule.
    #[must_use]
    pub fn parse(rule: &str) -> Self {
        let rule = rule.trim();
        match rule.strip_suffix('*') {
            Some(package) => Self {
                package: package.trim_end_matches('.').to_string(),
                include_subpackages: true,
            },
            None => Self {
                package: rule.to_string(),
                include_subpackages: false,
            },
        }
    }

    /// Returns `true` when the rule selects the package.
    #[must_use]
    pub fn matches(&self, package: &str) -> bool {
        if package == self.package {
            return true;
        }
        self.include_subpackages
            && package
                .strip_prefix(self.package.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl fmt::Display for PackageRule {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.include_subpackages {
            write!(formatter, "{}.*", self.package)
        } else {
            formatter.write_str(&self.package)
        }
    }
}

/// Settings of one API group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupConfig {
    /// The group name, as used by endpoint records.
    pub name: String,
    /// Human readable name.
    pub display_name: Option<String>,
    /// Output file name (template) of the group documents.
    pub filename: Option<String>,
    /// Packages whose endpoints join the group.
    pub packages: Vec<PackageRule>,
    /// Packages whose endpoints never join the group.
    pub packages_exclude: Vec<PackageRule>,
    /// Marks the group shown first by documentation UIs.
    pub primary: Option<bool>,
    /// When set, common endpoints are not added to the group documents.
    pub common_exclude: Option<bool>,
}

impl GroupConfig {
    /// Creates a group without settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the common-exclude flag.
    #[must_use]
    pub const fn with_common_exclude(mut self, common_exclude: bool) -> Self {
        self.common_exclude = Some(common_exclude);
        self
    }

    /// Sets the output file name.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Adds an inclusion package rule.
    #[must_use]
    pub fn with_package(mut self, rule: &str) -> Self {
        self.packages.push(PackageRule::parse(rule));
        self
    }

    /// Adds an exclusion package rule.
    #[must_use]
    pub fn with_package_exclude(mut self, rule: &str) -> Self {
        self.packages_exclude.push(PackageRule::parse(rule));
        self
    }

    /// Whether the group is the primary one.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.primary.unwrap_or(false)
    }

    /// Whether common endpoints stay out of this group.
    #[must_use]
    pub fn is_common_exclude(&self) -> bool {
        self.common_exclude.unwrap_or(false)
    }

    /// Whether an endpoint discovered in `package` joins the group.
    #[must_use]
    pub fn includes_package(&self, package: &str) -> bool {
        self.packages.iter().any(|rule| rule.matches(package))
    }

    /// Whether an endpoint discovered in `package` must stay out of the group.
    #[must_use]
    pub fn excludes_package(&self, package: &str) -> bool {
        self.packages_exclude.iter().any(|rule| rule.matches(package))
    }

    /// Sets a property from its configuration key, unless it is already set.
    ///
    /// Returns `false` for unknown properties.
    pub(crate) fn set_if_absent(&mut self, property: &str, value: &str) -> bool {
        match canonical_property(property).as_str() {
            "displayname" => {
                self.display_name.get_or_insert_with(|| value.to_string());
            }
            "filename" => {
                self.filename.get_or_insert_with(|| value.to_string());
            }
            "packages" => {
                if self.packages.is_empty() {
                    self.packages = parse_rules(value);
                }
            }
            "packagesexclude" => {
                if self.packages_exclude.is_empty() {
                    self.packages_exclude = parse_rules(value);
                }
            }
            "primary" => {
                self.primary.get_or_insert_with(|| parse_bool(value, false));
            }
            "commonexclude" => {
                self.common_exclude
                    .get_or_insert_with(|| parse_bool(value, false));
            }
            _ => return false,
        }
        true
    }
}

/// Lower-cases a property name and drops separators (`display-name`, `displayName`
/// and `display_name` are the same property).
fn canonical_property(property: &str) -> String {
    property
        .chars()
        .filter(|ch| !matches!(ch, '-' | '_' | '.'))
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

fn parse_rules(value: &str) -> Vec<PackageRule> {
    parse_list(value)
        .iter()
        .map(|rule| PackageRule::parse(rule))
        .collect()
}

/// Reads group settings from `<prefix><group>.<property>` keys.
///
/// `entries` must be given in precedence order: the first value of a property wins.
pub(crate) fn read_groups(
    prefix: &str,
    entries: impl IntoIterator<Item = (String, String)>,
) -> IndexMap<String, GroupConfig> {
    let mut groups = IndexMap::<String, GroupConfig>::new();
    for (key, value) in entries {
        let Some((group, property)) = key
            .strip_prefix(prefix)
            .and_then(|rest| rest.rsplit_once('.'))
        else {
            continue;
        };
        if group.is_empty() {
            continue;
        }
        let config = groups
            .entry(group.to_string())
            .or_insert_with(|| GroupConfig::new(group));
        if !config.set_if_absent(property, &value) {
            debug!(%group, %property, "unknown group property");
        }
    }
    groups
}
