//! `${key}` placeholder resolution over JSON-like trees.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::config::PropertySource;
use crate::diagnostics::{Diagnostics, Warning};

/// A `${...}` token, capturing its content.
pub(crate) static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("a valid regex"));

/// Upper bound of substitution passes on a single string.
const MAX_PASSES: usize = 16;

/// Rewrites text.
///
/// Returning [`Cow::Borrowed`] means "unchanged".
pub trait Expand {
    /// Expands the text.
    fn expand<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

impl<F> Expand for F
where
    F: Fn(&str) -> String,
{
    fn expand<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let expanded = self(text);
        if expanded == text {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(expanded)
        }
    }
}

/// Resolves placeholders in every string of a tree.
///
/// Object keys and string values go through `expand`, blank strings are left
/// alone. Nodes that do not change are moved into the result as is.
pub fn resolve_placeholders(value: Value, expand: &impl Expand) -> Value {
    match value {
        Value::String(text) => Value::String(expand_owned(text, expand)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| resolve_placeholders(item, expand))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (expand_owned(key, expand), resolve_placeholders(item, expand)))
                .collect::<Map<_, _>>(),
        ),
        other => other,
    }
}

fn expand_owned(text: String, expand: &impl Expand) -> String {
    if text.trim().is_empty() {
        return text;
    }
    let changed = match expand.expand(&text) {
        Cow::Borrowed(_) => None,
        Cow::Owned(expanded) => Some(expanded),
    };
    changed.unwrap_or(text)
}

/// Expands document text with the configuration layers.
///
/// Applies the configured expand aliases first, then replaces every `${key}` token
/// with the value of the first layer resolving it, repeating until nothing changes.
/// Unresolved tokens stay verbatim; they are collected and reported once with
/// [`LayeredExpander::report_unresolved`].
#[derive(Debug)]
pub struct LayeredExpander<'a> {
    expand_properties: &'a [(String, String)],
    sources: &'a [Box<dyn PropertySource>],
    unresolved: RefCell<BTreeSet<String>>,
}

impl<'a> LayeredExpander<'a> {
    /// Creates an expander.
    #[must_use]
    pub fn new(expand_properties: &'a [(String, String)], sources: &'a [Box<dyn PropertySource>]) -> Self {
        Self {
            expand_properties,
            sources,
            unresolved: RefCell::new(BTreeSet::new()),
        }
    }

    fn lookup(&self, token: &str) -> Option<String> {
        self.sources
            .iter()
            .find_map(|source| source.resolve_token(token))
    }

    fn substitute(&self, text: &str) -> String {
        let mut current = text.to_string();
        for (token, value) in self.expand_properties {
            if current.contains(token.as_str()) {
                current = current.replace(token.as_str(), value);
            }
        }

        for _ in 0..MAX_PASSES {
            let mut changed = false;
            let next = PLACEHOLDER
                .replace_all(&current, |captures: &Captures<'_>| {
                    let token = captures.get(1).map_or("", |found| found.as_str());
                    if let Some(value) = self.lookup(token) {
                        changed = true;
                        value
                    } else {
                        captures
                            .get(0)
                            .map_or_else(String::new, |found| found.as_str().to_string())
                    }
                })
                .into_owned();
            current = next;
            if !changed {
                break;
            }
        }

        for captures in PLACEHOLDER.captures_iter(&current) {
            if let Some(token) = captures.get(1)
                && self.lookup(token.as_str()).is_none()
            {
                self.unresolved
                    .borrow_mut()
                    .insert(token.as_str().to_string());
            }
        }
        current
    }

    /// The tokens left unresolved so far.
    #[must_use]
    pub fn unresolved(&self) -> Vec<String> {
        self.unresolved.borrow().iter().cloned().collect()
    }

    /// Reports every unresolved token once, then forgets them.
    pub fn report_unresolved(&self, diagnostics: &Diagnostics) {
        for token in self.unresolved.take() {
            diagnostics.report(Warning::UnresolvedPlaceholder { token });
        }
    }
}

impl Expand for LayeredExpander<'_> {
    fn expand<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if !text.contains("${") {
            return Cow::Borrowed(text);
        }
        let expanded = self.substitute(text);
        if expanded == text {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(expanded)
        }
    }
}
