use indexmap::IndexMap;
use tracing::info;

use crate::model::Document;

/// Prefixes every path key of a document with the server context path.
///
/// Keys already starting with the context path are kept. Repeated slashes at the
/// junction are collapsed, and every key starts with `/` unless it starts with `$`.
pub fn apply_context_path(doc: &mut Document, context_path: &str) {
    let context_path = context_path.trim();
    if context_path.is_empty() || doc.paths.is_empty() {
        return;
    }
    info!(%context_path, "applying server context path");

    let paths = std::mem::take(&mut doc.paths);
    doc.paths = paths
        .into_iter()
        .map(|(path, item)| (prefixed(context_path, &path), item))
        .collect::<IndexMap<_, _>>();
}

fn prefixed(context_path: &str, path: &str) -> String {
    let joined = if path.starts_with(context_path) {
        path.to_string()
    } else {
        join(context_path, path)
    };
    if joined.starts_with('/') || joined.starts_with('$') {
        joined
    } else {
        format!("/{joined}")
    }
}

fn join(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => format!("/{path}"),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Info, PathItem};
    use rstest::rstest;

    #[rstest]
    #[case("/api", "/pets", "/api/pets")]
    #[case("/api/", "/pets", "/api/pets")]
    #[case("api", "pets", "/api/pets")]
    #[case("/api", "/api/pets", "/api/pets")]
    #[case("/api", "/", "/api")]
    #[case("/", "/pets", "/pets")]
    fn should_prefix_path(#[case] context_path: &str, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(prefixed(context_path, path), expected);
    }

    #[test]
    fn should_keep_expression_keys() {
        assert_eq!(prefixed("$request", "$request.body#/url"), "$request.body#/url");
    }

    #[test]
    fn should_prefix_every_document_path() {
        let mut doc = Document::new(Info::new("Pets", "1.0"))
            .with_path("/pets", PathItem::default())
            .with_path("/owners/{id}", PathItem::default());

        apply_context_path(&mut doc, "/v1");

        assert_eq!(
            doc.paths.keys().collect::<Vec<_>>(),
            vec!["/v1/pets", "/v1/owners/{id}"]
        );
    }

    #[test]
    fn should_ignore_blank_context_path() {
        let mut doc = Document::new(Info::new("Pets", "1.0")).with_path("pets", PathItem::default());

        apply_context_path(&mut doc, "  ");

        assert_eq!(doc.paths.keys().collect::<Vec<_>>(), vec!["pets"]);
    }
}
