use indexmap::IndexMap;
use serde_json::Value;

use crate::model::{ApiResponse, MediaType, Operation, Parameter, RequestBody};

/// Merges two descriptions of the same operation.
///
/// # Merge Strategy
///
/// - **Parameters**: union, identified by name and location; the current one wins
/// - **Request body**: content types are combined, the current media type wins
/// - **Responses**: union by status; for a status present on both sides, content
///   types are combined and the current values win
/// - **Tags**: union, sorted and deduplicated
/// - **Other fields**: first value set wins
pub(crate) fn merge_operation(current: Operation, new: Operation) -> Operation {
    Operation {
        tags: merge_tags(current.tags, new.tags),
        summary: current.summary.or(new.summary),
        description: current.description.or(new.description),
        operation_id: current.operation_id.or(new.operation_id),
        parameters: merge_parameters(current.parameters, new.parameters),
        request_body: merge_request_body(current.request_body, new.request_body),
        responses: merge_responses(current.responses, new.responses),
        deprecated: current.deprecated.or(new.deprecated),
        security: current.security.or(new.security),
        extensions: merge_extensions(current.extensions, new.extensions),
    }
}

fn merge_tags(mut current: Vec<String>, new: Vec<String>) -> Vec<String> {
    current.extend(new);
    current.sort();
    current.dedup();
    current
}

fn merge_parameters(current: Vec<Parameter>, new: Vec<Parameter>) -> Vec<Parameter> {
    let mut result = Vec::with_capacity(current.len() + new.len());
    for param in current.into_iter().chain(new) {
        if !result
            .iter()
            .any(|known: &Parameter| known.identity() == param.identity())
        {
            result.push(param);
        }
    }
    result
}

fn merge_content(
    mut current: IndexMap<String, MediaType>,
    new: IndexMap<String, MediaType>,
) -> IndexMap<String, MediaType> {
    for (media_type, content) in new {
        current.entry(media_type).or_insert(content);
    }
    current
}

fn merge_request_body(
    current: Option<RequestBody>,
    new: Option<RequestBody>,
) -> Option<RequestBody> {
    match (current, new) {
        (Some(current), Some(new)) => Some(RequestBody {
            reference: current.reference.or(new.reference),
            description: current.description.or(new.description),
            content: merge_content(current.content, new.content),
            required: current.required.or(new.required),
            extensions: merge_extensions(current.extensions, new.extensions),
        }),
        (Some(current), None) => Some(current),
        (None, new) => new,
    }
}

fn merge_responses(
    mut current: IndexMap<String, ApiResponse>,
    new: IndexMap<String, ApiResponse>,
) -> IndexMap<String, ApiResponse> {
    for (status, response) in new {
        if let Some(existing) = current.get_mut(&status) {
            let taken = std::mem::take(existing);
            *existing = ApiResponse {
                reference: taken.reference.or(response.reference),
                description: taken.description.or(response.description),
                content: merge_content(taken.content, response.content),
                extensions: merge_extensions(taken.extensions, response.extensions),
            };
        } else {
            current.insert(status, response);
        }
    }
    current
}

fn merge_extensions(
    mut current: IndexMap<String, Value>,
    new: IndexMap<String, Value>,
) -> IndexMap<String, Value> {
    for (key, value) in new {
        current.entry(key).or_insert(value);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Schema;

    #[test]
    fn should_union_parameters_current_wins() {
        let current = Operation::default()
            .with_parameter(Parameter::new("limit", "query", Schema::of_type("integer")))
            .with_parameter(Parameter::new("id", "path", Schema::of_type("string")));
        let new = Operation::default()
            .with_parameter(Parameter::new("limit", "query", Schema::of_type("string")))
            .with_parameter(Parameter::new("limit", "header", Schema::of_type("string")));

        let merged = merge_operation(current, new);

        let names = merged
            .parameters
            .iter()
            .map(|param| {
                format!(
                    "{}:{}",
                    param.location.as_deref().unwrap_or_default(),
                    param.name.as_deref().unwrap_or_default()
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["query:limit", "path:id", "header:limit"]);
        let limit_schema = merged
            .parameters
            .first()
            .and_then(|param| param.schema.as_ref())
            .expect("limit schema");
        assert_eq!(limit_schema, &Schema::of_type("integer"));
    }

    #[test]
    fn should_union_responses_first_value_wins() {
        let current = Operation::default()
            .with_response(
                "200",
                ApiResponse::new("first").with_content(
                    "application/json",
                    MediaType::new(Schema::reference_to("Pet")),
                ),
            );
        let new = Operation::default()
            .with_response(
                "200",
                ApiResponse::new("second")
                    .with_content("application/json", MediaType::new(Schema::of_type("string")))
                    .with_content("application/xml", MediaType::new(Schema::reference_to("Pet"))),
            )
            .with_response("404", ApiResponse::new("not found"));

        let merged = merge_operation(current, new);

        assert_eq!(
            merged.responses.keys().collect::<Vec<_>>(),
            vec!["200", "404"]
        );
        let ok = merged.responses.get("200").expect("200");
        assert_eq!(ok.description.as_deref(), Some("first"));
        assert_eq!(
            ok.content.keys().collect::<Vec<_>>(),
            vec!["application/json", "application/xml"]
        );
        assert_eq!(
            ok.content
                .get("application/json")
                .and_then(|media| media.schema.clone()),
            Some(Schema::reference_to("Pet"))
        );
    }

    #[test]
    fn should_merge_request_bodies_and_tags() {
        let current = Operation {
            tags: vec!["pets".to_string()],
            ..Operation::with_id("createPet")
        }
        .with_request_body(
            RequestBody::default()
                .with_content("application/json", MediaType::new(Schema::reference_to("Pet"))),
        );
        let new = Operation {
            tags: vec!["animals".to_string(), "pets".to_string()],
            ..Operation::with_id("other")
        }
        .with_request_body(
            RequestBody::default().with_content(
                "application/x-www-form-urlencoded",
                MediaType::new(Schema::reference_to("Pet")),
            ),
        );

        let merged = merge_operation(current, new);

        assert_eq!(merged.operation_id.as_deref(), Some("createPet"));
        assert_eq!(merged.tags, vec!["animals", "pets"]);
        let body = merged.request_body.expect("request body");
        assert_eq!(body.content.len(), 2);
    }
}
