use utoipa::openapi::OpenApi;

use super::Document;
use crate::AssemblyError;

impl Document {
    /// Converts a utoipa description, e.g. the output of `#[derive(OpenApi)]`.
    ///
    /// # Errors
    ///
    /// Fails when the utoipa description does not serialize into a valid document.
    pub fn from_utoipa(openapi: &OpenApi) -> Result<Self, AssemblyError> {
        let value = serde_json::to_value(openapi)?;
        super::from_value("<utoipa>", value)
    }
}

#[cfg(test)]
mod tests {
    use utoipa::openapi::path::{OperationBuilder, PathItemBuilder};
    use utoipa::openapi::{InfoBuilder, OpenApiBuilder, ResponseBuilder};

    use super::*;

    #[test]
    fn should_convert_utoipa_openapi() {
        let list_pets = OperationBuilder::new()
            .operation_id(Some("listPets"))
            .response("200", ResponseBuilder::new().description("ok").build())
            .build();

        let mut paths = utoipa::openapi::Paths::new();
        paths.paths.insert(
            "/pets".to_string(),
            PathItemBuilder::new()
                .operation(utoipa::openapi::HttpMethod::Get, list_pets)
                .build(),
        );

        let openapi = OpenApiBuilder::new()
            .info(InfoBuilder::new().title("Pets").version("1.0.0").build())
            .paths(paths)
            .build();

        let doc = Document::from_utoipa(&openapi).expect("valid conversion");

        let info = doc.info.as_ref().expect("info");
        assert_eq!(info.title, "Pets");
        assert_eq!(info.version, "1.0.0");
        let operation = doc
            .paths
            .get("/pets")
            .and_then(|item| item.get.as_ref())
            .expect("GET /pets");
        assert_eq!(operation.operation_id.as_deref(), Some("listPets"));
        assert!(operation.responses.contains_key("200"));
    }
}
