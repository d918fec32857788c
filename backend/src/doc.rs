//! OpenAPI document for the design-request API.
//!
//! Paths come from the inbound HTTP handlers; the error envelope is
//! registered through the wrappers in [`crate::inbound::http::schemas`] so the
//! domain stays free of utoipa. Swagger UI serves this document in debug
//! builds and `openapi-dump` prints it.

use crate::inbound::http::applications::{
    ApplicationResponse, ApplicationStatusDto, CreateApplicationRequest, FavoriteRequest,
    ImagePayload, TransitionRequestBody,
};
use crate::inbound::http::categories::{CategoryResponse, CreateCategoryRequest};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{LoginRequest, RegisterRequest, UserResponse};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Design desk API",
        description = "Design requests from applicants, reviewed by staff."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::categories::create_category,
        crate::inbound::http::categories::delete_category,
        crate::inbound::http::applications::create_application,
        crate::inbound::http::applications::list_applications,
        crate::inbound::http::applications::get_application,
        crate::inbound::http::applications::delete_application,
        crate::inbound::http::applications::transition_application,
        crate::inbound::http::applications::set_favorite,
        crate::inbound::http::applications::get_image,
        crate::inbound::http::applications::get_design_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        LoginRequest,
        RegisterRequest,
        UserResponse,
        CreateCategoryRequest,
        CategoryResponse,
        CreateApplicationRequest,
        ImagePayload,
        TransitionRequestBody,
        FavoriteRequest,
        ApplicationResponse,
        ApplicationStatusDto,
    )),
    tags(
        (name = "users", description = "Registration, login and the current account"),
        (name = "categories", description = "Categories requests are filed under"),
        (name = "applications", description = "Design requests and their review"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected object schema for {name}"),
        }
    }

    #[rstest]
    #[case("crate.domain.Error", &["code", "message", "traceId", "details"])]
    #[case("ApplicationResponse", &["status", "comment", "designImageUrl", "favorite"])]
    #[case("RegisterRequest", &["username", "passwordConfirm"])]
    fn schemas_use_wire_field_names(#[case] name: &str, #[case] fields: &[&str]) {
        let present = object_fields(name);
        for field in fields {
            assert!(present.iter().any(|f| f == field), "{name} lacks {field}");
        }
    }

    #[rstest]
    #[case("/api/v1/applications/{id}/transition")]
    #[case("/api/v1/applications/{id}/design-image")]
    #[case("/api/v1/categories/{id}")]
    #[case("/health/ready")]
    fn documents_every_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn registers_the_session_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
