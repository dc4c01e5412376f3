//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the session endpoints, the debug diagnostics, and the
//! health checks together with the schemas they exchange. The document is
//! served by Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, SessionSnapshot};
use crate::inbound::http::auth::SignInRequest;
use crate::inbound::http::diagnostics::{BackendReport, EnvVarReport};

/// Enrich the generated document with the session cookie security scheme.
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
                "Encrypted session cookie set by the auth callback or POST /api/v1/auth/sign-in.",
            ))),
        );
    }
}

/// OpenAPI document for the portal API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Tutor portal API",
        description = "Session bootstrap, sign-in, sign-out, and health checks for the tutor dashboard."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth_callback::authorize,
        crate::inbound::http::auth_callback::auth_callback,
        crate::inbound::http::auth::sign_in,
        crate::inbound::http::auth::sign_out,
        crate::inbound::http::auth::current_session,
        crate::inbound::http::diagnostics::env_report,
        crate::inbound::http::diagnostics::backend_report,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        SessionSnapshot,
        SignInRequest,
        EnvVarReport,
        BackendReport
    )),
    tags(
        (name = "auth", description = "Session bootstrap and sign-in"),
        (name = "diagnostics", description = "Configuration presence checks"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI registration and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", &["code", "message", "traceId"])]
    #[case("SessionSnapshot", &["userId", "email", "expiresAt"])]
    #[case("SignInRequest", &["email", "password"])]
    #[case("EnvVarReport", &["name", "present", "length"])]
    #[case("BackendReport", &["configured", "host", "error"])]
    fn schema_exposes_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        for field in fields {
            assert_object_schema_has_field(schema, field);
        }
    }

    #[rstest]
    #[case("/auth/authorize")]
    #[case("/auth/callback")]
    #[case("/api/v1/auth/sign-in")]
    #[case("/api/v1/auth/sign-out")]
    #[case("/api/v1/session")]
    #[case("/api/debug/env")]
    #[case("/api/debug/backend")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_endpoint_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
