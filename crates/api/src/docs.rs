//! OpenAPI document and the Swagger UI portal.
//!
//! The UI is mounted at `DOCS_PATH` and the raw document at `{DOCS_PATH}-json`.
//! Outside development both are behind HTTP basic auth (user `gatico`,
//! password from `SWAGGER_PASSWORD`).

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::HeaderValue;
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cats_core::error::CoreError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{DocsConfig, Environment};
use crate::error::AppError;
use crate::state::AppState;
use crate::{handlers, response, routes};

/// Fixed basic-auth username for the documentation portal.
pub const DOCS_USERNAME: &str = "gatico";

/// Name of the bearer security scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "bearer";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cats Management API",
        description = "### API to manage your Cats.",
        version = "1.0.0",
        license(name = "MIT", url = "https://opensource.org/license/mit"),
    ),
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::register,
        handlers::auth::change_password,
        handlers::auth::logout,
        handlers::users::get_me,
        handlers::users::update_me,
        routes::health::health_check,
    ),
    components(schemas(
        handlers::auth::LoginRequest,
        handlers::auth::RefreshRequest,
        handlers::auth::RegisterRequest,
        handlers::auth::ChangePasswordRequest,
        handlers::auth::AuthResponse,
        handlers::users::UpdateProfileRequest,
        response::MessageResponse,
        response::ErrorResponse,
        cats_core::auth::UserView,
        cats_core::roles::Role,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Authentication and session lifecycle"),
        (name = "users", description = "Current user profile"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` JWT security scheme.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Build the OpenAPI document with a deterministic layout.
///
/// Paths and component schemas are keyed maps ordered by key; tags are
/// sorted here so the output does not depend on declaration order.
pub fn build_document() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if let Some(tags) = doc.tags.as_mut() {
        tags.sort_by(|a, b| a.name.cmp(&b.name));
    }
    doc
}

/// Swagger UI plus the JSON document, gated outside development.
pub fn docs_router(config: &DocsConfig, environment: Environment) -> Router<AppState> {
    let json_path = format!("{}-json", config.path);
    let router: Router<AppState> = SwaggerUi::new(config.path.clone())
        .url(json_path, build_document())
        .into();

    if environment.is_development() {
        tracing::warn!(path = %config.path, "API docs are served without authentication");
        return router;
    }

    match &config.password {
        Some(password) => {
            let gate = Arc::new(BasicAuthGate::new(DOCS_USERNAME, password));
            router.layer(from_fn_with_state(gate, require_basic_auth))
        }
        // Config loading refuses this combination; stay closed if it ever happens.
        None => {
            tracing::error!("SWAGGER_PASSWORD missing outside development; docs disabled");
            Router::new()
        }
    }
}

type HmacSha256 = Hmac<Sha256>;

/// Keyed digest of the expected `user:password` pair.
///
/// Presented credentials are run through the same MAC and checked with
/// `verify_slice`, which compares in constant time.
pub struct BasicAuthGate {
    expected_tag: Vec<u8>,
}

const GATE_KEY: &[u8] = b"cats-docs-basic-auth";

impl BasicAuthGate {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            expected_tag: Self::mac(format!("{username}:{password}").as_bytes()),
        }
    }

    fn mac(credentials: &[u8]) -> Vec<u8> {
        let mut mac = Self::keyed();
        mac.update(credentials);
        mac.finalize().into_bytes().to_vec()
    }

    fn keyed() -> HmacSha256 {
        // HMAC accepts keys of any length, so this cannot fail.
        match HmacSha256::new_from_slice(GATE_KEY) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC accepts any key length"),
        }
    }

    /// Check an `Authorization` header value of the form `Basic <base64>`.
    pub fn allows(&self, header: &str) -> bool {
        let Some(encoded) = header.strip_prefix("Basic ") else {
            return false;
        };
        let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let mut mac = Self::keyed();
        mac.update(&decoded);
        mac.verify_slice(&self.expected_tag).is_ok()
    }
}

async fn require_basic_auth(
    State(gate): State<Arc<BasicAuthGate>>,
    request: Request,
    next: Next,
) -> Response {
    let allowed = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| gate.allows(v));

    if allowed {
        return next.run(request).await;
    }

    tracing::debug!(path = %request.uri().path(), "Docs request rejected");
    let mut response = AppError::Core(CoreError::Unauthorized(
        "Documentation requires authentication".into(),
    ))
    .into_response();
    response.headers_mut().insert(
        WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"docs\""),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(credentials: &str) -> String {
        format!("Basic {}", STANDARD.encode(credentials))
    }

    #[test]
    fn test_document_info() {
        let doc = build_document();
        assert_eq!(doc.info.title, "Cats Management API");
        assert_eq!(doc.info.version, "1.0.0");
        assert_eq!(
            doc.info.description.as_deref(),
            Some("### API to manage your Cats.")
        );
        let license = doc.info.license.as_ref().expect("license");
        assert_eq!(license.name, "MIT");
        assert_eq!(
            license.url.as_deref(),
            Some("https://opensource.org/license/mit")
        );
    }

    #[test]
    fn test_document_is_sorted() {
        let doc = build_document();

        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
        assert!(doc.paths.paths.contains_key("/v1/auth/login"));
        assert!(doc.paths.paths.contains_key("/v1/users/me"));

        let components = doc.components.as_ref().expect("components");
        let schemas: Vec<&String> = components.schemas.keys().collect();
        let mut sorted = schemas.clone();
        sorted.sort();
        assert_eq!(schemas, sorted);

        let tags: Vec<&str> = doc
            .tags
            .as_ref()
            .expect("tags")
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(tags, ["auth", "health", "users"]);
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = build_document();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }

    #[test]
    fn test_gate_accepts_only_exact_credentials() {
        let gate = BasicAuthGate::new(DOCS_USERNAME, "meow");
        assert!(gate.allows(&basic("gatico:meow")));
        assert!(!gate.allows(&basic("gatico:meoww")));
        assert!(!gate.allows(&basic("admin:meow")));
        assert!(!gate.allows("Bearer gatico:meow"));
        assert!(!gate.allows("Basic not-base64!!"));
    }
}
