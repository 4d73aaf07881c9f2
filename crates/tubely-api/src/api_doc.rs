//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use tubely_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video ingestion API. Uploaded videos are probed for orientation, remuxed for progressive playback and stored in an object store; reads return time-limited signed URLs."
    ),
    paths(
        handlers::video_upload::upload_video,
        handlers::thumbnail_upload::upload_thumbnail,
        handlers::video_get::get_video,
        handlers::health::health,
    ),
    components(schemas(
        models::VideoResponse,
        error::ErrorResponse,
        handlers::health::HealthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "videos", description = "Video uploads and retrieval"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_upload_routes_and_bearer_scheme() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/api/videos/{videoID}/video"));
        assert!(spec.paths.paths.contains_key("/api/videos/{videoID}/thumbnail"));
        assert!(spec.paths.paths.contains_key("/api/videos/{videoID}"));

        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
