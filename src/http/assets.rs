//! Development static file server.
//!
//! Serves the asset directory under `/assets` so the remote document and the
//! files it points at can be hosted by this process during development.

use std::path::Path;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue},
    middleware::map_response,
    response::Response,
    Router,
};
use tower_http::services::ServeDir;

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Router serving files under `dir`, meant to be mounted with
/// `nest_service("/assets", ..)`.
pub fn router(dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(map_response(json_charset))
}

/// Mobile clients decode JSON assets as UTF-8 only when told to.
async fn json_charset(mut response: Response) -> Response {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if is_json {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use std::fs;
    use tower::ServiceExt;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_json_gets_utf8_charset() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), r#"{"lastUpdatedAt": 1}"#).unwrap();
        fs::write(dir.path().join("logo.png"), [0x89u8, 0x50, 0x4e, 0x47]).unwrap();

        let app: Router = Router::new().nest_service("/assets", router(dir.path()));

        let response = app.clone().oneshot(get("/assets/config.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], JSON_UTF8);

        let response = app.clone().oneshot(get("/assets/logo.png")).await.unwrap();
        assert_eq!(response.headers()[CONTENT_TYPE], "image/png");

        let response = app.oneshot(get("/assets/missing.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
