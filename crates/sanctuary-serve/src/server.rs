//! Web server setup and routing

use anyhow::Result;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::config::ServeConfig;

/// Routes for the bundle and its assets.
///
/// Assets are reachable under `/assets` and also at the root, where the
/// bundle fetches them relative to the page.
pub fn router(config: &ServeConfig) -> Router {
    Router::new()
        .nest_service("/assets", ServeDir::new(&config.paths.assets))
        // Static files (WASM frontend) - must be fallback for root
        .fallback_service(
            ServeDir::new(&config.paths.web).fallback(ServeDir::new(&config.paths.assets)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Run the web server
pub async fn run(config: &ServeConfig) -> Result<()> {
    let app = router(config);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "Web server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathsConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    struct Site {
        _web: tempfile::TempDir,
        _assets: tempfile::TempDir,
        config: ServeConfig,
    }

    fn site() -> Site {
        let web = tempfile::tempdir().unwrap();
        let assets = tempfile::tempdir().unwrap();
        std::fs::write(web.path().join("index.html"), "<canvas id=\"sanctuary-canvas\">").unwrap();
        std::fs::write(assets.path().join("digiDouble.glb"), b"glTF").unwrap();

        let config = ServeConfig {
            paths: PathsConfig {
                web: web.path().to_path_buf(),
                assets: assets.path().to_path_buf(),
            },
            ..Default::default()
        };
        Site {
            _web: web,
            _assets: assets,
            config,
        }
    }

    async fn status(config: &ServeConfig, uri: &str) -> StatusCode {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        router(config).oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_serves_index_at_root() {
        let site = site();
        assert_eq!(status(&site.config, "/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_assets_resolve_at_root_and_under_prefix() {
        let site = site();
        assert_eq!(status(&site.config, "/digiDouble.glb").await, StatusCode::OK);
        assert_eq!(status(&site.config, "/assets/digiDouble.glb").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let site = site();
        assert_eq!(status(&site.config, "/sanctuary4k.hdr").await, StatusCode::NOT_FOUND);
    }
}
