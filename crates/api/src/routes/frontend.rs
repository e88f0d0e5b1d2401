//! Static frontend serving with single-page-app fallback.
//!
//! Mounted as the router fallback. Unknown `/api/*` paths get a JSON 404;
//! everything else is looked up under the configured static directory and
//! falls back to `index.html` for client-side routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::warn;

use crate::app::AppState;
use crate::error::ApiError;

const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";
const REVALIDATE_CACHE: &str = "no-cache";

pub async fn serve_frontend(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if is_api_path(path) {
        return ApiError::NotFound(format!("No route for /{}", path)).into_response();
    }

    let Some(base_dir) = state.config.frontend.static_dir.as_deref() else {
        return ApiError::NotFound("Not found".to_string()).into_response();
    };

    let Some(relative) = sanitize(path) else {
        warn!(requested_path = %path, "Rejected frontend path");
        return StatusCode::FORBIDDEN.into_response();
    };

    let requested = base_dir.join(&relative);
    if let Ok(response) = serve_file(&requested).await {
        return response;
    }

    // Client-side routes have no extension; missing assets do.
    if relative.extension().is_none() {
        if let Ok(response) = serve_file(&base_dir.join("index.html")).await {
            return response;
        }
        warn!(dir = %base_dir.display(), "Frontend index.html missing");
    }

    StatusCode::NOT_FOUND.into_response()
}

fn is_api_path(path: &str) -> bool {
    path == "api" || path.starts_with("api/")
}

/// Maps a URL path to a relative file path, rejecting anything that could
/// leave the static directory. The empty path maps to `index.html`.
fn sanitize(path: &str) -> Option<PathBuf> {
    if path.is_empty() {
        return Some(PathBuf::from("index.html"));
    }
    let candidate = Path::new(path);
    candidate
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| candidate.to_path_buf())
}

async fn serve_file(path: &Path) -> Result<Response, std::io::Error> {
    let metadata = fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not a file",
        ));
    }

    let content = fs::read(path).await?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let cache_control = if is_immutable_asset(path) {
        IMMUTABLE_CACHE
    } else {
        REVALIDATE_CACHE
    };

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CACHE_CONTROL, cache_control.to_string()),
        ],
        Body::from(content),
    )
        .into_response())
}

/// Bundler output under `assets/` carries content hashes in its file names.
fn is_immutable_asset(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == "assets")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_api_path() {
        assert!(is_api_path("api/unknown"));
        assert!(is_api_path("api"));
        assert!(!is_api_path("apiary"));
        assert!(!is_api_path("journal"));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(""), Some(PathBuf::from("index.html")));
        assert_eq!(sanitize("assets/app.js"), Some(PathBuf::from("assets/app.js")));
        assert_eq!(sanitize("../etc/passwd"), None);
        assert_eq!(sanitize("assets/../../secret"), None);
        assert_eq!(sanitize("./index.html"), None);
    }

    #[test]
    fn test_is_immutable_asset() {
        assert!(is_immutable_asset(Path::new("/srv/app/assets/index-3f2a.js")));
        assert!(!is_immutable_asset(Path::new("/srv/app/index.html")));
    }
}
