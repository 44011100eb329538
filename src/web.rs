use crate::config;
use crate::config::FrontendConfig;
use crate::logging::*;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

struct AppState {
    frontend: FrontendConfig,
}

pub async fn run(frontend: FrontendConfig) {
    let log = DEFAULT.new(o!("function" => "run"));

    let state = Arc::new(AppState { frontend });
    let app = router(state);

    let addr = "0.0.0.0:8001";
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!(log, "Serving"; "addr" => addr);
    axum::serve(listener, app).await.unwrap();
}

fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/config", get(frontend_config))
        .with_state(state);

    Router::new()
        .route("/healthcheck", get(|| async { "OK" }))
        .nest(&config::api_v1_str(), api)
        .layer(cors_layer())
}

/// Runtime environment for the browser application.
async fn frontend_config(State(state): State<Arc<AppState>>) -> Json<FrontendConfig> {
    Json(state.frontend.clone())
}

fn cors_layer() -> CorsLayer {
    let origins = config::cors_origins();
    let suffixes = config::cors_origin_suffixes();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _: &axum::http::request::Parts| {
                origin
                    .to_str()
                    .map(|origin| origin_allowed(&origins, &suffixes, origin))
                    .unwrap_or(false)
            },
        ))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

// Origins matching a listed suffix must be HTTPS; listed origins are
// admitted as-is.
fn origin_allowed(origins: &[String], suffixes: &[String], origin: &str) -> bool {
    if origins.iter().any(|allowed| allowed == origin) {
        return true;
    }
    origin.starts_with("https://")
        && suffixes.iter().any(|suffix| origin.ends_with(suffix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_origin_allowed() {
        let origins = vec!["http://localhost:3000".to_string()];
        let suffixes = vec![".netlify.app".to_string(), ".herokuapp.com".to_string()];

        assert!(origin_allowed(&origins, &suffixes, "http://localhost:3000"));
        assert!(origin_allowed(
            &origins,
            &suffixes,
            "https://recipe-app.netlify.app"
        ));
        assert!(origin_allowed(
            &origins,
            &suffixes,
            "https://fastapi-recipe-app.herokuapp.com"
        ));

        // Suffix matches are HTTPS-only
        assert!(!origin_allowed(
            &origins,
            &suffixes,
            "http://recipe-app.netlify.app"
        ));
        assert!(!origin_allowed(&origins, &suffixes, "https://example.test"));
        assert!(!origin_allowed(&origins, &suffixes, "http://localhost:8001"));
    }

    fn clear_web_env() {
        unsafe {
            std::env::remove_var("REACT_APP_API_BASE_PATH");
            std::env::remove_var("REACT_APP_MODE");
            std::env::remove_var("API_V1_STR");
            std::env::remove_var("BACKEND_CORS_ORIGINS");
            std::env::remove_var("BACKEND_CORS_ORIGIN_SUFFIXES");
        }
    }

    async fn spawn_server() -> std::net::SocketAddr {
        let state = Arc::new(AppState {
            frontend: config::frontend(),
        });
        let app = router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    #[serial]
    async fn test_healthcheck() {
        clear_web_env();
        let addr = spawn_server().await;
        let body = reqwest::get(format!("http://{addr}/healthcheck"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    #[serial]
    async fn test_frontend_config_endpoint() {
        clear_web_env();
        unsafe {
            std::env::set_var("REACT_APP_MODE", "staging");
        }
        let addr = spawn_server().await;
        let body: serde_json::Value = reqwest::get(format!("http://{addr}/api/v1/config"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["apiBasePath"], "http://localhost:8001");
        assert_eq!(body["reactAppMode"], "staging");
        assert_eq!(body.as_object().unwrap().len(), 2);
        unsafe {
            std::env::remove_var("REACT_APP_MODE");
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_cors_allows_listed_origin_only() {
        clear_web_env();
        let addr = spawn_server().await;
        let client = reqwest::Client::new();

        let res = client
            .get(format!("http://{addr}/healthcheck"))
            .header("Origin", "http://localhost:3000")
            .send()
            .await
            .unwrap();
        let allowed = res
            .headers()
            .get("access-control-allow-origin")
            .map(|value| value.to_str().unwrap().to_string());
        assert_eq!(allowed, Some("http://localhost:3000".to_string()));

        let res = client
            .get(format!("http://{addr}/healthcheck"))
            .header("Origin", "http://evil.test")
            .send()
            .await
            .unwrap();
        assert!(res.headers().get("access-control-allow-origin").is_none());
    }
}
