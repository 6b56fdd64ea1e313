use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, Method, Request, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::error::{Result, TutorError};
use crate::handlers::{AppState, catalog, practice, solve};
use crate::models::SolveResponse;
use crate::solver::{MathSolver, SolverConfig};
use crate::transport::GroqTransport;

/// Build the solver from configuration with the real Groq transport.
pub fn solver_from_config(config: &Config) -> Result<MathSolver> {
    let transport = Arc::new(GroqTransport::from_config(&config.groq)?);
    Ok(MathSolver::new(transport, SolverConfig::from(&config.groq)))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Routes served next to the configurable solve path.
const BUILT_IN_ROUTES: [&str; 4] = ["/practice", "/subjects", "/formulae", "/health"];

/// The solve path must be a static absolute path that no built-in route uses.
pub fn check_solve_path(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(TutorError::Internal(format!(
            "Invalid solve path '{path}': must start with '/'"
        )));
    }
    if path.contains([':', '*', '{', '}']) || path.contains("//") {
        return Err(TutorError::Internal(format!(
            "Invalid solve path '{path}': must be a static path"
        )));
    }
    if BUILT_IN_ROUTES.contains(&path) {
        return Err(TutorError::Internal(format!(
            "Invalid solve path '{path}': already used by a built-in route"
        )));
    }
    Ok(())
}

/// Router with every public route. CORS wraps auth so preflights pass.
pub fn build_router(state: AppState, server: &ServerConfig) -> Result<Router> {
    check_solve_path(&server.solve_path)?;

    let mut router = Router::new()
        .route(server.solve_path.as_str(), post(solve::solve))
        .route("/practice", post(practice::practice))
        .route("/subjects", get(catalog::subjects))
        .route("/formulae", get(catalog::formulae))
        .with_state(state);

    if let Some(expected) = server.bearer_token.clone() {
        let expected = Arc::new(format!("Bearer {expected}"));
        router = router.layer(middleware::from_fn_with_state(expected, require_bearer));
    }

    Ok(router
        .route("/health", get(|| async { "ok" }))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http()))
}

async fn require_bearer(
    State(expected): State<Arc<String>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| v == expected.as_str());

    if !authorized {
        tracing::warn!(path = %req.uri().path(), "Rejected request without valid bearer token");
        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(SolveResponse::failure("Unauthorized")),
        )
            .into_response();
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static("Bearer"),
        );
        return response;
    }
    next.run(req).await
}
