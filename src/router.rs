use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::JwtKeys;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::store::TodoStore;
use crate::handlers::{system, todos};
use crate::middleware::jwt_auth_middleware;
use crate::services::todo_service::TodoService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub todos: TodoService,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, jwt: JwtKeys) -> Self {
        Self {
            todos: TodoService::new(store),
            jwt,
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        // Protected
        .merge(todo_routes(&state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.security))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        )
        .with_state(state)
}

fn todo_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/todos", get(todos::list).post(todos::create))
        .route("/api/todos/:id", put(todos::update).delete(todos::delete))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            jwt_auth_middleware,
        ))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
