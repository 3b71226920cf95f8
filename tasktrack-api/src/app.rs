/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasktrack_api::{app::{build_router, AppState}, config::Config};
/// use tasktrack_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::{Config, RECOMMENDED_SECRET_LEN},
    error::ApiError,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tasktrack_shared::{
    auth::{
        jwt,
        service::{AuthConfig, AuthService},
    },
    services::{CategoryService, StatsService, TaskService},
    store::SharedStore,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; every field is a
/// cheap handle around the same store.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub tasks: TaskService,
    pub categories: CategoryService,
    pub stats: StatsService,
}

impl AppState {
    /// Wires the services to a store
    pub fn new(store: SharedStore, config: Config) -> Self {
        match config.jwt.secret.as_deref() {
            None => warn!("JWT_SECRET is not set; login and protected routes will fail"),
            Some(secret) if secret.len() < RECOMMENDED_SECRET_LEN => warn!(
                min_len = RECOMMENDED_SECRET_LEN,
                "JWT_SECRET is shorter than recommended"
            ),
            Some(_) => {}
        }

        let auth = AuthService::new(
            store.clone(),
            AuthConfig {
                jwt_secret: config.jwt.secret.clone(),
            },
        );

        Self {
            tasks: TaskService::new(store.clone()),
            categories: CategoryService::new(store.clone()),
            stats: StatsService::new(store.clone()),
            auth,
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token validation
    pub fn jwt_secret(&self) -> Option<&str> {
        self.config.jwt.secret.as_deref()
    }
}

/// Authenticated caller, inserted into request extensions by the JWT layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /health
/// └── /api
///     ├── /auth                     (public)
///     │   ├── POST /register
///     │   └── POST /login
///     ├── /tasks                    (Bearer token)
///     │   ├── GET    /              ?page&limit&search&status&category_id
///     │   ├── POST   /
///     │   ├── GET    /stats
///     │   ├── GET    /:id
///     │   ├── PUT    /:id
///     │   └── DELETE /:id
///     └── /categories               (Bearer token)
///         ├── GET    /
///         ├── POST   /
///         └── DELETE /:id
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/stats", get(routes::tasks::task_stats))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        );

    let category_routes = Router::new()
        .route(
            "/",
            get(routes::categories::list_categories).post(routes::categories::create_category),
        )
        .route("/:id", delete(routes::categories::delete_category));

    let protected_routes = Router::new()
        .nest("/tasks", task_routes)
        .nest("/categories", category_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates `Authorization: Bearer <token>` and injects [`AuthUser`].
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let secret = state
        .jwt_secret()
        .ok_or_else(|| ApiError::InternalError("JWT secret is not configured".to_string()))?;

    let claims = jwt::validate_token(token, secret)?;
    req.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
    });

    Ok(next.run(req).await)
}
