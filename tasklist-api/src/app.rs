/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use tasklist_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config)?;
/// let app = tasklist_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use tasklist_shared::auth::jwt::{create_token, Claims};
use tasklist_shared::auth::middleware::{jwt_auth_middleware, optional_jwt_auth_middleware, AuthState};
use tasklist_shared::auth::password::{Argon2Hasher, CredentialHasher, PasswordError};
use tasklist_shared::models::user::User;
use tasklist_shared::repository::{PgTaskRepository, PgUserRepository, TaskRepository, UserRepository};
use tasklist_shared::services::{TaskService, UserService};

use crate::{config::Config, error::ApiResult, routes};

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is reference counted, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,

    pub users: UserService,

    /// User store, also used for health checks
    pub user_store: Arc<dyn UserRepository>,

    pub task_store: Arc<dyn TaskRepository>,

    pub hasher: Arc<dyn CredentialHasher>,

    /// State of the JWT layers
    pub auth: AuthState,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates state backed by Postgres
    ///
    /// # Errors
    ///
    /// Fails if the configured password hash cost is rejected by Argon2
    pub fn new(db: PgPool, config: Config) -> Result<Self, PasswordError> {
        let hasher = Argon2Hasher::with_memory(config.password.memory_kib)?;

        Ok(Self::from_parts(
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgTaskRepository::new(db)),
            Arc::new(hasher),
            config,
        ))
    }

    /// Creates state from explicit stores and hasher
    ///
    /// Used by tests to run the full router over an in-memory store.
    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        hasher: Arc<dyn CredentialHasher>,
        config: Config,
    ) -> Self {
        Self {
            tasks: TaskService::new(users.clone(), tasks.clone()),
            users: UserService::new(users.clone(), tasks.clone(), hasher.clone()),
            auth: AuthState::new(users.clone(), config.jwt.secret.as_str()),
            user_store: users,
            task_store: tasks,
            hasher,
            config: Arc::new(config),
        }
    }

    /// Issues an access token for `user`
    pub fn issue_token(&self, user: &User) -> ApiResult<String> {
        let claims = Claims::with_expiration(
            user.id,
            user.email.as_str(),
            user.authority,
            Duration::hours(self.config.jwt.expiration_hours),
        );
        Ok(create_token(&claims, &self.auth.secret)?)
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /api/v1/
///     ├── /auth/
///     │   ├── POST /register        # public, admin token optional
///     │   └── POST /login           # public
///     ├── /tasks                    # JWT required
///     │   ├── GET                   # admin
///     │   ├── /user                 # caller's own tasks
///     │   │   ├── GET, POST
///     │   │   └── /:id              # GET, PUT, PATCH, DELETE own;
///     │   │                         # POST creates for user :id (admin)
///     │   └── /:id                  # GET, PUT, PATCH, DELETE (admin)
///     └── /users                    # JWT required
///         ├── GET                   # admin
///         ├── /self                 # GET, PUT, PATCH, DELETE
///         └── /:id                  # GET, PUT, PATCH, DELETE (admin)
/// ```
///
/// Privilege is decided by the services; the layers only establish who the
/// caller is.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route(
            "/register",
            post(routes::auth::register).route_layer(middleware::from_fn_with_state(
                state.auth.clone(),
                optional_jwt_auth_middleware,
            )),
        )
        .route("/login", post(routes::auth::login));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_all))
        .route(
            "/user",
            get(routes::tasks::list_own).post(routes::tasks::create_own),
        )
        .route(
            "/user/:id",
            get(routes::tasks::get_own)
                .put(routes::tasks::replace_own)
                .patch(routes::tasks::patch_own)
                .delete(routes::tasks::delete_own)
                .post(routes::tasks::create_for_user),
        )
        .route(
            "/:id",
            get(routes::tasks::get)
                .put(routes::tasks::replace)
                .patch(routes::tasks::patch)
                .delete(routes::tasks::delete),
        );

    let user_routes = Router::new()
        .route("/", get(routes::users::list_all))
        .route(
            "/self",
            get(routes::users::get_self)
                .put(routes::users::replace_self)
                .patch(routes::users::patch_self)
                .delete(routes::users::delete_self),
        )
        .route(
            "/:id",
            get(routes::users::get)
                .put(routes::users::replace)
                .patch(routes::users::patch)
                .delete(routes::users::delete),
        );

    let protected_routes = Router::new()
        .nest("/tasks", task_routes)
        .nest("/users", user_routes)
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            jwt_auth_middleware,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}
