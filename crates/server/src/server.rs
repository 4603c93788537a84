use std::{future::Future, sync::Arc};

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::{ServerError, auth, expenses, health};
use api_types::ErrorResponse;
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Id of the user a request was authenticated as.
///
/// Inserted by the bearer middleware; handlers behind it read it with
/// `Extension<AuthUser>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

/// Routing options read from the settings file.
#[derive(Clone, Debug, Default)]
pub struct RouterConfig {
    /// Prefix for every route, e.g. `/api`. Empty mounts at the root.
    pub base_path: String,
    /// Origins allowed by CORS. Empty allows none.
    pub allowed_origins: Vec<String>,
}

async fn require_bearer(
    State(state): State<ServerState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(ServerError::Unauthorized(
            "Authentication required".to_string(),
        ));
    };

    let user_id = state.engine.verify(bearer.token()).await?;
    request.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(request).await)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Not found".to_string(),
        }),
    )
}

fn cors(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn router(state: ServerState, config: &RouterConfig) -> Router {
    let protected = Router::new()
        .route("/expenses", post(expenses::create).get(expenses::list))
        .route("/expenses/summary", get(expenses::summary))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    let routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(health::get))
        .merge(protected);

    let base_path = config.base_path.trim_matches('/');
    let routes = if base_path.is_empty() {
        routes
    } else {
        Router::new().nest(&format!("/{base_path}"), routes)
    };

    routes
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors(&config.allowed_origins))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves.
pub async fn run_with_listener(
    engine: Arc<Engine>,
    config: &RouterConfig,
    listener: tokio::net::TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState { engine };

    axum::serve(listener, router(state, config))
        .with_graceful_shutdown(shutdown)
        .await
}
