use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use chrono::Duration;

use std::sync::Arc;

use crate::{
    ServerError, auth, budgets, feed::FeedRelay, friends, leaderboard, posts, token::TokenKeys,
    transactions,
};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub tokens: Arc<TokenKeys>,
    pub feed: FeedRelay,
}

/// Runtime knobs of the HTTP API.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Posts buffered per feed subscriber before it starts skipping.
    pub feed_capacity: usize,
}

impl ServerConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::minutes(120),
            feed_capacity: 64,
        }
    }
}

impl ServerState {
    pub fn new(engine: Engine, config: &ServerConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            tokens: Arc::new(TokenKeys::new(&config.jwt_secret, config.token_ttl)),
            feed: FeedRelay::new(config.feed_capacity),
        }
    }
}

/// Resolves the bearer token to a user and stores it in the request
/// extensions for the handlers.
async fn authenticate(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        return Err(ServerError::Unauthorized("Not authorized, no token"));
    };
    let Some(user_id) = state.tokens.verify(bearer.token()) else {
        return Err(ServerError::Unauthorized("Not authorized, token failed"));
    };

    let user = match state.engine.user(user_id).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => {
            return Err(ServerError::Unauthorized("Not authorized, token failed"));
        }
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/delete", delete(auth::delete_account))
        .route("/auth/profile-picture", put(auth::profile_picture))
        .route("/friends", get(friends::list))
        .route("/friends/pending", get(friends::pending))
        .route("/friends/request", post(friends::request))
        .route("/friends/accept", post(friends::accept))
        .route("/friends/reject", post(friends::reject))
        .route("/friends/remove", post(friends::remove))
        .route("/friends/search", get(friends::search))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            put(transactions::update).delete(transactions::remove),
        )
        .route("/budgets", get(budgets::list).post(budgets::upsert))
        .route("/budgets/summary", get(budgets::summary))
        .route("/budgets/{id}", delete(budgets::remove))
        .route("/leaderboard/global", get(leaderboard::global))
        .route("/leaderboard/friends", get(leaderboard::friends))
        .route("/posts", get(posts::list).post(posts::create))
        .route("/posts/stream", get(posts::stream))
        .route("/posts/{id}", put(posts::update).delete(posts::remove))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    Router::new()
        .nest("/api", public.merge(protected))
        .with_state(state)
}

pub async fn run(engine: Engine, config: ServerConfig, bind: &str) {
    let listener = match tokio::net::TcpListener::bind(bind).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {bind}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, config, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState::new(engine, &config);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
