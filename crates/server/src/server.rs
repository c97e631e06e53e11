use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{ServerError, admin, donations, follows, posts, transactions, wallets};
use engine::{Account, AccountKind, Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolve Basic credentials and attach the [`Account`] to the request.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let account = match state
        .engine
        .authenticate(credentials.username(), credentials.password())
        .await
    {
        Ok(account) => account,
        Err(EngineError::Unauthorized(_)) => return Err(StatusCode::UNAUTHORIZED),
        Err(err) => {
            tracing::error!("authentication failed: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

/// Reject callers whose account is not of `kind`.
pub(crate) fn require_kind(account: &Account, kind: AccountKind) -> Result<(), ServerError> {
    if account.kind != kind {
        return Err(ServerError::Engine(EngineError::Forbidden(format!(
            "{} account required",
            kind.as_str()
        ))));
    }
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// Build the application router.
pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    let public = Router::new()
        .route("/health", get(health))
        .route("/donations", get(donations::list))
        .route("/donations/{id}", get(donations::get))
        .route("/wallets/{institute_id}", get(wallets::get))
        .route("/institutes/{id}/followers", get(follows::followers))
        .route("/posts", get(posts::list))
        .route("/posts/{id}", get(posts::get));

    let authenticated = Router::new()
        .route("/donations", post(donations::create))
        .route("/donations/{id}", put(donations::edit))
        .route("/donations/{id}/items", put(donations::replace_items))
        .route(
            "/donations/{id}/items/{item_id}/status",
            put(donations::change_item_status),
        )
        .route("/transactions", get(transactions::list))
        .route("/transactions/pay/{institute_id}", post(transactions::pay))
        .route("/transactions/withdraw", post(transactions::withdraw))
        .route("/wallets/activation", post(wallets::request_activation))
        .route("/admin/withdraw-requests", get(admin::list_withdraw_requests))
        .route(
            "/admin/withdraw-requests/{id}",
            put(admin::review_withdraw_request),
        )
        .route(
            "/admin/wallet-activation-requests",
            get(admin::list_activation_requests),
        )
        .route(
            "/admin/wallet-activation-requests/{id}",
            put(admin::review_activation_request),
        )
        .route("/admin/posts/{id}/status", put(posts::moderate))
        .route("/follows", get(follows::following))
        .route(
            "/follows/{institute_id}",
            post(follows::follow).delete(follows::unfollow),
        )
        .route("/followers/{user_id}", delete(follows::remove_follower))
        .route("/posts", post(posts::create))
        .route("/posts/feed", get(posts::feed))
        .route("/posts/{id}", put(posts::edit).delete(posts::delete))
        .route("/posts/{id}/status", put(posts::change_status))
        .route("/posts/{id}/like", put(posts::like))
        .route("/posts/{id}/comments", post(posts::comment))
        .route(
            "/posts/{id}/comments/{comment_id}/replies",
            post(posts::reply),
        )
        .route("/posts/{id}/shares", post(posts::share))
        .route("/posts/{id}/block", put(posts::block).delete(posts::unblock))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    public.merge(authenticated).with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
