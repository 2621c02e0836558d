pub mod func;
pub mod user;

use std::sync::Arc;

use axum::{
    handler::Handler,
    http::StatusCode,
    routing::{get, post, MethodRouter},
    Router,
};
use serde_json::json;

use crate::{Notifier, Response, Store};

/// 所有处理函数共享的状态
pub struct AppState<S> {
    pub store: Arc<S>,
    pub notifier: Notifier,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<S: Store> AppState<S> {
    pub fn new(store: S, notifier: Notifier) -> Self {
        Self {
            store: Arc::new(store),
            notifier,
        }
    }
}

pub fn router<S: Store>(state: AppState<S>) -> Router {
    func::func_router()
        .merge(user::user_router())
        .route("/health", get(health))
        .with_state(state)
}

/// 函数接口只接受 POST，OPTIONS 用于跨域预检，其余方法返回 405
pub(crate) fn function<S, H, T>(handler: H) -> MethodRouter<AppState<S>>
where
    S: Store,
    H: Handler<T, AppState<S>>,
    T: 'static,
{
    post(handler).options(preflight).fallback(method_not_allowed)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    Response::method_not_allowed()
}

async fn health() -> Response {
    Response::ok("ok", json!({ "status": "ok" }))
}
