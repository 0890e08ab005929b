use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit, middleware::from_fn, response::Redirect, routing::get, Extension,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{api::api_handler, board::board_handler},
    middleware::log_server_errors,
    AppState,
};

/// Room for the text fields and multipart framing around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_routes(app_state: Arc<AppState>) -> Router {
    let body_limit = app_state.config.max_file_size as usize + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(|| async { Redirect::to("/board/list") }))
        .nest("/board", board_handler())
        .nest("/api", api_handler())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(log_server_errors))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
}
