use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};

use crate::{
    models::{board::PostForm, page::ListQuery},
    AppState, Result,
};

use super::{
    extract::{ApiJson, ApiPath, ApiQuery},
    form::download_response,
};

pub fn api_handler() -> Router {
    Router::new()
        .route("/boards", get(list_boards).post(create_board))
        .route("/boards/popular", get(popular_boards))
        .route(
            "/boards/{id}",
            get(get_board).put(update_board).delete(delete_board),
        )
        .route("/boards/{id}/download", get(download_board))
}

async fn list_boards(
    Extension(app_state): Extension<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page_request(app_state.config.page_size);
    let posts = app_state
        .board_service
        .search_posts(query.search_keyword.as_deref(), query.search_type(), &page)
        .await?;

    Ok((StatusCode::OK, Json(posts)))
}

async fn popular_boards(
    Extension(app_state): Extension<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page_request(app_state.config.page_size);
    let posts = app_state.board_service.get_popular_posts(&page).await?;

    Ok((StatusCode::OK, Json(posts)))
}

async fn create_board(
    Extension(app_state): Extension<Arc<AppState>>,
    ApiJson(new_post): ApiJson<PostForm>,
) -> Result<impl IntoResponse> {
    let post = app_state.board_service.create_post(new_post, None).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

async fn get_board(
    Extension(app_state): Extension<Arc<AppState>>,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<impl IntoResponse> {
    let post = app_state.board_service.view_post(post_id).await?;

    Ok((StatusCode::OK, Json(post)))
}

async fn update_board(
    Extension(app_state): Extension<Arc<AppState>>,
    ApiPath(post_id): ApiPath<i32>,
    ApiJson(update_post): ApiJson<PostForm>,
) -> Result<impl IntoResponse> {
    let post = app_state
        .board_service
        .update_post(post_id, update_post, None)
        .await?;

    Ok((StatusCode::OK, Json(post)))
}

async fn delete_board(
    Extension(app_state): Extension<Arc<AppState>>,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<impl IntoResponse> {
    app_state.board_service.delete_post(post_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn download_board(
    Extension(app_state): Extension<Arc<AppState>>,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<impl IntoResponse> {
    let download = app_state.board_service.open_attachment(post_id).await?;

    Ok(download_response(download))
}
