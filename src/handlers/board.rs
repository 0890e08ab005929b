use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    models::{
        board::PostForm,
        page::ListQuery,
        response::{FormView, ListView, MessageView},
    },
    AppState, Error,
};

use super::{
    extract::{PageMultipart, PagePath, PageQuery},
    form::{download_response, read_submission, Submission},
};

pub fn board_handler() -> Router {
    Router::new()
        .route("/list", get(list))
        .route("/write", get(write_form))
        .route("/writepro", post(write_pro))
        .route("/view", get(view))
        .route("/modify/{id}", get(modify_form))
        .route("/update/{id}", post(update))
        .route("/delete", get(delete))
        .route("/popular", get(popular))
        .route("/download/{id}", get(download))
}

#[derive(Debug, Deserialize)]
struct IdQuery {
    id: i32,
}

/// Failure of a page request, rendered as the generic message view.
#[derive(Debug)]
pub struct MessagePage {
    status: StatusCode,
    view: MessageView,
}

impl MessagePage {
    fn new(status: StatusCode, message: impl Into<String>, search_url: &str) -> Self {
        Self {
            status,
            view: MessageView {
                message: message.into(),
                search_url: search_url.to_string(),
            },
        }
    }
}

impl From<Error> for MessagePage {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound => Self::new(
                StatusCode::NOT_FOUND,
                "The requested post could not be found.",
                "/board/list",
            ),
            Error::AttachmentMissing => Self::new(
                err.status(),
                "The requested file could not be found.",
                "/board/list",
            ),
            Error::Io(_) => Self::new(
                err.status(),
                "A file error occurred. Please try again later.",
                "/board/list",
            ),
            Error::FileTooLarge(_) => Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("{}. Please upload a smaller file.", err.message()),
                "/board/write",
            ),
            Error::BadRequest(ref msg) | Error::Validation(ref msg) => Self::new(
                err.status(),
                format!("Invalid request: {msg}"),
                "/board/list",
            ),
            Error::UnsupportedFileType(_) => Self::new(
                err.status(),
                format!("Invalid request: {}", err.message()),
                "/board/list",
            ),
            Error::DatabaseError(_) => {
                error!("Unhandled error on page request: {:?}", err);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A system error occurred. Please try again later.",
                    "/board/list",
                )
            }
        }
    }
}

impl IntoResponse for MessagePage {
    fn into_response(self) -> Response {
        (self.status, Json(self.view)).into_response()
    }
}

type PageResult = std::result::Result<Response, MessagePage>;

fn form_view(id: Option<i32>, form: PostForm, err: &Error, action: String) -> Response {
    warn!("Form submission rejected: {}", err.message());

    let view = FormView {
        id,
        form,
        error: Some(err.message()),
        action,
    };
    (err.status(), Json(view)).into_response()
}

async fn list(
    Extension(app_state): Extension<Arc<AppState>>,
    PageQuery(query): PageQuery<ListQuery>,
) -> PageResult {
    let page = query.page_request(app_state.config.page_size);
    let search_type = query.search_type();

    info!(
        page = page.page,
        keyword = ?query.search_keyword,
        search_type = search_type.as_str(),
        "List request"
    );

    let paging = app_state
        .board_service
        .search_posts(query.search_keyword.as_deref(), search_type, &page)
        .await?;

    Ok(Json(ListView {
        paging,
        search_keyword: query.search_keyword,
        search_type: search_type.as_str().to_string(),
        is_popular: false,
    })
    .into_response())
}

async fn popular(
    Extension(app_state): Extension<Arc<AppState>>,
    PageQuery(query): PageQuery<ListQuery>,
) -> PageResult {
    let page = query.page_request(app_state.config.page_size);
    info!(page = page.page, "Popular list request");

    let paging = app_state.board_service.get_popular_posts(&page).await?;

    Ok(Json(ListView {
        paging,
        search_keyword: None,
        search_type: "all".to_string(),
        is_popular: true,
    })
    .into_response())
}

async fn write_form() -> Json<FormView> {
    Json(FormView {
        id: None,
        form: PostForm::default(),
        error: None,
        action: "/board/writepro".to_string(),
    })
}

async fn write_pro(
    Extension(app_state): Extension<Arc<AppState>>,
    PageMultipart(multipart): PageMultipart,
) -> PageResult {
    let Submission { form, attachment } =
        read_submission(multipart, app_state.board_service.max_file_size()).await?;

    info!(title = %form.title, "Write request");

    match app_state
        .board_service
        .create_post(form.clone(), attachment)
        .await
    {
        Ok(post) => Ok(Redirect::to(&format!("/board/view?id={}", post.id)).into_response()),
        Err(err) if err.is_form_error() => {
            Ok(form_view(None, form, &err, "/board/writepro".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

async fn view(
    Extension(app_state): Extension<Arc<AppState>>,
    PageQuery(IdQuery { id }): PageQuery<IdQuery>,
) -> PageResult {
    info!(id, "View request");

    let post = app_state.board_service.view_post(id).await?;

    Ok(Json(post).into_response())
}

async fn modify_form(
    Extension(app_state): Extension<Arc<AppState>>,
    PagePath(id): PagePath<i32>,
) -> PageResult {
    let post = app_state.board_service.get_post(id).await?;

    Ok(Json(FormView {
        id: Some(id),
        form: PostForm::from_dto(&post),
        error: None,
        action: format!("/board/update/{id}"),
    })
    .into_response())
}

async fn update(
    Extension(app_state): Extension<Arc<AppState>>,
    PagePath(id): PagePath<i32>,
    PageMultipart(multipart): PageMultipart,
) -> PageResult {
    let Submission { form, attachment } =
        read_submission(multipart, app_state.board_service.max_file_size()).await?;

    info!(id, "Update request");

    match app_state
        .board_service
        .update_post(id, form.clone(), attachment)
        .await
    {
        Ok(_) => Ok(Redirect::to(&format!("/board/view?id={id}")).into_response()),
        Err(err) if err.is_form_error() => Ok(form_view(
            Some(id),
            form,
            &err,
            format!("/board/update/{id}"),
        )),
        Err(err) => Err(err.into()),
    }
}

async fn delete(
    Extension(app_state): Extension<Arc<AppState>>,
    PageQuery(IdQuery { id }): PageQuery<IdQuery>,
) -> PageResult {
    info!(id, "Delete request");

    app_state.board_service.delete_post(id).await?;

    Ok(Redirect::to("/board/list").into_response())
}

async fn download(
    Extension(app_state): Extension<Arc<AppState>>,
    PagePath(id): PagePath<i32>,
) -> PageResult {
    info!(id, "Download request");

    let download = app_state.board_service.open_attachment(id).await?;

    Ok(download_response(download))
}
