use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::utils::file::format_file_size;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    NotFound,
    BadRequest(String),
    Validation(String),
    UnsupportedFileType(String),
    FileTooLarge(u64),
    AttachmentMissing,
    Io(std::io::Error),
    DatabaseError(sqlx::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::AttachmentMissing => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) | Self::UnsupportedFileType(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::FileTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Io(_) | Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Errors the user can fix by resubmitting the form.
    pub fn is_form_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::UnsupportedFileType(_) | Self::FileTooLarge(_)
        )
    }

    pub fn message(&self) -> String {
        match self {
            Self::NotFound => "Post not found".to_string(),
            Self::BadRequest(msg) | Self::Validation(msg) => msg.clone(),
            Self::UnsupportedFileType(ext) if ext.is_empty() => {
                "Files without an extension are not allowed".to_string()
            }
            Self::UnsupportedFileType(ext) => format!("File type '.{ext}' is not allowed"),
            Self::FileTooLarge(limit) => {
                format!("File is too large, the limit is {}", format_file_size(*limit))
            }
            Self::AttachmentMissing => "Attachment not found".to_string(),
            Self::Io(_) => "File error".to_string(),
            Self::DatabaseError(_) => "Database error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message() }));
        (self.status(), body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        error!("Database error: {:?}", err);
        Self::DatabaseError(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        error!("File error: {:?}", err);
        Self::Io(err)
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        warn!("Rejected query string: {}", rejection.body_text());
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        warn!("Rejected path parameter: {}", rejection.body_text());
        Self::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected JSON body: {}", rejection.body_text());
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for Error {
    fn from(rejection: MultipartRejection) -> Self {
        warn!("Rejected multipart body: {}", rejection.body_text());
        Self::BadRequest(rejection.body_text())
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter()
                    .map(|e| match &e.message {
                        Some(msg) => format!("{field}: {msg}"),
                        None => format!("{field}: invalid value"),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        messages.sort();

        Self::Validation(messages.join(", "))
    }
}
