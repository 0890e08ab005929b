use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::{
    models::board::PostForm, services::board::Download, storage::Attachment, Error, Result,
};

/// Fields of a write/edit multipart submission.
pub struct Submission {
    pub form: PostForm,
    pub attachment: Option<Attachment>,
}

pub async fn read_submission(mut multipart: Multipart, max_file_size: u64) -> Result<Submission> {
    let mut form = PostForm::default();
    let mut attachment = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_error(err, max_file_size))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" | "content" | "author" => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| multipart_error(err, max_file_size))?;
                match name.as_str() {
                    "title" => form.title = value,
                    "content" => form.content = value,
                    _ => form.author = value,
                }
            }
            "file" => {
                let original_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| multipart_error(err, max_file_size))?;

                // Browsers send an empty part when no file was picked.
                if let Some(original_name) = original_name.filter(|n| !n.is_empty()) {
                    if !data.is_empty() {
                        attachment = Some(Attachment {
                            original_name,
                            content_type,
                            data,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    Ok(Submission { form, attachment })
}

fn multipart_error(err: MultipartError, max_file_size: u64) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::FileTooLarge(max_file_size);
    }
    Error::BadRequest(err.body_text())
}

/// Streams an attachment back with its original name.
pub fn download_response(download: Download) -> Response {
    let disposition = content_disposition(&download.filename);
    let body = Body::from_stream(ReaderStream::new(download.file));

    (
        [
            (header::CONTENT_TYPE, download.content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, download.len.to_string()),
        ],
        body,
    )
        .into_response()
}

fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
