use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    storage::{original_name, StoredFile},
    utils::{
        date::{format_date_time, relative_time},
        file::{is_document_file, is_image_file},
    },
};

/// A row of the `board` table.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub view_count: i32,
    #[sqlx(rename = "file_name")]
    pub filename: Option<String>,
    #[sqlx(rename = "file_path")]
    pub filepath: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Title, content and author as submitted by the write and edit forms.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostForm {
    #[validate(
        custom(function = "non_blank", message = "Title is required."),
        length(max = 200, message = "Title must be 200 characters or fewer.")
    )]
    #[serde(default)]
    pub title: String,
    #[validate(
        custom(function = "non_blank", message = "Content is required."),
        length(max = 4000, message = "Content must be 4000 characters or fewer.")
    )]
    #[serde(default)]
    pub content: String,
    #[validate(
        custom(function = "non_blank", message = "Author is required."),
        length(max = 50, message = "Author must be 50 characters or fewer.")
    )]
    #[serde(default)]
    pub author: String,
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl PostForm {
    pub fn from_dto(post: &PostDto) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            author: post.author.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub attachment: Option<StoredFile>,
}

impl NewPost {
    pub fn from_form(form: PostForm, attachment: Option<StoredFile>) -> Self {
        Self {
            title: form.title,
            content: form.content,
            author: form.author,
            attachment,
        }
    }
}

/// Full overwrite of the editable fields. The attachment is only replaced
/// when `attachment` is set.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub content: String,
    pub author: String,
    pub attachment: Option<StoredFile>,
}

impl PostChanges {
    pub fn from_form(form: PostForm, attachment: Option<StoredFile>) -> Self {
        Self {
            title: form.title,
            content: form.content,
            author: form.author,
            attachment,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Document,
    File,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AttachmentDto {
    pub filename: String,
    pub kind: AttachmentKind,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PostDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(rename = "viewCount")]
    pub view_count: i32,
    pub attachment: Option<AttachmentDto>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "createdAtText")]
    pub created_at_text: String,
    #[serde(rename = "postedAgo")]
    pub posted_ago: String,
}

impl PostDto {
    pub fn from_post(post: &Post) -> Self {
        let attachment = post.filename.as_deref().map(|stored| {
            let filename = original_name(stored).to_string();
            let kind = if is_image_file(&filename) {
                AttachmentKind::Image
            } else if is_document_file(&filename) {
                AttachmentKind::Document
            } else {
                AttachmentKind::File
            };

            AttachmentDto {
                filename,
                kind,
                download_url: format!("/board/download/{}", post.id),
            }
        });

        Self {
            id: post.id,
            title: post.title.to_owned(),
            content: post.content.to_owned(),
            author: post.author.to_owned(),
            view_count: post.view_count,
            attachment,
            created_at: post.created_at,
            updated_at: post.updated_at,
            created_at_text: format_date_time(&post.created_at),
            posted_ago: relative_time(&post.created_at, &Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Post {
        let now = Utc::now();
        Post {
            id: 7,
            title: "Hello".to_string(),
            content: "World".to_string(),
            author: "Alice".to_string(),
            view_count: 3,
            filename: None,
            filepath: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn form(title: &str, content: &str, author: &str) -> PostForm {
        PostForm {
            title: title.to_string(),
            content: content.to_string(),
            author: author.to_string(),
        }
    }

    #[test]
    fn accepts_values_at_the_length_limits() {
        let form = form(&"t".repeat(200), &"c".repeat(4000), &"a".repeat(50));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn rejects_blank_and_oversized_fields() {
        assert!(form("", "c", "a").validate().is_err());
        assert!(form("t", " \n ", "a").validate().is_err());
        assert!(form("t", "c", "").validate().is_err());
        assert!(form(&"t".repeat(201), "c", "a").validate().is_err());
        assert!(form("t", &"c".repeat(4001), "a").validate().is_err());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(form(&"가".repeat(200), "c", "a").validate().is_ok());
    }

    #[test]
    fn dto_restores_original_attachment_name() {
        let mut post = post();
        post.filename = Some("0195a0b2-7c3e-7d2a-9f10-2b3c4d5e6f70_photo.png".to_string());
        post.filepath = Some("/tmp/x".to_string());

        let dto = PostDto::from_post(&post);
        let attachment = dto.attachment.unwrap();

        assert_eq!(attachment.filename, "photo.png");
        assert_eq!(attachment.kind, AttachmentKind::Image);
        assert_eq!(attachment.download_url, "/board/download/7");
    }

    #[test]
    fn dto_keeps_fields_and_serializes_camel_case() {
        let dto = PostDto::from_post(&post());
        assert_eq!(dto.title, "Hello");
        assert_eq!(dto.view_count, 3);
        assert!(dto.attachment.is_none());

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["viewCount"], 3);
        assert!(json.get("createdAt").is_some());
    }
}
