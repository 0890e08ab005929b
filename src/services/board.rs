use std::sync::Arc;

use tokio::fs::File;
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    models::{
        board::{NewPost, PostChanges, PostDto, PostForm},
        page::{Page, PageRequest, SearchType},
    },
    repositories::board_repo::BoardRepository,
    storage::{original_name, Attachment, LocalStorage},
    Error, Result,
};

/// An attachment opened for download.
#[derive(Debug)]
pub struct Download {
    pub filename: String,
    pub content_type: String,
    pub len: u64,
    pub file: File,
}

#[derive(Clone)]
pub struct BoardService {
    repo: Arc<dyn BoardRepository>,
    storage: LocalStorage,
}

impl BoardService {
    pub fn new(repo: Arc<dyn BoardRepository>, storage: LocalStorage) -> Self {
        Self { repo, storage }
    }

    pub fn max_file_size(&self) -> u64 {
        self.storage.max_file_size()
    }

    pub async fn get_posts(&self, page: &PageRequest) -> Result<Page<PostDto>> {
        let posts = self.repo.find_all(page).await?;

        Ok(posts.map(|post| PostDto::from_post(&post)))
    }

    /// A missing or blank keyword lists everything.
    pub async fn search_posts(
        &self,
        keyword: Option<&str>,
        search_type: SearchType,
        page: &PageRequest,
    ) -> Result<Page<PostDto>> {
        let keyword = match keyword {
            Some(k) if !k.trim().is_empty() => k,
            _ => return self.get_posts(page).await,
        };

        let posts = match search_type {
            SearchType::Title => self.repo.find_by_title_containing(keyword, page).await?,
            SearchType::Content => self.repo.find_by_content_containing(keyword, page).await?,
            SearchType::Author => self.repo.find_by_author_containing(keyword, page).await?,
            SearchType::All => {
                self.repo
                    .find_by_title_or_content_containing(keyword, page)
                    .await?
            }
        };

        Ok(posts.map(|post| PostDto::from_post(&post)))
    }

    pub async fn get_popular_posts(&self, page: &PageRequest) -> Result<Page<PostDto>> {
        let posts = self.repo.find_popular_posts(page).await?;

        Ok(posts.map(|post| PostDto::from_post(&post)))
    }

    #[instrument(skip(self, form, attachment), fields(title = %form.title))]
    pub async fn create_post(
        &self,
        form: PostForm,
        attachment: Option<Attachment>,
    ) -> Result<PostDto> {
        form.validate()?;
        if let Some(attachment) = &attachment {
            self.storage.check(attachment)?;
        }

        let stored = match &attachment {
            Some(attachment) => Some(self.storage.store(attachment).await?),
            None => None,
        };
        let stored_path = stored.as_ref().map(|file| file.filepath.clone());

        let post = match self.repo.save(NewPost::from_form(form, stored)).await {
            Ok(post) => post,
            Err(err) => {
                if let Some(path) = stored_path {
                    self.storage.delete(&path).await;
                }
                return Err(err);
            }
        };

        info!(id = post.id, "Post created");

        Ok(PostDto::from_post(&post))
    }

    /// Detail view for readers. Counts as one view.
    pub async fn view_post(&self, id: i32) -> Result<PostDto> {
        let post = self
            .repo
            .increase_view_count(id)
            .await?
            .ok_or(Error::NotFound)?;

        Ok(PostDto::from_post(&post))
    }

    /// Detail view for the edit form. Does not count as a view.
    pub async fn get_post(&self, id: i32) -> Result<PostDto> {
        let post = self.repo.find_by_id(id).await?.ok_or(Error::NotFound)?;

        Ok(PostDto::from_post(&post))
    }

    #[instrument(skip(self, form, attachment))]
    pub async fn update_post(
        &self,
        id: i32,
        form: PostForm,
        attachment: Option<Attachment>,
    ) -> Result<PostDto> {
        let existing = self.repo.find_by_id(id).await?.ok_or(Error::NotFound)?;

        form.validate()?;

        let stored = match &attachment {
            Some(attachment) => {
                self.storage.check(attachment)?;
                if let Some(old) = &existing.filepath {
                    self.storage.delete(old).await;
                }
                Some(self.storage.store(attachment).await?)
            }
            None => None,
        };

        let stored_path = stored.as_ref().map(|file| file.filepath.clone());

        let post = match self.repo.update(id, PostChanges::from_form(form, stored)).await {
            Ok(Some(post)) => post,
            result => {
                if let Some(path) = stored_path {
                    self.storage.delete(&path).await;
                }
                return Err(result.err().unwrap_or(Error::NotFound));
            }
        };

        info!(id, "Post updated");

        Ok(PostDto::from_post(&post))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: i32) -> Result<()> {
        let post = self.repo.find_by_id(id).await?.ok_or(Error::NotFound)?;

        if let Some(path) = &post.filepath {
            self.storage.delete(path).await;
        }

        self.repo.delete_by_id(id).await?;
        info!(id, "Post deleted");

        Ok(())
    }

    pub async fn open_attachment(&self, id: i32) -> Result<Download> {
        let post = self.repo.find_by_id(id).await?.ok_or(Error::NotFound)?;

        let (Some(stored), Some(path)) = (post.filename.as_deref(), post.filepath.as_deref())
        else {
            return Err(Error::AttachmentMissing);
        };

        let (file, len) = self.storage.open(path).await?;
        let filename = original_name(stored).to_string();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();

        Ok(Download {
            filename,
            content_type,
            len,
            file,
        })
    }
}
