use std::{
    cmp::Ordering,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    models::{
        board::{NewPost, Post, PostChanges},
        page::{Page, PageRequest, SortDirection, SortField},
    },
    Result,
};

use super::board_repo::BoardRepository;

/// In-memory `BoardRepository` used by service and router tests.
#[derive(Default)]
pub struct MemoryRepo {
    posts: Mutex<Vec<Post>>,
    next_id: AtomicUsize,
    saves: AtomicUsize,
    deletes: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_calls(&self) -> usize {
        self.saves.load(AtomicOrdering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(AtomicOrdering::SeqCst)
    }

    /// Makes every later `save` and `update` fail like a lost connection.
    pub fn fail_writes(&self) {
        self.failing.store(true, AtomicOrdering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    fn page_where<F>(&self, page: &PageRequest, keep: F) -> Page<Post>
    where
        F: Fn(&Post) -> bool,
    {
        let mut matching: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| keep(*p))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare(a, b, page.sort.field).then(a.id.cmp(&b.id));
            match page.sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        slice(matching, page)
    }
}

fn compare(a: &Post, b: &Post, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Author => a.author.cmp(&b.author),
        SortField::ViewCount => a.view_count.cmp(&b.view_count),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

fn slice(posts: Vec<Post>, page: &PageRequest) -> Page<Post> {
    let total = posts.len() as u64;
    let content = posts
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Page::new(content, page, total)
}

#[async_trait]
impl BoardRepository for MemoryRepo {
    async fn find_all(&self, page: &PageRequest) -> Result<Page<Post>> {
        Ok(self.page_where(page, |_| true))
    }

    async fn find_by_title_containing(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>> {
        Ok(self.page_where(page, |p| p.title.contains(keyword)))
    }

    async fn find_by_content_containing(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>> {
        Ok(self.page_where(page, |p| p.content.contains(keyword)))
    }

    async fn find_by_title_or_content_containing(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>> {
        Ok(self.page_where(page, |p| {
            p.title.contains(keyword) || p.content.contains(keyword)
        }))
    }

    async fn find_by_author_containing(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>> {
        Ok(self.page_where(page, |p| p.author.contains(keyword)))
    }

    async fn find_popular_posts(&self, page: &PageRequest) -> Result<Page<Post>> {
        let mut posts = self.posts.lock().unwrap().clone();
        posts.sort_by(|a, b| {
            b.view_count
                .cmp(&a.view_count)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        Ok(slice(posts, page))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Post>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn save(&self, post: NewPost) -> Result<Post> {
        self.saves.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_writable()?;
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst) as i32 + 1;
        let now = Utc::now();
        let (filename, filepath) = match post.attachment {
            Some(file) => (Some(file.filename), Some(file.filepath)),
            None => (None, None),
        };

        let post = Post {
            id,
            title: post.title,
            content: post.content,
            author: post.author,
            view_count: 0,
            filename,
            filepath,
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Option<Post>> {
        self.check_writable()?;
        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        post.title = changes.title;
        post.content = changes.content;
        post.author = changes.author;
        if let Some(file) = changes.attachment {
            post.filename = Some(file.filename);
            post.filepath = Some(file.filepath);
        }
        post.updated_at = Utc::now().max(post.created_at);
        Ok(Some(post.clone()))
    }

    async fn increase_view_count(&self, id: i32) -> Result<Option<Post>> {
        let mut posts = self.posts.lock().unwrap();
        Ok(posts.iter_mut().find(|p| p.id == id).map(|post| {
            post.view_count += 1;
            post.clone()
        }))
    }

    async fn delete_by_id(&self, id: i32) -> Result<()> {
        self.deletes.fetch_add(1, AtomicOrdering::SeqCst);
        self.posts.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }
}
