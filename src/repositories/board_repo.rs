use async_trait::async_trait;
use tracing::instrument;

use crate::{
    models::{
        board::{NewPost, Post, PostChanges},
        page::{Page, PageRequest},
    },
    Result,
};

use super::PostgresRepo;

const COLUMNS: &str =
    "id, title, content, author, view_count, file_name, file_path, created_at, updated_at";

#[async_trait]
pub trait BoardRepository: Sync + Send {
    async fn find_all(&self, page: &PageRequest) -> Result<Page<Post>>;
    async fn find_by_title_containing(&self, keyword: &str, page: &PageRequest)
        -> Result<Page<Post>>;
    async fn find_by_content_containing(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>>;
    async fn find_by_title_or_content_containing(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>>;
    async fn find_by_author_containing(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>>;
    /// Ordered by view count, then newest first. The request's sort is ignored.
    async fn find_popular_posts(&self, page: &PageRequest) -> Result<Page<Post>>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>>;
    async fn save(&self, post: NewPost) -> Result<Post>;
    async fn update(&self, id: i32, changes: PostChanges) -> Result<Option<Post>>;
    /// Bumps the counter in a single statement and returns the updated row.
    async fn increase_view_count(&self, id: i32) -> Result<Option<Post>>;
    async fn delete_by_id(&self, id: i32) -> Result<()>;
}

enum Filter<'a> {
    None,
    Title(&'a str),
    Content(&'a str),
    TitleOrContent(&'a str),
    Author(&'a str),
}

impl Filter<'_> {
    fn where_clause(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Title(_) => r"WHERE title LIKE $1 ESCAPE '\'",
            Self::Content(_) => r"WHERE content LIKE $1 ESCAPE '\'",
            Self::TitleOrContent(_) => {
                r"WHERE title LIKE $1 ESCAPE '\' OR content LIKE $1 ESCAPE '\'"
            }
            Self::Author(_) => r"WHERE author LIKE $1 ESCAPE '\'",
        }
    }

    fn pattern(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Title(k) | Self::Content(k) | Self::TitleOrContent(k) | Self::Author(k) => {
                Some(format!("%{}%", escape_like(k)))
            }
        }
    }
}

/// Makes `%`, `_` and `\` match literally inside a LIKE pattern.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl PostgresRepo {
    async fn fetch_page(&self, filter: Filter<'_>, page: &PageRequest) -> Result<Page<Post>> {
        let where_clause = filter.where_clause();
        let pattern = filter.pattern();
        let direction = page.sort.direction.as_sql();

        // LIMIT/OFFSET follow the optional pattern parameter.
        let first_param = if pattern.is_some() { 2 } else { 1 };
        let sql = format!(
            "SELECT {COLUMNS} FROM board {where_clause} \
             ORDER BY {column} {direction}, id {direction} \
             LIMIT ${first_param} OFFSET ${}",
            first_param + 1,
            column = page.sort.field.column(),
        );
        let count_sql = format!("SELECT COUNT(*) FROM board {where_clause}");

        tracing::debug!("Executing query: {}", sql);

        let mut query = sqlx::query_as::<_, Post>(&sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(pattern) = pattern {
            query = query.bind(pattern.clone());
            count_query = count_query.bind(pattern);
        }

        let posts = query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        let total = count_query.fetch_one(&self.pool).await?;

        Ok(Page::new(posts, page, total.max(0) as u64))
    }
}

#[async_trait]
impl BoardRepository for PostgresRepo {
    #[instrument(skip(self))]
    async fn find_all(&self, page: &PageRequest) -> Result<Page<Post>> {
        self.fetch_page(Filter::None, page).await
    }

    #[instrument(skip(self))]
    async fn find_by_title_containing(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>> {
        self.fetch_page(Filter::Title(keyword), page).await
    }

    #[instrument(skip(self))]
    async fn find_by_content_containing(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>> {
        self.fetch_page(Filter::Content(keyword), page).await
    }

    #[instrument(skip(self))]
    async fn find_by_title_or_content_containing(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>> {
        self.fetch_page(Filter::TitleOrContent(keyword), page).await
    }

    #[instrument(skip(self))]
    async fn find_by_author_containing(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>> {
        self.fetch_page(Filter::Author(keyword), page).await
    }

    #[instrument(skip(self))]
    async fn find_popular_posts(&self, page: &PageRequest) -> Result<Page<Post>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM board \
             ORDER BY view_count DESC, created_at DESC, id DESC \
             LIMIT $1 OFFSET $2"
        );

        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM board")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(posts, page, total.max(0) as u64))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!("SELECT {COLUMNS} FROM board WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        tracing::debug!(id, found = post.is_some(), "Post lookup completed");

        Ok(post)
    }

    async fn save(&self, post: NewPost) -> Result<Post> {
        let (filename, filepath) = match post.attachment {
            Some(file) => (Some(file.filename), Some(file.filepath)),
            None => (None, None),
        };

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO board (title, content, author, view_count, file_name, file_path, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $4, $5, NOW(), NOW())
            RETURNING {COLUMNS}
            "#
        ))
        .bind(post.title)
        .bind(post.content)
        .bind(post.author)
        .bind(filename)
        .bind(filepath)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Option<Post>> {
        let (filename, filepath) = match changes.attachment {
            Some(file) => (Some(file.filename), Some(file.filepath)),
            None => (None, None),
        };

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE board
            SET title = $2,
                content = $3,
                author = $4,
                file_name = COALESCE($5, file_name),
                file_path = COALESCE($6, file_path),
                updated_at = GREATEST(NOW(), created_at)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.content)
        .bind(changes.author)
        .bind(filename)
        .bind(filepath)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn increase_view_count(&self, id: i32) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "UPDATE board SET view_count = view_count + 1 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_by_id(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM board WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn filter_binds_pattern_only_when_searching() {
        assert_eq!(Filter::None.pattern(), None);
        assert_eq!(Filter::None.where_clause(), "");
        assert_eq!(Filter::Author("Al").pattern().as_deref(), Some("%Al%"));
        assert!(Filter::TitleOrContent("x").where_clause().contains(" OR "));
    }
}
