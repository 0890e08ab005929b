use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Id,
    Title,
    Author,
    ViewCount,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Unknown keys fall back to `id`.
    pub fn from_param(value: &str) -> Self {
        match value.trim() {
            "title" => Self::Title,
            "author" => Self::Author,
            "viewCount" | "view_count" => Self::ViewCount,
            "createdAt" | "created_at" => Self::CreatedAt,
            "updatedAt" | "updated_at" => Self::UpdatedAt,
            _ => Self::Id,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Author => "author",
            Self::ViewCount => "view_count",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_param(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::Id,
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl PageRequest {
    pub fn of(page: u32, size: u32, sort: Sort) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort,
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Title,
    Content,
    Author,
    All,
}

impl SearchType {
    /// Anything unrecognised searches title and content together.
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "title" => Self::Title,
            "content" => Self::Content,
            "author" => Self::Author,
            _ => Self::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Author => "author",
            Self::All => "all",
        }
    }
}

/// Query string accepted by the list endpoints.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    #[serde(rename = "searchKeyword")]
    pub search_keyword: Option<String>,
    #[serde(rename = "searchType")]
    pub search_type: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self, default_size: u32) -> PageRequest {
        let sort = Sort {
            field: self
                .sort
                .as_deref()
                .map(SortField::from_param)
                .unwrap_or(SortField::Id),
            direction: self
                .direction
                .as_deref()
                .map(SortDirection::from_param)
                .unwrap_or(SortDirection::Desc),
        };

        PageRequest::of(
            self.page.unwrap_or(0),
            self.size.filter(|s| *s > 0).unwrap_or(default_size),
            sort,
        )
    }

    pub fn search_type(&self) -> SearchType {
        self.search_type
            .as_deref()
            .map(SearchType::from_param)
            .unwrap_or(SearchType::All)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(rename = "totalElements")]
    pub total_elements: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
    pub number: u32,
    pub size: u32,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size.max(1));
        let total_pages = total_elements.div_ceil(size) as u32;

        Self {
            empty: content.is_empty(),
            content,
            total_elements,
            total_pages,
            number: request.page,
            size: request.size,
            first: request.page == 0,
            last: request.page.saturating_add(1) >= total_pages,
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
            first: self.first,
            last: self.last,
            empty: self.empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_metadata_follows_total_count() {
        let request = PageRequest::of(1, 6, Sort::default());
        let page = Page::new(vec![1, 2, 3, 4], &request, 10);

        assert_eq!(page.total_pages, 2);
        assert_eq!(page.number, 1);
        assert!(!page.first);
        assert!(page.last);
        assert!(!page.empty);
    }

    #[test]
    fn empty_table_is_a_single_last_page() {
        let request = PageRequest::of(0, 10, Sort::default());
        let page: Page<i32> = Page::new(vec![], &request, 0);

        assert_eq!(page.total_pages, 0);
        assert!(page.first);
        assert!(page.last);
        assert!(page.empty);
    }

    #[test]
    fn size_is_clamped() {
        assert_eq!(PageRequest::of(0, 0, Sort::default()).size, 1);
        assert_eq!(PageRequest::of(0, 1000, Sort::default()).size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::of(3, 10, Sort::default()).offset(), 30);
    }

    #[test]
    fn list_query_defaults() {
        let query = ListQuery::default();
        let request = query.page_request(10);

        assert_eq!(request.page, 0);
        assert_eq!(request.size, 10);
        assert_eq!(request.sort, Sort::default());
        assert_eq!(query.search_type(), SearchType::All);
    }

    #[test]
    fn unknown_parameters_fall_back() {
        assert_eq!(SearchType::from_param("nonsense"), SearchType::All);
        assert_eq!(SearchType::from_param("AUTHOR"), SearchType::Author);
        assert_eq!(SortField::from_param("password"), SortField::Id);
        assert_eq!(SortDirection::from_param("ASC"), SortDirection::Asc);
        assert_eq!(SortDirection::from_param("sideways"), SortDirection::Desc);
    }
}
