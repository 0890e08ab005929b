use serde::{Deserialize, Serialize};

use super::{
    board::{PostDto, PostForm},
    page::Page,
};

/// Generic message shown when a page request fails.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageView {
    pub message: String,
    #[serde(rename = "searchUrl")]
    pub search_url: String,
}

/// Write/edit form, echoed back with `error` when submission fails.
#[derive(Debug, Serialize, Deserialize)]
pub struct FormView {
    pub id: Option<i32>,
    pub form: PostForm,
    pub error: Option<String>,
    pub action: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListView {
    pub paging: Page<PostDto>,
    #[serde(rename = "searchKeyword")]
    pub search_keyword: Option<String>,
    #[serde(rename = "searchType")]
    pub search_type: String,
    #[serde(rename = "isPopular")]
    pub is_popular: bool,
}
