use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single suggestion returned by the search endpoint.
///
/// `match_index` is computed client-side and only drives highlighting.
/// Fields the endpoint returns beyond `id` and `name` are kept in `extra`
/// so selection consumers receive the item exactly as it was delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub id: i64,
    pub name: String,
    #[serde(
        rename = "matchIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub match_index: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchResultItem {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            match_index: None,
            extra: Map::new(),
        }
    }

    pub fn with_match_index(mut self, match_index: Option<usize>) -> Self {
        self.match_index = match_index;
        self
    }
}

/// Paging metadata some endpoints attach to the result envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

/// One page of results as parsed from the endpoint body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsePage {
    pub results: Vec<SearchResultItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<PageInfo>,
}

impl ResponsePage {
    pub fn new(results: Vec<SearchResultItem>) -> Self {
        Self {
            results,
            info: None,
        }
    }

    /// Whether the endpoint says there is nothing after `page`.
    ///
    /// Without an `info` block we cannot tell, so paging stays open.
    pub fn is_last_page(&self, page: u32) -> bool {
        match &self.info {
            Some(info) => {
                if let Some(pages) = info.pages {
                    if page >= pages {
                        return true;
                    }
                }
                info.next.is_none() && (info.pages.is_some() || info.count.is_some())
            }
            None => false,
        }
    }
}
