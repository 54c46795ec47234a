use serde::{Deserialize, Serialize};

/// One page of a listed collection, as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    /// Cursor for the next page. `None` (or absent) on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// Converts every result, keeping order and the page cursor. Stops at
    /// the first conversion error.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            results: self.results.into_iter().map(f).collect::<Result<_, _>>()?,
            next_page_token: self.next_page_token,
        })
    }

    pub fn has_more(&self) -> bool {
        self.next_page_token.is_some()
    }
}

/// Pagination parameters sent as a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}
