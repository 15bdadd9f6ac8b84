use serde::Deserialize;

use crate::config::DEFAULT_PAGE_SIZE;

/// Paging descriptor as returned next to every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager {
    #[serde(default)]
    pub total: u64,
    #[serde(default = "one")]
    pub page_count: u64,
    #[serde(default = "one")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn one() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            total: 0,
            page_count: 1,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pager {
    fn effective_page_size(&self) -> u64 {
        if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }

    /// Page clamped to `[1, last page]`, where the last page is derived from the total.
    fn effective_page(&self) -> u64 {
        let last = self.total.div_ceil(self.effective_page_size()).max(1);
        self.page.clamp(1, last)
    }

    /// 1-based inclusive bounds of the rows on this page.
    pub fn range(&self) -> (u64, u64) {
        if self.total == 0 {
            return (0, 0);
        }
        let size = self.effective_page_size();
        let page = self.effective_page();
        let start = (page - 1) * size + 1;
        let end = (page * size).min(self.total);
        (start, end)
    }

    /// `"51 - 100"`.
    pub fn current_page_label(&self) -> String {
        let (start, end) = self.range();
        format!("{start} - {end}")
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}
