use serde::{Deserialize, Serialize};

use crate::adapter::{PreviewTarget, SourceAdapter};
use crate::{DataSourceType, Selection};

/// A page (or database) picked from a connected Notion workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionPage {
    pub page_id: String,
    pub page_name: String,
    #[serde(default)]
    pub page_icon: Option<String>,
    pub workspace_id: String,
    #[serde(rename = "type")]
    pub page_type: String,
}

/// Notion adapter state: an ordered set of pages keyed by `page_id`.
///
/// Previewing a page never touches the selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotionSource {
    pages: Vec<NotionPage>,
}

impl NotionSource {
    pub fn pages(&self) -> &[NotionPage] {
        &self.pages
    }

    pub fn page_ids(&self) -> Vec<String> {
        self.pages.iter().map(|page| page.page_id.clone()).collect()
    }

    /// Replaces the selection, keeping the first occurrence of each page id.
    pub fn select(&mut self, pages: Vec<NotionPage>) {
        let mut next: Vec<NotionPage> = Vec::with_capacity(pages.len());
        for page in pages {
            if !next.iter().any(|p| p.page_id == page.page_id) {
                next.push(page);
            }
        }
        self.pages = next;
    }

    pub fn deselect(&mut self, page_id: &str) -> bool {
        let before = self.pages.len();
        self.pages.retain(|page| page.page_id != page_id);
        self.pages.len() != before
    }
}

impl SourceAdapter for NotionSource {
    fn source_type(&self) -> DataSourceType {
        DataSourceType::Notion
    }

    fn is_ready(&self) -> bool {
        !self.pages.is_empty()
    }

    fn committed_selection(&self) -> Option<Selection> {
        self.is_ready()
            .then(|| Selection::NotionPages(self.pages.clone()))
    }

    fn preview_target(&self, key: &str) -> Option<PreviewTarget> {
        self.pages
            .iter()
            .find(|page| page.page_id == key)
            .cloned()
            .map(PreviewTarget::NotionPage)
    }

    fn reset(&mut self) {
        self.pages.clear();
    }
}
