use crate::adapter::PreviewTarget;
use crate::{DataSourceType, NotionPage};

/// Fetched rendition of one item, before it is attached to its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewContent {
    pub title: String,
    pub content: String,
}

/// The single open preview. Dismissing it never affects the selection,
/// except that a Lark preview only exists alongside its committed reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    File {
        file_id: String,
        title: String,
        content: String,
    },
    NotionPage {
        page: NotionPage,
        content: String,
    },
    Lark {
        reference: String,
        title: String,
        content: String,
    },
}

impl Preview {
    pub(crate) fn from_target(target: PreviewTarget, fetched: PreviewContent) -> Self {
        match target {
            PreviewTarget::LocalFile { file_id, name, .. } => Preview::File {
                file_id,
                title: if fetched.title.is_empty() {
                    name
                } else {
                    fetched.title
                },
                content: fetched.content,
            },
            PreviewTarget::NotionPage(page) => Preview::NotionPage {
                page,
                content: fetched.content,
            },
            PreviewTarget::LarkDocument { reference } => Preview::Lark {
                reference,
                title: fetched.title,
                content: fetched.content,
            },
        }
    }

    pub fn source_type(&self) -> DataSourceType {
        match self {
            Preview::File { .. } => DataSourceType::File,
            Preview::NotionPage { .. } => DataSourceType::Notion,
            Preview::Lark { .. } => DataSourceType::Lark,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Preview::File { title, .. } | Preview::Lark { title, .. } => title,
            Preview::NotionPage { page, .. } => &page.page_name,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Preview::File { content, .. }
            | Preview::NotionPage { content, .. }
            | Preview::Lark { content, .. } => content,
        }
    }

    pub(crate) fn shows_file(&self, id: &str) -> bool {
        matches!(self, Preview::File { file_id, .. } if file_id == id)
    }

    pub(crate) fn shows_page(&self, id: &str) -> bool {
        matches!(self, Preview::NotionPage { page, .. } if page.page_id == id)
    }
}
