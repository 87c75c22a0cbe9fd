use std::path::PathBuf;

use crate::{DataSourceType, NotionPage, Selection};

/// Uniform contract every data source exposes to the wizard.
///
/// The step controller only ever talks to the adapter of the active source type,
/// so source-specific branching stays inside the implementations.
pub trait SourceAdapter {
    fn source_type(&self) -> DataSourceType;

    /// Readiness predicate gating Select -> Configure.
    fn is_ready(&self) -> bool;

    /// The selection the Configure stage acts upon; `None` unless ready.
    fn committed_selection(&self) -> Option<Selection>;

    /// What to fetch to preview the item identified by `key`.
    fn preview_target(&self, key: &str) -> Option<PreviewTarget>;

    /// Drops every pending selection held by this adapter.
    fn reset(&mut self);
}

/// A single item whose read-only rendition can be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewTarget {
    LocalFile {
        file_id: String,
        name: String,
        path: PathBuf,
    },
    NotionPage(NotionPage),
    LarkDocument {
        reference: String,
    },
}

impl PreviewTarget {
    pub fn source_type(&self) -> DataSourceType {
        match self {
            PreviewTarget::LocalFile { .. } => DataSourceType::File,
            PreviewTarget::NotionPage(_) => DataSourceType::Notion,
            PreviewTarget::LarkDocument { .. } => DataSourceType::Lark,
        }
    }
}

/// Placeholder for the web crawl source; it can be picked but never advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WebSource;

impl SourceAdapter for WebSource {
    fn source_type(&self) -> DataSourceType {
        DataSourceType::Web
    }

    fn is_ready(&self) -> bool {
        false
    }

    fn committed_selection(&self) -> Option<Selection> {
        None
    }

    fn preview_target(&self, _key: &str) -> Option<PreviewTarget> {
        None
    }

    fn reset(&mut self) {}
}
