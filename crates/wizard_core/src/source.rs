use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{NotionPage, UploadedFile};

/// Where the documents of a dataset come from. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataSourceType {
    #[serde(rename = "upload_file")]
    File,
    #[serde(rename = "notion_import")]
    Notion,
    #[default]
    #[serde(rename = "lark_import")]
    Lark,
    /// Reserved; selectable but never ready.
    #[serde(rename = "website_crawl")]
    Web,
}

impl DataSourceType {
    /// Picker order.
    pub const ALL: [DataSourceType; 4] = [
        DataSourceType::Lark,
        DataSourceType::File,
        DataSourceType::Notion,
        DataSourceType::Web,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            DataSourceType::File => "upload_file",
            DataSourceType::Notion => "notion_import",
            DataSourceType::Lark => "lark_import",
            DataSourceType::Web => "website_crawl",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|source| source.wire_name() == name)
    }

    pub fn is_implemented(self) -> bool {
        !matches!(self, DataSourceType::Web)
    }

    pub fn label(self) -> &'static str {
        match self {
            DataSourceType::File => "Local file",
            DataSourceType::Notion => "Notion",
            DataSourceType::Lark => "Lark document",
            DataSourceType::Web => "Web site",
        }
    }
}

impl fmt::Display for DataSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// The committed selection of the active source, as handed to the indexing job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Selection {
    Files(Vec<UploadedFile>),
    NotionPages(Vec<NotionPage>),
    LarkDocument(String),
}

impl Selection {
    pub fn source_type(&self) -> DataSourceType {
        match self {
            Selection::Files(_) => DataSourceType::File,
            Selection::NotionPages(_) => DataSourceType::Notion,
            Selection::LarkDocument(_) => DataSourceType::Lark,
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            Selection::Files(files) => files.len(),
            Selection::NotionPages(pages) => pages.len(),
            Selection::LarkDocument(_) => 1,
        }
    }
}
