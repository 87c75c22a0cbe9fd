use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DataSourceType, Selection};

pub const MIN_SEGMENT_TOKENS: u32 = 50;
pub const MAX_SEGMENT_TOKENS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexingTechnique {
    #[default]
    HighQuality,
    Economy,
}

impl IndexingTechnique {
    pub fn wire_name(self) -> &'static str {
        match self {
            IndexingTechnique::HighQuality => "high_quality",
            IndexingTechnique::Economy => "economy",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "high_quality" => Some(IndexingTechnique::HighQuality),
            "economy" => Some(IndexingTechnique::Economy),
            _ => None,
        }
    }
}

impl fmt::Display for IndexingTechnique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocForm {
    #[default]
    TextModel,
    QaModel,
}

impl DocForm {
    pub fn wire_name(self) -> &'static str {
        match self {
            DocForm::TextModel => "text_model",
            DocForm::QaModel => "qa_model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRule {
    pub separator: String,
    pub max_tokens: u32,
    pub remove_extra_spaces: bool,
    pub remove_urls_emails: bool,
}

impl Default for CustomRule {
    fn default() -> Self {
        Self {
            separator: "\\n".to_string(),
            max_tokens: 500,
            remove_extra_spaces: true,
            remove_urls_emails: false,
        }
    }
}

/// How documents are segmented and cleaned before indexing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessRule {
    #[default]
    Automatic,
    Custom(CustomRule),
}

impl ProcessRule {
    pub fn is_valid(&self) -> bool {
        match self {
            ProcessRule::Automatic => true,
            ProcessRule::Custom(rule) => {
                !rule.separator.is_empty()
                    && (MIN_SEGMENT_TOKENS..=MAX_SEGMENT_TOKENS).contains(&rule.max_tokens)
            }
        }
    }
}

/// Everything the operator chooses on the Configure stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingConfig {
    pub indexing_technique: IndexingTechnique,
    pub process_rule: ProcessRule,
    pub doc_form: DocForm,
    pub doc_language: String,
}

impl IndexingConfig {
    pub fn with_technique(indexing_technique: IndexingTechnique) -> Self {
        Self {
            indexing_technique,
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.process_rule.is_valid() && !self.doc_language.trim().is_empty()
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            indexing_technique: IndexingTechnique::default(),
            process_rule: ProcessRule::default(),
            doc_form: DocForm::default(),
            doc_language: "English".to_string(),
        }
    }
}

/// The job handed to the backend: active source type and its committed selection, unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexingRequest {
    pub dataset_id: Option<String>,
    pub source_type: DataSourceType,
    pub selection: Selection,
    pub config: IndexingConfig,
}

/// Opaque submission result; owned by the backend and cached verbatim for Finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingJobResult(serde_json::Value);

impl IndexingJobResult {
    pub fn new(raw: serde_json::Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn dataset_id(&self) -> Option<&str> {
        self.0
            .get("dataset")
            .and_then(|dataset| dataset.get("id"))
            .and_then(serde_json::Value::as_str)
    }

    pub fn dataset_name(&self) -> Option<&str> {
        self.0
            .get("dataset")
            .and_then(|dataset| dataset.get("name"))
            .and_then(serde_json::Value::as_str)
    }

    pub fn batch(&self) -> Option<&str> {
        self.0.get("batch").and_then(serde_json::Value::as_str)
    }

    pub fn document_count(&self) -> usize {
        self.0
            .get("documents")
            .and_then(serde_json::Value::as_array)
            .map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingEstimate {
    pub total_segments: u64,
    pub tokens: u64,
    pub total_price: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentIndexingStatus {
    pub id: String,
    pub indexing_status: String,
    pub completed_segments: u64,
    pub total_segments: u64,
    pub error: Option<String>,
}

impl DocumentIndexingStatus {
    pub fn percent(&self) -> u8 {
        if self.total_segments == 0 {
            return 0;
        }
        let ratio = self.completed_segments.min(self.total_segments) * 100 / self.total_segments;
        ratio as u8
    }
}
