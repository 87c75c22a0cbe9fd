use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::adapter::{PreviewTarget, SourceAdapter};
use crate::{DataSourceType, Selection};

/// A file picked by the operator. `id` is assigned by the server once the upload completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub extension: Option<String>,
    pub id: Option<String>,
}

/// One row of the file list. Identity is `file_id`; `progress` is `None` until the
/// upload has started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileItem {
    pub file_id: String,
    pub file: FileHandle,
    pub progress: Option<u8>,
}

impl FileItem {
    pub fn new(file_id: impl Into<String>, file: FileHandle) -> Self {
        Self {
            file_id: file_id.into(),
            file,
            progress: None,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        self.file.id.is_some()
    }
}

/// Server-side record of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub extension: Option<String>,
}

/// File adapter state.
///
/// The item list is never mutated in place: every change builds a new vector behind a
/// new `Arc`, so any view holding the previous list observes a distinct value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileSource {
    items: Arc<Vec<FileItem>>,
    revision: u64,
}

impl FileSource {
    pub fn items(&self) -> Arc<Vec<FileItem>> {
        Arc::clone(&self.items)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, file_id: &str) -> Option<&FileItem> {
        self.items.iter().find(|item| item.file_id == file_id)
    }

    /// Appends items not already present; returns the ones actually added.
    pub fn add(&mut self, items: Vec<FileItem>) -> Vec<FileItem> {
        let mut next = self.items.as_ref().clone();
        let mut added = Vec::new();
        for item in items {
            if next.iter().any(|existing| existing.file_id == item.file_id) {
                continue;
            }
            next.push(item.clone());
            added.push(item);
        }
        if !added.is_empty() {
            self.replace(next);
        }
        added
    }

    pub fn update_progress(&mut self, file_id: &str, progress: u8) -> bool {
        self.modify(file_id, |item| item.progress = Some(progress.min(100)))
    }

    pub fn complete_upload(&mut self, file_id: &str, uploaded: &UploadedFile) -> bool {
        self.modify(file_id, |item| {
            item.file.id = Some(uploaded.id.clone());
            item.progress = Some(100);
        })
    }

    pub fn remove(&mut self, file_id: &str) -> bool {
        if self.get(file_id).is_none() {
            return false;
        }
        let next = self
            .items
            .iter()
            .filter(|item| item.file_id != file_id)
            .cloned()
            .collect();
        self.replace(next);
        true
    }

    fn modify(&mut self, file_id: &str, apply: impl FnOnce(&mut FileItem)) -> bool {
        let mut next = self.items.as_ref().clone();
        let Some(target) = next.iter_mut().find(|item| item.file_id == file_id) else {
            return false;
        };
        apply(target);
        self.replace(next);
        true
    }

    fn replace(&mut self, next: Vec<FileItem>) {
        self.items = Arc::new(next);
        self.revision += 1;
    }
}

impl SourceAdapter for FileSource {
    fn source_type(&self) -> DataSourceType {
        DataSourceType::File
    }

    fn is_ready(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(FileItem::is_uploaded)
    }

    fn committed_selection(&self) -> Option<Selection> {
        if !self.is_ready() {
            return None;
        }
        let files = self
            .items
            .iter()
            .filter_map(|item| {
                item.file.id.as_ref().map(|id| UploadedFile {
                    id: id.clone(),
                    name: item.file.name.clone(),
                    size: item.file.size,
                    extension: item.file.extension.clone(),
                })
            })
            .collect();
        Some(Selection::Files(files))
    }

    fn preview_target(&self, key: &str) -> Option<PreviewTarget> {
        self.get(key).map(|item| PreviewTarget::LocalFile {
            file_id: item.file_id.clone(),
            name: item.file.name.clone(),
            path: item.file.path.clone(),
        })
    }

    fn reset(&mut self) {
        if !self.items.is_empty() {
            self.replace(Vec::new());
        }
    }
}
