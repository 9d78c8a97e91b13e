//! Upload slots and the files they hold.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::FileRejection;

use super::validator::{mime_from_path, validate_file};

// =============================================================================
// Upload Items
// =============================================================================

/// A file picked on this device, not yet sent.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LocalFile {
    pub name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing the MIME type from its extension.
    pub fn read(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(name, mime_from_path(path), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl std::fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// A file already stored on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteFile {
    pub name: String,
    pub url: String,
}

impl RemoteFile {
    /// Use `name` when given, otherwise the last URL segment.
    pub fn from_url(url: impl Into<String>, name: Option<&str>) -> Self {
        let url = url.into();
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => url
                .rsplit('/')
                .find(|s| !s.is_empty())
                .unwrap_or("file")
                .to_string(),
        };
        Self { name, url }
    }
}

/// Contents of a slot: new local bytes or a reference to a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UploadItem {
    Local(LocalFile),
    Remote(RemoteFile),
}

impl UploadItem {
    pub fn name(&self) -> &str {
        match self {
            UploadItem::Local(f) => &f.name,
            UploadItem::Remote(f) => &f.name,
        }
    }

    pub fn as_local(&self) -> Option<&LocalFile> {
        match self {
            UploadItem::Local(f) => Some(f),
            UploadItem::Remote(_) => None,
        }
    }
}

// =============================================================================
// Upload Slot
// =============================================================================

/// A named upload target ("Driving License", "Front View", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSlot {
    pub label: String,
    pub required: bool,
    items: Vec<UploadItem>,
    error: Option<String>,
}

impl UploadSlot {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            required: false,
            items: Vec::new(),
            error: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Last validation message shown next to the slot.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate and append. A rejection is recorded on this slot only.
    pub fn add(&mut self, file: LocalFile) -> Result<(), FileRejection> {
        match validate_file(&file) {
            Ok(()) => {
                self.error = None;
                self.items.push(UploadItem::Local(file));
                Ok(())
            }
            Err(rejection) => {
                self.error = Some(rejection.to_string());
                Err(rejection)
            }
        }
    }

    /// Add several files; accepted ones are kept, rejections are returned.
    pub fn add_all(&mut self, files: impl IntoIterator<Item = LocalFile>) -> Vec<FileRejection> {
        let mut rejected = Vec::new();
        for file in files {
            if let Err(rejection) = self.add(file) {
                rejected.push(rejection);
            }
        }
        if let Some(last) = rejected.last() {
            self.error = Some(last.to_string());
        }
        rejected
    }

    /// Append a server-side file without validation.
    pub fn attach_remote(&mut self, file: RemoteFile) {
        self.items.push(UploadItem::Remote(file));
    }

    pub fn remove(&mut self, index: usize) -> Option<UploadItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Files still to be sent.
    pub fn new_files(&self) -> impl Iterator<Item = &LocalFile> {
        self.items.iter().filter_map(UploadItem::as_local)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.error = None;
    }

    /// Forget server-side files, keeping local ones.
    pub fn drop_remote(&mut self) {
        self.items.retain(|item| matches!(item, UploadItem::Local(_)));
    }
}
