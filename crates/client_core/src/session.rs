use std::path::Path;

use shared::domain::DocumentId;

use crate::preview::{PreviewHandle, PreviewInfo};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file picked or dropped by the user, with its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads `path` and guesses its content type from the extension.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        Ok(Self::new(name, content_type, bytes))
    }
}

/// In-memory state of one document-and-chat interaction.
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) is_loading: bool,
    pub(crate) file_name: String,
    pub(crate) preview: Option<PreviewHandle>,
    pub(crate) question: String,
    pub(crate) answer: String,
    pub(crate) document_id: Option<DocumentId>,
}

impl Session {
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    pub fn has_active_file(&self) -> bool {
        self.preview.is_some()
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        self.document_id.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            is_loading: self.is_loading,
            file_name: self.file_name.clone(),
            preview: self.preview.as_ref().map(|handle| handle.info().clone()),
            question: self.question.clone(),
            answer: self.answer.clone(),
            document_id: self.document_id.clone(),
        }
    }
}

/// Immutable copy of [`Session`] handed to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub is_loading: bool,
    pub file_name: String,
    pub preview: Option<PreviewInfo>,
    pub question: String,
    pub answer: String,
    pub document_id: Option<DocumentId>,
}
