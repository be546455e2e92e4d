use serde::{Deserialize, Serialize};

use crate::{domain::DocumentId, error::ApiException};

/// Multipart field name carrying the PDF on `/api/upload`.
pub const UPLOAD_FILE_FIELD: &str = "file";
pub const UPLOAD_PATH: &str = "api/upload";
pub const QUESTION_PATH: &str = "api/question";

/// Response of `POST /api/upload`: either `summary` or `error` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub summary: String,
    pub document_id: Option<DocumentId>,
}

impl UploadResponse {
    /// `Ok(None)` means the body carried neither field.
    pub fn into_outcome(self) -> Result<Option<UploadOutcome>, ApiException> {
        if let Some(error) = self.error.filter(|error| !error.is_empty()) {
            return Err(ApiException::new(error));
        }
        Ok(self.summary.map(|summary| UploadOutcome {
            summary,
            document_id: self.document_id,
        }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
}

/// Response of `POST /api/question`: either `answer` or `error` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnswerResponse {
    pub fn into_answer(self) -> Result<Option<String>, ApiException> {
        if let Some(error) = self.error.filter(|error| !error.is_empty()) {
            return Err(ApiException::new(error));
        }
        Ok(self.answer)
    }
}
