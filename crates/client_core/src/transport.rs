use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    error::ErrorBody,
    protocol::{
        AnswerResponse, QuestionRequest, UploadOutcome, UploadResponse, QUESTION_PATH,
        UPLOAD_FILE_FIELD, UPLOAD_PATH,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{error::BackendError, session::SelectedFile};

/// The two remote operations the session controller depends on.
#[async_trait]
pub trait QaBackend: Send + Sync {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadOutcome, BackendError>;
    async fn ask(&self, request: QuestionRequest) -> Result<String, BackendError>;
}

pub struct HttpQaBackend {
    http: Client,
    base_url: Url,
}

impl HttpQaBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, http: Client) -> Result<Self, BackendError> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path)?)
    }
}

/// Parses `raw` and makes sure relative joins land under its path.
pub fn normalize_base_url(raw: &str) -> Result<Url, BackendError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn error_message(response: Response) -> Option<String> {
    let body = response.json::<ErrorBody>().await.ok()?;
    body.message().map(str::to_string)
}

async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = error_message(response).await;
    warn!(status = status.as_u16(), ?message, "backend returned error status");
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl QaBackend for HttpQaBackend {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadOutcome, BackendError> {
        let url = self.endpoint(UPLOAD_PATH)?;
        debug!(%url, file_name = %file.name, size_bytes = file.bytes.len(), "uploading document");

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part(UPLOAD_FILE_FIELD, part);

        let response = self.http.post(url).multipart(form).send().await?;
        let body: UploadResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        body.into_outcome()?
            .ok_or_else(|| BackendError::Decode("upload response has no summary".into()))
    }

    async fn ask(&self, request: QuestionRequest) -> Result<String, BackendError> {
        let url = self.endpoint(QUESTION_PATH)?;
        debug!(%url, document_id = ?request.document_id, "asking question");

        let response = self.http.post(url).json(&request).send().await?;
        let body: AnswerResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        body.into_answer()?
            .ok_or_else(|| BackendError::Decode("question response has no answer".into()))
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
