//! Document session controller: owns the [`Session`] and sequences uploads and
//! questions against a [`QaBackend`].

use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use shared::{domain::is_pdf_content_type, protocol::QuestionRequest};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    input::{too_long_message, InputKey, PlaceholderRotation, QuestionBounds, QuestionCheck},
    preview::PreviewRegistry,
    session::{SelectedFile, Session, SessionSnapshot},
    transport::QaBackend,
};

pub const NON_PDF_MESSAGE: &str = "Please upload a PDF file";
pub const UPLOAD_FAILED_MESSAGE: &str = "Sorry, there was an error processing your PDF.";

/// Marks the session as loading for its lifetime and publishes a snapshot on
/// entry and on drop, so the flag is cleared even if the request future is
/// cancelled.
struct LoadingGuard<'a> {
    session: &'a mut Session,
    updates: &'a watch::Sender<SessionSnapshot>,
}

impl<'a> LoadingGuard<'a> {
    fn begin(session: &'a mut Session, updates: &'a watch::Sender<SessionSnapshot>) -> Self {
        session.is_loading = true;
        updates.send_replace(session.snapshot());
        Self { session, updates }
    }
}

impl Deref for LoadingGuard<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        &*self.session
    }
}

impl DerefMut for LoadingGuard<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        &mut *self.session
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.session.is_loading = false;
        self.updates.send_replace(self.session.snapshot());
    }
}

pub struct SessionController {
    backend: Arc<dyn QaBackend>,
    previews: PreviewRegistry,
    bounds: QuestionBounds,
    placeholders: PlaceholderRotation,
    session: Session,
    updates: watch::Sender<SessionSnapshot>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn QaBackend>) -> Self {
        Self::new_with_dependencies(backend, PreviewRegistry::new(), QuestionBounds::default())
    }

    pub fn new_with_dependencies(
        backend: Arc<dyn QaBackend>,
        previews: PreviewRegistry,
        bounds: QuestionBounds,
    ) -> Self {
        let session = Session::default();
        let (updates, _) = watch::channel(session.snapshot());
        Self {
            backend,
            previews,
            bounds,
            placeholders: PlaceholderRotation::default(),
            session,
            updates,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Receives a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn preview_bytes(&self) -> Option<Arc<[u8]>> {
        self.session.preview.as_ref().and_then(|handle| handle.bytes())
    }

    /// Whether the question input accepts typing.
    pub fn can_type_question(&self) -> bool {
        self.session.has_active_file() && !self.session.is_loading
    }

    /// Whether the submit control is enabled.
    pub fn can_submit_question(&self) -> bool {
        self.can_type_question() && !self.session.question.trim().is_empty()
    }

    pub fn placeholder(&mut self) -> &'static str {
        self.placeholders.next(self.session.has_active_file())
    }

    fn publish(&self) {
        self.updates.send_replace(self.session.snapshot());
    }

    /// Takes the first file of a pick/drop list.
    pub async fn submit_files(&mut self, files: Vec<SelectedFile>) {
        let Some(file) = files.into_iter().next() else {
            return;
        };
        self.submit_file(file).await;
    }

    pub async fn submit_file(&mut self, file: SelectedFile) {
        if self.session.is_loading {
            return;
        }

        if !is_pdf_content_type(&file.content_type) {
            warn!(
                file_name = %file.name,
                content_type = %file.content_type,
                "rejected non-PDF file"
            );
            self.session.answer = NON_PDF_MESSAGE.to_string();
            self.publish();
            return;
        }

        info!(
            file_name = %file.name,
            size_bytes = file.bytes.len(),
            "accepted document"
        );
        self.session.file_name = file.name.clone();
        // The previous handle is dropped here, releasing its preview.
        self.session.preview = Some(self.previews.create(&file.name, &file.bytes));
        self.session.document_id = None;

        let backend = Arc::clone(&self.backend);
        let mut loading = LoadingGuard::begin(&mut self.session, &self.updates);
        match backend.upload(&file).await {
            Ok(outcome) => {
                info!(
                    file_name = %file.name,
                    document_id = ?outcome.document_id,
                    "document uploaded"
                );
                loading.answer = outcome.summary;
                loading.document_id = outcome.document_id;
            }
            Err(err) => {
                warn!(file_name = %file.name, error = %err, "upload failed");
                loading.answer = UPLOAD_FAILED_MESSAGE.to_string();
            }
        }
    }

    /// Binds the question input text. Ignored while the input is disabled.
    pub fn set_question(&mut self, question: impl Into<String>) {
        if !self.can_type_question() {
            return;
        }
        self.session.question = question.into();
        self.publish();
    }

    /// Sets the question text and submits it.
    pub async fn ask(&mut self, question: impl Into<String>) {
        if !self.can_type_question() {
            debug!("ignoring question without an active document");
            return;
        }
        self.set_question(question);
        self.submit_question().await;
    }

    /// Submits on Enter without Shift. Returns whether the key was a submit key.
    pub async fn handle_key(&mut self, key: InputKey) -> bool {
        if !key.is_submit() {
            return false;
        }
        self.submit_question().await;
        true
    }

    pub async fn submit_question(&mut self) {
        if !self.can_type_question() {
            return;
        }

        let question = match self.bounds.check(&self.session.question) {
            QuestionCheck::Blank => return,
            QuestionCheck::TooLong { max } => {
                warn!(max, "rejected over-length question");
                self.session.answer = too_long_message(max);
                self.publish();
                return;
            }
            QuestionCheck::Accepted(question) => question.to_string(),
        };

        let request = QuestionRequest {
            question,
            document_id: self.session.document_id.clone(),
        };

        let backend = Arc::clone(&self.backend);
        let mut loading = LoadingGuard::begin(&mut self.session, &self.updates);
        match backend.ask(request).await {
            Ok(answer) => {
                info!(answer_len = answer.len(), "question answered");
                loading.answer = answer;
                loading.question.clear();
            }
            Err(err) => {
                warn!(error = %err, "question failed");
                loading.answer = err.question_failure_message();
            }
        }
    }

    /// Drops the preview so a different file can be chosen. The file name,
    /// answer and document id are kept.
    pub fn clear_preview(&mut self) {
        if self.session.is_loading {
            return;
        }
        if self.session.preview.take().is_some() {
            self.publish();
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
