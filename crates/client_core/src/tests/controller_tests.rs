use super::*;

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use shared::{domain::DocumentId, error::ApiException, protocol::UploadOutcome};
use tokio::sync::Notify;

use crate::{
    error::{BackendError, QUESTION_FAILED_MESSAGE},
    input::Key,
};

type UploadReply = Box<dyn Fn() -> Result<UploadOutcome, BackendError> + Send + Sync>;
type AskReply = Box<dyn Fn() -> Result<String, BackendError> + Send + Sync>;

struct RecordingBackend {
    upload_reply: UploadReply,
    ask_reply: AskReply,
    gate: Option<Arc<Notify>>,
    uploads: Mutex<Vec<SelectedFile>>,
    questions: Mutex<Vec<QuestionRequest>>,
}

impl RecordingBackend {
    fn ok() -> Self {
        Self {
            upload_reply: Box::new(|| {
                Ok(UploadOutcome {
                    summary: "This report covers Q1 earnings.".to_string(),
                    document_id: Some(DocumentId::new("doc-0001")),
                })
            }),
            ask_reply: Box::new(|| Ok("Revenue was $5M.".to_string())),
            gate: None,
            uploads: Mutex::new(Vec::new()),
            questions: Mutex::new(Vec::new()),
        }
    }

    fn with_upload_reply(
        mut self,
        reply: impl Fn() -> Result<UploadOutcome, BackendError> + Send + Sync + 'static,
    ) -> Self {
        self.upload_reply = Box::new(reply);
        self
    }

    fn with_ask_reply(
        mut self,
        reply: impl Fn() -> Result<String, BackendError> + Send + Sync + 'static,
    ) -> Self {
        self.ask_reply = Box::new(reply);
        self
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn upload_count(&self) -> usize {
        self.uploads.lock().expect("uploads").len()
    }

    fn questions(&self) -> Vec<QuestionRequest> {
        self.questions.lock().expect("questions").clone()
    }

    fn call_count(&self) -> usize {
        self.upload_count() + self.questions().len()
    }
}

#[async_trait]
impl QaBackend for RecordingBackend {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadOutcome, BackendError> {
        self.uploads.lock().expect("uploads").push(file.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        (self.upload_reply)()
    }

    async fn ask(&self, request: QuestionRequest) -> Result<String, BackendError> {
        self.questions.lock().expect("questions").push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        (self.ask_reply)()
    }
}

fn controller_with(backend: &Arc<RecordingBackend>) -> SessionController {
    let backend: Arc<dyn QaBackend> = backend.clone();
    SessionController::new(backend)
}

fn pdf_file(name: &str) -> SelectedFile {
    SelectedFile::new(name, "application/pdf", b"%PDF-1.7 test".to_vec())
}

async fn controller_with_document(backend: &Arc<RecordingBackend>) -> SessionController {
    let mut controller = controller_with(backend);
    controller.submit_file(pdf_file("report.pdf")).await;
    assert!(controller.session().has_active_file());
    controller
}

#[tokio::test]
async fn non_pdf_file_is_rejected_without_network_call() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with(&backend);

    controller
        .submit_file(SelectedFile::new("image.png", "image/png", vec![0x89, 0x50]))
        .await;

    assert_eq!(backend.call_count(), 0);
    assert_eq!(controller.session().answer(), "Please upload a PDF file");
    assert!(!controller.session().has_active_file());
    assert!(!controller.session().is_loading());
    assert_eq!(controller.session().file_name(), "");
}

#[tokio::test]
async fn pdf_upload_shows_summary_and_activates_preview() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with(&backend);

    controller.submit_file(pdf_file("report.pdf")).await;

    let session = controller.session();
    assert_eq!(session.answer(), "This report covers Q1 earnings.");
    assert_eq!(session.file_name(), "report.pdf");
    assert!(session.has_active_file());
    assert!(!session.is_loading());
    assert_eq!(session.document_id(), Some(&DocumentId::new("doc-0001")));
    assert_eq!(backend.upload_count(), 1);
    assert_eq!(
        controller.preview_bytes().as_deref(),
        Some(b"%PDF-1.7 test".as_slice())
    );
}

#[tokio::test]
async fn second_upload_releases_previous_preview() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with(&backend);

    controller.submit_file(pdf_file("first.pdf")).await;
    let first_url = controller
        .session()
        .preview()
        .map(|handle| handle.url().to_string())
        .expect("first preview");

    controller.submit_file(pdf_file("second.pdf")).await;

    assert_eq!(controller.previews().live_count(), 1);
    assert!(controller.previews().resolve(&first_url).is_none());
    assert_eq!(controller.session().file_name(), "second.pdf");
}

#[tokio::test]
async fn first_file_of_a_drop_is_used() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with(&backend);

    controller.submit_files(Vec::new()).await;
    assert_eq!(backend.call_count(), 0);
    assert_eq!(controller.snapshot(), SessionSnapshot::default());

    controller
        .submit_files(vec![pdf_file("a.pdf"), pdf_file("b.pdf")])
        .await;
    assert_eq!(backend.upload_count(), 1);
    assert_eq!(controller.session().file_name(), "a.pdf");
}

#[tokio::test]
async fn failed_upload_reports_failure_and_clears_loading() {
    let failures: [fn() -> BackendError; 3] = [
        || BackendError::Status {
            status: 500,
            message: None,
        },
        || BackendError::Application(ApiException::new("no text layer")),
        || BackendError::Decode("upload response has no summary".into()),
    ];

    for failure in failures {
        let backend = Arc::new(RecordingBackend::ok().with_upload_reply(move || Err(failure())));
        let mut controller = controller_with(&backend);

        controller.submit_file(pdf_file("report.pdf")).await;

        let session = controller.session();
        assert!(!session.is_loading());
        assert_eq!(session.answer(), UPLOAD_FAILED_MESSAGE);
        assert!(session.has_active_file());
        assert_eq!(session.document_id(), None);
    }
}

#[tokio::test]
async fn question_without_document_is_ignored() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with(&backend);
    controller.set_question("What is the revenue?");
    let before = controller.snapshot();

    controller.submit_question().await;

    assert_eq!(backend.call_count(), 0);
    assert_eq!(controller.snapshot(), before);
}

#[tokio::test]
async fn ask_without_document_leaves_state_unchanged() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with(&backend);
    let mut updates = controller.subscribe();
    let before = controller.snapshot();

    controller.ask("What is the revenue?").await;

    assert_eq!(backend.call_count(), 0);
    assert_eq!(controller.snapshot(), before);
    assert!(!updates.has_changed().expect("sender alive"));
}

#[tokio::test]
async fn ask_after_clearing_preview_leaves_state_unchanged() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with_document(&backend).await;
    controller.clear_preview();
    let before = controller.snapshot();

    controller.ask("What is the revenue?").await;

    assert!(backend.questions().is_empty());
    assert_eq!(controller.snapshot(), before);
}

#[tokio::test]
async fn blank_question_is_ignored() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with_document(&backend).await;

    for blank in ["", "   ", "\n\t"] {
        controller.set_question(blank);
        let before = controller.snapshot();
        controller.submit_question().await;
        assert_eq!(controller.snapshot(), before);
    }
    assert!(backend.questions().is_empty());
}

#[tokio::test]
async fn answered_question_clears_input_and_sends_document_id() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with_document(&backend).await;

    controller.ask("What is the revenue?").await;

    assert_eq!(controller.session().answer(), "Revenue was $5M.");
    assert_eq!(controller.session().question(), "");
    assert!(!controller.session().is_loading());
    assert_eq!(
        backend.questions(),
        vec![QuestionRequest {
            question: "What is the revenue?".to_string(),
            document_id: Some(DocumentId::new("doc-0001")),
        }]
    );
}

#[tokio::test]
async fn failed_question_keeps_input_and_shows_error() {
    let backend = Arc::new(RecordingBackend::ok().with_ask_reply(|| {
        Err(BackendError::Status {
            status: 400,
            message: Some("No document uploaded".to_string()),
        })
    }));
    let mut controller = controller_with_document(&backend).await;

    controller.ask("What is the revenue?").await;

    assert_eq!(controller.session().answer(), "No document uploaded");
    assert_eq!(controller.session().question(), "What is the revenue?");
    assert!(!controller.session().is_loading());
}

#[tokio::test]
async fn failed_question_without_message_uses_fallback() {
    let backend = Arc::new(
        RecordingBackend::ok()
            .with_ask_reply(|| Err(BackendError::Application(ApiException::new("")))),
    );
    let mut controller = controller_with_document(&backend).await;

    controller.ask("What is the revenue?").await;

    assert_eq!(controller.session().answer(), QUESTION_FAILED_MESSAGE);
}

#[tokio::test]
async fn over_length_question_is_rejected_locally() {
    let backend = Arc::new(RecordingBackend::ok());
    let backend_dyn: Arc<dyn QaBackend> = backend.clone();
    let mut controller = SessionController::new_with_dependencies(
        backend_dyn,
        PreviewRegistry::new(),
        QuestionBounds::new(10),
    );
    controller.submit_file(pdf_file("report.pdf")).await;

    controller.ask("This question is far too long").await;

    assert!(backend.questions().is_empty());
    assert_eq!(
        controller.session().answer(),
        "Question is too long (maximum 10 characters)"
    );
    assert_eq!(controller.session().question(), "This question is far too long");
}

#[tokio::test]
async fn question_is_trimmed_before_sending() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with_document(&backend).await;

    controller.ask("  Who wrote it?  ").await;

    assert_eq!(backend.questions()[0].question, "Who wrote it?");
}

#[tokio::test]
async fn only_plain_enter_submits_the_question() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with_document(&backend).await;
    controller.set_question("What is the revenue?");

    assert!(!controller.handle_key(InputKey::shift_enter()).await);
    assert!(
        !controller
            .handle_key(InputKey {
                key: Key::Char('x'),
                shift: false,
            })
            .await
    );
    assert!(backend.questions().is_empty());

    assert!(controller.handle_key(InputKey::enter()).await);
    assert_eq!(backend.questions().len(), 1);
}

#[tokio::test]
async fn clear_preview_releases_handle_and_blocks_questions() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with_document(&backend).await;

    controller.clear_preview();

    assert_eq!(controller.previews().live_count(), 0);
    assert!(!controller.session().has_active_file());
    assert_eq!(controller.session().file_name(), "report.pdf");
    assert_eq!(
        controller.session().answer(),
        "This report covers Q1 earnings."
    );
    assert_eq!(controller.placeholder(), "Upload a PDF first...");

    controller.ask("What is the revenue?").await;
    assert!(backend.questions().is_empty());
}

#[tokio::test]
async fn submit_control_follows_guards() {
    let backend = Arc::new(RecordingBackend::ok());
    let mut controller = controller_with(&backend);
    controller.set_question("What is the revenue?");
    assert!(!controller.can_type_question());
    assert!(!controller.can_submit_question());
    assert_eq!(controller.session().question(), "");

    controller.submit_file(pdf_file("report.pdf")).await;
    assert!(controller.can_type_question());
    assert!(!controller.can_submit_question());

    controller.set_question("What is the revenue?");
    assert!(controller.can_submit_question());

    controller.set_question("   ");
    assert!(!controller.can_submit_question());
}

#[tokio::test]
async fn loading_is_published_while_upload_is_pending() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(RecordingBackend::ok().gated(Arc::clone(&gate)));
    let mut controller = controller_with(&backend);
    let mut updates = controller.subscribe();

    let task = tokio::spawn(async move {
        controller.submit_file(pdf_file("report.pdf")).await;
        controller
    });

    let pending = updates
        .wait_for(|snapshot| snapshot.is_loading)
        .await
        .expect("loading snapshot")
        .clone();
    assert_eq!(pending.file_name, "report.pdf");
    assert!(pending.preview.is_some());
    assert_eq!(pending.answer, "");

    gate.notify_one();
    let controller = task.await.expect("join");

    assert!(!controller.session().is_loading());
    assert!(!updates.borrow().is_loading);
    assert_eq!(updates.borrow().answer, "This report covers Q1 earnings.");
}

#[tokio::test]
async fn cancelled_request_still_clears_loading() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(RecordingBackend::ok().gated(gate));
    let mut controller = controller_with(&backend);

    let result = tokio::time::timeout(
        Duration::from_millis(50),
        controller.submit_file(pdf_file("report.pdf")),
    )
    .await;

    assert!(result.is_err());
    assert!(!controller.session().is_loading());
    assert!(controller.session().has_active_file());
    assert_eq!(controller.session().answer(), "");
}
