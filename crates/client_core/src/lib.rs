//! Client-side core of the document question-answering app: backend access,
//! local previews and the session controller that ties them together.

pub mod controller;
pub mod error;
pub mod input;
pub mod preview;
pub mod session;
pub mod transport;

pub use controller::{SessionController, NON_PDF_MESSAGE, UPLOAD_FAILED_MESSAGE};
pub use error::{BackendError, QUESTION_FAILED_MESSAGE, QUESTION_STATUS_FALLBACK};
pub use input::{InputKey, Key, PlaceholderRotation, QuestionBounds};
pub use preview::{PreviewHandle, PreviewInfo, PreviewRegistry};
pub use session::{SelectedFile, Session, SessionSnapshot};
pub use transport::{HttpQaBackend, QaBackend};
