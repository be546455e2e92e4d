use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

// Opaque identifier the backend assigns to an uploaded document.
id_newtype!(DocumentId, String);
id_newtype!(PreviewId, Uuid);

impl DocumentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PreviewId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Local URL a front end can hand to its viewer.
    pub fn url(&self) -> String {
        format!("preview://{}", self.0)
    }

    pub fn from_url(url: &str) -> Option<Self> {
        let raw = url.strip_prefix("preview://")?;
        Uuid::parse_str(raw).ok().map(Self)
    }
}

pub const PDF_MIME_MARKER: &str = "pdf";

/// Loose content-type check matching what browsers report for PDFs
/// (`application/pdf`, `application/x-pdf`, ...).
pub fn is_pdf_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains(PDF_MIME_MARKER)
}
