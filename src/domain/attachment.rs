use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{AttachmentId, AttachmentTitle, MimeType};

/// A media file registered in the local store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub file_path: String,
    pub url: String,
    pub mime_type: MimeType,
    pub title: AttachmentTitle,
    pub created_at: NaiveDateTime,
}

/// Data required to register a new [`Attachment`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAttachment {
    pub file_path: String,
    pub url: String,
    pub mime_type: MimeType,
    pub title: AttachmentTitle,
}
