use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::attachment::{Attachment as DomainAttachment, NewAttachment as DomainNewAttachment};
use crate::domain::types::{AttachmentId, AttachmentTitle, MimeType, TypeConstraintError};

/// Diesel model representing the `attachments` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::attachments)]
pub struct Attachment {
    pub id: i32,
    pub file_path: String,
    pub url: String,
    pub mime_type: String,
    pub title: String,
    pub created_at: NaiveDateTime,
}

/// Insertable form of [`Attachment`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::attachments)]
pub struct NewAttachment {
    pub file_path: String,
    pub url: String,
    pub mime_type: String,
    pub title: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<Attachment> for DomainAttachment {
    type Error = TypeConstraintError;

    fn try_from(attachment: Attachment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AttachmentId::new(attachment.id)?,
            file_path: attachment.file_path,
            url: attachment.url,
            mime_type: MimeType::new(attachment.mime_type)?,
            title: AttachmentTitle::new(attachment.title)?,
            created_at: attachment.created_at,
        })
    }
}

impl NewAttachment {
    pub fn from_domain(attachment: &DomainNewAttachment, now: NaiveDateTime) -> Self {
        Self {
            file_path: attachment.file_path.clone(),
            url: attachment.url.clone(),
            mime_type: attachment.mime_type.as_str().to_string(),
            title: attachment.title.as_str().to_string(),
            created_at: now,
        }
    }
}
