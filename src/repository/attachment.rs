use chrono::Utc;
use diesel::prelude::*;

use crate::domain::attachment::NewAttachment;
use crate::domain::types::AttachmentId;
use crate::models::attachment::NewAttachment as DbNewAttachment;
use crate::repository::{AttachmentWriter, DieselRepository, RepositoryResult};

impl AttachmentWriter for DieselRepository {
    fn create_attachment(&self, attachment: &NewAttachment) -> RepositoryResult<AttachmentId> {
        use crate::schema::attachments;

        let mut conn = self.conn()?;
        let db_attachment = DbNewAttachment::from_domain(attachment, Utc::now().naive_utc());

        let id = diesel::insert_into(attachments::table)
            .values(&db_attachment)
            .returning(attachments::id)
            .get_result::<i32>(&mut conn)?;

        Ok(AttachmentId::new(id)?)
    }
}
