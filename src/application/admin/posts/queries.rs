use uuid::Uuid;

use crate::application::repos::AdminPostFilter;
use crate::domain::entities::PostRecord;

use super::service::AdminPostService;
use super::types::AdminPostError;

impl AdminPostService {
    /// Every post, drafts included. Never cached.
    pub async fn list(&self, filter: &AdminPostFilter) -> Result<Vec<PostRecord>, AdminPostError> {
        self.reader
            .list_for_admin(filter)
            .await
            .map_err(AdminPostError::from)
    }

    pub async fn load_post(&self, id: Uuid) -> Result<PostRecord, AdminPostError> {
        self.reader
            .find_by_id(id)
            .await?
            .ok_or(AdminPostError::NotFound)
    }
}
