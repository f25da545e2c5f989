use serde_json::json;

use super::ApiClient;
use crate::constants::PATH_ADMIN_USERS;
use crate::errors::AppResult;
use crate::models::{AdminUser, AdminUserWire, DeleteUserOutcome, DeleteUserWire, LevelChange, LevelChangeWire, UserLevel};
use crate::transport::ApiRequest;

impl ApiClient {
    /// Fetches the full roster with per-user file statistics.
    #[tracing::instrument(skip(self), err)]
    pub async fn list_users(&self) -> AppResult<Vec<AdminUser>> {
        let users: Vec<AdminUserWire> = self.execute_json(ApiRequest::get(PATH_ADMIN_USERS)).await?;
        Ok(users.into_iter().map(AdminUser::from).collect())
    }

    /// Deletes an account, optionally together with its stored files.
    #[tracing::instrument(skip(self), err)]
    pub async fn delete_user(&self, user_id: u64, delete_files: bool) -> AppResult<DeleteUserOutcome> {
        let mut request = ApiRequest::delete(format!("{}{}/", PATH_ADMIN_USERS, user_id));
        if delete_files {
            request = request.with_query("delete_files", 1);
        }

        let outcome: DeleteUserWire = self.execute_json(request).await?;
        Ok(DeleteUserOutcome {
            user_id,
            detail: outcome.detail,
            files_deleted: outcome.files_deleted,
        })
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn set_user_level(&self, user_id: u64, level: UserLevel) -> AppResult<LevelChange> {
        let request = ApiRequest::patch(format!("{}{}/level/", PATH_ADMIN_USERS, user_id))
            .with_json(json!({ "level": level }));
        let change: LevelChangeWire = self.execute_json(request).await?;
        Ok(change.into())
    }
}
