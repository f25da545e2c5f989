//! # Admin Users State
//!
//! The user roster shown to administrators, and the user currently selected
//! for a level change or deletion (`target_user`). The selected user is a
//! copy of a roster entry; both are patched together when a level change
//! succeeds, so no snapshot ever shows them disagreeing.

use std::sync::Arc;

use futures::channel::mpsc;
use serde::Serialize;

use super::reject;
use crate::api::ApiClient;
use crate::constants::{MSG_CHANGE_LEVEL_FAILED, MSG_DELETE_USER_FAILED, MSG_FETCH_USERS_FAILED};
use crate::errors::Rejection;
use crate::log_data;
use crate::logging::Logger;
use crate::models::{AdminUser, DeleteUserOutcome, LevelChange, UserLevel, UserRank};
use crate::permissions;
use crate::status::RequestState;
use crate::store::Store;

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminUsersState {
    pub items: Vec<AdminUser>,
    pub fetch: RequestState,
    pub remove: RequestState,
    pub change_level: RequestState,
    pub target_user: Option<AdminUser>,
}

impl AdminUsersState {
    pub fn user(&self, user_id: u64) -> Option<&AdminUser> {
        self.items.iter().find(|u| u.user.id == user_id)
    }

    /// Levels `actor` may assign to the selected user; empty when nobody is selected.
    pub fn target_level_options(&self, actor: UserRank) -> Vec<UserLevel> {
        self.target_user
            .as_ref()
            .map(|target| permissions::level_options(actor, target.user.rank))
            .unwrap_or_default()
    }
}

pub struct AdminUsersStore {
    client: ApiClient,
    state: Store<AdminUsersState>,
}

impl AdminUsersStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Store::default(),
        }
    }

    pub fn snapshot(&self) -> Arc<AdminUsersState> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Arc<AdminUsersState>> {
        self.state.subscribe()
    }

    pub async fn fetch_users(&self) -> Result<(), Rejection> {
        let log = Logger::new("admin/fetch_users");
        self.state.update(|s| s.fetch.begin());

        match self.client.list_users().await {
            Ok(items) => {
                log.info("Roster loaded", log_data!("count" => items.len()));
                self.state.update(|s| {
                    s.items = items;
                    s.fetch.succeed();
                });
                Ok(())
            }
            Err(err) => {
                let rejection = reject(&log, &err, MSG_FETCH_USERS_FAILED);
                self.state.update(|s| s.fetch.fail(rejection.detail.clone()));
                Err(rejection)
            }
        }
    }

    /// Deletes a user and drops them from the roster.
    ///
    /// The roster entry is removed whether or not the backend also deleted the
    /// user's files; `files_deleted` in the outcome is only for messaging.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Account to delete
    /// * `delete_files` - Also remove the user's stored files
    pub async fn remove_user(&self, user_id: u64, delete_files: bool) -> Result<DeleteUserOutcome, Rejection> {
        let log = Logger::new("admin/delete_user");
        self.state.update(|s| s.remove.begin());

        match self.client.delete_user(user_id, delete_files).await {
            Ok(outcome) => {
                log.info(
                    "User deleted",
                    log_data!("user_id" => user_id, "files_deleted" => outcome.files_deleted),
                );
                self.state.update(|s| {
                    s.items.retain(|u| u.user.id != user_id);
                    if s.target_user.as_ref().is_some_and(|t| t.user.id == user_id) {
                        s.target_user = None;
                    }
                    s.remove.succeed();
                });
                Ok(outcome)
            }
            Err(err) => {
                let rejection = reject(&log, &err, MSG_DELETE_USER_FAILED);
                self.state.update(|s| s.remove.fail(rejection.detail.clone()));
                Err(rejection)
            }
        }
    }

    /// Assigns a new level; the roster entry and the selected user are patched together.
    pub async fn change_level(&self, user_id: u64, level: UserLevel) -> Result<LevelChange, Rejection> {
        let log = Logger::new("admin/change_level");
        self.state.update(|s| s.change_level.begin());

        match self.client.set_user_level(user_id, level).await {
            Ok(change) => {
                log.info(
                    "Level changed",
                    log_data!("user_id" => change.user_id, "level" => change.level.as_str()),
                );
                self.state.update(|s| {
                    if let Some(entry) = s.items.iter_mut().find(|u| u.user.id == change.user_id) {
                        change.apply_to(&mut entry.user);
                    }
                    if let Some(target) = s.target_user.as_mut().filter(|t| t.user.id == change.user_id) {
                        change.apply_to(&mut target.user);
                    }
                    s.change_level.succeed();
                });
                Ok(change)
            }
            Err(err) => {
                let rejection = reject(&log, &err, MSG_CHANGE_LEVEL_FAILED);
                self.state.update(|s| s.change_level.fail(rejection.detail.clone()));
                Err(rejection)
            }
        }
    }

    /// Clears the error of every roster operation.
    pub fn clear_errors(&self) {
        self.state.update(|s| {
            s.fetch.clear_error();
            s.remove.clear_error();
            s.change_level.clear_error();
        });
    }

    /// Selects a roster entry as the target of the next admin action.
    pub fn select_target(&self, user_id: u64) -> Option<AdminUser> {
        self.state.update(|s| {
            s.target_user = s.user(user_id).cloned();
            s.target_user.clone()
        })
    }

    pub fn clear_target(&self) {
        self.state.update(|s| s.target_user = None);
    }

    /// Drops the roster and selection, e.g. after logout.
    pub fn reset(&self) {
        self.state.update(|s| *s = AdminUsersState::default());
    }
}
