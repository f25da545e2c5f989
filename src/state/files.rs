//! # Files State
//!
//! The file list of the user being viewed (the caller, or another user when
//! an administrator opened their storage) plus one request state per
//! operation, so an upload in flight does not hide a failed rename.
//!
//! ## Merge Rules
//!
//! - fetch replaces the whole list
//! - upload prepends the created file
//! - delete filters the file out
//! - rename, comment, share and download patch the matching entry; a patch
//!   for an id that is not loaded is ignored

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::channel::mpsc;
use serde::Serialize;

use super::reject;
use crate::api::ApiClient;
use crate::constants::{
    DOWNLOAD_NAME_PREFIX, MSG_COMMENT_FAILED, MSG_DELETE_FILE_FAILED, MSG_DOWNLOAD_FAILED, MSG_FETCH_FILES_FAILED,
    MSG_FILE_NOT_LOADED, MSG_RENAME_FAILED, MSG_SHARE_DISABLE_FAILED, MSG_SHARE_ENABLE_FAILED, MSG_UPLOAD_FAILED,
};
use crate::download::DownloadSink;
use crate::errors::Rejection;
use crate::log_data;
use crate::logging::Logger;
use crate::models::{CommentedFile, DownloadMode, FileEntry, FilePatch, Patch, RenamedFile, ShareUpdate, UploadRequest};
use crate::status::RequestState;
use crate::store::Store;
use crate::utils::{build_name_with_date_time, normalize_nullable_text};

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilesState {
    pub items: Vec<FileEntry>,
    /// Owner passed to the last fetch; `None` means the caller's own files.
    pub viewing_user: Option<u64>,
    pub list: RequestState,
    pub upload: RequestState,
    pub remove: RequestState,
    pub rename: RequestState,
    pub comment: RequestState,
    pub share: RequestState,
    pub download: RequestState,
}

impl FilesState {
    pub fn file(&self, file_id: u64) -> Option<&FileEntry> {
        self.items.iter().find(|f| f.id == file_id)
    }

    fn patch(&mut self, file_id: u64, patch: FilePatch) {
        if let Some(file) = self.items.iter_mut().find(|f| f.id == file_id) {
            patch.apply_to(file);
        }
    }
}

/// What `edit_file` did. Each half is reported on its own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditOutcome {
    pub renamed: Option<RenamedFile>,
    pub commented: Option<CommentedFile>,
    /// Messages of the halves that failed, rename first.
    pub errors: Vec<String>,
}

impl EditOutcome {
    pub fn is_noop(&self) -> bool {
        self.renamed.is_none() && self.commented.is_none() && self.errors.is_empty()
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct FilesStore {
    client: ApiClient,
    state: Store<FilesState>,
}

impl FilesStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Store::default(),
        }
    }

    pub fn snapshot(&self) -> Arc<FilesState> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Arc<FilesState>> {
        self.state.subscribe()
    }

    /// Loads the file list, replacing whatever was loaded before.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Another user's storage to open, or `None` for the caller's own
    pub async fn fetch_files(&self, user_id: Option<u64>) -> Result<(), Rejection> {
        let log = Logger::new("files/fetch");
        self.state.update(|s| s.list.begin());

        match self.client.list_files(user_id).await {
            Ok(items) => {
                log.info("Files loaded", log_data!("count" => items.len(), "user_id" => user_id));
                self.state.update(|s| {
                    s.items = items;
                    s.viewing_user = user_id;
                    s.list.succeed();
                });
                Ok(())
            }
            Err(err) => {
                let rejection = reject(&log, &err, MSG_FETCH_FILES_FAILED);
                self.state.update(|s| s.list.fail(rejection.detail.clone()));
                Err(rejection)
            }
        }
    }

    /// Uploads a file; the created entry goes to the head of the list.
    /// A blank comment is not sent.
    pub async fn upload(&self, mut upload: UploadRequest) -> Result<FileEntry, Rejection> {
        let log = Logger::new("files/upload");
        self.state.update(|s| s.upload.begin());

        upload.comment = normalize_nullable_text(upload.comment.as_deref());
        match self.client.upload_file(upload).await {
            Ok(file) => {
                log.info("File uploaded", log_data!("file_id" => file.id, "size_bytes" => file.size_bytes));
                self.state.update(|s| {
                    s.items.insert(0, file.clone());
                    s.upload.succeed();
                });
                Ok(file)
            }
            Err(err) => {
                let rejection = reject(&log, &err, MSG_UPLOAD_FAILED);
                self.state.update(|s| s.upload.fail(rejection.detail.clone()));
                Err(rejection)
            }
        }
    }

    /// Returns the upload state to idle, e.g. when the upload dialog closes.
    pub fn reset_upload(&self) {
        self.state.update(|s| s.upload.reset());
    }

    pub async fn remove(&self, file_id: u64) -> Result<(), Rejection> {
        let log = Logger::new("files/delete");
        self.state.update(|s| s.remove.begin());

        match self.client.delete_file(file_id).await {
            Ok(detail) => {
                log.info("File deleted", log_data!("file_id" => file_id, "detail" => detail));
                self.state.update(|s| {
                    s.items.retain(|f| f.id != file_id);
                    s.remove.succeed();
                });
                Ok(())
            }
            Err(err) => {
                let rejection = reject(&log, &err, MSG_DELETE_FILE_FAILED);
                self.state.update(|s| s.remove.fail(rejection.detail.clone()));
                Err(rejection)
            }
        }
    }

    pub async fn rename(&self, file_id: u64, name: &str) -> Result<RenamedFile, Rejection> {
        let log = Logger::new("files/rename");
        self.state.update(|s| s.rename.begin());

        match self.client.rename_file(file_id, name).await {
            Ok(renamed) => {
                log.info("File renamed", log_data!("file_id" => file_id, "name" => renamed.original_name));
                self.state.update(|s| {
                    s.patch(renamed.id, renamed.clone().into());
                    s.rename.succeed();
                });
                Ok(renamed)
            }
            Err(err) => {
                let rejection = reject(&log, &err, MSG_RENAME_FAILED);
                self.state.update(|s| s.rename.fail(rejection.detail.clone()));
                Err(rejection)
            }
        }
    }

    /// Sets the comment, or clears it with `None`.
    pub async fn update_comment(&self, file_id: u64, comment: Option<&str>) -> Result<CommentedFile, Rejection> {
        let log = Logger::new("files/comment");
        self.state.update(|s| s.comment.begin());

        match self.client.comment_file(file_id, comment).await {
            Ok(commented) => {
                log.info("Comment updated", log_data!("file_id" => file_id, "cleared" => commented.comment.is_none()));
                self.state.update(|s| {
                    s.patch(commented.id, commented.clone().into());
                    s.comment.succeed();
                });
                Ok(commented)
            }
            Err(err) => {
                let rejection = reject(&log, &err, MSG_COMMENT_FAILED);
                self.state.update(|s| s.comment.fail(rejection.detail.clone()));
                Err(rejection)
            }
        }
    }

    pub async fn enable_share(&self, file_id: u64) -> Result<ShareUpdate, Rejection> {
        self.set_share(file_id, true).await
    }

    pub async fn disable_share(&self, file_id: u64) -> Result<ShareUpdate, Rejection> {
        self.set_share(file_id, false).await
    }

    async fn set_share(&self, file_id: u64, enable: bool) -> Result<ShareUpdate, Rejection> {
        let (log, fallback) = if enable {
            (Logger::new("files/share"), MSG_SHARE_ENABLE_FAILED)
        } else {
            (Logger::new("files/unshare"), MSG_SHARE_DISABLE_FAILED)
        };
        self.state.update(|s| s.share.begin());

        let result = if enable {
            self.client.enable_share(file_id).await
        } else {
            self.client.disable_share(file_id).await
        };

        match result {
            Ok(update) => {
                log.info("Share updated", log_data!("file_id" => update.file_id, "shared" => update.share.is_some()));
                self.state.update(|s| {
                    s.patch(update.file_id, update.clone().into());
                    s.share.succeed();
                });
                Ok(update)
            }
            Err(err) => {
                let rejection = reject(&log, &err, fallback);
                self.state.update(|s| s.share.fail(rejection.detail.clone()));
                Err(rejection)
            }
        }
    }

    /// Records that the file was downloaded at `at`.
    pub fn mark_downloaded(&self, file_id: u64, at: DateTime<Utc>) {
        self.apply_patch(
            file_id,
            FilePatch {
                last_downloaded_at: Patch::Set(Some(at)),
                ..FilePatch::default()
            },
        );
    }

    pub(crate) fn apply_patch(&self, file_id: u64, patch: FilePatch) {
        self.state.update(|s| s.patch(file_id, patch));
    }

    /// Downloads a file into `sink` under its original name and marks it as downloaded.
    ///
    /// A file without a usable name is saved as `downloaded_YYYYMMDD_HHMMSS`.
    pub async fn download(&self, file_id: u64, sink: &dyn DownloadSink) -> Result<(), Rejection> {
        let log = Logger::new("files/download");
        self.state.update(|s| s.download.begin());

        let filename = self
            .snapshot()
            .file(file_id)
            .map(|f| f.original_name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| build_name_with_date_time(DOWNLOAD_NAME_PREFIX));

        let saved = match self.client.download_file(file_id, DownloadMode::Attachment).await {
            Ok(bytes) => sink.save(&filename, &bytes).map(|_| bytes.len()),
            Err(err) => Err(err),
        };

        match saved {
            Ok(size) => {
                log.info("File downloaded", log_data!("file_id" => file_id, "filename" => filename, "bytes" => size));
                let now = Utc::now();
                self.state.update(|s| {
                    s.patch(
                        file_id,
                        FilePatch {
                            last_downloaded_at: Patch::Set(Some(now)),
                            ..FilePatch::default()
                        },
                    );
                    s.download.succeed();
                });
                Ok(())
            }
            Err(err) => {
                let rejection = reject(&log, &err, MSG_DOWNLOAD_FAILED);
                self.state.update(|s| s.download.fail(rejection.detail.clone()));
                Err(rejection)
            }
        }
    }

    /// Applies an edit form: renames and/or updates the comment, sending only
    /// what differs from the loaded entry. Both requests run concurrently and
    /// fail independently; a half that succeeded stays applied.
    ///
    /// The name is trimmed and a blank comment clears it. An empty name keeps
    /// the current one.
    pub async fn edit_file(&self, file_id: u64, name: &str, comment: &str) -> EditOutcome {
        let Some(current) = self.snapshot().file(file_id).cloned() else {
            return EditOutcome {
                errors: vec![MSG_FILE_NOT_LOADED.to_string()],
                ..EditOutcome::default()
            };
        };

        let name = name.trim();
        let comment = normalize_nullable_text(Some(comment));
        let rename_needed = !name.is_empty() && name != current.original_name;
        let comment_needed = comment != current.comment;

        let rename = async {
            if rename_needed {
                Some(self.rename(file_id, name).await)
            } else {
                None
            }
        };
        let update_comment = async {
            if comment_needed {
                Some(self.update_comment(file_id, comment.as_deref()).await)
            } else {
                None
            }
        };
        let (renamed, commented) = futures::join!(rename, update_comment);

        let mut outcome = EditOutcome::default();
        match renamed {
            Some(Ok(renamed)) => outcome.renamed = Some(renamed),
            Some(Err(rejection)) => outcome.errors.push(rejection.detail),
            None => {}
        }
        match commented {
            Some(Ok(commented)) => outcome.commented = Some(commented),
            Some(Err(rejection)) => outcome.errors.push(rejection.detail),
            None => {}
        }
        outcome
    }

    /// Drops every loaded file and request state, e.g. after logout.
    pub fn reset(&self) {
        self.state.update(|s| *s = FilesState::default());
    }
}
