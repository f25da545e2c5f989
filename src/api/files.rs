use serde::Deserialize;
use serde_json::json;

use super::ApiClient;
use crate::constants::{PATH_FILES, PATH_FILES_UPLOAD};
use crate::errors::{ApiError, AppResult};
use crate::models::{
    CommentedFile, DownloadMode, FileEntry, FileWire, RenamedFile, ShareUpdate, ShareWire, UploadRequest,
};
use crate::transport::{ApiRequest, FormPart};

#[derive(Deserialize)]
struct DetailWire {
    #[serde(default)]
    detail: String,
}

fn file_path(file_id: u64, action: &str) -> String {
    if action.is_empty() {
        format!("{}{}/", PATH_FILES, file_id)
    } else {
        format!("{}{}/{}/", PATH_FILES, file_id, action)
    }
}

impl ApiClient {
    /// Lists the caller's files, or another user's when `user_id` is given (admins only).
    #[tracing::instrument(skip(self), err)]
    pub async fn list_files(&self, user_id: Option<u64>) -> AppResult<Vec<FileEntry>> {
        let mut request = ApiRequest::get(PATH_FILES);
        if let Some(user_id) = user_id {
            request = request.with_query("user_id", user_id);
        }

        let files: Vec<FileWire> = self.execute_json(request).await?;
        files.into_iter().map(FileEntry::try_from).collect()
    }

    /// Uploads one file as multipart form data; `comment` is sent only when present.
    #[tracing::instrument(skip(self, upload), fields(file_name = %upload.file_name, size = upload.bytes.len()), err)]
    pub async fn upload_file(&self, upload: UploadRequest) -> AppResult<FileEntry> {
        if upload.file_name.trim().is_empty() {
            return Err(ApiError::InvalidField {
                field: "file".to_string(),
                reason: "File name is required".to_string(),
            });
        }

        let mut parts = vec![FormPart::File {
            name: "file".to_string(),
            file_name: upload.file_name,
            content_type: upload.content_type,
            bytes: upload.bytes,
        }];
        if let Some(comment) = upload.comment {
            parts.push(FormPart::Text {
                name: "comment".to_string(),
                value: comment,
            });
        }

        let created: FileWire = self
            .execute_json(ApiRequest::post(PATH_FILES_UPLOAD).with_multipart(parts))
            .await?;
        created.try_into()
    }

    /// Absolute URL serving the file, for links and inline previews.
    pub fn download_url(&self, file_id: u64, mode: DownloadMode) -> String {
        let url = self.config.api_url(&file_path(file_id, "download"));
        match mode {
            DownloadMode::Attachment => url,
            DownloadMode::Preview => format!("{}?mode=preview", url),
        }
    }

    /// Fetches the file content.
    #[tracing::instrument(skip(self), err)]
    pub async fn download_file(&self, file_id: u64, mode: DownloadMode) -> AppResult<Vec<u8>> {
        let mut request = ApiRequest::get(file_path(file_id, "download"));
        if mode == DownloadMode::Preview {
            request = request.with_query("mode", "preview");
        }
        Ok(self.execute(request).await?.body)
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn delete_file(&self, file_id: u64) -> AppResult<String> {
        let detail: DetailWire = self.execute_json(ApiRequest::delete(file_path(file_id, ""))).await?;
        Ok(detail.detail)
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn rename_file(&self, file_id: u64, name: &str) -> AppResult<RenamedFile> {
        let request = ApiRequest::patch(file_path(file_id, "rename")).with_json(json!({ "name": name }));
        self.execute_json(request).await
    }

    /// Sets or clears (`None`) the file comment.
    #[tracing::instrument(skip(self), err)]
    pub async fn comment_file(&self, file_id: u64, comment: Option<&str>) -> AppResult<CommentedFile> {
        let request = ApiRequest::patch(file_path(file_id, "comment")).with_json(json!({ "comment": comment }));
        self.execute_json(request).await
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn enable_share(&self, file_id: u64) -> AppResult<ShareUpdate> {
        let share: ShareWire = self.execute_json(ApiRequest::post(file_path(file_id, "share"))).await?;
        share.try_into()
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn disable_share(&self, file_id: u64) -> AppResult<ShareUpdate> {
        let share: ShareWire = self
            .execute_json(ApiRequest::post(file_path(file_id, "share/disable")))
            .await?;
        share.try_into()
    }
}
