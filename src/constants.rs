//! # Application Constants
//!
//! This module defines the constants shared by the API client, the state
//! stores and the configuration layer. Centralizing them keeps endpoint paths
//! and user-facing fallback messages consistent across the crate.
//!
//! ## Endpoints
//!
//! Paths are relative to the API prefix (`/api` by default) and always end
//! with a slash, matching the backend's URL configuration.
//!
//! ## Fallback Messages
//!
//! Every store operation has a fixed message that is surfaced when a failure
//! carries no usable `detail` from the backend.

/// Environment variable holding the JSON client configuration
pub const CONFIG_ENV_VAR: &str = "MYCLOUD_CLIENT_CONFIG";

/// Default backend origin
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default API prefix appended to the origin
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Cookie the backend stores the CSRF token in
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";

/// Header the CSRF token is echoed in on mutating requests
pub const DEFAULT_CSRF_HEADER: &str = "X-CSRFToken";

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const PATH_AUTH_CSRF: &str = "/auth/csrf/";
pub const PATH_AUTH_LOGIN: &str = "/auth/login/";
pub const PATH_AUTH_LOGOUT: &str = "/auth/logout/";
pub const PATH_AUTH_ME: &str = "/auth/me/";
pub const PATH_AUTH_REGISTER: &str = "/auth/register/";
pub const PATH_FILES: &str = "/files/";
pub const PATH_FILES_UPLOAD: &str = "/files/upload/";
pub const PATH_ADMIN_USERS: &str = "/admin/users/";

// Fallback messages, one per store operation.
pub const MSG_LOGIN_FAILED: &str = "Login failed";
pub const MSG_LOGOUT_FAILED: &str = "Logout failed";
pub const MSG_BOOTSTRAP_FAILED: &str = "Auth bootstrap failed";
pub const MSG_REGISTER_FAILED: &str = "Registration failed";
pub const MSG_VALIDATION_ERROR: &str = "Validation error";
pub const MSG_FETCH_FILES_FAILED: &str = "Failed to load files";
pub const MSG_UPLOAD_FAILED: &str = "Failed to upload file";
pub const MSG_DELETE_FILE_FAILED: &str = "Failed to delete file";
pub const MSG_RENAME_FAILED: &str = "Failed to rename file";
pub const MSG_COMMENT_FAILED: &str = "Failed to update comment";
pub const MSG_SHARE_ENABLE_FAILED: &str = "Failed to enable sharing";
pub const MSG_SHARE_DISABLE_FAILED: &str = "Failed to disable sharing";
pub const MSG_DOWNLOAD_FAILED: &str = "Failed to download file";
pub const MSG_FETCH_USERS_FAILED: &str = "Failed to load users";
pub const MSG_DELETE_USER_FAILED: &str = "Failed to delete user";
pub const MSG_CHANGE_LEVEL_FAILED: &str = "Failed to change user level";

/// Prefix used for generated download names when a file has no name
pub const DOWNLOAD_NAME_PREFIX: &str = "downloaded";

/// Reported when an edit targets a file that is not in the loaded list
pub const MSG_FILE_NOT_LOADED: &str = "File is not in the loaded list";
