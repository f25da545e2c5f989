//! # MyCloud Client
//!
//! Client-side core of the MyCloud personal storage service: a typed REST
//! client for the backend, observable state containers for the session,
//! the file list and the admin user roster, and the privilege rules that
//! decide which level changes an administrator may apply.
//!
//! ## Architecture
//!
//! - **Transport**: sends requests over a cookie-session `reqwest` client and
//!   echoes the CSRF token on mutating calls
//! - **API**: one typed method per backend endpoint, wire formats mapped to
//!   domain models
//! - **State**: `AuthStore`, `FilesStore` and `AdminUsersStore`, each
//!   publishing immutable snapshots through a `Store`
//! - **Permissions**: the level-change evaluator
//! - **App**: owns the client and the three stores
//!
//! ## Endpoints
//!
//! ```text
//! GET    /api/auth/csrf/                  - Set the CSRF cookie
//! POST   /api/auth/login/                 - Log in
//! GET    /api/auth/logout/                - Log out
//! GET    /api/auth/me/                    - Current session user
//! POST   /api/auth/register/              - Create an account
//! GET    /api/files/[?user_id=]           - List files
//! POST   /api/files/upload/               - Upload (multipart)
//! GET    /api/files/{id}/download/        - File content
//! DELETE /api/files/{id}/                 - Delete a file
//! PATCH  /api/files/{id}/rename/          - Rename
//! PATCH  /api/files/{id}/comment/         - Set or clear the comment
//! POST   /api/files/{id}/share/           - Enable the public link
//! POST   /api/files/{id}/share/disable/   - Disable the public link
//! GET    /api/admin/users/                - User roster
//! DELETE /api/admin/users/{id}/           - Delete a user
//! PATCH  /api/admin/users/{id}/level/     - Change a user's level
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use mycloud_client::{App, ClientConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let app = App::new(ClientConfig::default())?;
//! if app.start().await?.is_some() {
//!     app.files().fetch_files(None).await?;
//!     for file in &app.files().snapshot().items {
//!         println!("{} ({} bytes)", file.original_name, file.size_bytes);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod constants;
pub mod download;
pub mod errors;
pub mod logging;
pub mod models;
pub mod permissions;
pub mod state;
pub mod status;
pub mod store;
pub mod transport;
pub mod utils;
pub mod validation;

#[cfg(test)]
mod testing;

pub use api::ApiClient;
pub use app::App;
pub use config::ClientConfig;
pub use download::{DirectorySink, DownloadSink};
pub use errors::{ApiError, AppResult, FieldErrors, Rejection};
pub use models::{AdminUser, FileEntry, ShareLink, User, UserLevel, UserRank};
pub use permissions::can_change_level;
pub use state::{AdminUsersStore, AuthStore, FilesStore};
pub use status::{RequestState, RequestStatus};
