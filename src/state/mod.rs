//! # State Containers
//!
//! One container per domain concern: [`AuthStore`] (session user),
//! [`FilesStore`] (the file list) and [`AdminUsersStore`] (the user roster).
//! Each wraps a [`Store`](crate::store::Store) and exposes async operations
//! that follow the same three phases:
//!
//! 1. **Pending**: the operation's [`RequestState`](crate::status::RequestState)
//!    goes to `Loading` and its previous error is cleared.
//! 2. **Fulfilled**: the result is merged into the entities and the status
//!    becomes `Succeeded`.
//! 3. **Rejected**: entities are left alone, the status becomes `Failed` and
//!    the error holds the classified detail or the operation's fallback.
//!
//! Operations return the classified [`Rejection`] as well, so a caller can
//! react to the outcome (close a dialog, keep a form open) without reading
//! the snapshot back.

pub mod admin_users;
pub mod auth;
pub mod files;

pub use admin_users::{AdminUsersState, AdminUsersStore};
pub use auth::{AuthState, AuthStore};
pub use files::{EditOutcome, FilesState, FilesStore};

use crate::errors::{ApiError, Rejection};
use crate::log_data;
use crate::logging::Logger;

/// Classifies `err` and logs the outcome under the operation's logger.
///
/// An unreachable backend is logged as an error; a response the backend
/// rejected is a warning.
pub(crate) fn reject(log: &Logger, err: &ApiError, fallback: &str) -> Rejection {
    let rejection = err.classify(fallback);
    let data = log_data!(
        "status" => rejection.status,
        "detail" => rejection.detail,
        "cause" => err.to_string()
    );
    if matches!(err, ApiError::Transport(_)) {
        log.error("Backend unreachable", data);
    } else {
        log.warn("Request rejected", data);
    }
    rejection
}
