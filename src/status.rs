//! Request lifecycle shared by every store operation.
//!
//! ```text
//! Idle ──begin──▶ Loading ──succeed──▶ Succeeded
//!                    │                     │
//!                    └──fail──▶ Failed ◀───┘ (next attempt goes through begin)
//! Succeeded | Failed ──reset──▶ Idle
//! ```

use serde::Serialize;

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Status of one async concern plus its last error.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestState {
    pub status: RequestStatus,
    pub error: Option<String>,
}

impl RequestState {
    pub fn begin(&mut self) {
        self.status = RequestStatus::Loading;
        self.error = None;
    }

    pub fn succeed(&mut self) {
        self.status = RequestStatus::Succeeded;
        self.error = None;
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RequestStatus::Failed;
        self.error = Some(error.into());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Callers check this to ignore a second dispatch of the same operation.
    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions() {
        let mut state = RequestState::default();
        assert_eq!(state.status, RequestStatus::Idle);

        state.begin();
        assert!(state.is_loading());

        state.fail("Failed to load files");
        assert_eq!(state.status, RequestStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("Failed to load files"));

        state.begin();
        assert_eq!(state.error, None);
        state.succeed();
        assert_eq!(state.status, RequestStatus::Succeeded);

        state.reset();
        assert_eq!(state, RequestState::default());
    }
}
