//! # Auth State
//!
//! Holds the session user. `bootstrap` restores the session on startup; a
//! 401 there simply means nobody is logged in and is not reported as an
//! error. Registration is validated locally before anything is sent and
//! does not log the new account in.

use std::sync::Arc;

use futures::channel::mpsc;
use http::StatusCode;
use serde::Serialize;

use super::reject;
use crate::api::ApiClient;
use crate::constants::{
    MSG_BOOTSTRAP_FAILED, MSG_LOGIN_FAILED, MSG_LOGOUT_FAILED, MSG_REGISTER_FAILED, MSG_VALIDATION_ERROR,
};
use crate::errors::{FieldErrors, Rejection};
use crate::log_data;
use crate::logging::Logger;
use crate::models::{LoginRequest, RegisterRequest, RegisteredUser, User};
use crate::status::RequestState;
use crate::store::Store;
use crate::validation::FormValidation;

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<User>,
    pub request: RequestState,
    pub field_errors: Option<FieldErrors>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

pub struct AuthStore {
    client: ApiClient,
    state: Store<AuthState>,
}

impl AuthStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Store::default(),
        }
    }

    pub fn snapshot(&self) -> Arc<AuthState> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Arc<AuthState>> {
        self.state.subscribe()
    }

    fn begin(&self) {
        self.state.update(|s| {
            s.request.begin();
            s.field_errors = None;
        });
    }

    fn fail(&self, rejection: &Rejection) {
        self.state.update(|s| {
            s.request.fail(rejection.detail.clone());
            s.field_errors = None;
        });
    }

    /// Registration is the only operation that keeps per-field errors.
    fn fail_registration(&self, rejection: &Rejection) {
        self.state.update(|s| {
            s.request.fail(rejection.detail.clone());
            s.field_errors = rejection.errors.clone();
        });
    }

    /// Logs in and stores the returned user. The username is sent trimmed.
    pub async fn login(&self, payload: LoginRequest) -> Result<User, Rejection> {
        let log = Logger::new("auth/login");
        self.begin();

        let payload = payload.normalized();

        match self.client.login(&payload).await {
            Ok(user) => {
                log.info("Logged in", log_data!("user_id" => user.id, "level" => user.level.as_str()));
                self.state.update(|s| {
                    s.request.succeed();
                    s.user = Some(user.clone());
                });
                Ok(user)
            }
            Err(err) => {
                let rejection = reject(&log, &err, MSG_LOGIN_FAILED);
                self.fail(&rejection);
                Err(rejection)
            }
        }
    }

    /// Ends the session; on success the state is back to logged-out and idle.
    pub async fn logout(&self) -> Result<(), Rejection> {
        let log = Logger::new("auth/logout");
        self.begin();

        match self.client.logout().await {
            Ok(detail) => {
                log.info("Logged out", log_data!("detail" => detail));
                self.state.update(|s| *s = AuthState::default());
                Ok(())
            }
            Err(err) => {
                let rejection = reject(&log, &err, MSG_LOGOUT_FAILED);
                self.fail(&rejection);
                Err(rejection)
            }
        }
    }

    /// Restores the session from the backend cookie.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(user))` - A session exists
    /// * `Ok(None)` - The backend answered 401; state is logged-out and idle
    /// * `Err(rejection)` - Any other failure
    pub async fn bootstrap(&self) -> Result<Option<User>, Rejection> {
        let log = Logger::new("auth/bootstrap");
        self.begin();

        match self.client.me().await {
            Ok(user) => {
                log.info("Session restored", log_data!("user_id" => user.id));
                self.state.update(|s| {
                    s.request.succeed();
                    s.user = Some(user.clone());
                });
                Ok(Some(user))
            }
            Err(err) => {
                if err.status() == Some(StatusCode::UNAUTHORIZED) {
                    log.info("No active session", None);
                    self.state.update(|s| *s = AuthState::default());
                    return Ok(None);
                }
                let rejection = reject(&log, &err, MSG_BOOTSTRAP_FAILED);
                self.fail(&rejection);
                Err(rejection)
            }
        }
    }

    /// Creates an account. The trimmed form is checked locally first; when it
    /// fails the operation is rejected with the field map and nothing is sent.
    pub async fn register(&self, payload: RegisterRequest) -> Result<RegisteredUser, Rejection> {
        let log = Logger::new("auth/register");
        self.begin();

        let payload = payload.normalized();
        let field_errors = FormValidation::validate_registration(&payload);
        if !field_errors.is_empty() {
            log.info(
                "Registration form rejected locally",
                log_data!("fields" => field_errors.keys().collect::<Vec<_>>()),
            );
            let rejection = Rejection::new(None, MSG_VALIDATION_ERROR).with_errors(field_errors);
            self.fail_registration(&rejection);
            return Err(rejection);
        }

        match self.client.register(&payload).await {
            Ok(registered) => {
                log.info("Registered", log_data!("user_id" => registered.id));
                self.state.update(|s| s.request.succeed());
                Ok(registered)
            }
            Err(err) => {
                let rejection = reject(&log, &err, MSG_REGISTER_FAILED);
                self.fail_registration(&rejection);
                Err(rejection)
            }
        }
    }

    /// Clears the error and field errors, keeping the status.
    pub fn reset_error(&self) {
        self.state.update(|s| {
            s.request.clear_error();
            s.field_errors = None;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserLevel;
    use crate::status::RequestStatus;
    use crate::testing::{user_json, ScriptedTransport};
    use crate::transport::RequestBody;
    use serde_json::json;

    fn login_form() -> LoginRequest {
        LoginRequest {
            username: "alice".into(),
            password: "Secret1!".into(),
        }
    }

    fn register_form() -> RegisterRequest {
        RegisterRequest {
            username: "alice".into(),
            full_name: "Alice Liddell".into(),
            email: "alice@example.com".into(),
            password: "Secret1!".into(),
        }
    }

    #[tokio::test]
    async fn login_success_sets_user() {
        let transport = ScriptedTransport::new();
        transport.respond_json(200, json!({"user": user_json(1, "alice", "user")}));
        let store = AuthStore::new(transport.client());

        let user = store.login(login_form()).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.user.as_ref(), Some(&user));
        assert_eq!(state.request.status, RequestStatus::Succeeded);
        assert_eq!(state.request.error, None);
        assert!(state.is_authenticated());
    }

    #[tokio::test]
    async fn login_rejection_uses_backend_detail() {
        let transport = ScriptedTransport::new();
        transport.respond_json(401, json!({"detail": "Invalid credentials"}));
        let store = AuthStore::new(transport.client());

        let rejection = store.login(login_form()).await.unwrap_err();

        assert_eq!(rejection.detail, "Invalid credentials");
        let state = store.snapshot();
        assert_eq!(state.request.status, RequestStatus::Failed);
        assert_eq!(state.request.error.as_deref(), Some("Invalid credentials"));
        assert!(state.user.is_none());
    }

    #[tokio::test]
    async fn login_network_failure_uses_fallback() {
        let transport = ScriptedTransport::new();
        transport.fail("connection reset");
        let store = AuthStore::new(transport.client());

        store.login(login_form()).await.unwrap_err();
        assert_eq!(store.snapshot().request.error.as_deref(), Some(MSG_LOGIN_FAILED));
    }

    #[tokio::test]
    async fn subscribers_see_pending_then_fulfilled() {
        use futures::StreamExt;

        let transport = ScriptedTransport::new();
        transport.respond_json(200, json!({"user": user_json(1, "alice", "user")}));
        let store = AuthStore::new(transport.client());
        let mut rx = store.subscribe();

        store.login(login_form()).await.unwrap();

        assert_eq!(rx.next().await.unwrap().request.status, RequestStatus::Idle);
        assert_eq!(rx.next().await.unwrap().request.status, RequestStatus::Loading);
        let last = rx.next().await.unwrap();
        assert_eq!(last.request.status, RequestStatus::Succeeded);
        assert_eq!(last.user.as_ref().unwrap().username, "alice");
    }

    #[tokio::test]
    async fn bootstrap_unauthorized_is_logged_out_and_idle() {
        let transport = ScriptedTransport::new();
        transport.respond_json(401, json!({"detail": "Authentication credentials were not provided."}));
        let store = AuthStore::new(transport.client());

        assert_eq!(store.bootstrap().await, Ok(None));

        let state = store.snapshot();
        assert_eq!(state.request.status, RequestStatus::Idle);
        assert_eq!(state.request.error, None);
        assert!(state.user.is_none());
    }

    #[tokio::test]
    async fn bootstrap_server_error_is_reported() {
        let transport = ScriptedTransport::new();
        transport.respond_json(500, json!({}));
        let store = AuthStore::new(transport.client());

        let rejection = store.bootstrap().await.unwrap_err();
        assert_eq!(rejection.detail, MSG_BOOTSTRAP_FAILED);
        assert_eq!(store.snapshot().request.status, RequestStatus::Failed);
    }

    #[tokio::test]
    async fn bootstrap_restores_session() {
        let transport = ScriptedTransport::new();
        transport.respond_json(200, json!({"user": user_json(3, "root", "superuser")}));
        let store = AuthStore::new(transport.client());

        let user = store.bootstrap().await.unwrap().unwrap();
        assert_eq!(user.level, UserLevel::Superuser);
        assert_eq!(store.snapshot().user.as_ref().unwrap().rank.value(), 0);
    }

    #[tokio::test]
    async fn logout_returns_to_idle_without_user() {
        let transport = ScriptedTransport::new();
        transport.respond_json(200, json!({"user": user_json(1, "alice", "user")}));
        transport.respond_json(200, json!({"detail": "Logged out"}));
        let store = AuthStore::new(transport.client());

        store.login(login_form()).await.unwrap();
        store.logout().await.unwrap();

        assert_eq!(*store.snapshot(), AuthState::default());
    }

    #[tokio::test]
    async fn failed_logout_keeps_user() {
        let transport = ScriptedTransport::new();
        transport.respond_json(200, json!({"user": user_json(1, "alice", "user")}));
        transport.respond_json(500, json!({"detail": 5}));
        let store = AuthStore::new(transport.client());

        store.login(login_form()).await.unwrap();
        store.logout().await.unwrap_err();

        let state = store.snapshot();
        assert!(state.user.is_some());
        assert_eq!(state.request.error.as_deref(), Some(MSG_LOGOUT_FAILED));
    }

    #[tokio::test]
    async fn invalid_registration_fails_without_request() {
        let transport = ScriptedTransport::new();
        let store = AuthStore::new(transport.client());

        let rejection = store
            .register(RegisterRequest {
                username: "1x".into(),
                ..register_form()
            })
            .await
            .unwrap_err();

        assert_eq!(rejection.detail, MSG_VALIDATION_ERROR);
        assert!(transport.requests().is_empty());
        let state = store.snapshot();
        assert_eq!(state.request.status, RequestStatus::Failed);
        assert!(state.field_errors.as_ref().unwrap().contains_key("username"));
    }

    #[tokio::test]
    async fn backend_registration_errors_are_attached() {
        let transport = ScriptedTransport::new();
        transport.respond_json(
            400,
            json!({"detail": "Validation error", "errors": {"username": ["already taken"]}}),
        );
        let store = AuthStore::new(transport.client());

        store.register(register_form()).await.unwrap_err();

        let state = store.snapshot();
        assert_eq!(state.request.error.as_deref(), Some("Validation error"));
        assert_eq!(
            state.field_errors.as_ref().unwrap()["username"],
            vec!["already taken".to_string()]
        );

        store.reset_error();
        let state = store.snapshot();
        assert_eq!(state.request.error, None);
        assert_eq!(state.field_errors, None);
        assert_eq!(state.request.status, RequestStatus::Failed);
    }

    #[tokio::test]
    async fn forms_are_sent_trimmed() {
        let transport = ScriptedTransport::new();
        transport.respond_json(200, json!({"user": user_json(1, "alice", "user")}));
        transport.respond_json(201, json!({"id": 9, "username": "alice"}));
        let store = AuthStore::new(transport.client());

        store
            .login(LoginRequest {
                username: " alice ".into(),
                password: " Secret1! ".into(),
            })
            .await
            .unwrap();
        store
            .register(RegisterRequest {
                username: "  alice ".into(),
                full_name: " Alice ".into(),
                email: " alice@example.com ".into(),
                password: "Secret1!".into(),
            })
            .await
            .unwrap();

        let bodies: Vec<serde_json::Value> = transport
            .requests()
            .into_iter()
            .map(|r| match r.body {
                RequestBody::Json(value) => value,
                other => panic!("expected json body, got {:?}", other),
            })
            .collect();
        assert_eq!(bodies[0], json!({"username": "alice", "password": " Secret1! "}));
        assert_eq!(
            bodies[1],
            json!({
                "username": "alice",
                "full_name": "Alice",
                "email": "alice@example.com",
                "password": "Secret1!"
            })
        );
    }

    #[tokio::test]
    async fn only_registration_keeps_field_errors() {
        let transport = ScriptedTransport::new();
        transport.respond_json(
            400,
            json!({"detail": "Invalid credentials", "errors": {"username": ["unknown"]}}),
        );
        let store = AuthStore::new(transport.client());

        store.login(login_form()).await.unwrap_err();

        let state = store.snapshot();
        assert_eq!(state.request.error.as_deref(), Some("Invalid credentials"));
        assert_eq!(state.field_errors, None);
    }

    #[tokio::test]
    async fn registration_does_not_log_in() {
        let transport = ScriptedTransport::new();
        transport.respond_json(
            201,
            json!({
                "id": 9,
                "username": "alice",
                "full_name": "Alice Liddell",
                "email": "alice@example.com",
                "level": "user",
                "storage_rel_path": "users/9"
            }),
        );
        let store = AuthStore::new(transport.client());

        let registered = store.register(register_form()).await.unwrap();
        assert_eq!(registered.id, 9);
        let state = store.snapshot();
        assert_eq!(state.request.status, RequestStatus::Succeeded);
        assert!(state.user.is_none());
    }
}
