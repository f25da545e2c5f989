//! # Application State
//!
//! `App` bundles the API client and the three state containers. Build one at
//! startup and pass it by reference to whatever renders the UI; the stores
//! share the client, and through it one cookie session.

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::errors::{AppResult, Rejection};
use crate::log_data;
use crate::logging::Logger;
use crate::models::{User, UserLevel, UserRank};
use crate::permissions;
use crate::state::{AdminUsersStore, AuthStore, FilesStore};

pub struct App {
    client: ApiClient,
    auth: AuthStore,
    files: FilesStore,
    admin_users: AdminUsersStore,
}

impl App {
    /// Builds the application on top of a reqwest transport.
    pub fn new(config: ClientConfig) -> AppResult<Self> {
        Ok(Self::with_client(ApiClient::new(config)?))
    }

    /// Builds the application from the configuration in the environment,
    /// falling back to defaults when none is set.
    pub fn from_env() -> AppResult<Self> {
        Self::new(ClientConfig::load()?)
    }

    pub fn with_client(client: ApiClient) -> Self {
        Self {
            auth: AuthStore::new(client.clone()),
            files: FilesStore::new(client.clone()),
            admin_users: AdminUsersStore::new(client.clone()),
            client,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn files(&self) -> &FilesStore {
        &self.files
    }

    pub fn admin_users(&self) -> &AdminUsersStore {
        &self.admin_users
    }

    /// Primes the CSRF cookie and restores the session.
    ///
    /// A failure to obtain the CSRF cookie is logged and does not stop the
    /// bootstrap; the backend sets the cookie on later responses as well.
    pub async fn start(&self) -> Result<Option<User>, Rejection> {
        let log = Logger::new("app/start");
        if let Err(err) = self.client.ensure_csrf().await {
            log.warn("Could not prime CSRF cookie", log_data!("cause" => err.to_string()));
        }
        self.auth.bootstrap().await
    }

    /// Logs out and, on success, drops every user-specific state.
    pub async fn logout(&self) -> Result<(), Rejection> {
        self.auth.logout().await?;
        self.files.reset();
        self.admin_users.reset();
        Ok(())
    }

    /// Rank of the signed-in user.
    pub fn actor_rank(&self) -> Option<UserRank> {
        self.auth.snapshot().user.as_ref().map(|u| u.rank)
    }

    /// Whether the signed-in user may move the selected roster user to `selected`.
    pub fn can_apply_level(&self, selected: Option<UserLevel>) -> bool {
        let Some(actor) = self.actor_rank() else {
            return false;
        };
        self.admin_users
            .snapshot()
            .target_user
            .as_ref()
            .is_some_and(|target| permissions::can_apply_level(actor, target.user.rank, selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::RequestStatus;
    use crate::testing::{file_json, user_json, ScriptedTransport};
    use http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn start_without_session_is_idle() {
        let transport = ScriptedTransport::new();
        transport.respond_json(200, json!({"detail": "CSRF cookie set"}));
        transport.respond_json(401, json!({"detail": "Not authenticated"}));
        let app = App::with_client(transport.client());

        assert_eq!(app.start().await, Ok(None));

        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/auth/csrf/", "/auth/me/"]);
        assert_eq!(app.auth().snapshot().request.status, RequestStatus::Idle);
        assert_eq!(app.actor_rank(), None);
    }

    #[tokio::test]
    async fn start_survives_csrf_failure() {
        let transport = ScriptedTransport::new();
        transport.fail("connection refused");
        transport.respond_json(200, json!({"user": user_json(1, "alice", "user")}));
        let app = App::with_client(transport.client());

        let user = app.start().await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(app.actor_rank(), Some(UserRank::USER));
    }

    #[tokio::test]
    async fn logout_clears_user_specific_state() {
        let transport = ScriptedTransport::new();
        transport.respond_json(200, json!({"user": user_json(1, "root", "superuser")}));
        transport.respond_json(200, json!([file_json(1, "a.txt")]));
        transport.respond_json(200, json!({"detail": "Logged out"}));
        let app = App::with_client(transport.client());

        app.auth().bootstrap().await.unwrap();
        app.files().fetch_files(None).await.unwrap();
        app.logout().await.unwrap();

        assert!(app.files().snapshot().items.is_empty());
        assert!(app.auth().snapshot().user.is_none());
        assert_eq!(transport.requests().last().unwrap().method, Method::GET);
    }

    #[tokio::test]
    async fn senior_admin_cannot_promote_to_own_tier() {
        let mut bob = user_json(2, "bob", "user");
        bob["files_count"] = json!(0);
        bob["total_storage_bytes"] = json!(0);

        let transport = ScriptedTransport::new();
        transport.respond_json(200, json!({"user": user_json(1, "sam", "senior_admin")}));
        transport.respond_json(200, json!([bob]));
        let app = App::with_client(transport.client());

        app.auth().bootstrap().await.unwrap();
        app.admin_users().fetch_users().await.unwrap();
        assert!(!app.can_apply_level(Some(UserLevel::Admin)));

        app.admin_users().select_target(2);
        assert!(!app.can_apply_level(Some(UserLevel::SeniorAdmin)));
        assert!(!app.can_apply_level(Some(UserLevel::User)));
        assert!(!app.can_apply_level(None));
        assert!(app.can_apply_level(Some(UserLevel::Admin)));
    }
}
