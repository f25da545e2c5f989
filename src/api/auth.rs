use serde::Deserialize;

use super::ApiClient;
use crate::constants::{PATH_AUTH_CSRF, PATH_AUTH_LOGIN, PATH_AUTH_LOGOUT, PATH_AUTH_ME, PATH_AUTH_REGISTER};
use crate::errors::AppResult;
use crate::models::{LoginRequest, RegisterRequest, RegisteredUser, User, UserWire};
use crate::transport::ApiRequest;

#[derive(Deserialize)]
struct SessionWire {
    user: UserWire,
}

#[derive(Deserialize)]
struct DetailWire {
    #[serde(default)]
    detail: String,
}

impl ApiClient {
    /// Asks the backend to set the CSRF cookie.
    #[tracing::instrument(skip(self), err)]
    pub async fn ensure_csrf(&self) -> AppResult<()> {
        self.execute(ApiRequest::get(PATH_AUTH_CSRF)).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, payload), fields(username = %payload.username), err)]
    pub async fn login(&self, payload: &LoginRequest) -> AppResult<User> {
        let request = ApiRequest::post(PATH_AUTH_LOGIN).with_json(serde_json::to_value(payload)?);
        let session: SessionWire = self.execute_json(request).await?;
        Ok(session.user.into())
    }

    /// Ends the session and returns the backend's confirmation message.
    #[tracing::instrument(skip(self), err)]
    pub async fn logout(&self) -> AppResult<String> {
        let detail: DetailWire = self.execute_json(ApiRequest::get(PATH_AUTH_LOGOUT)).await?;
        Ok(detail.detail)
    }

    /// Returns the user of the current session.
    #[tracing::instrument(skip(self), err)]
    pub async fn me(&self) -> AppResult<User> {
        let session: SessionWire = self.execute_json(ApiRequest::get(PATH_AUTH_ME)).await?;
        Ok(session.user.into())
    }

    #[tracing::instrument(skip(self, payload), fields(username = %payload.username), err)]
    pub async fn register(&self, payload: &RegisterRequest) -> AppResult<RegisteredUser> {
        let request = ApiRequest::post(PATH_AUTH_REGISTER).with_json(serde_json::to_value(payload)?);
        self.execute_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserLevel;
    use crate::testing::{user_json, ScriptedTransport};
    use http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn login_posts_credentials_and_maps_user() {
        let transport = ScriptedTransport::new();
        transport.respond_json(200, json!({"detail": "Login successful", "user": user_json(1, "alice", "admin")}));

        let user = transport
            .client()
            .login(&LoginRequest {
                username: "alice".into(),
                password: "Secret1!".into(),
            })
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.level, UserLevel::Admin);

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/auth/login/");
        assert_eq!(
            request.body,
            crate::transport::RequestBody::Json(json!({"username": "alice", "password": "Secret1!"}))
        );
    }

    #[tokio::test]
    async fn register_returns_created_account() {
        let transport = ScriptedTransport::new();
        transport.respond_json(
            201,
            json!({"id": 9, "username": "dave", "full_name": "Dave", "email": "d@x.io",
                   "level": "user", "rank": 3, "storage_rel_path": "users/9"}),
        );

        let created = transport.client().register(&RegisterRequest::default()).await.unwrap();
        assert_eq!(created.id, 9);
        assert_eq!(created.level, Some(UserLevel::User));
    }

    #[tokio::test]
    async fn logout_uses_get_and_returns_detail() {
        let transport = ScriptedTransport::new();
        transport.respond_json(200, json!({"detail": "Logout successful"}));

        assert_eq!(transport.client().logout().await.unwrap(), "Logout successful");
        assert_eq!(transport.requests()[0].method, Method::GET);
    }
}
