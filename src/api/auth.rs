//! Sign-in, sign-up and profile calls. The caller keeps the returned
//! session; nothing is stored here.

use log::info;
use reqwest::Method;

use crate::{
    error::Result,
    models::{AuthToken, ProfileUpdate, Registration, SessionContext, UserProfile},
};

use super::{
    client::{decode, send},
    ApiClient,
};

impl ApiClient {
    /// OAuth2 password form; `username` may also be the e-mail address.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionContext> {
        let request = self
            .http()
            .post(self.url("/api/auth/login"))
            .form(&[("username", username), ("password", password)]);
        let token: AuthToken = decode(send(request).await?).await?;
        info!("Signed in as user {}", token.user.id);
        Ok(token.into_session())
    }

    pub async fn register(&self, registration: &Registration) -> Result<SessionContext> {
        let request = self
            .http()
            .post(self.url("/api/auth/register"))
            .json(registration);
        let token: AuthToken = decode(send(request).await?).await?;
        info!("Registered user {}", token.user.id);
        Ok(token.into_session())
    }

    pub async fn current_user(&self, session: &SessionContext) -> Result<UserProfile> {
        let request = self.request(session, Method::GET, "/api/auth/me");
        decode(send(request).await?).await
    }

    pub async fn update_profile(
        &self,
        session: &SessionContext,
        update: &ProfileUpdate,
    ) -> Result<UserProfile> {
        let request = self
            .request(session, Method::PUT, "/api/auth/me")
            .json(update);
        decode(send(request).await?).await
    }
}
