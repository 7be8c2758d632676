use std::fmt;

use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::account::errors::AccountError;
use crate::account::models::AccountLookup;
use crate::account::models::LoginCommand;
use crate::account::models::Password;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<(CookieJar, ApiSuccess<LoginResponseData>), ApiError> {
    let session = state
        .account_service
        .login(body.try_into_command()?)
        .await?;

    let jar = cookies::with_session(jar, &session, state.secure_cookies);
    let data = LoginResponseData {
        user: (&session.account).into(),
        access_token: session.access_token,
        refresh_token: session.refresh_token,
    };

    Ok((
        jar,
        ApiSuccess::new(StatusCode::OK, data, "User logged in successfully"),
    ))
}

/// Either identifier may be given; at least one is required.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    username: Option<String>,
    email: Option<String>,
    #[serde(default)]
    password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl LoginRequest {
    fn try_into_command(self) -> Result<LoginCommand, AccountError> {
        Ok(LoginCommand {
            lookup: AccountLookup::for_login(self.username.as_deref(), self.email.as_deref())?,
            password: Password::new(&self.password)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseData {
    pub user: AccountData,
    pub access_token: String,
    pub refresh_token: String,
}
