use std::fmt;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use super::EmptyData;
use crate::account::errors::AccountError;
use crate::account::models::ChangePasswordCommand;
use crate::account::models::Password;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedAccount>,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> Result<ApiSuccess<EmptyData>, ApiError> {
    state
        .account_service
        .change_password(&identity.account_id, body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, EmptyData {}, "Password changed successfully"))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    old_password: String,
    #[serde(default)]
    new_password: String,
}

impl fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordRequest")
            .field("old_password", &"***")
            .field("new_password", &"***")
            .finish()
    }
}

impl ChangePasswordRequest {
    fn try_into_command(self) -> Result<ChangePasswordCommand, AccountError> {
        Ok(ChangePasswordCommand {
            old_password: Password::new(&self.old_password)?,
            new_password: Password::new(&self.new_password)?,
        })
    }
}
