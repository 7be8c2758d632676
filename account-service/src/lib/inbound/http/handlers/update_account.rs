use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;

use super::AccountData;
use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::account::errors::AccountError;
use crate::account::models::EmailAddress;
use crate::account::models::FullName;
use crate::account::models::UpdateAccountCommand;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

pub async fn update_account(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedAccount>,
    ApiJson(body): ApiJson<UpdateAccountRequest>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    state
        .account_service
        .update_details(&identity.account_id, body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref account| {
            ApiSuccess::new(
                StatusCode::OK,
                account.into(),
                "Account details updated successfully",
            )
        })
}

/// Both fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    email: String,
}

impl UpdateAccountRequest {
    fn try_into_command(self) -> Result<UpdateAccountCommand, AccountError> {
        Ok(UpdateAccountCommand {
            full_name: FullName::new(&self.full_name)?,
            email: EmailAddress::new(&self.email)?,
        })
    }
}
