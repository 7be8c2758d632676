use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::cookies;
use crate::inbound::http::cookies::REFRESH_TOKEN_COOKIE;
use crate::inbound::http::router::AppState;

pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshTokenRequest>>,
) -> Result<(CookieJar, ApiSuccess<RefreshTokenResponseData>), ApiError> {
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| body.and_then(|Json(body)| body.refresh_token))
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized request".to_string()))?;

    let session = state.account_service.refresh(&presented).await?;

    let jar = cookies::with_session(jar, &session, state.secure_cookies);
    let data = RefreshTokenResponseData {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
    };

    Ok((
        jar,
        ApiSuccess::new(StatusCode::OK, data, "Access token refreshed"),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponseData {
    pub access_token: String,
    pub refresh_token: String,
}
