use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum_extra::extract::cookie::CookieJar;

use super::ApiError;
use super::ApiSuccess;
use super::EmptyData;
use crate::inbound::http::cookies;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedAccount>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<EmptyData>), ApiError> {
    state.account_service.logout(&identity.account_id).await?;

    Ok((
        cookies::without_session(jar, state.secure_cookies),
        ApiSuccess::new(StatusCode::OK, EmptyData {}, "User logged out"),
    ))
}
