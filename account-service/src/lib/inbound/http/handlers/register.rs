use std::path::Path;

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use axum::extract::State;
use axum::http::StatusCode;
use tempfile::NamedTempFile;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::AccountError;
use crate::account::models::EmailAddress;
use crate::account::models::FullName;
use crate::account::models::Password;
use crate::account::models::RegisterCommand;
use crate::account::models::Username;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    // Temp files are removed when `form` is dropped, after the upload completed.
    let form = RegisterForm::read(multipart).await?;

    state
        .account_service
        .register(form.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref account| {
            ApiSuccess::new(
                StatusCode::CREATED,
                account.into(),
                "User registered successfully",
            )
        })
}

/// Multipart registration form, with uploaded files spooled to disk.
#[derive(Default)]
struct RegisterForm {
    username: String,
    email: String,
    full_name: String,
    password: String,
    avatar: Option<NamedTempFile>,
    cover_image: Option<NamedTempFile>,
}

impl RegisterForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "username" => form.username = field.text().await.map_err(bad_multipart)?,
                "email" => form.email = field.text().await.map_err(bad_multipart)?,
                "fullName" => form.full_name = field.text().await.map_err(bad_multipart)?,
                "password" => form.password = field.text().await.map_err(bad_multipart)?,
                "avatar" => form.avatar = spool(field).await?,
                "coverImage" => form.cover_image = spool(field).await?,
                other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
            }
        }

        Ok(form)
    }

    fn try_into_command(&self) -> Result<RegisterCommand, AccountError> {
        Ok(RegisterCommand {
            username: Username::new(&self.username)?,
            email: EmailAddress::new(&self.email)?,
            full_name: FullName::new(&self.full_name)?,
            password: Password::new(&self.password)?,
            avatar: self.avatar.as_ref().map(|file| file.path().to_path_buf()),
            cover_image: self
                .cover_image
                .as_ref()
                .map(|file| file.path().to_path_buf()),
        })
    }
}

/// Write a file field to a temp file. Empty uploads count as absent.
async fn spool(field: Field<'_>) -> Result<Option<NamedTempFile>, ApiError> {
    let extension = field
        .file_name()
        .and_then(|name| Path::new(name).extension())
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let bytes = field.bytes().await.map_err(bad_multipart)?;
    if bytes.is_empty() {
        return Ok(None);
    }

    let file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&extension)
        .tempfile()
        .map_err(|e| ApiError::from(anyhow::Error::from(e)))?;
    tokio::fs::write(file.path(), &bytes)
        .await
        .map_err(|e| ApiError::from(anyhow::Error::from(e)))?;

    Ok(Some(file))
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart body: {}", e))
}
