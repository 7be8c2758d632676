use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use ring::digest::Context;
use ring::digest::SHA1_FOR_LEGACY_USE_ONLY;
use serde::Deserialize;

use crate::account::errors::MediaUploadError;
use crate::account::models::UploadedMedia;
use crate::account::ports::MediaUploader;
use crate::config::MediaConfig;

const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com";

/// Cloudinary credentials used for signed uploads.
#[derive(Clone)]
pub struct Credentials {
    pub cloud_name: String,
    pub api_key: String,
    /// Never sent over the wire, only used to sign requests.
    pub api_secret: String,
}

/// Uploads files to Cloudinary with signed requests.
///
/// Resource type is detected by Cloudinary (`auto`), so images and other media
/// go through the same endpoint.
pub struct CloudinaryUploader {
    client: reqwest::Client,
    credentials: Credentials,
    folder: Option<String>,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryUploader {
    pub fn new(credentials: Credentials, folder: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            folder,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        let credentials = Credentials {
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        };
        let uploader = Self::new(credentials, config.folder.clone());
        match &config.api_base_url {
            Some(base_url) => uploader.with_api_base_url(base_url),
            None => uploader,
        }
    }

    pub fn with_api_base_url(mut self, api_base_url: &str) -> Self {
        self.api_base_url = api_base_url.trim_end_matches('/').to_string();
        self
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/auto/upload",
            self.api_base_url, self.credentials.cloud_name
        )
    }

    /// Signed parameters, sorted by name.
    fn signed_params(&self, timestamp: i64) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(2);
        if let Some(folder) = &self.folder {
            params.push(("folder", folder.clone()));
        }
        params.push(("timestamp", timestamp.to_string()));
        params
    }

    async fn try_upload(&self, path: &Path) -> Result<UploadedMedia, MediaUploadError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| MediaUploadError::ReadFailed(e.to_string()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let params = self.signed_params(Utc::now().timestamp());
        let signature = sign(&params, &self.credentials.api_secret);

        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("api_key", self.credentials.api_key.clone())
            .text("signature", signature);
        for (name, value) in params {
            form = form.text(name, value);
        }

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaUploadError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaUploadError::InvalidResponse(format!(
                "{}: {}",
                status, body
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaUploadError::InvalidResponse(e.to_string()))?;

        Ok(UploadedMedia {
            url: body.secure_url,
        })
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, path: &Path) -> Option<UploadedMedia> {
        match self.try_upload(path).await {
            Ok(media) => {
                tracing::debug!(url = %media.url, "Media uploaded");
                Some(media)
            }
            Err(e) => {
                tracing::error!(error = %e, "Media upload failed");
                None
            }
        }
    }
}

/// `name=value` pairs joined with `&`, in the given order.
fn string_to_sign(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&")
}

fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut payload = string_to_sign(params);
    payload.push_str(api_secret);
    sha1_hex(payload.as_bytes())
}

fn sha1_hex(data: &[u8]) -> String {
    let mut context = Context::new(&SHA1_FOR_LEGACY_USE_ONLY);
    context.update(data);
    hex::encode(context.finish())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Json;
    use axum::Router;
    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            cloud_name: "demo".to_string(),
            api_key: "111111111111111".to_string(),
            api_secret: "SECRET_KEY".to_string(),
        }
    }

    async fn spawn_media_host(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", address)
    }

    fn media_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not really a png").unwrap();
        file
    }

    #[test]
    fn test_sha1_hex() {
        assert_eq!(
            sha1_hex(b"hello world!"),
            "430ce34d020724ed75a196dfc2ad67c77772d169"
        );
    }

    #[test]
    fn test_signed_params_are_sorted() {
        let uploader = CloudinaryUploader::new(credentials(), Some("avatars".to_string()));
        let params = uploader.signed_params(1700000000);

        assert_eq!(
            string_to_sign(&params),
            "folder=avatars&timestamp=1700000000"
        );
        assert_eq!(
            sign(&params, "SECRET_KEY"),
            sha1_hex(b"folder=avatars&timestamp=1700000000SECRET_KEY")
        );
    }

    #[test]
    fn test_upload_url() {
        let uploader = CloudinaryUploader::new(credentials(), None)
            .with_api_base_url("http://localhost:9000/");
        assert_eq!(
            uploader.upload_url(),
            "http://localhost:9000/v1_1/demo/auto/upload"
        );
    }

    #[tokio::test]
    async fn test_upload_returns_secure_url() {
        let router = Router::new().route(
            "/v1_1/demo/auto/upload",
            post(|mut multipart: Multipart| async move {
                let mut fields = Vec::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    fields.push(field.name().unwrap_or_default().to_string());
                }
                assert!(fields.contains(&"file".to_string()));
                assert!(fields.contains(&"signature".to_string()));
                assert!(fields.contains(&"timestamp".to_string()));
                assert!(!fields.contains(&"api_secret".to_string()));

                Json(json!({ "secure_url": "https://res.example.com/demo/avatar.png" }))
            }),
        );
        let base_url = spawn_media_host(router).await;

        let uploader =
            CloudinaryUploader::new(credentials(), None).with_api_base_url(&base_url);
        let file = media_file();

        let media = uploader.upload(file.path()).await;
        assert_eq!(
            media,
            Some(UploadedMedia {
                url: "https://res.example.com/demo/avatar.png".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_upload_failure_yields_none() {
        let router = Router::new().route(
            "/v1_1/demo/auto/upload",
            post(|| async { (StatusCode::UNAUTHORIZED, "Invalid Signature") }),
        );
        let base_url = spawn_media_host(router).await;

        let uploader =
            CloudinaryUploader::new(credentials(), None).with_api_base_url(&base_url);
        let file = media_file();

        assert_eq!(uploader.upload(file.path()).await, None);
    }

    #[tokio::test]
    async fn test_missing_file_yields_none() {
        let uploader = CloudinaryUploader::new(credentials(), None);
        assert_eq!(
            uploader.upload(Path::new("/definitely/not/here.png")).await,
            None
        );
    }
}
