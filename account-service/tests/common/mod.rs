#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use account_service::account::models::AccountLookup;
use account_service::account::models::RefreshPolicy;
use account_service::account::models::UploadedMedia;
use account_service::account::ports::AccountRepository;
use account_service::account::ports::MediaUploader;
use account_service::account::service::AccountService;
use account_service::inbound::http::router::create_router;
use account_service::repositories::InMemoryAccountRepository;
use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenIssuer;
use chrono::Duration;
use reqwest::header::HeaderMap;
use reqwest::header::SET_COOKIE;
use reqwest::multipart::Form;
use reqwest::multipart::Part;

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-key-at-least-32-bytes";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-key-at-least-32-bytes";
pub const MEDIA_HOST: &str = "https://media.test";

/// Media host stand-in. Accepts any non-empty file unless uploads are disabled.
pub struct FakeMediaUploader {
    accept_uploads: bool,
}

#[async_trait]
impl MediaUploader for FakeMediaUploader {
    async fn upload(&self, path: &Path) -> Option<UploadedMedia> {
        if !self.accept_uploads {
            return None;
        }
        let bytes = tokio::fs::read(path).await.ok()?;
        if bytes.is_empty() {
            return None;
        }
        let file_name = path.file_name()?.to_string_lossy();
        Some(UploadedMedia {
            url: format!("{}/{}", MEDIA_HOST, file_name),
        })
    }
}

/// Test application that spawns a real server backed by the in-memory store
pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryAccountRepository>,
    pub token_issuer: Arc<TokenIssuer>,
    pub api_client: reqwest::Client,
}

pub struct TestAppOptions {
    pub refresh_policy: RefreshPolicy,
    pub accept_uploads: bool,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            refresh_policy: RefreshPolicy::MatchStored,
            accept_uploads: true,
        }
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestAppOptions::default()).await
    }

    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with(options: TestAppOptions) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryAccountRepository::new());
        let token_issuer = Arc::new(
            TokenIssuer::new(
                ACCESS_SECRET,
                Duration::minutes(15),
                REFRESH_SECRET,
                Duration::days(10),
            )
            .expect("Failed to create token issuer"),
        );
        let media_uploader = Arc::new(FakeMediaUploader {
            accept_uploads: options.accept_uploads,
        });

        let account_service = AccountService::new(
            Arc::clone(&repository),
            media_uploader,
            Arc::clone(&token_issuer),
        )
        .with_password_hasher(PasswordHasher::with_cost(1024, 1, 1).unwrap())
        .with_refresh_policy(options.refresh_policy);

        // Plain http, so cookies are not marked Secure
        let router = create_router(Arc::new(account_service), Arc::clone(&token_issuer), false);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            repository,
            token_issuer,
            api_client: reqwest::Client::new(),
        }
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.patch(format!("{}{}", self.address, path))
    }

    /// Register an account through the API.
    pub async fn register(&self, form: Form) -> reqwest::Response {
        self.post("/api/v1/users/register")
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn register_default(&self) -> reqwest::Response {
        self.register(registration_form("sam", "sam@x.com", "Sam R", "p@ss1234"))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/api/v1/users/login")
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register the default account, log in and return the session tokens.
    pub async fn logged_in(&self) -> SessionTokens {
        self.register_default().await;
        let response = self.login("sam", "p@ss1234").await;
        let body: serde_json::Value = response.json().await.expect("Failed to parse response");

        SessionTokens {
            access_token: body["data"]["accessToken"].as_str().unwrap().to_string(),
            refresh_token: body["data"]["refreshToken"].as_str().unwrap().to_string(),
        }
    }

    pub async fn stored_refresh_token(&self, username: &str) -> Option<String> {
        let lookup = AccountLookup::for_login(Some(username), None).unwrap();
        self.repository
            .find_by_username_or_email(&lookup)
            .await
            .unwrap()
            .expect("Account not found")
            .refresh_token
    }
}

pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub fn image_part(file_name: &str) -> Part {
    Part::bytes(b"\x89PNG fake image bytes".to_vec()).file_name(file_name.to_string())
}

/// Registration form with an avatar attached.
pub fn registration_form(username: &str, email: &str, full_name: &str, password: &str) -> Form {
    Form::new()
        .text("username", username.to_string())
        .text("email", email.to_string())
        .text("fullName", full_name.to_string())
        .text("password", password.to_string())
        .part("avatar", image_part("avatar.png"))
}

/// `Set-Cookie` headers of a response, one string per cookie.
pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

pub fn set_cookie<'a>(cookies: &'a [String], name: &str) -> Option<&'a String> {
    let prefix = format!("{}=", name);
    cookies.iter().find(|cookie| cookie.starts_with(&prefix))
}

/// Value of a `Set-Cookie` header, without attributes.
pub fn cookie_value(cookie: &str) -> &str {
    cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value)
        .unwrap_or_default()
}
