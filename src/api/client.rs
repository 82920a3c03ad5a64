use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{
    ChatAction, ChatStatus, ChatSummary, CheckPhoneReply, ErrorReply, OpenedChat, ProfileField,
    SearchPerson, SearchResults, ToggleRequest,
};

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";
const SESSION_COOKIE: &str = "sessionid";

/// HTTP access to the Messenger server. Cheap to clone; clones share the
/// connection pool and the cookie jar.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base: Url,
    jar: Arc<Jar>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let base = Url::parse(&crate::utils::normalize_url(base_url))?;
        let jar = Arc::new(Jar::default());
        let http = HttpClient::builder()
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { http, base, jar })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base.join(path)?)
    }

    /// Value of a cookie the server has set for our base URL.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        let header = header.to_str().ok()?;
        crate::utils::cookie_value(header, name)
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.cookie(CSRF_COOKIE)
    }

    /// `Cookie` header to replay on the push channel handshake.
    pub fn cookie_header(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        header.to_str().ok().map(str::to_string)
    }

    pub fn has_session(&self) -> bool {
        self.cookie(SESSION_COOKIE).is_some()
    }

    fn with_csrf(&self, req: RequestBuilder) -> RequestBuilder {
        match self.csrf_token() {
            Some(token) => req.header(CSRF_HEADER, token),
            None => {
                debug!("no {CSRF_COOKIE} cookie yet, sending without {CSRF_HEADER}");
                req
            }
        }
    }

    /// Turn a non-success reply into an error, preferring the server's own
    /// `error` text.
    async fn check(resp: Response) -> ApiResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        if let Ok(ErrorReply { error: Some(error) }) = serde_json::from_str::<ErrorReply>(&body) {
            return Err(ApiError::Server(error));
        }
        Err(ApiError::Http {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("request failed").to_string(),
        })
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        debug!("GET {url}");
        let resp = self.http.get(url).header("Accept", "application/json").send().await?;
        Self::decode(Self::check(resp).await?).await
    }

    async fn send_json<B: Serialize + ?Sized>(&self, req: RequestBuilder, body: &B) -> ApiResult<Response> {
        let resp = self.with_csrf(req).json(body).send().await?;
        Self::check(resp).await
    }

    /// Fetch the login page once so the server hands out its CSRF cookie.
    pub async fn bootstrap_csrf(&self) -> ApiResult<()> {
        let url = self.endpoint("/login/")?;
        let resp = self.http.get(url).send().await?;
        if self.csrf_token().is_none() {
            warn!("server did not set a {CSRF_COOKIE} cookie (HTTP {})", resp.status());
        }
        Ok(())
    }

    pub async fn active_chats(&self) -> ApiResult<Vec<ChatSummary>> {
        self.get_json(self.endpoint("/api/chats/active/")?).await
    }

    pub async fn favourite_chats(&self) -> ApiResult<Vec<ChatSummary>> {
        self.get_json(self.endpoint("/api/chats/favourites/")?).await
    }

    pub async fn archived_chats(&self) -> ApiResult<Vec<ChatSummary>> {
        self.get_json(self.endpoint("/api/chats/archived/")?).await
    }

    pub async fn search(&self, query: &str) -> ApiResult<SearchResults> {
        let mut url = self.endpoint("/api/search-users")?;
        url.query_pairs_mut().append_pair("q", query);
        self.get_json(url).await
    }

    /// Our own profile. The search reply always echoes the caller as
    /// `selfUser`, so searching for our phone is enough.
    pub async fn own_profile(&self, full_phone: &str) -> ApiResult<Option<SearchPerson>> {
        Ok(self.search(full_phone).await?.self_user)
    }

    pub async fn chat_status(&self, phone: &str) -> ApiResult<ChatStatus> {
        let mut url = self.endpoint("/api/chat-status/")?;
        url.query_pairs_mut().append_pair("phone", phone);
        self.get_json(url).await
    }

    pub async fn toggle_chat(&self, phone: &str, action: ChatAction) -> ApiResult<ChatStatus> {
        let url = self.endpoint("/api/chat-toggle/")?;
        let resp = self.send_json(self.http.post(url), &ToggleRequest { phone, action }).await?;
        Self::decode(resp).await
    }

    pub async fn get_or_create_chat(&self, phone: &str) -> ApiResult<OpenedChat> {
        let url = self.endpoint("/api/get_or_create_chat/")?;
        let resp = self
            .send_json(self.http.post(url), &serde_json::json!({ "phone": phone }))
            .await?;
        Self::decode(resp).await
    }

    pub async fn mark_message_read(&self, message_id: i64) -> ApiResult<()> {
        let url = self.endpoint(&format!("/api/messages/{message_id}/mark-read/"))?;
        self.send_json(self.http.post(url), &serde_json::json!({ "read": true })).await?;
        Ok(())
    }

    pub async fn update_profile_field(&self, field: ProfileField, value: &str) -> ApiResult<()> {
        let url = self.endpoint("/api/setup/")?;
        let mut body = serde_json::Map::new();
        body.insert(field.as_str().to_string(), serde_json::Value::String(value.to_string()));
        self.send_json(self.http.put(url), &body).await?;
        Ok(())
    }

    pub async fn upload_profile_picture(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<()> {
        let url = self.endpoint("/api/setup/")?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("profile_picture", part);
        let resp = self.with_csrf(self.http.post(url)).multipart(form).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn check_phone(&self, phone: &str) -> ApiResult<bool> {
        let url = self.endpoint("/check-phone/")?;
        let resp = self
            .send_json(self.http.post(url), &serde_json::json!({ "phone": phone }))
            .await?;
        let reply: CheckPhoneReply = Self::decode(resp).await?;
        Ok(reply.exists)
    }

    pub async fn login(&self, full_phone: &str, password: &str) -> ApiResult<()> {
        let url = self.endpoint("/api/login/")?;
        let body = serde_json::json!({ "fullPhone": full_phone, "password": password });
        self.send_json(self.http.post(url), &body).await?;
        Ok(())
    }

    pub async fn register(&self, phone: &str, password: &str) -> ApiResult<()> {
        let url = self.endpoint("/register/")?;
        let body = serde_json::json!({ "phone": phone, "password": password });
        self.send_json(self.http.post(url), &body).await?;
        Ok(())
    }

    pub async fn logout(&self) -> ApiResult<()> {
        let url = self.endpoint("/logout/")?;
        self.http.get(url).send().await?;
        Ok(())
    }
}
