use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::models::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, TaskDraft, TaskPatch,
    TaskRecord,
};
use crate::session::SessionStore;

/// HTTP client for the task backend. Attaches the session token to task
/// endpoints and translates error responses into [`ApiError`]. A 401 on any
/// endpoint clears the session before surfacing, so the guard sends the next
/// navigation back to login.
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        let base_url = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.get() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(&self, resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED {
            if let Err(err) = self.session.clear() {
                warn!(%err, "failed to clear session after 401");
            }
            return Err(ApiError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Server {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    pub async fn list_tasks(&self) -> Result<Vec<TaskRecord>, ApiError> {
        let resp = self.authed(self.http.get(self.url("/tasks"))).send().await?;
        let tasks: Vec<TaskRecord> = self.check(resp).await?.json().await?;
        info!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<TaskRecord, ApiError> {
        let resp = self
            .authed(self.http.post(self.url("/tasks")).json(draft))
            .send()
            .await?;
        let task: TaskRecord = self.check(resp).await?.json().await?;
        info!(id = task.id, title = %task.title, "created task");
        Ok(task)
    }

    pub async fn update_task(&self, id: i64, draft: &TaskDraft) -> Result<TaskPatch, ApiError> {
        let resp = self
            .authed(self.http.put(self.url(&format!("/tasks/{id}"))).json(draft))
            .send()
            .await?;
        let patch: TaskPatch = self.check(resp).await?.json().await?;
        info!(id, "updated task");
        Ok(patch)
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        let resp = self
            .authed(self.http.delete(self.url(&format!("/tasks/{id}"))))
            .send()
            .await?;
        self.check(resp).await?;
        info!(id, "deleted task");
        Ok(())
    }

    /// Log in and store the returned token in the session.
    pub async fn login(&self, req: &LoginRequest) -> Result<(), ApiError> {
        let resp = self.http.post(self.url("/login")).json(req).send().await?;
        let body: LoginResponse = self.check(resp).await?.json().await?;
        self.session.set(&body.token)?;
        info!("logged in");
        Ok(())
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let resp = self
            .http
            .post(self.url("/register"))
            .json(req)
            .send()
            .await?;
        let body: RegisterResponse = self.check(resp).await?.json().await?;
        info!(username = %req.username, "registered");
        Ok(body)
    }
}

/// Pull a human-readable message out of an error body. Backends in the wild
/// use either `{"message": ...}` or `{"error": ...}`.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(message) = value.get(key).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    body.to_string()
}
