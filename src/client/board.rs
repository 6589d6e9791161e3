/**
 * Board HTTP Client
 *
 * Async client for the board REST API. Holds the bearer token after
 * register/login and tags every request with its client id so the relay
 * does not echo this client's own mutations back to it.
 *
 * # Conflicts
 *
 * `update_task` returns a [`TaskUpdate`]: either the applied task or a
 * [`PendingConflict`] holding the rejected draft and the server's row.
 * Settle it with `resolve_conflict`, which resubmits under the version from
 * the conflict report.
 */
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::client::error::ClientError;
use crate::client::events::BoardEventStream;
use crate::shared::activity::{ActivityView, MarkSeenResponse, UnseenCountResponse};
use crate::shared::conflict::{ConflictReport, PendingConflict, Resolution};
use crate::shared::event::{BoardEvent, RelayRequest, RelayResponse, CLIENT_ID_HEADER};
use crate::shared::task::{
    CreateTaskRequest, DeleteTaskResponse, TaskView, UpdateTaskRequest, ValidateTitleRequest,
    ValidateTitleResponse,
};
use crate::shared::user::{
    AuthResponse, CreateMemberRequest, CreateMemberResponse, LoginRequest, RegisterRequest,
    UserResponse,
};

/// Result of a versioned task update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskUpdate {
    Applied(TaskView),
    Conflict(PendingConflict),
}

impl TaskUpdate {
    pub fn applied(self) -> Option<TaskView> {
        match self {
            Self::Applied(view) => Some(view),
            Self::Conflict(_) => None,
        }
    }
}

/// Client for one user session against one server
#[derive(Debug, Clone)]
pub struct BoardClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    client_id: String,
}

impl BoardClient {
    /// Create a client with a random client id
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            client_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, self.url(path))
            .header(CLIENT_ID_HEADER, &self.client_id);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        if self.token.is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        Ok(self.request(method, path))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        request: RequestBuilder,
        body: &B,
    ) -> Result<T, ClientError> {
        Self::send(request.json(body)).await
    }

    /// Create an account and keep its token
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse =
            Self::send_json(self.request(Method::POST, "/api/auth/register"), &body).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    /// Log in by email or username and keep the token
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse =
            Self::send_json(self.request(Method::POST, "/api/auth/login"), &body).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    pub async fn me(&self) -> Result<UserResponse, ClientError> {
        Self::send(self.authed(Method::GET, "/api/auth/me")?).await
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>, ClientError> {
        Self::send(self.authed(Method::GET, "/api/users")?).await
    }

    /// Add a teammate with the server's default password
    pub async fn add_member(
        &self,
        username: &str,
        email: &str,
    ) -> Result<CreateMemberResponse, ClientError> {
        let body = CreateMemberRequest {
            username: username.to_string(),
            email: email.to_string(),
        };
        Self::send_json(self.authed(Method::POST, "/api/users")?, &body).await
    }

    /// All tasks, newest first
    pub async fn list_tasks(&self) -> Result<Vec<TaskView>, ClientError> {
        Self::send(self.authed(Method::GET, "/api/tasks")?).await
    }

    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<TaskView, ClientError> {
        Self::send_json(self.authed(Method::POST, "/api/tasks")?, request).await
    }

    /// Submit an edit made from `request.version`
    ///
    /// A version conflict is not an error here; it comes back as
    /// [`TaskUpdate::Conflict`].
    pub async fn update_task(
        &self,
        task_id: Uuid,
        request: &UpdateTaskRequest,
    ) -> Result<TaskUpdate, ClientError> {
        let response = self
            .authed(Method::PUT, &format!("/api/tasks/{}", task_id))?
            .json(request)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            let report: ConflictReport = response.json().await?;
            tracing::debug!(
                "Update of task {} conflicted at version {}",
                task_id,
                report.current_version
            );
            return Ok(TaskUpdate::Conflict(PendingConflict::new(
                task_id,
                request.fields.clone(),
                report,
            )));
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(TaskUpdate::Applied(response.json().await?))
    }

    /// Resubmit a rejected edit according to the user's choice
    ///
    /// Another conflict is possible if someone wrote again in between.
    pub async fn resolve_conflict(
        &self,
        conflict: &PendingConflict,
        resolution: &Resolution,
    ) -> Result<TaskUpdate, ClientError> {
        let request = conflict.resolve(resolution);
        self.update_task(conflict.task_id, &request).await
    }

    pub async fn delete_task(&self, task_id: Uuid) -> Result<DeleteTaskResponse, ClientError> {
        Self::send(self.authed(Method::DELETE, &format!("/api/tasks/{}", task_id))?).await
    }

    /// Ask whether `title` is acceptable, ignoring the task `exclude_id`
    pub async fn validate_title(
        &self,
        title: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<ValidateTitleResponse, ClientError> {
        let body = ValidateTitleRequest {
            title: title.to_string(),
            exclude_id,
        };
        Self::send_json(self.authed(Method::POST, "/api/tasks/validate-title")?, &body).await
    }

    /// Assign the task to the least-loaded user
    ///
    /// With `version`, a mismatch is reported as [`ClientError::Conflict`].
    pub async fn smart_assign(
        &self,
        task_id: Uuid,
        version: Option<i64>,
    ) -> Result<TaskView, ClientError> {
        let mut request = self.authed(Method::POST, &format!("/api/tasks/smart-assign/{}", task_id))?;
        if let Some(version) = version {
            request = request.query(&[("version", version)]);
        }
        Self::send(request).await
    }

    /// Latest activity, newest first
    pub async fn activity(&self) -> Result<Vec<ActivityView>, ClientError> {
        Self::send(self.authed(Method::GET, "/api/activity")?).await
    }

    pub async fn unseen_count(&self) -> Result<i64, ClientError> {
        let response: UnseenCountResponse =
            Self::send(self.authed(Method::GET, "/api/activity/unseen-count")?).await?;
        Ok(response.count)
    }

    pub async fn mark_seen(&self) -> Result<bool, ClientError> {
        let response: MarkSeenResponse =
            Self::send(self.authed(Method::POST, "/api/activity/mark-seen")?).await?;
        Ok(response.success)
    }

    /// Send an event to the other clients of a board
    pub async fn relay(
        &self,
        board: Option<&str>,
        event: BoardEvent,
    ) -> Result<RelayResponse, ClientError> {
        let body = RelayRequest {
            client_id: self.client_id.clone(),
            board: board.map(str::to_string),
            event,
        };
        Self::send_json(self.authed(Method::POST, "/api/board/events")?, &body).await
    }

    /// Open the event stream of a board
    pub async fn subscribe(&self, board: Option<&str>) -> Result<BoardEventStream, ClientError> {
        let mut request = self
            .authed(Method::GET, "/api/board/events")?
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .query(&[("client_id", self.client_id.as_str())]);
        if let Some(board) = board {
            request = request.query(&[("board", board)]);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(BoardEventStream::new(response))
    }
}

/// Turn an error response into a [`ClientError`]
async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::CONFLICT {
        if let Ok(report) = serde_json::from_str::<ConflictReport>(&body) {
            return ClientError::Conflict(Box::new(report));
        }
    }

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body
            }
        });

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}
