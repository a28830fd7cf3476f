use serde::{Deserialize, Serialize};

/// Canonical task status codes as the backend speaks them. Records keep the
/// raw string (see [`TaskRecord::status`]) so unknown codes survive a round
/// trip; this enum covers the closed set the UI knows how to label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn code(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        }
    }

    pub fn from_code(code: &str) -> Option<Status> {
        match code {
            "todo" => Some(Status::Todo),
            "in_progress" => Some(Status::InProgress),
            "done" => Some(Status::Done),
            _ => None,
        }
    }

    /// User-facing label. The mapping is a bijection with [`Status::from_label`].
    pub fn label(self) -> &'static str {
        match self {
            Status::Todo => "待辦",
            Status::InProgress => "進行中",
            Status::Done => "已完成",
        }
    }

    pub fn from_label(label: &str) -> Option<Status> {
        match label {
            "待辦" => Some(Status::Todo),
            "進行中" => Some(Status::InProgress),
            "已完成" => Some(Status::Done),
            _ => None,
        }
    }
}

/// Display label for a raw status code. Unrecognized codes pass through
/// unchanged rather than erroring.
pub fn status_label(code: &str) -> &str {
    Status::from_code(code).map(Status::label).unwrap_or(code)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(
        default,
        rename = "createdAt",
        alias = "created_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
}

impl TaskRecord {
    /// Merge a partial server response into this record, keeping local fields
    /// the response did not include.
    pub fn merge(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if patch.created_at.is_some() {
            self.created_at = patch.created_at;
        }
    }
}

/// Outbound payload for create and update. Title and description are expected
/// to be trimmed before construction (see `TaskForm::draft`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: String,
}

/// Partial task fields as returned by `PUT /tasks/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: Option<String>,
    #[serde(default, rename = "createdAt", alias = "created_at")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Confirmation payload from `POST /register`. The backend returns a human
/// readable message; nothing else in it is load-bearing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
}
