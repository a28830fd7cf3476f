use crate::error::ApiError;
use crate::models::{Status, TaskDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Status,
}

/// Tagged state transitions for the task form; consumed by the pure
/// [`reduce`] function.
#[derive(Debug, Clone)]
pub enum FormAction {
    Change(TaskField, String),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: String,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: Status::Todo.code().to_string(),
        }
    }
}

impl TaskForm {
    pub fn title_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Trimmed outbound payload. Fails before any network dispatch when the
    /// trimmed title is empty.
    pub fn draft(&self) -> Result<TaskDraft, ApiError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ApiError::Validation("標題不可為空"));
        }
        Ok(TaskDraft {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            status: self.status.clone(),
        })
    }
}

pub fn reduce(state: &TaskForm, action: FormAction) -> TaskForm {
    match action {
        FormAction::Change(field, value) => {
            let mut next = state.clone();
            match field {
                TaskField::Title => next.title = value,
                TaskField::Description => next.description = value,
                TaskField::Status => next.status = value,
            }
            next
        }
        FormAction::Reset => TaskForm::default(),
    }
}

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn can_submit(&self) -> bool {
        !self.email.trim().is_empty() && self.password.len() >= MIN_PASSWORD_LEN
    }

    pub fn payload(&self) -> Result<crate::models::LoginRequest, ApiError> {
        if !self.can_submit() {
            return Err(ApiError::Validation("請填寫 Email 與至少 6 碼的密碼"));
        }
        Ok(crate::models::LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn can_submit(&self) -> bool {
        !self.username.trim().is_empty()
            && !self.email.trim().is_empty()
            && self.password.len() >= MIN_PASSWORD_LEN
    }

    pub fn payload(&self) -> Result<crate::models::RegisterRequest, ApiError> {
        if !self.can_submit() {
            return Err(ApiError::Validation("請填寫所有欄位，密碼至少 6 碼"));
        }
        Ok(crate::models::RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}
