use std::sync::Arc;

use tracing::warn;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::form::TaskForm;
use crate::models::TaskRecord;
use crate::ui::{ConfirmAction, Notify, Severity};

/// Applies create/update/delete intents against the backend and reconciles
/// the in-memory task collection without a full reload.
///
/// The collection is the single source of truth for every derived view and is
/// mutated strictly after network success; a failed mutation leaves it
/// untouched. Validation failures never reach the network. Nothing retries
/// automatically. Double-submit gating lives with the page state that drives
/// this coordinator ([`crate::compose::TaskComposer`], [`crate::dashboard::Dashboard`]),
/// since `&mut self` already serializes the calls themselves.
pub struct TaskMutationCoordinator {
    api: Arc<ApiClient>,
    notifier: Arc<dyn Notify>,
    tasks: Vec<TaskRecord>,
    error: Option<String>,
}

impl TaskMutationCoordinator {
    pub fn new(api: Arc<ApiClient>, notifier: Arc<dyn Notify>) -> Self {
        Self {
            api,
            notifier,
            tasks: Vec::new(),
            error: None,
        }
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    /// Last mutation error, for the top-level error slot. Cleared by the next
    /// successful mutation.
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the collection wholesale from a fresh `GET /tasks`.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        let tasks = self.api.list_tasks().await?;
        self.tasks = tasks;
        Ok(())
    }

    pub async fn create(&mut self, form: &TaskForm) -> Result<TaskRecord, ApiError> {
        // Field-level rejection; no toast since nothing was attempted.
        let draft = form.draft()?;
        match self.api.create_task(&draft).await {
            Ok(task) => {
                self.tasks.push(task.clone());
                self.error = None;
                self.notifier.notify("✅ 任務已新增！", Severity::Success);
                Ok(task)
            }
            Err(err) => {
                self.error = Some("新增失敗".to_string());
                self.notifier
                    .notify(&format!("❌ 新增失敗：{err}"), Severity::Error);
                Err(err)
            }
        }
    }

    pub async fn update(&mut self, id: i64, form: &TaskForm) -> Result<(), ApiError> {
        let draft = match form.draft() {
            Ok(draft) => draft,
            Err(err) => {
                // Update also surfaces a generic top-level message.
                self.error = Some(err.to_string());
                return Err(err);
            }
        };
        match self.api.update_task(id, &draft).await {
            Ok(patch) => {
                if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
                    task.merge(patch);
                } else {
                    warn!(id, "update completed for a task no longer present");
                }
                self.error = None;
                self.notifier.notify("✅ 已更新任務", Severity::Success);
                Ok(())
            }
            Err(err) => {
                self.error = Some("更新失敗".to_string());
                self.notifier.notify("❌ 更新失敗", Severity::Error);
                Err(err)
            }
        }
    }

    /// Delete after user confirmation. Returns `Ok(false)` when the user
    /// declined; no network call is made in that case.
    pub async fn delete(
        &mut self,
        id: i64,
        confirm: &dyn ConfirmAction,
    ) -> Result<bool, ApiError> {
        if !confirm.confirm("確定要刪除這個任務嗎？此動作無法復原。") {
            return Ok(false);
        }
        match self.api.delete_task(id).await {
            Ok(()) => {
                self.tasks.retain(|task| task.id != id);
                self.error = None;
                self.notifier.notify("🗑️ 已刪除任務", Severity::Success);
                Ok(true)
            }
            Err(err) => {
                self.error = Some("刪除失敗".to_string());
                self.notifier.notify("❌ 刪除失敗", Severity::Error);
                Err(err)
            }
        }
    }
}
