use tracing::warn;

use crate::error::ApiError;
use crate::form::{reduce, FormAction, TaskForm};
use crate::models::TaskRecord;
use crate::mutation::TaskMutationCoordinator;
use crate::ui::ConfirmAction;
use crate::view::{derive_view, FilterState, StatusFilter, Ticket, ViewBundle, ViewScheduler};

/// Edit-dialog state: which task is being edited and the working copy of its
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEditor {
    pub id: i64,
    pub form: TaskForm,
}

/// The dashboard page: owns the task collection (through the mutation
/// coordinator), the filter/search inputs, and the derived view.
///
/// Filter and search edits are accepted immediately; the derived view is
/// recomputed through [`ViewScheduler`] so a recompute that raced a newer
/// edit is discarded instead of applied out of order. Dropping the dashboard
/// drops every target a late completion could have mutated.
pub struct Dashboard {
    coordinator: TaskMutationCoordinator,
    filter: FilterState,
    scheduler: ViewScheduler,
    editor: Option<TaskEditor>,
    load_error: Option<String>,
    loading: bool,
}

impl Dashboard {
    pub fn new(coordinator: TaskMutationCoordinator) -> Self {
        Self::with_filter(coordinator, FilterState::default())
    }

    /// Restore filter state from the URL on entry.
    pub fn with_filter(coordinator: TaskMutationCoordinator, filter: FilterState) -> Self {
        Self {
            coordinator,
            filter,
            scheduler: ViewScheduler::default(),
            editor: None,
            load_error: None,
            loading: true,
        }
    }

    /// Initial fetch. A failed load keeps an empty collection and surfaces a
    /// persistent banner; the view still renders. `Unauthorized` propagates
    /// so the caller can route back to login (the session is already
    /// cleared).
    pub async fn load(&mut self) -> Result<(), ApiError> {
        let result = self.coordinator.load().await;
        self.loading = false;
        match result {
            Ok(()) => {
                self.load_error = None;
                self.refresh_view();
                Ok(())
            }
            Err(ApiError::Unauthorized) => {
                self.load_error = Some("未授權，請先登入".to_string());
                Err(ApiError::Unauthorized)
            }
            Err(err) => {
                warn!(%err, "failed to load tasks");
                self.load_error = Some("無法載入任務".to_string());
                self.refresh_view();
                Err(err)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        self.coordinator.tasks()
    }

    pub fn coordinator(&self) -> &TaskMutationCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut TaskMutationCoordinator {
        &mut self.coordinator
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Query parameters mirroring the current filter state.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.filter.to_query_pairs()
    }

    // Input setters echo immediately; derivation is a separate, supersedable
    // step (see begin_recompute/apply_recompute).

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.filter.status = status;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
    }

    /// Snapshot the inputs for a deferred recomputation and take a ticket
    /// for it.
    pub fn begin_recompute(&mut self) -> (Ticket, Vec<TaskRecord>, FilterState) {
        (
            self.scheduler.begin(),
            self.coordinator.tasks().to_vec(),
            self.filter.clone(),
        )
    }

    /// Apply a finished recomputation; stale results are discarded and
    /// `false` is returned.
    pub fn apply_recompute(&mut self, ticket: Ticket, bundle: ViewBundle) -> bool {
        self.scheduler.apply(ticket, bundle)
    }

    /// Synchronous derive-and-apply, used after mutations where no newer
    /// input can be racing.
    pub fn refresh_view(&mut self) {
        let ticket = self.scheduler.begin();
        let bundle = derive_view(self.coordinator.tasks(), &self.filter);
        self.scheduler.apply(ticket, bundle);
    }

    pub fn view(&self) -> Option<&ViewBundle> {
        self.scheduler.view()
    }

    /// Open the edit dialog seeded with the task's current fields.
    pub fn open_edit(&mut self, id: i64) -> bool {
        let Some(task) = self.coordinator.tasks().iter().find(|task| task.id == id) else {
            return false;
        };
        self.editor = Some(TaskEditor {
            id,
            form: TaskForm {
                title: task.title.clone(),
                description: task.description.clone(),
                status: task.status.clone(),
            },
        });
        true
    }

    pub fn editor(&self) -> Option<&TaskEditor> {
        self.editor.as_ref()
    }

    pub fn edit_dispatch(&mut self, action: FormAction) {
        if let Some(editor) = self.editor.as_mut() {
            editor.form = reduce(&editor.form, action);
        }
    }

    pub fn close_edit(&mut self) {
        self.editor = None;
    }

    /// Submit the edit dialog. On success the dialog closes and the view is
    /// recomputed; on any failure (validation or network) it stays open with
    /// the attempted values intact.
    pub async fn save_edit(&mut self) -> Result<(), ApiError> {
        let Some(editor) = self.editor.clone() else {
            return Ok(());
        };
        self.coordinator.update(editor.id, &editor.form).await?;
        self.editor = None;
        self.refresh_view();
        Ok(())
    }

    /// Delete a task after confirmation; the list and charts recompute only
    /// when the backend acknowledged the removal.
    pub async fn delete_task(
        &mut self,
        id: i64,
        confirm: &dyn ConfirmAction,
    ) -> Result<bool, ApiError> {
        let deleted = self.coordinator.delete(id, confirm).await?;
        if deleted {
            self.refresh_view();
        }
        Ok(deleted)
    }
}
