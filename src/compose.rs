use crate::error::ApiError;
use crate::form::{reduce, FormAction, TaskForm};
use crate::models::{TaskDraft, TaskRecord};
use crate::mutation::TaskMutationCoordinator;

/// State of the task-creation page: the reducer-driven form, whether a submit
/// has been attempted (field errors only show after that), and whether one is
/// in flight (the double-submit guard).
#[derive(Default)]
pub struct TaskComposer {
    form: TaskForm,
    attempted: bool,
    submitting: bool,
}

impl TaskComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    pub fn dispatch(&mut self, action: FormAction) {
        self.form = reduce(&self.form, action);
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn can_submit(&self) -> bool {
        self.form.title_valid() && !self.submitting
    }

    /// Field-level error for the title, shown only after a submit attempt.
    pub fn title_error(&self) -> Option<&'static str> {
        (self.attempted && !self.form.title_valid()).then_some("標題不可為空")
    }

    /// First phase of a submit. Returns the trimmed payload to send, or
    /// `None` when the form is invalid or a submit is already in flight —
    /// in both cases nothing may go out on the network.
    pub fn begin_submit(&mut self) -> Option<TaskDraft> {
        self.attempted = true;
        if self.submitting {
            return None;
        }
        let draft = self.form.draft().ok()?;
        self.submitting = true;
        Some(draft)
    }

    /// Second phase: reconcile the outcome. Success clears the form; failure
    /// leaves it populated so nothing the user typed is lost.
    pub fn complete_submit(&mut self, outcome: &Result<TaskRecord, ApiError>) {
        self.submitting = false;
        if outcome.is_ok() {
            self.form = TaskForm::default();
            self.attempted = false;
        }
    }

    /// Convenience for drivers without interleaved events: both phases around
    /// the coordinator call.
    pub async fn submit(
        &mut self,
        coordinator: &mut TaskMutationCoordinator,
    ) -> Result<Option<TaskRecord>, ApiError> {
        if self.begin_submit().is_none() {
            return Ok(None);
        }
        let outcome = coordinator.create(&self.form).await;
        self.complete_submit(&outcome);
        outcome.map(Some)
    }
}
