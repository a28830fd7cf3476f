use std::collections::BTreeMap;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::models::{status_label, Status, TaskRecord};

/// Filter label meaning "show everything".
pub const ALL_LABEL: &str = "全部";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => ALL_LABEL,
            StatusFilter::Only(status) => status.label(),
        }
    }

    pub fn from_label(label: &str) -> Option<StatusFilter> {
        if label == ALL_LABEL {
            return Some(StatusFilter::All);
        }
        Status::from_label(label).map(StatusFilter::Only)
    }
}

/// Ephemeral filter/search inputs, mirrored to query parameters so a reload
/// or shared URL reproduces the same view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub status: StatusFilter,
    pub query: String,
}

impl FilterState {
    /// Query parameters for the current state. Defaults are omitted rather
    /// than serialized.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let StatusFilter::Only(status) = self.status {
            pairs.push(("status", status.code().to_string()));
        }
        let query = self.query.trim();
        if !query.is_empty() {
            pairs.push(("q", query.to_string()));
        }
        pairs
    }

    /// Rebuild filter state from query parameters. A missing parameter means
    /// the default; an unrecognized status code degrades to "all".
    pub fn from_query_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut state = FilterState::default();
        for (key, value) in pairs {
            match key {
                "status" => {
                    if let Some(status) = Status::from_code(value) {
                        state.status = StatusFilter::Only(status);
                    }
                }
                "q" => state.query = value.to_string(),
                _ => {}
            }
        }
        state
    }
}

/// A task as the list renders it: the record plus its display label.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleTask {
    pub task: TaskRecord,
    pub status_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusDistribution {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl StatusDistribution {
    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }

    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Todo => self.todo,
            Status::InProgress => self.in_progress,
            Status::Done => self.done,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: String,
    pub count: usize,
}

/// Everything the dashboard renders, recomputed as a whole from the source
/// collection plus the current filter inputs. Never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewBundle {
    pub visible_tasks: Vec<VisibleTask>,
    pub distribution: StatusDistribution,
    pub trend: Vec<TrendPoint>,
    pub completion_rate: u8,
}

/// Derive the dashboard view. Pure: same inputs, same bundle.
///
/// The distribution and completion rate cover the filtered set so the charts
/// agree with the list on screen; the trend covers the full collection so it
/// is unaffected by filter and search.
pub fn derive_view(tasks: &[TaskRecord], filter: &FilterState) -> ViewBundle {
    let query = filter.query.trim().to_lowercase();

    let visible_tasks: Vec<VisibleTask> = tasks
        .iter()
        .filter(|task| match filter.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == status.code(),
        })
        .filter(|task| {
            if query.is_empty() {
                return true;
            }
            task.title.to_lowercase().contains(&query)
                || task.description.to_lowercase().contains(&query)
        })
        .map(|task| VisibleTask {
            status_label: status_label(&task.status).to_string(),
            task: task.clone(),
        })
        .collect();

    let mut distribution = StatusDistribution::default();
    for visible in &visible_tasks {
        match Status::from_code(&visible.task.status) {
            Some(Status::Todo) => distribution.todo += 1,
            Some(Status::InProgress) => distribution.in_progress += 1,
            Some(Status::Done) => distribution.done += 1,
            None => {}
        }
    }

    let total = visible_tasks.len();
    let done = visible_tasks
        .iter()
        .filter(|visible| visible.task.status == Status::Done.code())
        .count();
    let completion_rate = if total > 0 {
        (done as f64 / total as f64 * 100.0).round() as u8
    } else {
        0
    };

    ViewBundle {
        visible_tasks,
        distribution,
        trend: trend_series(tasks),
        completion_rate,
    }
}

/// Creation-date trend over the whole collection: calendar day (UTC) to count
/// of tasks created that day, ascending by date. Tasks without a parseable
/// creation timestamp are skipped.
fn trend_series(tasks: &[TaskRecord]) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<Date, usize> = BTreeMap::new();
    for task in tasks {
        let Some(raw) = task.created_at.as_deref() else {
            continue;
        };
        if let Some(date) = creation_day(raw) {
            *by_day.entry(date).or_insert(0) += 1;
        }
    }
    by_day
        .into_iter()
        .map(|(date, count)| TrendPoint {
            date: date.to_string(),
            count,
        })
        .collect()
}

fn creation_day(raw: &str) -> Option<Date> {
    if let Ok(timestamp) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(timestamp.to_offset(time::UtcOffset::UTC).date());
    }
    // Bare dates ("2026-08-29") also occur in the wild.
    Date::parse(raw, &format_description!("[year]-[month]-[day]")).ok()
}

/// Generation ticket for one scheduled recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Orders racing recomputations. Filter/search edits can outpace derivation,
/// so each recompute takes a ticket and only the result matching the latest
/// issued ticket is ever applied; superseded results are dropped on the floor
/// instead of clobbering newer state. Results are never reused across inputs,
/// this is ordering, not caching.
#[derive(Debug, Default)]
pub struct ViewScheduler {
    issued: u64,
    current: Option<ViewBundle>,
}

impl ViewScheduler {
    /// Take a ticket for a recomputation about to start.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Apply a finished recomputation. Returns false (and discards the
    /// bundle) when a newer ticket has been issued since.
    pub fn apply(&mut self, ticket: Ticket, bundle: ViewBundle) -> bool {
        if ticket.0 != self.issued {
            return false;
        }
        self.current = Some(bundle);
        true
    }

    pub fn view(&self) -> Option<&ViewBundle> {
        self.current.as_ref()
    }
}
