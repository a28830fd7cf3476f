use std::sync::Arc;

use taskdash::compose::TaskComposer;
use taskdash::form::{reduce, FormAction, LoginForm, RegisterForm, TaskField, TaskForm};
use taskdash::guard::{Route, RouteDecision, RouteGuard};
use taskdash::models::{status_label, Status, TaskRecord};
use taskdash::mutation::TaskMutationCoordinator;
use taskdash::session::{FileTokenStore, MemoryTokenStore, SessionStore, TokenStore};
use taskdash::ui::{Notify, Severity};
use taskdash::view::{
    derive_view, FilterState, StatusFilter, ViewScheduler, ALL_LABEL,
};
use taskdash::{ApiClient, Dashboard};

fn task(id: i64, title: &str, description: &str, status: &str, created_at: Option<&str>) -> TaskRecord {
    TaskRecord {
        id,
        title: title.to_string(),
        description: description.to_string(),
        status: status.to_string(),
        created_at: created_at.map(str::to_string),
    }
}

fn sample_tasks() -> Vec<TaskRecord> {
    vec![
        task(1, "第一個任務", "寫週報", "todo", Some("2026-08-27T09:00:00Z")),
        task(2, "買菜", "晚餐要用", "in_progress", Some("2026-08-27T18:00:00Z")),
        task(3, "修 Bug", "登入頁面閃退", "done", Some("2026-08-28T10:00:00Z")),
        task(4, "Review PR", "", "done", Some("2026-08-29T08:00:00Z")),
    ]
}

fn filter(status: StatusFilter, query: &str) -> FilterState {
    FilterState {
        status,
        query: query.to_string(),
    }
}

#[test]
fn filter_all_keeps_every_task() {
    let tasks = sample_tasks();
    let view = derive_view(&tasks, &FilterState::default());
    assert_eq!(view.visible_tasks.len(), tasks.len());
    let ids: Vec<i64> = view.visible_tasks.iter().map(|v| v.task.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn filter_by_status_keeps_exactly_matching_tasks() {
    let tasks = sample_tasks();
    for status in Status::ALL {
        let view = derive_view(&tasks, &filter(StatusFilter::Only(status), ""));
        let expected: Vec<i64> = tasks
            .iter()
            .filter(|t| t.status == status.code())
            .map(|t| t.id)
            .collect();
        let got: Vec<i64> = view.visible_tasks.iter().map(|v| v.task.id).collect();
        assert_eq!(got, expected, "status {:?}", status);
    }
}

#[test]
fn search_matches_substring_in_title_or_description() {
    let tasks = sample_tasks();

    let view = derive_view(&tasks, &filter(StatusFilter::All, "任務"));
    let ids: Vec<i64> = view.visible_tasks.iter().map(|v| v.task.id).collect();
    assert_eq!(ids, vec![1]);

    // Description matches too.
    let view = derive_view(&tasks, &filter(StatusFilter::All, "晚餐"));
    let ids: Vec<i64> = view.visible_tasks.iter().map(|v| v.task.id).collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn search_is_case_insensitive() {
    let tasks = sample_tasks();
    let view = derive_view(&tasks, &filter(StatusFilter::All, "review pr"));
    assert_eq!(view.visible_tasks.len(), 1);
    assert_eq!(view.visible_tasks[0].task.id, 4);
}

#[test]
fn whitespace_only_query_is_a_no_op() {
    let tasks = sample_tasks();
    let filtered = derive_view(&tasks, &filter(StatusFilter::Only(Status::Done), "   "));
    let unfiltered = derive_view(&tasks, &filter(StatusFilter::Only(Status::Done), ""));
    assert_eq!(filtered.visible_tasks, unfiltered.visible_tasks);
    assert_eq!(filtered.visible_tasks.len(), 2);
}

#[test]
fn visible_tasks_carry_localized_labels() {
    let mut tasks = sample_tasks();
    tasks.push(task(5, "神秘", "", "archived", None));
    let view = derive_view(&tasks, &FilterState::default());
    assert_eq!(view.visible_tasks[0].status_label, "待辦");
    assert_eq!(view.visible_tasks[1].status_label, "進行中");
    assert_eq!(view.visible_tasks[2].status_label, "已完成");
    // Unknown code passes through as-is.
    assert_eq!(view.visible_tasks[4].status_label, "archived");
}

#[test]
fn distribution_sums_to_filtered_total() {
    let tasks = sample_tasks();
    let cases = [
        FilterState::default(),
        filter(StatusFilter::Only(Status::Done), ""),
        filter(StatusFilter::All, "任務"),
        filter(StatusFilter::Only(Status::Todo), "買菜"),
    ];
    for case in cases {
        let view = derive_view(&tasks, &case);
        assert_eq!(view.distribution.total(), view.visible_tasks.len(), "{case:?}");
    }
}

#[test]
fn completion_rate_bounds_and_zero_cases() {
    let tasks = sample_tasks();

    let view = derive_view(&tasks, &FilterState::default());
    assert_eq!(view.completion_rate, 50); // 2 of 4 done

    // Empty filtered set: no division-by-zero, rate is 0.
    let view = derive_view(&tasks, &filter(StatusFilter::Only(Status::Todo), "買菜"));
    assert!(view.visible_tasks.is_empty());
    assert_eq!(view.completion_rate, 0);

    // No done tasks in view: 0.
    let view = derive_view(&tasks, &filter(StatusFilter::Only(Status::Todo), ""));
    assert_eq!(view.completion_rate, 0);

    // All done: 100.
    let view = derive_view(&tasks, &filter(StatusFilter::Only(Status::Done), ""));
    assert_eq!(view.completion_rate, 100);

    // Rounding: 1 of 3 done.
    let three = vec![
        task(1, "a", "", "done", None),
        task(2, "b", "", "todo", None),
        task(3, "c", "", "todo", None),
    ];
    let view = derive_view(&three, &FilterState::default());
    assert_eq!(view.completion_rate, 33);
}

#[test]
fn trend_is_independent_of_filter_and_search() {
    let tasks = sample_tasks();
    let baseline = derive_view(&tasks, &FilterState::default());
    let cases = [
        filter(StatusFilter::Only(Status::Done), ""),
        filter(StatusFilter::All, "任務"),
        filter(StatusFilter::Only(Status::InProgress), "無此字串"),
    ];
    for case in cases {
        let view = derive_view(&tasks, &case);
        assert_eq!(view.trend, baseline.trend, "{case:?}");
    }
}

#[test]
fn trend_groups_by_day_ascending() {
    let tasks = sample_tasks();
    let view = derive_view(&tasks, &FilterState::default());
    let points: Vec<(&str, usize)> = view.trend.iter().map(|p| (p.date.as_str(), p.count)).collect();
    assert_eq!(
        points,
        vec![("2026-08-27", 2), ("2026-08-28", 1), ("2026-08-29", 1)]
    );
}

#[test]
fn trend_skips_missing_and_unparseable_timestamps() {
    let tasks = vec![
        task(1, "a", "", "todo", Some("2026-08-29T01:00:00Z")),
        task(2, "b", "", "todo", None),
        task(3, "c", "", "todo", Some("not a date")),
    ];
    let view = derive_view(&tasks, &FilterState::default());
    assert_eq!(view.trend.len(), 1);
    assert_eq!(view.trend[0].count, 1);
}

#[test]
fn trend_normalizes_offsets_to_utc_days() {
    // 02:00 at +08:00 is still the previous day in UTC.
    let tasks = vec![task(1, "a", "", "todo", Some("2026-08-29T02:00:00+08:00"))];
    let view = derive_view(&tasks, &FilterState::default());
    assert_eq!(view.trend[0].date, "2026-08-28");
}

#[test]
fn trend_accepts_bare_dates() {
    let tasks = vec![task(1, "a", "", "todo", Some("2026-08-29"))];
    let view = derive_view(&tasks, &FilterState::default());
    assert_eq!(view.trend[0].date, "2026-08-29");
}

#[test]
fn status_label_mapping_is_bijective() {
    for status in Status::ALL {
        assert_eq!(Status::from_label(status.label()), Some(status));
        assert_eq!(Status::from_code(status.code()), Some(status));
    }
    // No two codes share a label.
    let labels: std::collections::HashSet<&str> =
        Status::ALL.iter().map(|s| s.label()).collect();
    assert_eq!(labels.len(), Status::ALL.len());
    assert_eq!(status_label("archived"), "archived");
    assert_eq!(StatusFilter::from_label(ALL_LABEL), Some(StatusFilter::All));
    assert_eq!(StatusFilter::from_label("待辦"), Some(StatusFilter::Only(Status::Todo)));
    assert_eq!(StatusFilter::from_label("???"), None);
}

#[test]
fn filter_state_round_trips_through_query_pairs() {
    let state = filter(StatusFilter::Only(Status::InProgress), "報告");
    let pairs = state.to_query_pairs();
    assert_eq!(
        pairs,
        vec![
            ("status", "in_progress".to_string()),
            ("q", "報告".to_string())
        ]
    );
    let borrowed: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
    assert_eq!(FilterState::from_query_pairs(borrowed), state);
}

#[test]
fn filter_state_defaults_are_omitted_and_restored() {
    let state = FilterState::default();
    assert!(state.to_query_pairs().is_empty());
    assert_eq!(FilterState::from_query_pairs(Vec::new()), state);

    // Whitespace-only query is not mirrored.
    let state = filter(StatusFilter::All, "   ");
    assert!(state.to_query_pairs().is_empty());

    // Unknown status parameter degrades to "all".
    let restored = FilterState::from_query_pairs(vec![("status", "archived"), ("q", "x")]);
    assert_eq!(restored.status, StatusFilter::All);
    assert_eq!(restored.query, "x");
}

#[test]
fn scheduler_discards_stale_results() {
    let tasks = sample_tasks();
    let mut scheduler = ViewScheduler::default();

    let ticket_a = scheduler.begin();
    let bundle_a = derive_view(&tasks, &filter(StatusFilter::All, "任務"));
    let ticket_b = scheduler.begin();
    let bundle_b = derive_view(&tasks, &filter(StatusFilter::Only(Status::Done), ""));

    // B lands first, then stale A must not overwrite it.
    assert!(scheduler.apply(ticket_b, bundle_b.clone()));
    assert!(!scheduler.apply(ticket_a, bundle_a.clone()));
    assert_eq!(scheduler.view(), Some(&bundle_b));

    // Same race, completion in issue order: A is already superseded.
    let mut scheduler = ViewScheduler::default();
    let ticket_a = scheduler.begin();
    let ticket_b = scheduler.begin();
    assert!(!scheduler.apply(ticket_a, bundle_a));
    assert!(scheduler.apply(ticket_b, bundle_b.clone()));
    assert_eq!(scheduler.view(), Some(&bundle_b));
}

struct SilentNotifier;

impl Notify for SilentNotifier {
    fn notify(&self, _message: &str, _severity: Severity) {}
}

fn offline_dashboard() -> Dashboard {
    let session = Arc::new(SessionStore::new(Box::<MemoryTokenStore>::default()));
    let api = Arc::new(ApiClient::new("http://127.0.0.1:0", session));
    Dashboard::new(TaskMutationCoordinator::new(api, Arc::new(SilentNotifier)))
}

#[test]
fn dashboard_reflects_only_the_latest_inputs() {
    let mut dashboard = offline_dashboard();

    dashboard.set_query("舊的");
    let (ticket_a, tasks_a, filter_a) = dashboard.begin_recompute();

    dashboard.set_query("新的");
    let (ticket_b, tasks_b, filter_b) = dashboard.begin_recompute();

    assert!(dashboard.apply_recompute(ticket_b, derive_view(&tasks_b, &filter_b)));
    assert!(!dashboard.apply_recompute(ticket_a, derive_view(&tasks_a, &filter_a)));
    assert_eq!(dashboard.filter().query, "新的");
}

#[test]
fn form_reducer_changes_and_resets() {
    let form = TaskForm::default();
    assert_eq!(form.status, "todo");

    let form = reduce(&form, FormAction::Change(TaskField::Title, "  新任務 ".into()));
    let form = reduce(&form, FormAction::Change(TaskField::Description, " 說明 ".into()));
    let form = reduce(&form, FormAction::Change(TaskField::Status, "done".into()));
    assert_eq!(form.title, "  新任務 ");

    let draft = form.draft().unwrap();
    assert_eq!(draft.title, "新任務");
    assert_eq!(draft.description, "說明");
    assert_eq!(draft.status, "done");

    let form = reduce(&form, FormAction::Reset);
    assert_eq!(form, TaskForm::default());
}

#[test]
fn empty_title_fails_validation_before_any_network() {
    let form = TaskForm {
        title: "   ".into(),
        ..TaskForm::default()
    };
    assert!(!form.title_valid());
    assert!(form.draft().is_err());
}

#[test]
fn composer_guards_against_double_submit() {
    let mut composer = TaskComposer::new();
    composer.dispatch(FormAction::Change(TaskField::Title, "新任務".into()));

    let first = composer.begin_submit();
    assert!(first.is_some());
    assert!(composer.is_submitting());

    // Second submit while the first is in flight: nothing to send.
    assert!(composer.begin_submit().is_none());

    composer.complete_submit(&Ok(TaskRecord {
        id: 1,
        title: "新任務".into(),
        description: String::new(),
        status: "todo".into(),
        created_at: None,
    }));
    assert!(!composer.is_submitting());
    assert_eq!(composer.form(), &TaskForm::default());
}

#[test]
fn composer_rejects_empty_title_without_submitting() {
    let mut composer = TaskComposer::new();
    assert!(composer.title_error().is_none()); // not shown before an attempt
    assert!(composer.begin_submit().is_none());
    assert!(!composer.is_submitting());
    assert_eq!(composer.title_error(), Some("標題不可為空"));
}

#[test]
fn login_and_register_forms_gate_submission() {
    let mut login = LoginForm::default();
    assert!(!login.can_submit());
    login.email = " user@example.com ".into();
    login.password = "12345".into();
    assert!(!login.can_submit()); // password too short
    login.password = "123456".into();
    assert!(login.can_submit());
    assert_eq!(login.payload().unwrap().email, "user@example.com");

    let mut register = RegisterForm::default();
    register.email = "user@example.com".into();
    register.password = "123456".into();
    assert!(!register.can_submit()); // username missing
    register.username = "user".into();
    assert!(register.can_submit());
}

#[test]
fn guard_redirects_unauthenticated_and_remembers_destination() {
    let session = Arc::new(SessionStore::new(Box::<MemoryTokenStore>::default()));
    let mut guard = RouteGuard::new(session.clone());

    assert_eq!(
        guard.check(Route::TaskCreate),
        RouteDecision::Redirect(Route::Login)
    );
    assert_eq!(guard.remembered(), Some(Route::TaskCreate));

    // Public routes render regardless.
    assert_eq!(guard.check(Route::Register), RouteDecision::Render(Route::Register));

    session.set("token-123").unwrap();
    assert_eq!(guard.post_login_target(), Route::TaskCreate);
    // Consumed: the fallback is the default landing view.
    assert_eq!(guard.post_login_target(), Route::Dashboard);
    assert_eq!(
        guard.check(Route::Dashboard),
        RouteDecision::Render(Route::Dashboard)
    );
}

#[test]
fn guard_bounces_authenticated_visitors_off_the_login_page() {
    let session = Arc::new(SessionStore::new(Box::<MemoryTokenStore>::default()));
    session.set("token-123").unwrap();
    let mut guard = RouteGuard::new(session);
    assert_eq!(
        guard.check(Route::Login),
        RouteDecision::Redirect(Route::Dashboard)
    );
}

#[test]
fn session_store_notifies_subscribers() {
    let session = SessionStore::new(Box::<MemoryTokenStore>::default());
    let mut rx = session.subscribe();
    assert!(!session.is_authenticated());

    session.set("abc").unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().as_deref(), Some("abc"));

    session.clear().unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().as_deref(), None);
}

#[test]
fn file_token_store_persists_and_refreshes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token");

    let session = SessionStore::new(Box::new(FileTokenStore::new(&path)));
    assert!(!session.is_authenticated());
    session.set("abc").unwrap();

    // A second store over the same file sees the token at init.
    let other = SessionStore::new(Box::new(FileTokenStore::new(&path)));
    assert_eq!(other.get().as_deref(), Some("abc"));

    // External change is only visible after refresh.
    std::fs::write(&path, "xyz").unwrap();
    assert_eq!(session.get().as_deref(), Some("abc"));
    let mut rx = session.subscribe();
    session.refresh();
    assert!(rx.has_changed().unwrap());
    assert_eq!(session.get().as_deref(), Some("xyz"));

    // Logged out elsewhere: refresh drops the token.
    FileTokenStore::new(&path).clear().unwrap();
    session.refresh();
    assert!(!session.is_authenticated());

    // Refresh with no change stays quiet.
    let mut rx = session.subscribe();
    session.refresh();
    assert!(!rx.has_changed().unwrap());
}
