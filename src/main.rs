use std::sync::Arc;

use taskdash::guard::{Route, RouteDecision, RouteGuard};
use taskdash::models::LoginRequest;
use taskdash::session::{FileTokenStore, SessionStore};
use taskdash::ui::TracingNotifier;
use taskdash::{ApiClient, Dashboard, TaskMutationCoordinator};

/// Headless dashboard summary: logs in if needed, loads the task list, and
/// prints the derived view to stdout.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let base_url = std::env::var("TASKDASH_API_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:5001".to_string());
    let token_file =
        std::env::var("TASKDASH_TOKEN_FILE").unwrap_or_else(|_| ".taskdash-token".to_string());

    let session = Arc::new(SessionStore::new(Box::new(FileTokenStore::new(token_file))));
    let api = Arc::new(ApiClient::new(base_url, session.clone()));

    let mut guard = RouteGuard::new(session.clone());
    if let RouteDecision::Redirect(Route::Login) = guard.check(Route::Dashboard) {
        let email = std::env::var("TASKDASH_EMAIL").expect("TASKDASH_EMAIL to be set");
        let password = std::env::var("TASKDASH_PASSWORD").expect("TASKDASH_PASSWORD to be set");
        api.login(&LoginRequest { email, password })
            .await
            .expect("login failed");
    }
    let landing = guard.post_login_target();
    tracing::info!(landing = landing.path(), "entering");

    let coordinator = TaskMutationCoordinator::new(api, Arc::new(TracingNotifier));
    let mut dashboard = Dashboard::new(coordinator);
    if let Err(err) = dashboard.load().await {
        eprintln!("{}", dashboard.load_error().unwrap_or(&err.to_string()));
        std::process::exit(1);
    }

    let view = dashboard.view().expect("view derived after load");
    println!(
        "待辦 {}｜進行中 {}｜已完成 {}｜完成率 {}%",
        view.distribution.todo,
        view.distribution.in_progress,
        view.distribution.done,
        view.completion_rate
    );
    for point in &view.trend {
        println!("{}  {}", point.date, point.count);
    }
    for task in &view.visible_tasks {
        println!("#{} [{}] {}", task.task.id, task.status_label, task.task.title);
    }
}
