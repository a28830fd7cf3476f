pub mod api;
pub mod compose;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod guard;
pub mod models;
pub mod mutation;
pub mod session;
pub mod ui;
pub mod view;

pub use api::ApiClient;
pub use compose::TaskComposer;
pub use dashboard::Dashboard;
pub use error::ApiError;
pub use guard::{Route, RouteDecision, RouteGuard};
pub use mutation::TaskMutationCoordinator;
pub use session::SessionStore;
pub use view::{derive_view, FilterState, StatusFilter, ViewBundle};
