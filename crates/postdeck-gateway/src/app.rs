use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use axum::{middleware, routing::get, Router};
use postdeck_core::config::PostdeckConfig;
use postdeck_posts::{Dashboard, PostManager, PostStore};
use postdeck_scheduler::{SweepReport, Sweeper};

use crate::http::{categories, dashboard, health, posts, publish};

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: PostdeckConfig,
    pub posts: PostManager,
    pub dashboard: Dashboard,
    pub sweeper: Sweeper,
    pub sweep_stats: SweepStats,
}

impl AppState {
    /// Build every subsystem on top of one store handle.
    pub fn new(config: PostdeckConfig, store: PostStore) -> Self {
        Self {
            config,
            posts: PostManager::new(store.clone()),
            dashboard: Dashboard::new(store.clone()),
            sweeper: Sweeper::new(store),
            sweep_stats: SweepStats::default(),
        }
    }
}

/// Totals across every sweep that published something, whether triggered by
/// the background engine or over HTTP.
#[derive(Default)]
pub struct SweepStats {
    published_total: AtomicU64,
    last: Mutex<Option<SweepReport>>,
}

impl SweepStats {
    pub fn record(&self, report: &SweepReport) {
        if report.is_empty() {
            return;
        }
        self.published_total
            .fetch_add(report.published as u64, Ordering::Relaxed);
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(report.clone());
    }

    pub fn published_total(&self) -> u64 {
        self.published_total.load(Ordering::Relaxed)
    }

    pub fn last(&self) -> Option<SweepReport> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/archived", get(posts::list_archived))
        .route("/posts/due", get(posts::list_due))
        .route(
            "/posts/{id}",
            get(posts::get_post)
                .patch(posts::update_post)
                .delete(posts::delete_post),
        )
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/categories/{id}/posts", get(categories::list_category_posts))
        .route(
            "/publish-scheduled",
            get(publish::publish_scheduled).post(publish::publish_scheduled),
        )
        .route("/dashboard", get(dashboard::dashboard_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api", api)
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
