//! Polling: run every interested query, one at a time

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::AppState;
use crate::domain::twitter::feed_queries;
use crate::services::ingest::run_query;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Run the interested queries, or every query when `force` is set.
///
/// A failing query is logged and skipped; only a failure to list the
/// queries aborts the poll.
pub async fn poll_queries(state: &AppState, force: bool) -> Result<PollSummary, sqlx::Error> {
    let queries = if force {
        feed_queries::list_queries(&state.db).await?
    } else {
        feed_queries::list_interested_queries(&state.db).await?
    };

    let mut summary = PollSummary::default();
    for query in queries {
        match run_query(&state.db, state.source.as_ref(), &state.settings, &query).await {
            Ok(_) => summary.succeeded += 1,
            Err(e) => {
                summary.failed += 1;
                error!(query_id = query.id, "Polling {} failed: {}", query, e);
            }
        }
    }

    info!(
        "Poll finished: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
    Ok(summary)
}

/// Background scheduler that polls interested queries on a fixed interval.
///
/// A zero interval is raised to one second; `tokio::time::interval` panics
/// on a zero period.
pub async fn start_background_scheduler(state: Arc<AppState>, check_interval_secs: u64) {
    let period = Duration::from_secs(check_interval_secs.max(1));
    if check_interval_secs == 0 {
        warn!("[scheduler] Poll interval of 0s raised to {}s", period.as_secs());
    }
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;

        if let Err(e) = poll_queries(&state, false).await {
            error!("[scheduler] Error listing interested queries: {}", e);
        }
    }
}
