use anyhow::Result;
use moka::future::Cache;
use once_cell::sync::Lazy;
use serde::Serialize;
use sqlx::MySqlPool;
use std::time::Duration;
use utoipa::ToSchema;

/// Pending-work counters shown on the admin overview. Refreshed by a
/// fixed-interval background poller rather than per-request queries; the
/// data changes at human speed, so staleness up to one interval is fine.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct PendingCounts {
    pub pending_leave_requests: i64,
    pub pending_tasks: i64,
}

const COUNTS_KEY: &str = "pending";

static COUNTS_CACHE: Lazy<Cache<&'static str, PendingCounts>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(4)
        .time_to_idle(Duration::from_secs(600))
        .build()
});

/// Last polled counts; zeroes before the first refresh completes.
pub async fn current() -> PendingCounts {
    COUNTS_CACHE.get(COUNTS_KEY).await.unwrap_or_default()
}

pub async fn refresh(pool: &MySqlPool) -> Result<PendingCounts> {
    let pending_leave_requests = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM leave_requests WHERE status = 'Pending'",
    )
    .fetch_one(pool)
    .await?;

    let pending_tasks =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE status = 'Pending'")
            .fetch_one(pool)
            .await?;

    let counts = PendingCounts {
        pending_leave_requests,
        pending_tasks,
    };
    COUNTS_CACHE.insert(COUNTS_KEY, counts).await;

    Ok(counts)
}

/// Handle for the periodic refresh task; aborting it stops the poll loop.
pub struct PollerHandle {
    handle: actix_web::rt::task::JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(self) {
        self.handle.abort();
    }
}

/// Spawn the fixed-interval poller. A failed refresh leaves the previous
/// cached counts in place until the next tick.
pub fn spawn_poller(pool: MySqlPool, every: Duration) -> PollerHandle {
    let handle = actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = refresh(&pool).await {
                log::warn!("Overview counts refresh failed: {}", e);
            }
        }
    });

    PollerHandle { handle }
}
