use std::sync::Arc;
use std::time::Duration;

use crate::api::coordinator::UpdateCoordinator;
use crate::storage::SnapshotCache;
use crate::tracker::StatsTracker;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<StatsTracker>,
    pub cache: Arc<SnapshotCache>,
    pub coordinator: Arc<UpdateCoordinator>,
    /// Upper bound on a single update run
    pub update_deadline: Duration,
}
