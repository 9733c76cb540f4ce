use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::store::ContentStore;
use crate::thumbs::Thumbnailer;

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: Arc<AppConfig>,

    /// Filesystem-backed content collections
    pub store: ContentStore,

    /// Handle to the background thumbnail worker
    pub thumbs: Thumbnailer,

    /// Rate limit tracking: client key -> (count, window_start)
    pub rate_limiter: DashMap<String, (u32, std::time::Instant)>,
}

impl AppState {
    /// Create new application state, bootstrapping the content tree and
    /// spawning the thumbnail worker.
    ///
    /// The worker's `JoinHandle` is returned alongside the state: after the
    /// server stops, close the queue (`state.thumbs.close()`) and await the
    /// handle so already-accepted uploads still get their thumbnails.
    pub fn new(config: AppConfig) -> anyhow::Result<(Arc<Self>, JoinHandle<()>)> {
        let store = ContentStore::new(&config.data_dir)?;
        let (thumbs, worker) = Thumbnailer::spawn();

        let state = Arc::new(Self {
            config: Arc::new(config),
            store,
            thumbs,
            rate_limiter: DashMap::new(),
        });
        Ok((state, worker))
    }

    /// Fixed-window rate limit check for one client key.
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = std::time::Instant::now();
        let window = std::time::Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}
