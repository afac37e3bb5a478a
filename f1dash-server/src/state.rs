//! Application state management

use crate::cache::{SessionCache, SessionHandle};
use crate::error::ApiError;
use f1dash_core::metrics::AnimationOptions;
use f1dash_core::model::LoadOptions;
use f1dash_core::{SessionKey, SessionProvider};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Where sessions come from
    pub provider: Arc<dyn SessionProvider>,

    /// Loaded sessions, shared by every request
    pub cache: Arc<Mutex<SessionCache>>,

    /// Track replay sampling and playback settings
    pub animation: AnimationOptions,
}

impl AppState {
    pub fn new(provider: Arc<dyn SessionProvider>, cache_capacity: usize) -> Self {
        Self {
            provider,
            cache: Arc::new(Mutex::new(SessionCache::new(cache_capacity))),
            animation: AnimationOptions::default(),
        }
    }

    pub fn with_animation(mut self, animation: AnimationOptions) -> Self {
        self.animation = animation;
        self
    }

    /// Cached session for `key`, loading it through the provider on a miss
    ///
    /// The cache lock is not held across the load: two concurrent misses
    /// for the same key both load, and the later insert replaces the
    /// earlier entry.
    pub async fn get_session(&self, key: &SessionKey) -> Result<SessionHandle, ApiError> {
        if let Some(handle) = self.cache.lock().await.get(key) {
            return Ok(handle);
        }

        info!("Loading {} from {}", key, self.provider.name());
        let provider = self.provider.clone();
        let load_key = key.clone();
        let session = tokio::task::spawn_blocking(move || {
            provider.load_session(&load_key, LoadOptions::laps_and_telemetry())
        })
        .await??;

        let handle = self.cache.lock().await.insert(key, session);
        info!("Loaded {} ({} laps)", key, handle.laps.len());
        Ok(handle)
    }
}
