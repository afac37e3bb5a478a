//! Session provider trait definition

use crate::error::Result;
use crate::model::{EventInfo, LoadOptions, Session, SessionKey};

/// Trait for sources of session data
///
/// Each provider is responsible for:
/// - Publishing the event schedule of a season
/// - Resolving a (year, event, session type) key to a session
/// - Converting its own payloads to the unified [`Session`] model
///
/// Loads are synchronous and may be slow; callers run them off the async
/// executor.
pub trait SessionProvider: Send + Sync {
    /// Get the name of this provider (e.g., "Demo", "Archive")
    fn name(&self) -> &str;

    /// Every event of a season, testing included, in round order
    fn event_schedule(&self, year: i32) -> Result<Vec<EventInfo>>;

    /// Load a session
    ///
    /// Returns `DataUnavailable` when the event or session cannot be
    /// resolved (unknown name, not yet run, no payload).
    fn load_session(&self, key: &SessionKey, options: LoadOptions) -> Result<Session>;
}
