//! Trait definitions for watching-status sources.
//!
//! The cloud publisher and the local companion both implement
//! [`StatusSource`], so the resolver can be tested against fakes.

use std::future::Future;

use foxden_core::models::WatchingRecord;

/// Somewhere a current [`WatchingRecord`] can be fetched from.
pub trait StatusSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short label for logs ("cloud", "local").
    fn name(&self) -> &str;

    /// Fetch the source's current record, as reported.
    fn fetch_status(&self) -> impl Future<Output = Result<WatchingRecord, Self::Error>> + Send;
}
