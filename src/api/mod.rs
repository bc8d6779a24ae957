//! API clients for the reading platform backend

pub mod buddypress;

use std::collections::HashSet;
use std::future::Future;

use serde_json::Value;

use crate::error::FeedError;

pub use buddypress::BuddyPressClient;

/// Narrow contract the feed engine needs from the backend
///
/// Raw pages come back as untyped JSON values on purpose: the tolerant
/// decoder owns all interpretation of the loosely-typed payloads. An empty
/// page means the feed is exhausted, not an error.
///
/// Futures are `Send` so a controller can live on the feed worker task;
/// implementors just write `async fn`.
pub trait FeedApi: Send + Sync {
    /// Fetch one page of the activity feed (1-based page cursor)
    fn fetch_page(
        &self,
        page: u32,
        per_page: usize,
    ) -> impl Future<Output = Result<Vec<Value>, FeedError>> + Send;

    /// Fetch the full blocked-users list
    fn fetch_blocked_ids(&self) -> impl Future<Output = Result<HashSet<i64>, FeedError>> + Send;

    /// Fetch the full muted-users list
    fn fetch_muted_ids(&self) -> impl Future<Output = Result<HashSet<i64>, FeedError>> + Send;

    /// Block a user
    fn block(&self, user_id: i64) -> impl Future<Output = Result<(), FeedError>> + Send;

    /// Unblock a user
    fn unblock(&self, user_id: i64) -> impl Future<Output = Result<(), FeedError>> + Send;

    /// Mute a user
    fn mute(&self, user_id: i64) -> impl Future<Output = Result<(), FeedError>> + Send;

    /// Unmute a user
    fn unmute(&self, user_id: i64) -> impl Future<Output = Result<(), FeedError>> + Send;
}
