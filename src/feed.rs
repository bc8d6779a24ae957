//! Paginated feed controller
//!
//! Owns one feed session: fetches pages, deduplicates them into the flat
//! store, and reruns thread reconstruction over the *whole* accumulated
//! store after every append or moderation change. Because every pass runs
//! over the full store, the rendered forest is always consistent with the
//! latest pages and moderation lists regardless of how loads and refreshes
//! interleave.

use std::collections::HashSet;

use serde_json::Value;
use uuid::Uuid;

use crate::api::FeedApi;
use crate::decode::decode_page;
use crate::error::FeedError;
use crate::models::ActivityRecord;
use crate::moderation::ModerationState;
use crate::thread::reconstruct;

/// Accumulated per-screen feed state
///
/// Constructed by the controller on first load, reset on full refresh, and
/// dropped with it; nothing here is shared across screens.
#[derive(Debug)]
pub struct FeedSession {
    /// Client-side session identity
    pub id: Uuid,
    /// All fetched records so far, deduplicated, in server arrival order
    pub flat_store: Vec<ActivityRecord>,
    /// Dedup index over `flat_store`
    seen_ids: HashSet<i64>,
    /// 1-based page cursor
    pub current_page: u32,
    /// Whether another page may contain more results
    pub has_more: bool,
}

impl FeedSession {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            flat_store: Vec::new(),
            seen_ids: HashSet::new(),
            current_page: 1,
            has_more: true,
        }
    }

    /// Append decoded records, skipping any id already in the store
    fn append_deduped(&mut self, records: Vec<ActivityRecord>) -> usize {
        let mut added = 0;
        for record in records {
            if self.seen_ids.insert(record.id) {
                self.flat_store.push(record);
                added += 1;
            } else {
                tracing::debug!("Skipping duplicate activity {} across pages", record.id);
            }
        }
        added
    }
}

/// Outcome of a [`FeedController::load_next_page`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// New records were appended to the store
    Appended {
        /// How many records survived dedup
        added: usize,
    },
    /// The feed has no more pages
    Exhausted,
    /// A load was already in flight or the feed was known to be exhausted
    Skipped,
}

/// Orchestrates page-by-page fetching for one feed session
pub struct FeedController<A: FeedApi> {
    api: A,
    page_size: usize,
    session: FeedSession,
    moderation: ModerationState,
    forest: Vec<ActivityRecord>,
    loading: bool,
    generation: u64,
}

impl<A: FeedApi> FeedController<A> {
    /// Create a controller with a fresh, empty session
    pub fn new(api: A, page_size: usize) -> Self {
        Self {
            api,
            page_size,
            session: FeedSession::new(),
            moderation: ModerationState::default(),
            forest: Vec::new(),
            loading: false,
            generation: 0,
        }
    }

    /// The latest rendered forest
    pub fn forest(&self) -> &[ActivityRecord] {
        &self.forest
    }

    /// Number of records in the accumulated flat store
    pub fn flat_len(&self) -> usize {
        self.session.flat_store.len()
    }

    /// Current 1-based page cursor
    pub const fn current_page(&self) -> u32 {
        self.session.current_page
    }

    /// Whether another page may contain more results
    pub const fn has_more(&self) -> bool {
        self.session.has_more
    }

    /// Session epoch, bumped on every full refresh
    ///
    /// Forest publications are tagged with this; a consumer that triggered a
    /// full refresh while a load was pending drops results carrying a stale
    /// generation.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The current moderation lists
    pub const fn moderation(&self) -> &ModerationState {
        &self.moderation
    }

    /// The backend client this controller fetches through
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Full refresh: reset the session to page 1 and fetch the first page
    pub async fn load_first_page(&mut self) -> Result<(), FeedError> {
        self.generation = self.generation.wrapping_add(1);

        self.loading = true;
        let result = self.api.fetch_page(1, self.page_size).await;
        self.loading = false;

        // The old store and forest stay intact on failure so the screen
        // keeps showing what it had
        let raw_page = result?;

        self.session = FeedSession::new();
        self.apply_page(&raw_page);
        self.rebuild();
        Ok(())
    }

    /// Fetch the next page, if one may exist and nothing is in flight
    pub async fn load_next_page(&mut self) -> Result<PageOutcome, FeedError> {
        if self.loading || !self.session.has_more {
            return Ok(PageOutcome::Skipped);
        }

        let next_page = self.session.current_page + 1;
        self.loading = true;
        let result = self.api.fetch_page(next_page, self.page_size).await;
        self.loading = false;

        let raw_page = result?;
        if raw_page.is_empty() {
            self.session.has_more = false;
            return Ok(PageOutcome::Exhausted);
        }

        let added = self.apply_page(&raw_page);
        self.session.current_page = next_page;
        self.rebuild();
        Ok(PageOutcome::Appended { added })
    }

    /// Replace the moderation lists wholesale and rebuild, no network
    pub fn refresh_moderation(&mut self, moderation: ModerationState) {
        self.moderation = moderation;
        self.rebuild();
    }

    /// Pull fresh moderation lists from the backend
    ///
    /// The two lists are independently fetchable and independently failable;
    /// a failed fetch leaves that set at its previous value. The forest is
    /// rebuilt against whatever was applied, and the first failure (if any)
    /// is surfaced after the rebuild.
    pub async fn fetch_moderation(&mut self) -> Result<(), FeedError> {
        let mut first_error = None;

        match self.api.fetch_blocked_ids().await {
            Ok(ids) => self.moderation.replace_blocked(ids),
            Err(e) => {
                tracing::warn!("Keeping previous blocked list, fetch failed: {e}");
                first_error = Some(e);
            }
        }
        match self.api.fetch_muted_ids().await {
            Ok(ids) => self.moderation.replace_muted(ids),
            Err(e) => {
                tracing::warn!("Keeping previous muted list, fetch failed: {e}");
                first_error.get_or_insert(e);
            }
        }

        self.rebuild();
        first_error.map_or(Ok(()), Err)
    }

    /// Decode, dedup, and append one raw page; returns how many were added
    fn apply_page(&mut self, raw_page: &[Value]) -> usize {
        if raw_page.len() < self.page_size {
            self.session.has_more = false;
        }
        let records = decode_page(raw_page);
        self.session.append_deduped(records)
    }

    fn rebuild(&mut self) {
        self.forest = reconstruct(&self.session.flat_store, &self.moderation);
    }

    /// The accumulated flat store, in arrival order (for cache write-through
    /// and diagnostics)
    pub fn flat_store(&self) -> &[ActivityRecord] {
        &self.session.flat_store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted backend: pages are served in order, errors injected by flag
    struct MockApi {
        pages: Mutex<Vec<Result<Vec<Value>, FeedError>>>,
        blocked: Mutex<Result<Vec<i64>, ()>>,
        muted: Mutex<Result<Vec<i64>, ()>>,
    }

    impl MockApi {
        fn with_pages(pages: Vec<Vec<Value>>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().map(Ok).collect()),
                blocked: Mutex::new(Ok(Vec::new())),
                muted: Mutex::new(Ok(Vec::new())),
            }
        }

        fn push_failure(self) -> Self {
            self.pages.lock().unwrap().push(Err(FeedError::Http {
                status: 500,
                body: "boom".to_string(),
            }));
            self
        }
    }

    fn moderation_err() -> FeedError {
        FeedError::Http {
            status: 503,
            body: "unavailable".to_string(),
        }
    }

    impl FeedApi for MockApi {
        async fn fetch_page(&self, _page: u32, _per_page: usize) -> Result<Vec<Value>, FeedError> {
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                Ok(Vec::new())
            } else {
                pages.remove(0)
            }
        }

        async fn fetch_blocked_ids(&self) -> Result<std::collections::HashSet<i64>, FeedError> {
            self.blocked
                .lock()
                .unwrap()
                .clone()
                .map(|ids| ids.into_iter().collect())
                .map_err(|()| moderation_err())
        }

        async fn fetch_muted_ids(&self) -> Result<std::collections::HashSet<i64>, FeedError> {
            self.muted
                .lock()
                .unwrap()
                .clone()
                .map(|ids| ids.into_iter().collect())
                .map_err(|()| moderation_err())
        }

        async fn block(&self, _user_id: i64) -> Result<(), FeedError> {
            Ok(())
        }
        async fn unblock(&self, _user_id: i64) -> Result<(), FeedError> {
            Ok(())
        }
        async fn mute(&self, _user_id: i64) -> Result<(), FeedError> {
            Ok(())
        }
        async fn unmute(&self, _user_id: i64) -> Result<(), FeedError> {
            Ok(())
        }
    }

    fn raw_update(id: i64, user_id: i64) -> Value {
        json!({ "id": id, "user_id": user_id, "type": "activity_update" })
    }

    #[tokio::test]
    async fn test_first_page_builds_forest() {
        let api = MockApi::with_pages(vec![vec![raw_update(1, 10), raw_update(2, 11)]]);
        let mut controller = FeedController::new(api, 2);

        controller.load_first_page().await.unwrap();
        assert_eq!(controller.flat_len(), 2);
        assert_eq!(controller.forest().len(), 2);
        assert_eq!(controller.current_page(), 1);
        assert_eq!(controller.generation(), 1);
    }

    #[tokio::test]
    async fn test_pages_dedup_by_id_first_seen_order() {
        let api = MockApi::with_pages(vec![
            vec![raw_update(1, 1), raw_update(2, 1), raw_update(3, 1)],
            vec![raw_update(3, 1), raw_update(4, 1), raw_update(5, 1)],
        ]);
        let mut controller = FeedController::new(api, 3);

        controller.load_first_page().await.unwrap();
        let outcome = controller.load_next_page().await.unwrap();
        assert_eq!(outcome, PageOutcome::Appended { added: 2 });

        let ids: Vec<i64> = controller.flat_store().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(controller.current_page(), 2);
    }

    #[tokio::test]
    async fn test_short_page_ends_feed() {
        let api = MockApi::with_pages(vec![
            vec![raw_update(1, 1), raw_update(2, 1)],
            vec![raw_update(3, 1)],
        ]);
        let mut controller = FeedController::new(api, 2);

        controller.load_first_page().await.unwrap();
        assert!(controller.has_more());

        controller.load_next_page().await.unwrap();
        assert!(!controller.has_more());
        assert_eq!(controller.load_next_page().await.unwrap(), PageOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_empty_page_is_exhausted_not_error() {
        let api = MockApi::with_pages(vec![vec![raw_update(1, 1), raw_update(2, 1)]]);
        let mut controller = FeedController::new(api, 2);

        controller.load_first_page().await.unwrap();
        assert_eq!(controller.load_next_page().await.unwrap(), PageOutcome::Exhausted);
        assert!(!controller.has_more());
        // The store keeps what it had
        assert_eq!(controller.flat_len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_state_untouched() {
        let api = MockApi::with_pages(vec![vec![raw_update(1, 1), raw_update(2, 1)]]).push_failure();
        let mut controller = FeedController::new(api, 2);

        controller.load_first_page().await.unwrap();
        let err = controller.load_next_page().await.unwrap_err();
        assert!(matches!(err, FeedError::Http { status: 500, .. }));

        assert_eq!(controller.flat_len(), 2);
        assert_eq!(controller.current_page(), 1);
        assert_eq!(controller.forest().len(), 2);
        // Retry works after the failure
        assert_eq!(controller.load_next_page().await.unwrap(), PageOutcome::Exhausted);
    }

    #[tokio::test]
    async fn test_full_refresh_resets_session() {
        let api = MockApi::with_pages(vec![
            vec![raw_update(1, 1), raw_update(2, 1)],
            vec![raw_update(1, 1), raw_update(9, 1)],
        ]);
        let mut controller = FeedController::new(api, 2);

        controller.load_first_page().await.unwrap();
        controller.load_first_page().await.unwrap();

        // Reset store may legally reintroduce ids from the previous session
        let ids: Vec<i64> = controller.flat_store().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 9]);
        assert_eq!(controller.current_page(), 1);
        assert_eq!(controller.generation(), 2);
    }

    #[tokio::test]
    async fn test_moderation_refresh_without_fetch() {
        let api = MockApi::with_pages(vec![vec![raw_update(1, 7), raw_update(2, 8)]]);
        let mut controller = FeedController::new(api, 2);
        controller.load_first_page().await.unwrap();
        assert_eq!(controller.forest().len(), 2);

        let blocked = ModerationState::new([7].into_iter().collect(), HashSet::new());
        controller.refresh_moderation(blocked);
        assert_eq!(controller.forest().len(), 1);
        assert_eq!(controller.forest()[0].id, 2);

        controller.refresh_moderation(ModerationState::default());
        assert_eq!(controller.forest().len(), 2);
    }

    #[tokio::test]
    async fn test_moderation_fetch_failure_keeps_previous_set() {
        let api = MockApi::with_pages(vec![vec![raw_update(1, 7), raw_update(2, 8)]]);
        *api.blocked.lock().unwrap() = Ok(vec![7]);
        let mut controller = FeedController::new(api, 2);

        controller.load_first_page().await.unwrap();
        controller.fetch_moderation().await.unwrap();
        assert!(controller.moderation().is_blocked(7));
        assert_eq!(controller.forest().len(), 1);

        // Blocked fetch now fails; the previous blocked set must survive
        *controller.api.blocked.lock().unwrap() = Err(());
        *controller.api.muted.lock().unwrap() = Ok(vec![8]);
        let err = controller.fetch_moderation().await.unwrap_err();
        assert!(matches!(err, FeedError::Http { status: 503, .. }));
        assert!(controller.moderation().is_blocked(7));
        assert!(controller.moderation().is_muted(8));
        assert!(controller.forest().is_empty());
    }
}
