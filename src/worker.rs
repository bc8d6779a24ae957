//! Feed worker task
//!
//! Uses channels to communicate between the screen and the async feed
//! engine. The spawned task is the single writer for its feed session:
//! commands are processed strictly one at a time, so two page loads can
//! never race and every published forest reflects a complete pass.

use tokio::sync::mpsc;

use crate::api::FeedApi;
use crate::db::ActivityCache;
use crate::error::FeedError;
use crate::feed::{FeedController, PageOutcome};
use crate::models::ActivityRecord;

/// Commands sent from the screen to the feed worker
#[derive(Debug, Clone)]
pub enum FeedCommand {
    /// Full refresh: reset to page 1 and refetch
    LoadFirstPage,
    /// Fetch the next page, if any
    LoadNextPage,
    /// Re-pull the moderation lists and rebuild, no feed fetch
    RefreshModeration,
    /// Block a user, then refresh moderation
    Block {
        /// Author to block
        user_id: i64,
    },
    /// Unblock a user, then refresh moderation
    Unblock {
        /// Author to unblock
        user_id: i64,
    },
    /// Mute a user, then refresh moderation
    Mute {
        /// Author to mute
        user_id: i64,
    },
    /// Unmute a user, then refresh moderation
    Unmute {
        /// Author to unmute
        user_id: i64,
    },
    /// Shut down the worker
    Shutdown,
}

/// Events sent back from the feed worker to the screen
#[derive(Debug)]
pub enum FeedEvent {
    /// A reconstruction pass completed
    ForestUpdated {
        /// Session epoch this forest belongs to; consumers drop events from
        /// a superseded generation (full refresh while a load was queued)
        generation: u64,
        /// The rendered forest
        forest: Vec<ActivityRecord>,
    },
    /// The feed has no more pages
    EndOfFeed,
    /// A fetch failed; previously loaded state is untouched and the command
    /// may be retried
    Error {
        /// Human-readable description
        message: String,
    },
}

/// Channel handles for talking to the feed worker
pub struct FeedHandle {
    /// Send commands to the worker
    pub cmd_tx: mpsc::Sender<FeedCommand>,
    /// Receive events from the worker
    pub event_rx: mpsc::Receiver<FeedEvent>,
}

/// Spawn the feed worker and return its handles
///
/// When a cache is supplied, fetched records are written through to it
/// best-effort for offline reads.
pub fn spawn_worker<A>(api: A, page_size: usize, cache: Option<ActivityCache>) -> FeedHandle
where
    A: FeedApi + 'static,
{
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<FeedCommand>(32);
    let (event_tx, event_rx) = mpsc::channel::<FeedEvent>(32);

    tokio::spawn(async move {
        let mut controller = FeedController::new(api, page_size);

        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                FeedCommand::Shutdown => break,
                FeedCommand::LoadFirstPage => {
                    match controller.load_first_page().await {
                        Ok(()) => {
                            write_through(cache.as_ref(), controller.flat_store());
                            publish_forest(&event_tx, &controller).await;
                        }
                        Err(e) => send_error(&event_tx, &e).await,
                    }
                }
                FeedCommand::LoadNextPage => match controller.load_next_page().await {
                    Ok(PageOutcome::Appended { .. }) => {
                        write_through(cache.as_ref(), controller.flat_store());
                        publish_forest(&event_tx, &controller).await;
                    }
                    Ok(PageOutcome::Exhausted) => {
                        let _ = event_tx.send(FeedEvent::EndOfFeed).await;
                    }
                    Ok(PageOutcome::Skipped) => {}
                    Err(e) => send_error(&event_tx, &e).await,
                },
                FeedCommand::RefreshModeration => {
                    refresh_moderation(&event_tx, &mut controller).await;
                }
                FeedCommand::Block { user_id } => {
                    moderation_action(&event_tx, &mut controller, user_id, ModAction::Block).await;
                }
                FeedCommand::Unblock { user_id } => {
                    moderation_action(&event_tx, &mut controller, user_id, ModAction::Unblock)
                        .await;
                }
                FeedCommand::Mute { user_id } => {
                    moderation_action(&event_tx, &mut controller, user_id, ModAction::Mute).await;
                }
                FeedCommand::Unmute { user_id } => {
                    moderation_action(&event_tx, &mut controller, user_id, ModAction::Unmute).await;
                }
            }
        }
        tracing::debug!("Feed worker shutting down");
    });

    FeedHandle { cmd_tx, event_rx }
}

#[derive(Clone, Copy)]
enum ModAction {
    Block,
    Unblock,
    Mute,
    Unmute,
}

async fn moderation_action<A: FeedApi>(
    event_tx: &mpsc::Sender<FeedEvent>,
    controller: &mut FeedController<A>,
    user_id: i64,
    action: ModAction,
) {
    let result = match action {
        ModAction::Block => controller.api().block(user_id).await,
        ModAction::Unblock => controller.api().unblock(user_id).await,
        ModAction::Mute => controller.api().mute(user_id).await,
        ModAction::Unmute => controller.api().unmute(user_id).await,
    };

    match result {
        Ok(()) => refresh_moderation(event_tx, controller).await,
        Err(e) => send_error(event_tx, &e).await,
    }
}

async fn refresh_moderation<A: FeedApi>(
    event_tx: &mpsc::Sender<FeedEvent>,
    controller: &mut FeedController<A>,
) {
    // The controller keeps whatever lists it could apply even when a fetch
    // fails, so the forest is published either way
    let result = controller.fetch_moderation().await;
    publish_forest(event_tx, controller).await;
    if let Err(e) = result {
        send_error(event_tx, &e).await;
    }
}

async fn publish_forest<A: FeedApi>(
    event_tx: &mpsc::Sender<FeedEvent>,
    controller: &FeedController<A>,
) {
    let _ = event_tx
        .send(FeedEvent::ForestUpdated {
            generation: controller.generation(),
            forest: controller.forest().to_vec(),
        })
        .await;
}

async fn send_error(event_tx: &mpsc::Sender<FeedEvent>, error: &FeedError) {
    let _ = event_tx
        .send(FeedEvent::Error {
            message: error.to_string(),
        })
        .await;
}

fn write_through(cache: Option<&ActivityCache>, records: &[ActivityRecord]) {
    if let Some(cache) = cache {
        if let Err(e) = cache.cache_page(records) {
            tracing::warn!("Failed to cache activity page: {e}");
        }
    }
}
